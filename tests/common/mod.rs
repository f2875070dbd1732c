#![allow(dead_code)]

use axum::{extract::State, routing::post, Json, Router};
use ctk_api::config::{Config, Environment};
use ctk_api::server::{self, AppState};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    pub url: String,
    _tmp: TempDir,
}

impl TestServer {
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.url, path)
    }
}

pub fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

/// Config for a server with a fresh database and no seed data.
pub fn test_config(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.app.environment = Environment::Testing;
    config.app.diagnoses_file = data_file("data/diagnoses.json");
    config.db.path = tmp.path().join("ctk.sqlite");
    config.openai.prompt_file = data_file("data/prompts.yaml");
    config.openai.api_key = Some("sk-test".to_string());
    config.openai.max_retries = 0;
    config
}

pub async fn spawn_server(configure: impl FnOnce(&mut Config)) -> TestServer {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&tmp);
    configure(&mut config);

    let state = AppState::new(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, state).await.unwrap();
    });

    TestServer {
        url: format!("http://{}", addr),
        _tmp: tmp,
    }
}

/// Chat completions endpoint answering every request with `reply`.
pub async fn spawn_openai_mock(reply: Option<&str>) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/chat/completions",
            post(
                |State((calls, reply)): State<(Arc<AtomicUsize>, Option<String>)>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": reply}}]
                    }))
                },
            ),
        )
        .with_state((calls.clone(), reply.map(str::to_string)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), calls)
}

pub async fn pandoc_available() -> bool {
    ctk_api::pandoc::is_available(Path::new("pandoc")).await
}

/// Asserts the error body of a failed response.
pub async fn assert_error(response: reqwest::Response, status: u16, code: &str, message: &str) {
    assert_eq!(response.status().as_u16(), status);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], code);
    assert_eq!(body["error"]["message"], message);
}
