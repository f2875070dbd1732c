//! OpenAI chat completions client.
//!
//! Retry strategy:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (not 429) → fail immediately
//! - Network errors → retry
//!
//! Retries back off exponentially: 1s, 2s, 4s, … capped at 32s.

use anyhow::{bail, Result};
use serde::Serialize;
use std::time::Duration;

use crate::config::OpenAiConfig;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one system and one user message and returns the content of the
    /// first choice, `None` when the model returned no content.
    pub async fn chat_completion(&self, system: &str, user: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(attempt, delay_secs = delay.as_secs(), "retrying OpenAI request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .http
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_chat_response(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "OpenAI API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Chat completion failed after retries")))
    }
}

/// `choices[0].message.content`; a null content is `None`.
fn parse_chat_response(json: &serde_json::Value) -> Result<Option<String>> {
    let message = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message"))?;

    match message.get("content") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(content)) => Ok(Some(content.clone())),
        Some(other) => bail!("Invalid OpenAI response: unexpected content {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn parses_first_choice() {
        let json = json!({"choices": [{"message": {"role": "assistant", "content": "Summary"}}]});
        assert_eq!(parse_chat_response(&json).unwrap().as_deref(), Some("Summary"));

        let json = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert_eq!(parse_chat_response(&json).unwrap(), None);

        assert!(parse_chat_response(&json!({"choices": []})).is_err());
    }

    /// Mock endpoint answering with `statuses` in turn, then 200.
    async fn mock_server(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let statuses = Arc::new(statuses);

        let app = Router::new()
            .route(
                "/chat/completions",
                post(
                    |State((calls, statuses)): State<(Arc<AtomicUsize>, Arc<Vec<u16>>)>,
                     Json(body): Json<serde_json::Value>| async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        let status = statuses.get(n).copied().unwrap_or(200);
                        let echo = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
                        (
                            StatusCode::from_u16(status).unwrap(),
                            Json(json!({"choices": [{"message": {"content": echo}}]})),
                        )
                    },
                ),
            )
            .with_state((calls.clone(), statuses));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    fn client(base_url: &str, max_retries: u32) -> OpenAiClient {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: base_url.to_string(),
            max_retries,
            ..OpenAiConfig::default()
        };
        OpenAiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn sends_messages_and_returns_content() {
        let (url, calls) = mock_server(vec![]).await;
        let reply = client(&url, 3).chat_completion("system", "report text").await.unwrap();
        assert_eq!(reply.as_deref(), Some("report text"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limits() {
        let (url, calls) = mock_server(vec![429]).await;
        let reply = client(&url, 3).chat_completion("system", "again").await.unwrap();
        assert_eq!(reply.as_deref(), Some("again"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (url, calls) = mock_server(vec![400]).await;
        let err = client(&url, 3).chat_completion("system", "bad").await.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_errors_exhaust_retries() {
        let (url, calls) = mock_server(vec![500, 500]).await;
        let err = client(&url, 1).chat_completion("system", "x").await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_sending() {
        let config = OpenAiConfig::default();
        let err = OpenAiClient::new(&config)
            .unwrap()
            .chat_completion("system", "user")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
