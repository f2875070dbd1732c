//! Log setup and the HTTP request logger.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::Config;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &Config) -> String {
    format!("ctk_api={}", config.logging.level)
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. A second call is a no-op.
pub fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Tags every request with a fresh id, logs its start and end, and echoes the
/// id in the `x-request-id` response header.
pub async fn request_logger(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!("request", request_id = %request_id);
    tracing::info!(parent: &span, "Starting request: {} - {} - {}", request_id, method, path);
    let mut response = next.run(request).instrument(span.clone()).await;
    tracing::info!(parent: &span, "Finished request: {}.", request_id);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
