//! HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/api/v1/diagnoses` | All diagnosis trees |
//! | `POST`   | `/api/v1/diagnoses` | Create a diagnosis tree (201) |
//! | `PATCH`  | `/api/v1/diagnoses/{id}` | Rename or move a diagnosis |
//! | `DELETE` | `/api/v1/diagnoses/{id}` | Delete a diagnosis and its subtree (204) |
//! | `POST`   | `/api/v1/summarization/anonymize_report` | Anonymized diagnostic section of a .docx report |
//! | `POST`   | `/api/v1/summarization/summarize_report` | Plain-language summary as .docx (201 new, 200 stored) |
//! | `POST`   | `/api/v1/file_conversion/md2docx` | Markdown to .docx |
//! | `POST`   | `/api/v1/file_conversion/intake2docx` | REDCap intake survey to report draft |
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/` | Redirects to `/health` |
//!
//! Errors use the body documented in [`crate::error`].
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection},
        DefaultBodyLimit, Form, Multipart, Path, State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::anonymizer;
use crate::config::{Config, Environment};
use crate::diagnoses;
use crate::docx::MIME_DOCX;
use crate::error::ApiError;
use crate::intake;
use crate::logging;
use crate::migrate;
use crate::models::{CreateDiagnosisRequest, DiagnosisNodeOutput, DiagnosisNodePatch, Report};
use crate::openai::OpenAiClient;
use crate::pandoc;
use crate::prompts::Prompts;
use crate::summarization;

/// Uploaded reports and intake exports may exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub openai: Arc<OpenAiClient>,
    pub prompts: Arc<Prompts>,
}

impl AppState {
    /// Connects and migrates the database, seeds diagnoses in development,
    /// and loads the chat prompts.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = crate::db::connect(config).await?;
        migrate::run_migrations(&pool).await?;

        if config.app.environment == Environment::Development {
            diagnoses::seed_diagnoses(&pool, &config.app.diagnoses_file).await?;
        }

        let prompts = Prompts::load(&config.openai.prompt_file)?;
        let openai = OpenAiClient::new(&config.openai)?;

        Ok(Self {
            config: Arc::new(config.clone()),
            pool,
            openai: Arc::new(openai),
            prompts: Arc::new(prompts),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/diagnoses", get(handle_get_diagnoses).post(handle_create_diagnosis))
        .route(
            "/diagnoses/{id}",
            patch(handle_patch_diagnosis).delete(handle_delete_diagnosis),
        )
        .route(
            "/summarization/anonymize_report",
            post(handle_anonymize_report),
        )
        .route(
            "/summarization/summarize_report",
            post(handle_summarize_report),
        )
        .route("/file_conversion/md2docx", post(handle_md2docx))
        .route("/file_conversion/intake2docx", post(handle_intake2docx));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handle_health))
        .route("/", get(handle_root))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(logging::request_logger))
        .layer(cors)
        .with_state(state)
}

/// Serves the API on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Starts the HTTP server on `[server].bind`.
///
/// This is the entry point used by the `ctk serve` command.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::new(config).await?;
    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        environment = %config.app.environment,
        "server listening"
    );
    serve(listener, state).await
}

fn docx_response(status: StatusCode, bytes: Vec<u8>, filename: &str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, MIME_DOCX.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Collects the named fields of a multipart body. Unknown fields are skipped.
async fn multipart_fields(
    mut multipart: Multipart,
    names: &[&str],
) -> Result<Vec<Option<Vec<u8>>>, ApiError> {
    let mut values = vec![None; names.len()];
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let Some(index) = field
            .name()
            .and_then(|name| names.iter().position(|n| *n == name))
        else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        values[index] = Some(bytes.to_vec());
    }
    Ok(values)
}

fn required_field(value: Option<Vec<u8>>, name: &str) -> Result<Vec<u8>, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("Missing form field: {}", name)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_root() -> Redirect {
    Redirect::temporary("/health")
}

// ============ /api/v1/diagnoses ============

async fn handle_get_diagnoses(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiagnosisNodeOutput>>, ApiError> {
    tracing::debug!("getting diagnoses");
    let trees = diagnoses::get_diagnoses(&state.pool).await?;
    Ok(Json(trees))
}

async fn handle_create_diagnosis(
    State(state): State<AppState>,
    payload: Result<Json<CreateDiagnosisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DiagnosisNodeOutput>), ApiError> {
    let request = json_body(payload)?;
    tracing::debug!(parent_id = ?request.parent_id, "creating diagnosis");
    let node =
        diagnoses::create_diagnosis_node(&state.pool, &request.diagnosis, request.parent_id)
            .await?;
    tracing::debug!(id = node.id, "created diagnosis");
    Ok((StatusCode::CREATED, Json(node)))
}

async fn handle_patch_diagnosis(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DiagnosisNodePatch>, JsonRejection>,
) -> Result<Json<DiagnosisNodeOutput>, ApiError> {
    let id = path_id(id)?;
    let patch = json_body(payload)?;
    tracing::debug!(id, "patching diagnosis");
    let node = diagnoses::patch_diagnosis_node(&state.pool, id, &patch).await?;
    Ok(Json(node))
}

async fn handle_delete_diagnosis(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = path_id(id)?;
    tracing::debug!(id, "deleting diagnosis");
    diagnoses::delete_diagnosis_node(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ /api/v1/summarization ============

async fn handle_anonymize_report(multipart: Multipart) -> Result<Json<String>, ApiError> {
    let mut fields = multipart_fields(multipart, &["docx_file"]).await?;
    let docx = required_field(fields.remove(0), "docx_file")?;
    tracing::debug!(bytes = docx.len(), "anonymizing report");
    let text = anonymizer::anonymize_report(&docx)?;
    Ok(Json(text))
}

async fn handle_summarize_report(
    State(state): State<AppState>,
    payload: Result<Json<Report>, JsonRejection>,
) -> Result<Response, ApiError> {
    let report = json_body(payload)?;
    tracing::debug!(chars = report.text.len(), "summarizing report");
    let (status, docx) = summarization::summarize_report(
        &state.pool,
        &state.openai,
        &state.prompts,
        &state.config.conversion.pandoc,
        &report.text,
    )
    .await?;
    Ok(docx_response(status, docx, "summary.docx"))
}

// ============ /api/v1/file_conversion ============

#[derive(Deserialize)]
struct MarkdownForm {
    markdown_text: String,
}

async fn handle_md2docx(
    State(state): State<AppState>,
    form: Result<Form<MarkdownForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    tracing::debug!(chars = form.markdown_text.len(), "converting markdown");
    let docx =
        pandoc::markdown_to_docx(&state.config.conversion.pandoc, &form.markdown_text).await?;
    Ok(docx_response(StatusCode::OK, docx, "md2docx.docx"))
}

async fn handle_intake2docx(multipart: Multipart) -> Result<Response, ApiError> {
    let mut fields =
        multipart_fields(multipart, &["csv_file", "redcap_survey_identifier"]).await?;
    let identifier = required_field(fields.remove(1), "redcap_survey_identifier")?;
    let csv = required_field(fields.remove(0), "csv_file")?;

    let identifier = String::from_utf8_lossy(&identifier);
    let identifier: i64 = identifier.trim().parse().map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid redcap_survey_identifier: '{}'",
            identifier.trim()
        ))
    })?;

    tracing::debug!(identifier, "converting intake form");
    let document = intake::intake_report(&csv, identifier)?;
    let docx = document
        .to_bytes()
        .map_err(|e| ApiError::internal(format!("Failed to write report: {}", e)))?;
    Ok(docx_response(StatusCode::OK, docx, "report.docx"))
}
