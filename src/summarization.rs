//! Report summarization.
//!
//! Summaries are cached by their anonymized input text: a report that was
//! summarized before is answered from the `summaries` table without calling
//! the chat model again.

use axum::http::StatusCode;
use sqlx::SqlitePool;
use std::path::Path;

use crate::error::ApiError;
use crate::models::Summary;
use crate::openai::OpenAiClient;
use crate::pandoc;
use crate::prompts::{PromptCategory, Prompts};

const SUMMARY_PROMPT: &str = "summarize_clinical_report";
const NO_RESPONSE: &str = "No response was received from OpenAI.";

/// A summary and whether it was created by this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryText {
    pub text: String,
    pub created: bool,
}

pub async fn find_summary(
    pool: &SqlitePool,
    anonymous_text: &str,
) -> Result<Option<Summary>, sqlx::Error> {
    sqlx::query_as::<_, Summary>(
        "SELECT id, anonymous_text, summary_text FROM summaries WHERE anonymous_text = ? ORDER BY id LIMIT 1",
    )
    .bind(anonymous_text)
    .fetch_optional(pool)
    .await
}

pub async fn store_summary(
    pool: &SqlitePool,
    anonymous_text: &str,
    summary_text: &str,
) -> Result<Summary, sqlx::Error> {
    let result = sqlx::query("INSERT INTO summaries (anonymous_text, summary_text) VALUES (?, ?)")
        .bind(anonymous_text)
        .bind(summary_text)
        .execute(pool)
        .await?;
    Ok(Summary {
        id: result.last_insert_rowid(),
        anonymous_text: anonymous_text.to_string(),
        summary_text: summary_text.to_string(),
    })
}

/// Returns the stored summary of `text`, or asks the chat model for one and
/// stores it.
pub async fn summary_text(
    pool: &SqlitePool,
    client: &OpenAiClient,
    prompts: &Prompts,
    text: &str,
) -> Result<SummaryText, ApiError> {
    if let Some(summary) = find_summary(pool, text).await? {
        tracing::debug!(id = summary.id, "found stored summary");
        return Ok(SummaryText {
            text: summary.summary_text,
            created: false,
        });
    }

    let system_prompt = prompts.get(PromptCategory::System, SUMMARY_PROMPT)?;
    tracing::debug!(model = client.model(), "requesting summary");
    let reply = client
        .chat_completion(system_prompt, text)
        .await?
        .ok_or_else(|| ApiError::internal(NO_RESPONSE))?;

    let summary = store_summary(pool, text, &reply).await?;
    tracing::debug!(id = summary.id, "stored summary");
    Ok(SummaryText {
        text: summary.summary_text,
        created: true,
    })
}

/// Summarizes an anonymized report into a .docx document. The status is 201
/// when a new summary was created and 200 when a stored one was reused.
pub async fn summarize_report(
    pool: &SqlitePool,
    client: &OpenAiClient,
    prompts: &Prompts,
    pandoc_path: &Path,
    text: &str,
) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let summary = summary_text(pool, client, prompts, text).await?;
    let docx = pandoc::markdown_to_docx(pandoc_path, &summary.text).await?;
    let status = if summary.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, docx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OpenAiConfig};
    use crate::{db, migrate};
    use tempfile::TempDir;

    async fn test_pool() -> (TempDir, SqlitePool) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.db.path = tmp.path().join("ctk.sqlite");
        let pool = db::connect(&config).await.unwrap();
        migrate::run_migrations(&pool).await.unwrap();
        (tmp, pool)
    }

    fn prompts() -> Prompts {
        Prompts::parse("system:\n  summarize_clinical_report: Summarize.\n").unwrap()
    }

    /// A client pointed at a closed port; any request to it fails.
    fn unreachable_client() -> OpenAiClient {
        OpenAiClient::new(&OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            max_retries: 0,
            ..OpenAiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn stored_summary_is_reused() {
        let (_tmp, pool) = test_pool().await;
        store_summary(&pool, "[FIRST_NAME] is kind.", "Kind child.")
            .await
            .unwrap();

        let summary = summary_text(&pool, &unreachable_client(), &prompts(), "[FIRST_NAME] is kind.")
            .await
            .unwrap();
        assert_eq!(summary.text, "Kind child.");
        assert!(!summary.created);
    }

    #[tokio::test]
    async fn upstream_failure_is_an_internal_error() {
        let (_tmp, pool) = test_pool().await;
        let err = summary_text(&pool, &unreachable_client(), &prompts(), "new text")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(find_summary(&pool, "new text").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_prompt_is_an_internal_error() {
        let (_tmp, pool) = test_pool().await;
        let err = summary_text(&pool, &unreachable_client(), &Prompts::default(), "text")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("summarize_clinical_report"));
    }

    #[tokio::test]
    async fn lookup_matches_exact_text_only() {
        let (_tmp, pool) = test_pool().await;
        let stored = store_summary(&pool, "abc", "summary").await.unwrap();
        assert_eq!(find_summary(&pool, "abc").await.unwrap(), Some(stored));
        assert!(find_summary(&pool, "abc ").await.unwrap().is_none());
    }
}
