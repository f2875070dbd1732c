use anyhow::Result;
use sqlx::SqlitePool;

/// Creates the schema. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::debug!("creating database schema");

    // Diagnosis tree; children go with their parent
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS diagnoses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL CHECK (length(text) <= 2048),
            parent_id INTEGER REFERENCES diagnoses(id) ON DELETE CASCADE,
            time_created TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            time_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Summaries returned by the chat model, keyed by the anonymized input
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            anonymous_text TEXT NOT NULL,
            summary_text TEXT NOT NULL,
            time_created TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            time_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_diagnoses_parent_id ON diagnoses(parent_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_summaries_anonymous_text ON summaries(anonymous_text)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
