//! Markdown to .docx conversion through the `pandoc` binary.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::process::Command;

/// Converts markdown to .docx bytes. Temporary files are removed on return.
pub async fn markdown_to_docx(pandoc: &Path, markdown: &str) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let input = dir.path().join("input.md");
    let output = dir.path().join("output.docx");
    tokio::fs::write(&input, markdown).await?;

    tracing::debug!(pandoc = %pandoc.display(), bytes = markdown.len(), "running pandoc");
    let result = Command::new(pandoc)
        .arg(&input)
        .args(["-f", "markdown", "-t", "docx", "-o"])
        .arg(&output)
        .output()
        .await
        .with_context(|| format!("Failed to run pandoc: {}", pandoc.display()))?;

    if !result.status.success() {
        bail!(
            "pandoc exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        );
    }

    let bytes = tokio::fs::read(&output)
        .await
        .context("pandoc did not write an output file")?;
    Ok(bytes)
}

/// Whether `pandoc` can be started; used to skip conversions in tests.
pub async fn is_available(pandoc: &Path) -> bool {
    Command::new(pandoc)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
