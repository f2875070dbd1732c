//! The diagnosis tree.
//!
//! Nodes live in the `diagnoses` table with a nullable `parent_id`. Roots have
//! no parent; deleting a node cascades to its descendants through the foreign
//! key. Trees are assembled in memory from flat rows.

use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ApiError;
use crate::models::{
    DiagnosisNodeCreate, DiagnosisNodeOutput, DiagnosisNodePatch, MAX_DIAGNOSIS_TEXT_LENGTH,
};

const NODE_NOT_FOUND: &str = "The specified diagnosis does not exist.";
const PARENT_NODE_NOT_FOUND: &str = "The specified parent diagnosis node does not exist.";
const PARENT_NOT_FOUND: &str = "The specified parent diagnosis does not exist.";
const MOVE_INTO_SELF: &str = "Cannot move a diagnosis to a child of itself.";

#[derive(Debug, sqlx::FromRow)]
struct DiagnosisRow {
    id: i64,
    text: String,
    parent_id: Option<i64>,
}

/// Groups rows by parent and assembles the trees rooted at `roots`.
fn assemble(rows: Vec<DiagnosisRow>, roots: impl Fn(&DiagnosisRow) -> bool) -> Vec<DiagnosisNodeOutput> {
    let mut children: HashMap<i64, Vec<&DiagnosisRow>> = HashMap::new();
    for row in &rows {
        if let Some(parent_id) = row.parent_id {
            children.entry(parent_id).or_default().push(row);
        }
    }

    fn build(row: &DiagnosisRow, children: &HashMap<i64, Vec<&DiagnosisRow>>) -> DiagnosisNodeOutput {
        DiagnosisNodeOutput {
            id: row.id,
            text: row.text.clone(),
            parent_id: row.parent_id,
            children: children
                .get(&row.id)
                .map(|nodes| nodes.iter().map(|child| build(child, children)).collect())
                .unwrap_or_default(),
        }
    }

    rows.iter()
        .filter(|row| roots(row))
        .map(|row| build(row, &children))
        .collect()
}

fn check_text(text: &str) -> Result<(), ApiError> {
    if text.chars().count() > MAX_DIAGNOSIS_TEXT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Diagnosis text must be at most {} characters.",
            MAX_DIAGNOSIS_TEXT_LENGTH
        )));
    }
    Ok(())
}

fn check_tree_text(node: &DiagnosisNodeCreate) -> Result<(), ApiError> {
    check_text(&node.text)?;
    node.children.iter().try_for_each(check_tree_text)
}

async fn node_exists(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<bool, ApiError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM diagnoses WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(found.is_some())
}

/// All root nodes with their full subtrees, ordered by id.
pub async fn get_diagnoses(pool: &SqlitePool) -> Result<Vec<DiagnosisNodeOutput>, ApiError> {
    tracing::debug!("getting diagnoses");
    let rows = sqlx::query_as::<_, DiagnosisRow>(
        "SELECT id, text, parent_id FROM diagnoses ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(assemble(rows, |row| row.parent_id.is_none()))
}

/// One node with its subtree.
pub async fn get_diagnosis_node(pool: &SqlitePool, id: i64) -> Result<DiagnosisNodeOutput, ApiError> {
    let rows = sqlx::query_as::<_, DiagnosisRow>(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT id FROM diagnoses WHERE id = ?
            UNION ALL
            SELECT d.id FROM diagnoses d JOIN subtree s ON d.parent_id = s.id
        )
        SELECT d.id, d.text, d.parent_id
        FROM diagnoses d JOIN subtree USING (id)
        ORDER BY d.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    assemble(rows, |row| row.id == id)
        .pop()
        .ok_or_else(|| ApiError::not_found(NODE_NOT_FOUND))
}

/// Inserts `diagnosis` and its nested children in one transaction, under
/// `parent_id` when given.
pub async fn create_diagnosis_node(
    pool: &SqlitePool,
    diagnosis: &DiagnosisNodeCreate,
    parent_id: Option<i64>,
) -> Result<DiagnosisNodeOutput, ApiError> {
    tracing::debug!(?parent_id, "creating diagnosis");
    check_tree_text(diagnosis)?;

    let mut tx = pool.begin().await?;
    if let Some(parent_id) = parent_id {
        if !node_exists(&mut tx, parent_id).await? {
            return Err(ApiError::not_found(PARENT_NODE_NOT_FOUND));
        }
    }

    let mut root_id = None;
    let mut stack = vec![(diagnosis, parent_id)];
    while let Some((node, parent)) = stack.pop() {
        let id = sqlx::query("INSERT INTO diagnoses (text, parent_id) VALUES (?, ?)")
            .bind(&node.text)
            .bind(parent)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        root_id.get_or_insert(id);
        // reversed so siblings get increasing ids
        stack.extend(node.children.iter().rev().map(|child| (child, Some(id))));
    }
    tx.commit().await?;

    let root_id = root_id.ok_or_else(|| ApiError::internal("No diagnosis was inserted."))?;
    get_diagnosis_node(pool, root_id).await
}

/// Updates the text of a node and/or moves it under another parent.
pub async fn patch_diagnosis_node(
    pool: &SqlitePool,
    id: i64,
    patch: &DiagnosisNodePatch,
) -> Result<DiagnosisNodeOutput, ApiError> {
    tracing::debug!(id, "patching diagnosis");
    let mut tx = pool.begin().await?;
    if !node_exists(&mut tx, id).await? {
        return Err(ApiError::not_found(NODE_NOT_FOUND));
    }

    if let Some(text) = &patch.text {
        check_text(text)?;
        sqlx::query(
            "UPDATE diagnoses SET text = ?, time_updated = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(text)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(parent_id) = patch.parent_id {
        if !node_exists(&mut tx, parent_id).await? {
            return Err(ApiError::not_found(PARENT_NOT_FOUND));
        }
        // the new parent must not be the node or one of its descendants
        let mut ancestor = Some(parent_id);
        while let Some(current) = ancestor {
            if current == id {
                return Err(ApiError::bad_request(MOVE_INTO_SELF));
            }
            ancestor = sqlx::query_scalar("SELECT parent_id FROM diagnoses WHERE id = ?")
                .bind(current)
                .fetch_one(&mut *tx)
                .await?;
        }
        sqlx::query(
            "UPDATE diagnoses SET parent_id = ?, time_updated = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(parent_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    get_diagnosis_node(pool, id).await
}

/// Deletes a node and, through the cascade, all of its descendants.
pub async fn delete_diagnosis_node(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    tracing::debug!(id, "deleting diagnosis");
    let result = sqlx::query("DELETE FROM diagnoses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(NODE_NOT_FOUND));
    }
    Ok(())
}

/// Loads development diagnoses from a JSON array of trees into an empty
/// table. Returns the number of root nodes created.
pub async fn seed_diagnoses(pool: &SqlitePool, file: &Path) -> anyhow::Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diagnoses")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "diagnoses table is not empty, skipping seed");
        return Ok(0);
    }

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read diagnoses file: {}", file.display()))?;
    let trees: Vec<DiagnosisNodeCreate> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse diagnoses file: {}", file.display()))?;

    for tree in &trees {
        create_diagnosis_node(pool, tree, None).await?;
    }
    tracing::info!(count = trees.len(), "seeded diagnoses");
    Ok(trees.len())
}
