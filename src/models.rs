//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Longest diagnosis text the database accepts.
pub const MAX_DIAGNOSIS_TEXT_LENGTH: usize = 2048;

/// A diagnosis node to create, with any nested children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiagnosisNodeCreate {
    pub text: String,
    #[serde(default)]
    pub children: Vec<DiagnosisNodeCreate>,
}

/// Partial update of a diagnosis node. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiagnosisNodePatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiagnosisNodeOutput {
    pub id: i64,
    pub text: String,
    pub parent_id: Option<i64>,
    pub children: Vec<DiagnosisNodeOutput>,
}

/// Body of `POST /api/v1/diagnoses`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateDiagnosisRequest {
    pub diagnosis: DiagnosisNodeCreate,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Body of `POST /api/v1/summarization/summarize_report`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Report {
    pub text: String,
}

/// A stored summary, keyed by the anonymized report text it summarizes.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Summary {
    pub id: i64,
    pub anonymous_text: String,
    pub summary_text: String,
}
