//! # Clinician Toolkit API
//!
//! Back-end services for clinicians writing psychological evaluations: a
//! catalogue of diagnoses, anonymization and plain-language summarization of
//! finished reports, and report drafts generated from REDCap intake surveys.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐
//!   HTTP ───────▶│    server    │◀─── CLI (ctk)
//!                └──────┬───────┘
//!        ┌──────────────┼──────────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!  ┌───────────┐ ┌──────────────┐ ┌─────────┐ ┌────────────┐
//!  │ diagnoses │ │summarization │ │ pandoc  │ │   intake   │
//!  └─────┬─────┘ └──┬────────┬──┘ └─────────┘ └─────┬──────┘
//!        ▼          ▼        ▼                       ▼
//!  ┌──────────┐ ┌────────┐ ┌────────────┐      ┌──────────┐
//!  │  SQLite  │ │ openai │ │ anonymizer │─────▶│   docx   │
//!  └──────────┘ └────────┘ └────────────┘      └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with environment overrides |
//! | [`logging`] | Subscriber setup and request logger |
//! | [`error`] | HTTP error type |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`models`] | Request and response bodies |
//! | [`diagnoses`] | Diagnosis tree storage |
//! | [`docx`] | WordprocessingML reader, writer and text replacement |
//! | [`anonymizer`] | Report anonymization |
//! | [`openai`] | Chat completion client |
//! | [`prompts`] | Prompt file |
//! | [`summarization`] | Cached report summaries |
//! | [`pandoc`] | Markdown to .docx conversion |
//! | [`intake`] | REDCap intake survey to report draft |
//! | [`text`] | Text helpers |
//! | [`server`] | HTTP server |

pub mod anonymizer;
pub mod config;
pub mod db;
pub mod diagnoses;
pub mod docx;
pub mod error;
pub mod intake;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod openai;
pub mod pandoc;
pub mod prompts;
pub mod server;
pub mod summarization;
pub mod text;
