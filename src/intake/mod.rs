//! REDCap intake form conversion.
//!
//! A REDCap CSV export holds one row per completed intake survey. Converting a
//! survey into a report draft goes through four stages:
//!
//! 1. [`parser::read_subject_row`] selects the row for one survey.
//! 2. [`parser::IntakeInformation`] reads typed patient information from it,
//!    decoding option codes through [`descriptors`].
//! 3. [`transformers`] turn coded answers into report phrases.
//! 4. [`writer::ReportWriter`] lays the phrases out in a report document and
//!    applies [`language`] corrections.

pub mod descriptors;
pub mod language;
pub mod parser;
pub mod transformers;
pub mod writer;

use thiserror::Error;

use crate::docx::Document;

pub use parser::{read_subject_row, IntakeInformation, IntakeRow};
pub use writer::ReportWriter;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Patient not found.")]
    PatientNotFound,

    #[error("Multiple patients found.")]
    MultiplePatients,

    #[error("Missing column '{0}' in intake data.")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column '{column}'.")]
    InvalidValue { column: String, value: String },

    #[error("Unknown {descriptor} code: {code}.")]
    UnknownCode { descriptor: &'static str, code: i64 },

    #[error(
        "Birth complications 'none of the above' cannot be combined with other birth complications."
    )]
    ConflictingBirthComplications,

    #[error("Could not read intake CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Builds the report draft for survey `identifier` from a REDCap CSV export.
pub fn intake_report(csv: &[u8], identifier: i64) -> Result<Document, IntakeError> {
    let row = read_subject_row(csv, identifier)?;
    let intake = IntakeInformation::from_row(&row)?;
    tracing::debug!(identifier, "writing intake report");
    Ok(ReportWriter::new(&intake).transform())
}
