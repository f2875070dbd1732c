//! Anonymization of clinical reports.
//!
//! A report names the patient on a `Name: <first> <last>` line. The diagnostic
//! section runs from the "Clinical Summary and Impressions" heading up to the
//! "Recommendations" heading. Names in that section become placeholders and
//! gendered words become both-gender forms (`he` → `he/she`).

use regex::RegexBuilder;
use thiserror::Error;

use crate::docx::{Document, DocxError, Paragraph};
use crate::text::capitalize;

const SECTION_START: &str = "clinical summary and impressions";
const SECTION_END: &str = "recommendations";

const PRONOUN_REPLACEMENTS: [(&str, &str); 7] = [
    ("he", "he/she"),
    ("she", "he/she"),
    ("his", "his/her"),
    ("her", "his/her"),
    ("him", "him/her"),
    ("himself", "himself/herself"),
    ("herself", "himself/herself"),
];

const GENDER_REPLACEMENTS: [(&str, &str); 6] = [
    ("man", "man/woman"),
    ("woman", "man/woman"),
    ("boy", "boy/girl"),
    ("girl", "boy/girl"),
    ("son", "son/daughter"),
    ("daughter", "son/daughter"),
];

#[derive(Debug, Error)]
pub enum AnonymizeError {
    #[error("Patient name not found.")]
    PatientNameNotFound,

    #[error("Diagnostic paragraphs not found.")]
    DiagnosticParagraphsNotFound,

    #[error(transparent)]
    Docx(#[from] DocxError),
}

/// Returns `(first_name, last_name)` from the first `Name: ` paragraph.
pub fn get_patient_name(document: &Document) -> Result<(String, String), AnonymizeError> {
    tracing::debug!("extracting patient name");
    let text = document
        .paragraphs()
        .map(Paragraph::text)
        .find(|text| text.starts_with("Name: "))
        .ok_or(AnonymizeError::PatientNameNotFound)?;

    let words: Vec<&str> = text.split(' ').collect();
    let first_name = words.get(1).copied().unwrap_or_default().to_string();
    let last_name = words.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    Ok((first_name, last_name))
}

/// Paragraphs of the diagnostic section, heading included.
///
/// A report without the start heading yields no paragraphs. A report whose
/// "Recommendations" heading is missing is rejected.
pub fn get_diagnostic_paragraphs(document: &Document) -> Result<Vec<&Paragraph>, AnonymizeError> {
    tracing::debug!("extracting diagnostic paragraphs");
    let mut paragraphs = Vec::new();
    let mut retain = false;
    for paragraph in document.paragraphs() {
        let sanitized = paragraph.text().trim().to_lowercase();
        if sanitized == SECTION_START {
            retain = true;
        } else if sanitized == SECTION_END {
            return Ok(paragraphs);
        }
        if retain {
            paragraphs.push(paragraph);
        }
    }
    Err(AnonymizeError::DiagnosticParagraphsNotFound)
}

/// Replaces the patient's names and gendered words in one paragraph of text.
pub fn anonymize_paragraph(text: &str, first_name: &str, last_name: &str) -> String {
    let mut text = find_and_replace(text, first_name, "[FIRST_NAME]", false);
    text = find_and_replace(&text, last_name, "[LAST_NAME]", false);
    for (target, replacement) in PRONOUN_REPLACEMENTS.iter().chain(GENDER_REPLACEMENTS.iter()) {
        text = find_and_replace(&text, target, replacement, true);
    }
    text
}

/// Replaces whole-word occurrences of `target` that do not touch a `/`.
///
/// With `match_case`, the capitalized target is replaced as well, by the
/// replacement with every `/`-separated part capitalized. Without it the match
/// ignores case.
pub fn find_and_replace(text: &str, target: &str, replacement: &str, match_case: bool) -> String {
    if target.is_empty() {
        return text.to_string();
    }
    if !match_case {
        return replace_words(text, target, replacement, true);
    }

    let text = replace_words(text, target, replacement, false);
    let capitalized_replacement = replacement
        .split('/')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("/");
    replace_words(&text, &capitalize(target), &capitalized_replacement, false)
}

fn replace_words(text: &str, target: &str, replacement: &str, ignore_case: bool) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(target));
    let re = match RegexBuilder::new(&pattern).case_insensitive(ignore_case).build() {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(error = %e, "could not build replacement pattern");
            return text.to_string();
        }
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before == Some('/') || after == Some('/') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(replacement);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Reads a .docx report and returns its anonymized diagnostic section, one
/// paragraph per line.
pub fn anonymize_report(bytes: &[u8]) -> Result<String, AnonymizeError> {
    let document = Document::from_bytes(bytes)?;
    let (first_name, last_name) = get_patient_name(&document)?;
    let paragraphs = get_diagnostic_paragraphs(&document)?;
    tracing::debug!(count = paragraphs.len(), "anonymizing paragraphs");

    let anonymized: Vec<String> = paragraphs
        .iter()
        .map(|p| anonymize_paragraph(&p.text(), &first_name, &last_name))
        .collect();
    Ok(anonymized.join("\n"))
}
