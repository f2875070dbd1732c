//! Grammar corrections applied to a finished report.
//!
//! Report text is written with pronoun placeholders, so a patient who uses
//! they/them ends up with sentences such as `they is` or `they enjoys`. The
//! placeholders also leave sentences that start in lower case.

use regex::{Match, Regex};
use std::sync::OnceLock;

use crate::docx::{Document, Paragraph, Run};

const IRREGULAR_VERBS: [(&str, &str); 9] = [
    ("is", "are"),
    ("was", "were"),
    ("has", "have"),
    ("does", "do"),
    ("goes", "go"),
    ("isn't", "aren't"),
    ("wasn't", "weren't"),
    ("hasn't", "haven't"),
    ("doesn't", "don't"),
];

/// Words ending in `s` that follow `they` without being verbs.
const NON_VERBS: [&str; 5] = ["themselves", "perhaps", "besides", "afterwards", "towards"];

/// Adverbs that may sit between `they` and the verb.
const ADVERBS: [&str; 20] = [
    "also",
    "always",
    "consistently",
    "currently",
    "easily",
    "frequently",
    "generally",
    "just",
    "never",
    "now",
    "occasionally",
    "often",
    "only",
    "rarely",
    "really",
    "reportedly",
    "seldom",
    "sometimes",
    "still",
    "usually",
];

const ABBREVIATIONS: [&str; 9] = [
    "mr.", "ms.", "mrs.", "dr.", "e.g.", "i.e.", "vs.", "st.", "etc.",
];

/// Characters that may precede the first letter of a sentence.
const OPENERS: [char; 5] = ['"', '\'', '(', '“', '‘'];

const CLOSERS: [char; 5] = ['"', '\'', ')', '”', '’'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCorrections {
    /// Conjugate verbs after a singular `they`.
    pub correct_they: bool,
    /// Capitalize sentences that start in lower case.
    pub correct_capitalization: bool,
}

impl DocumentCorrections {
    pub fn new(correct_they: bool, correct_capitalization: bool) -> Self {
        Self {
            correct_they,
            correct_capitalization,
        }
    }

    pub fn correct(&self, document: &mut Document) {
        if self.correct_they {
            let mut count = 0;
            for paragraph in document.all_paragraphs_mut() {
                let corrections = they_corrections(&paragraph.text());
                count += corrections.len();
                for correction in &corrections {
                    correction.apply_to_paragraph(paragraph);
                }
            }
            tracing::debug!(count, "corrected singular they");
        }

        if self.correct_capitalization {
            for paragraph in document.all_paragraphs_mut() {
                capitalize_sentences(&mut paragraph.runs);
            }
        }
    }

    /// The same corrections on plain text.
    pub fn correct_text(&self, text: &str) -> String {
        let mut text = text.to_string();
        if self.correct_they {
            for correction in they_corrections(&text) {
                text = correction.apply_to_text(&text);
            }
        }
        if self.correct_capitalization {
            let mut runs = [Run::new(text)];
            capitalize_sentences(&mut runs);
            let [run] = runs;
            text = run.text;
        }
        text
    }
}

/// One `they <verb>` fix within a single paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheyCorrection {
    pub from: String,
    pub to: String,
    /// The verb ends the text, so `from` has no trailing boundary character
    /// and may only replace the end of the text.
    pub at_end: bool,
}

impl TheyCorrection {
    fn apply_to_paragraph(&self, paragraph: &mut Paragraph) {
        if self.at_end {
            paragraph.replace_suffix(&self.from, &self.to);
        } else {
            paragraph.replace(&self.from, &self.to);
        }
    }

    fn apply_to_text(&self, text: &str) -> String {
        if self.at_end {
            match text.strip_suffix(self.from.as_str()) {
                Some(head) => format!("{}{}", head, self.to),
                None => text.to_string(),
            }
        } else {
            text.replace(&self.from, &self.to)
        }
    }
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+(?:['’][A-Za-z]+)?").expect("static regex"))
}

/// Fixes for `they <verb>` in `text`. Each fragment carries the character
/// after the verb so the replacement stays on word boundaries; a verb at the
/// end of the text is marked `at_end` instead.
pub fn they_corrections(text: &str) -> Vec<TheyCorrection> {
    let words: Vec<Match<'_>> = word_regex().find_iter(text).collect();
    let only_space = |a: &Match<'_>, b: &Match<'_>| text[a.end()..b.start()].trim().is_empty();

    let mut out: Vec<TheyCorrection> = Vec::new();
    for (i, subject) in words.iter().enumerate() {
        if !subject.as_str().eq_ignore_ascii_case("they") {
            continue;
        }
        let Some(mut verb) = words.get(i + 1) else {
            continue;
        };
        if !only_space(subject, verb) {
            continue;
        }
        if ADVERBS.contains(&verb.as_str().to_lowercase().as_str()) {
            let adverb = verb;
            match words.get(i + 2) {
                Some(next) if only_space(adverb, next) => verb = next,
                _ => continue,
            }
        }
        let Some(plural) = pluralize_verb(verb.as_str()) else {
            continue;
        };

        let boundary = text[verb.end()..].chars().next();
        let mut from = text[subject.start()..verb.end()].to_string();
        let mut to = format!("{}{}", &text[subject.start()..verb.start()], plural);
        if let Some(c) = boundary {
            from.push(c);
            to.push(c);
        }
        let correction = TheyCorrection {
            from,
            to,
            at_end: boundary.is_none(),
        };
        if !out.contains(&correction) {
            out.push(correction);
        }
    }
    out
}

/// Plural present form of a third-person singular verb, or `None` when the
/// word does not look like one.
pub fn pluralize_verb(verb: &str) -> Option<String> {
    if verb.chars().any(|c| c.is_uppercase()) {
        return None;
    }
    if let Some((_, plural)) = IRREGULAR_VERBS.iter().find(|(s, _)| *s == verb) {
        return Some(plural.to_string());
    }
    if verb.len() < 3 || verb.contains(['\'', '’']) || NON_VERBS.contains(&verb) {
        return None;
    }
    if verb.ends_with("ss") || verb.ends_with("us") || verb.ends_with("is") {
        return None;
    }
    if verb.len() > 4 && verb.ends_with("ies") {
        return Some(format!("{}y", &verb[..verb.len() - 3]));
    }
    if ["sses", "shes", "ches", "xes", "zzes", "oes"]
        .iter()
        .any(|suffix| verb.ends_with(suffix))
    {
        return Some(verb[..verb.len() - 2].to_string());
    }
    verb.strip_suffix('s').map(str::to_string)
}

fn ends_sentence(word: &str) -> bool {
    let word = word.trim_end_matches(CLOSERS).trim_start_matches(OPENERS);
    if !word.ends_with(['.', '!', '?']) {
        return false;
    }
    if !word.ends_with('.') {
        return true;
    }
    let lowered = word.to_lowercase();
    if ABBREVIATIONS.contains(&lowered.as_str()) {
        return false;
    }
    // initials such as "J."
    let mut chars = word.chars();
    !matches!((chars.next(), chars.next(), chars.next()), (Some(c), Some('.'), None) if c.is_uppercase())
}

/// Upper-cases the first letter of every sentence, walking across runs so
/// formatting is untouched.
fn capitalize_sentences(runs: &mut [Run]) {
    let mut at_start = true;
    let mut word = String::new();
    for run in runs.iter_mut() {
        if run.text.is_empty() {
            continue;
        }
        let mut out = String::with_capacity(run.text.len());
        for c in run.text.chars() {
            if c.is_whitespace() {
                if ends_sentence(&word) {
                    at_start = true;
                }
                word.clear();
                out.push(c);
                continue;
            }
            if at_start && c.is_lowercase() {
                out.extend(c.to_uppercase());
                at_start = false;
            } else {
                out.push(c);
                if !OPENERS.contains(&c) {
                    at_start = false;
                }
            }
            word.push(c);
        }
        run.text = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::Paragraph;

    #[test]
    fn verbs_are_pluralized() {
        let cases = [
            ("is", Some("are")),
            ("was", Some("were")),
            ("has", Some("have")),
            ("does", Some("do")),
            ("goes", Some("go")),
            ("doesn't", Some("don't")),
            ("enjoys", Some("enjoy")),
            ("likes", Some("like")),
            ("tries", Some("try")),
            ("lies", Some("lie")),
            ("watches", Some("watch")),
            ("misses", Some("miss")),
            ("fixes", Some("fix")),
            ("are", None),
            ("went", None),
            ("themselves", None),
        ];
        for (verb, expected) in cases {
            assert_eq!(pluralize_verb(verb).as_deref(), expected, "{}", verb);
        }
        assert_eq!(pluralize_verb("discuss"), None);
        assert_eq!(pluralize_verb("Is"), None);
    }

    fn pairs(text: &str) -> Vec<(String, String, bool)> {
        they_corrections(text)
            .into_iter()
            .map(|c| (c.from, c.to, c.at_end))
            .collect()
    }

    #[test]
    fn they_corrections_include_boundary() {
        assert_eq!(
            pairs("Today they is tired and They always enjoys school."),
            vec![
                ("they is ".to_string(), "they are ".to_string(), false),
                ("They always enjoys ".to_string(), "They always enjoy ".to_string(), false),
            ]
        );
        assert_eq!(
            pairs("Asked how they feel, they is"),
            vec![("they is".to_string(), "they are".to_string(), true)]
        );
    }

    #[test]
    fn they_followed_by_plural_or_punctuation_is_left_alone() {
        assert!(they_corrections("they are here").is_empty());
        assert!(they_corrections("they. is").is_empty());
        assert!(they_corrections("they sometimes").is_empty());
        assert!(they_corrections("Isthey is").is_empty());
    }

    #[test]
    fn correct_text() {
        let corrections = DocumentCorrections::new(true, true);
        assert_eq!(
            corrections.correct_text("they is happy and they always runs. she likes it."),
            "They are happy and they always run. She likes it."
        );

        let capitalization_only = DocumentCorrections::new(false, true);
        assert_eq!(
            capitalization_only.correct_text("they is happy."),
            "They is happy."
        );
    }

    #[test]
    fn abbreviations_do_not_end_sentences() {
        let corrections = DocumentCorrections::new(false, true);
        assert_eq!(
            corrections.correct_text("Ms. Doe said so, e.g. twice. the end! really? yes."),
            "Ms. Doe said so, e.g. twice. The end! Really? Yes."
        );
        assert_eq!(
            corrections.correct_text("(she) agreed. \"it\" was fine."),
            "(She) agreed. \"It\" was fine."
        );
        assert_eq!(corrections.correct_text("______ is here."), "______ is here.");
    }

    #[test]
    fn document_corrections_keep_runs() {
        let mut doc = Document::new();
        doc.push_paragraph(
            Paragraph::new()
                .run(Run::new("they "))
                .run(Run::new("is").bold())
                .run(Run::new(" kind. she ")),
        );
        doc.push_paragraph(Paragraph::with_text("they is here"));

        DocumentCorrections::new(true, true).correct(&mut doc);

        let texts: Vec<String> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["They are kind. She ", "They are here"]);
        let first = doc.paragraphs().next().unwrap();
        assert_eq!(first.runs.len(), 3);
    }

    #[test]
    fn verb_ending_a_paragraph_does_not_touch_other_words() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::with_text("Asked how they feel, they is"));
        doc.push_paragraph(Paragraph::with_text("At school they isolated themselves."));
        doc.push_paragraph(Paragraph::with_text("Then they is quiet while they isolated"));

        DocumentCorrections::new(true, false).correct(&mut doc);

        let texts: Vec<String> = doc.paragraphs().map(Paragraph::text).collect();
        assert_eq!(
            texts,
            vec![
                "Asked how they feel, they are",
                "At school they isolated themselves.",
                "Then they are quiet while they isolated",
            ]
        );
    }

    #[test]
    fn verb_at_end_of_text_is_replaced_once() {
        let corrections = DocumentCorrections::new(true, false);
        assert_eq!(
            corrections.correct_text("they isolated, but they is"),
            "they isolated, but they are"
        );
    }

    #[test]
    fn suffix_replacement_spans_runs() {
        let mut paragraph = Paragraph::new()
            .run(Run::new("so they "))
            .run(Run::new("is").italic());
        assert!(paragraph.replace_suffix("they is", "they are"));
        assert_eq!(paragraph.text(), "so they are");
        assert_eq!(paragraph.runs[0].text, "so they are");
        assert_eq!(paragraph.runs[1].text, "");
        assert!(!paragraph.replace_suffix("they is", "they are"));
    }
}
