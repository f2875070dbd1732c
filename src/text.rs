//! Small string helpers used when composing report prose.

use regex::Regex;
use std::sync::OnceLock;

/// Joins items with an Oxford comma: `a`, `a and b`, `a, b, and c`.
pub fn join_with_oxford_comma<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

/// Ordinal suffix for a number (`st`, `nd`, `rd`, `th`).
pub fn ordinal_suffix(number: i64) -> &'static str {
    let number = number.unsigned_abs();
    if (11..=13).contains(&(number % 100)) {
        return "th";
    }
    match number % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collapses runs of whitespace (including newlines) into single spaces and
/// trims both ends.
pub fn remove_excess_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn leading_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").expect("static regex"))
}

const UNITS: [&str; 20] = [
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

const TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Reads a number at the start of free text as REDCap respondents type it:
/// `"38"`, `"38 weeks"`, `"1.5 months"`, `"twenty five"`.
///
/// Text holding more than one quantity (`"5 months and 4 days"`) or no number
/// at all yields `None`.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(caps) = leading_number_regex().captures(text) {
        let digits = caps.get(1)?;
        let rest = &text[digits.end()..];
        if rest.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        return digits.as_str().parse().ok();
    }
    parse_number_words(text)
}

fn parse_number_words(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();
    let mut total: Option<u32> = None;
    for word in lowered.split(|c: char| c.is_whitespace() || c == '-') {
        if word.is_empty() {
            continue;
        }
        if let Some(value) = UNITS.iter().position(|u| *u == word) {
            let current = total.unwrap_or(0);
            // "five twenty" is not a number
            if current % 10 != 0 || (current >= 10 && current < 20) {
                return None;
            }
            total = Some(current + value as u32);
        } else if let Some(index) = TENS.iter().position(|t| *t == word) {
            if total.is_some() {
                return None;
            }
            total = Some((index as u32 + 2) * 10);
        } else if total.is_some() {
            break;
        } else {
            return None;
        }
    }
    total.map(f64::from)
}
