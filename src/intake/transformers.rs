//! Turn coded intake answers into report phrases.
//!
//! Every transformer checks whether its answer is the "interesting" case
//! ([`Transformer::matches`]) and renders the phrase for either case
//! ([`Transformer::transform`]).

use super::descriptors;
use super::parser::Language;
use super::IntakeError;
use crate::text::join_with_oxford_comma;

pub trait Transformer {
    fn matches(&self) -> bool;
    fn transform(&self) -> String;
}

/// Handedness; unknown renders as nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handedness(pub descriptors::Handedness);

impl Transformer for Handedness {
    fn matches(&self) -> bool {
        self.0 != descriptors::Handedness::Unknown
    }

    fn transform(&self) -> String {
        if !self.matches() {
            return String::new();
        }
        format!("{}-handed", self.0.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndividualizedEducationProgram(pub descriptors::IndividualizedEducationProgram);

impl Transformer for IndividualizedEducationProgram {
    fn matches(&self) -> bool {
        self.0 == descriptors::IndividualizedEducationProgram::Yes
    }

    fn transform(&self) -> String {
        if self.matches() {
            "had an Individualized Education Program (IEP)".to_string()
        } else {
            "did not have an Individualized Education Program (IEP)".to_string()
        }
    }
}

/// Complications checked on the pregnancy questionnaire. `other` is the
/// free-text description of "other illnesses".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthComplications {
    complications: Vec<descriptors::BirthComplications>,
    other: Option<String>,
}

impl BirthComplications {
    /// Rejects "none of the above" combined with any other complication.
    pub fn new(
        complications: Vec<descriptors::BirthComplications>,
        other: Option<String>,
    ) -> Result<Self, IntakeError> {
        let has_none = complications.contains(&descriptors::BirthComplications::NoneOfTheAbove);
        if has_none && complications.len() > 1 {
            return Err(IntakeError::ConflictingBirthComplications);
        }
        Ok(Self {
            complications,
            other: other.filter(|o| !o.trim().is_empty()),
        })
    }

    pub fn complications(&self) -> &[descriptors::BirthComplications] {
        &self.complications
    }

    fn describe(&self, complication: descriptors::BirthComplications) -> String {
        match (&self.other, complication) {
            (Some(other), descriptors::BirthComplications::OtherIllnesses) => other.clone(),
            _ => complication.to_string(),
        }
    }
}

impl Transformer for BirthComplications {
    fn matches(&self) -> bool {
        !self.complications.is_empty()
            && !self
                .complications
                .contains(&descriptors::BirthComplications::NoneOfTheAbove)
    }

    fn transform(&self) -> String {
        if !self.matches() {
            return "no birth complications".to_string();
        }
        let names: Vec<String> = self
            .complications
            .iter()
            .map(|c| self.describe(*c))
            .collect();
        if names.len() == 1 {
            return format!("the following birth complication: {}", names[0]);
        }
        format!(
            "the following birth complications: {}",
            join_with_oxford_comma(&names)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDelivery(pub descriptors::BirthDelivery);

impl Transformer for BirthDelivery {
    fn matches(&self) -> bool {
        self.0 != descriptors::BirthDelivery::Unknown
    }

    fn transform(&self) -> String {
        match self.0 {
            descriptors::BirthDelivery::Vaginal => "a vaginal delivery",
            descriptors::BirthDelivery::Cesarean => "a cesarean section",
            descriptors::BirthDelivery::Unknown => "an unknown type of delivery",
        }
        .to_string()
    }
}

/// Place of birth; "other" renders the free-text answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLocation {
    pub location: descriptors::DeliveryLocation,
    pub other: Option<String>,
}

impl Transformer for DeliveryLocation {
    fn matches(&self) -> bool {
        self.location != descriptors::DeliveryLocation::Other
    }

    fn transform(&self) -> String {
        match self.location {
            descriptors::DeliveryLocation::Hospital => "a hospital".to_string(),
            descriptors::DeliveryLocation::Home => "home".to_string(),
            descriptors::DeliveryLocation::Other => self
                .other
                .as_deref()
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .unwrap_or("an unspecified location")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adaptability(pub descriptors::Adaptability);

impl Transformer for Adaptability {
    fn matches(&self) -> bool {
        self.0 == descriptors::Adaptability::Easy
    }

    fn transform(&self) -> String {
        if self.matches() {
            "an adaptable temperament".to_string()
        } else {
            "a difficult temperament".to_string()
        }
    }
}

/// Age at which Early Intervention started, if it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarlyIntervention(pub Option<String>);

impl Transformer for EarlyIntervention {
    fn matches(&self) -> bool {
        self.0.as_deref().is_some_and(|age| !age.trim().is_empty())
    }

    fn transform(&self) -> String {
        match self.0.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(age) => format!("received Early Intervention (EI) starting at {}", age),
            None => "did not receive Early Intervention (EI)".to_string(),
        }
    }
}

/// Age at which Committee on Preschool Special Education services started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpse(pub Option<String>);

impl Transformer for Cpse {
    fn matches(&self) -> bool {
        self.0.as_deref().is_some_and(|age| !age.trim().is_empty())
    }

    fn transform(&self) -> String {
        match self.0.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(age) => format!(
                "received Committee on Preschool Special Education (CPSE) services starting at {}",
                age
            ),
            None => "did not receive Committee on Preschool Special Education (CPSE) services"
                .to_string(),
        }
    }
}

/// Weeks of pregnancy at birth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationOfPregnancy(pub Option<f64>);

impl Transformer for DurationOfPregnancy {
    fn matches(&self) -> bool {
        self.0.is_some()
    }

    fn transform(&self) -> String {
        match self.0 {
            Some(weeks) if weeks.fract() == 0.0 => format!("{:.0} weeks", weeks),
            Some(weeks) => format!("{} weeks", weeks),
            None => "an unknown number of weeks".to_string(),
        }
    }
}

/// The patient's languages grouped by fluency, e.g.
/// `is fluent in English and proficient in Spanish, and has basic skills in French`.
#[derive(Debug, Clone, Copy)]
pub struct LanguageFluencies<'a>(pub &'a [Language]);

impl LanguageFluencies<'_> {
    fn names_with(&self, fluency: descriptors::LanguageFluency) -> Vec<&str> {
        self.0
            .iter()
            .filter(|l| l.fluency == fluency)
            .map(|l| l.name.as_str())
            .collect()
    }
}

impl Transformer for LanguageFluencies<'_> {
    fn matches(&self) -> bool {
        !self.0.is_empty()
    }

    fn transform(&self) -> String {
        use descriptors::LanguageFluency;

        let mut descriptions: Vec<String> = [
            LanguageFluency::Fluent,
            LanguageFluency::Proficient,
            LanguageFluency::Conversational,
        ]
        .into_iter()
        .filter_map(|fluency| {
            let names = self.names_with(fluency);
            (!names.is_empty())
                .then(|| format!("{} in {}", fluency, join_with_oxford_comma(&names)))
        })
        .collect();
        let prepend_is = !descriptions.is_empty();

        let basic = self.names_with(LanguageFluency::Basic);
        if !basic.is_empty() {
            descriptions.push(format!(
                "has basic skills in {}",
                join_with_oxford_comma(&basic)
            ));
        }

        let text = join_with_oxford_comma(&descriptions);
        if prepend_is {
            format!("is {}", text)
        } else {
            text
        }
    }
}
