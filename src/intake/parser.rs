//! Typed views over one row of a REDCap intake export.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::descriptors::{
    self, GuardianMaritalStatus, GuardianRelationship, HouseholdRelationship, LanguageFluency,
    SchoolType, SoothingDifficulty, USState,
};
use super::transformers::{
    Adaptability, BirthComplications, BirthDelivery, Cpse, DeliveryLocation, DurationOfPregnancy,
    EarlyIntervention, Handedness, IndividualizedEducationProgram,
};
use super::IntakeError;
use crate::text::parse_leading_number;

const IDENTIFIER_COLUMN: &str = "redcap_survey_identifier";

/// Languages the child-language block of the form has room for.
const MAX_CHILD_LANGUAGES: usize = 3;
/// The intake form has household slots `peopleinhome1` to `peopleinhome10`.
const MAX_HOUSEHOLD_MEMBERS: i64 = 10;

const THEY_PRONOUNS: [&str; 5] = ["they", "them", "their", "theirs", "themselves"];

/// One survey row: column name → raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeRow {
    values: HashMap<String, String>,
}

impl IntakeRow {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get_str(&self, column: &str) -> Result<&str, IntakeError> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .ok_or_else(|| IntakeError::MissingColumn(column.to_string()))
    }

    /// `None` when the column is absent or blank.
    pub fn opt_str(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_int(&self, column: &str) -> Result<i64, IntakeError> {
        let value = self.get_str(column)?;
        parse_int(value).ok_or_else(|| invalid(column, value))
    }

    /// `None` when the column is absent or blank; an unparsable value is an error.
    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, IntakeError> {
        match self.opt_str(column) {
            Some(value) => parse_int(value)
                .map(Some)
                .ok_or_else(|| invalid(column, value)),
            None => Ok(None),
        }
    }

    pub fn get_float(&self, column: &str) -> Result<f64, IntakeError> {
        let value = self.get_str(column)?;
        value.parse().map_err(|_| invalid(column, value))
    }

    /// Checkbox and yes/no answers: `1`/`0`, `true`/`false`; blank is false.
    pub fn get_bool(&self, column: &str) -> Result<bool, IntakeError> {
        let value = self.get_str(column)?;
        match value.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" | "yes" => Ok(true),
            "0" | "0.0" | "false" | "no" | "" => Ok(false),
            _ => Err(invalid(column, value)),
        }
    }

    pub fn get_date(&self, column: &str, format: &str) -> Result<NaiveDate, IntakeError> {
        let value = self.get_str(column)?;
        NaiveDate::parse_from_str(value, format).map_err(|_| invalid(column, value))
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn invalid(column: &str, value: &str) -> IntakeError {
    IntakeError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Reads a REDCap CSV export and returns the row of survey `identifier`.
pub fn read_subject_row(csv: &[u8], identifier: i64) -> Result<IntakeRow, IntakeError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(csv);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if !headers.iter().any(|h| h == IDENTIFIER_COLUMN) {
        return Err(IntakeError::MissingColumn(IDENTIFIER_COLUMN.to_string()));
    }

    let mut matches = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = IntakeRow::new(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
        match row.opt_int(IDENTIFIER_COLUMN) {
            Ok(Some(id)) if id == identifier => matches.push(row),
            Ok(_) => {}
            Err(_) => tracing::debug!(
                value = row.opt_str(IDENTIFIER_COLUMN).unwrap_or_default(),
                "skipping row with non-numeric survey identifier"
            ),
        }
    }

    match matches.len() {
        0 => Err(IntakeError::PatientNotFound),
        1 => Ok(matches.remove(0)),
        _ => Err(IntakeError::MultiplePatients),
    }
}

#[derive(Debug, Clone)]
pub struct IntakeInformation {
    pub date_of_intake: NaiveDate,
    pub phone: String,
    pub patient: Patient,
}

impl IntakeInformation {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        Ok(Self {
            date_of_intake: row.get_date("date", "%m/%d/%y")?,
            phone: row.get_str("phone")?.to_string(),
            patient: Patient::from_row(row)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Patient {
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub age: u32,
    pub date_of_birth: NaiveDate,
    pub gender: descriptors::Gender,
    pub gender_other: Option<String>,
    /// Subject, object, possessive determiner, possessive pronoun, reflexive.
    pub pronouns: Vec<String>,
    pub handedness: Handedness,
    pub education: Education,
    pub development: Development,
    pub guardian: Guardian,
    pub household: Household,
    pub languages: Vec<Language>,
    pub language_spoken_best: Option<String>,
}

impl Patient {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        let mut languages = Vec::new();
        for identifier in 1..=MAX_CHILD_LANGUAGES {
            if let Some(language) = Language::from_row(row, identifier)? {
                languages.push(language);
            }
        }

        Ok(Self {
            first_name: row.get_str("firstname")?.to_string(),
            last_name: row.get_str("lastname")?.to_string(),
            nickname: row.opt_str("othername").map(str::to_string),
            age: row.get_float("age")?.max(0.0).floor() as u32,
            date_of_birth: row.get_date("dob", "%Y-%m-%d")?,
            gender: descriptors::Gender::from_code(row.get_int("childgender")?)?,
            gender_other: row.opt_str("childgender_other").map(str::to_string),
            pronouns: parse_pronouns(row.get_int("pronouns")?, row.opt_str("pronouns_other"))?,
            handedness: Handedness(descriptors::Handedness::from_code(
                row.get_int("dominant_hand")?,
            )?),
            education: Education::from_row(row)?,
            development: Development::from_row(row)?,
            guardian: Guardian::from_row(row)?,
            household: Household::from_row(row)?,
            languages,
            language_spoken_best: row.opt_str("language_spoken_best").map(str::to_string),
        })
    }

    /// `First "Nick" Last` when a nickname was given.
    pub fn full_name(&self) -> String {
        match &self.nickname {
            Some(nickname) => format!("{} \"{}\" {}", self.first_name, nickname, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn preferred_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.first_name)
    }

    /// The gender as written in the report; "other" uses the free-text answer.
    pub fn gender_text(&self) -> String {
        match (self.gender, &self.gender_other) {
            (descriptors::Gender::Other, Some(other)) => other.clone(),
            (gender, _) => gender.to_string(),
        }
    }

    /// `boy`, `girl`, `man`, `woman`, `child` or `adult`.
    pub fn age_gender_label(&self) -> &'static str {
        use descriptors::Gender;

        let adult = self.age >= 18;
        match self.gender {
            Gender::Male | Gender::TransgenderMale => {
                if adult {
                    "man"
                } else {
                    "boy"
                }
            }
            Gender::Female | Gender::TransgenderFemale => {
                if adult {
                    "woman"
                } else {
                    "girl"
                }
            }
            Gender::NonBinary | Gender::Other => {
                if adult {
                    "adult"
                } else {
                    "child"
                }
            }
        }
    }

    pub fn pronoun(&self, index: usize) -> &str {
        self.pronouns
            .get(index)
            .map(String::as_str)
            .unwrap_or(THEY_PRONOUNS[index.min(THEY_PRONOUNS.len() - 1)])
    }

    pub fn uses_they(&self) -> bool {
        self.pronoun(0).eq_ignore_ascii_case("they")
    }
}

/// The five pronoun forms. Free-text pronouns are `/`-separated and missing
/// forms fall back to they/them.
fn parse_pronouns(code: i64, other: Option<&str>) -> Result<Vec<String>, IntakeError> {
    let pronouns = descriptors::Pronouns::from_code(code)?;
    let given: Vec<String> = match pronouns {
        descriptors::Pronouns::Other => other
            .unwrap_or_default()
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        _ => pronouns.name().split('_').map(str::to_string).collect(),
    };
    Ok(THEY_PRONOUNS
        .iter()
        .enumerate()
        .map(|(i, fallback)| given.get(i).cloned().unwrap_or_else(|| fallback.to_string()))
        .collect())
}

#[derive(Debug, Clone)]
pub struct Guardian {
    pub first_name: String,
    pub last_name: String,
    pub relationship_code: GuardianRelationship,
    pub relationship_other: Option<String>,
}

impl Guardian {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        Ok(Self {
            first_name: row.get_str("guardian_first_name")?.to_string(),
            last_name: row.get_str("guardian_last_name")?.to_string(),
            relationship_code: GuardianRelationship::from_code(
                row.get_int("guardian_relationship___1")?,
            )?,
            relationship_other: row.opt_str("other_relation").map(str::to_string),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Relationship to the patient; "other" uses the free-text answer.
    pub fn relationship(&self) -> String {
        match (self.relationship_code, &self.relationship_other) {
            (GuardianRelationship::Other, Some(other)) => other.clone(),
            (GuardianRelationship::Other, None) => "guardian".to_string(),
            (relationship, _) => relationship.to_string(),
        }
    }

    fn title(&self) -> Option<&'static str> {
        use GuardianRelationship::*;
        match self.relationship_code {
            Mother | Stepmother | Grandmother | Aunt => Some("Ms."),
            Father | Stepfather | Grandfather | Uncle => Some("Mr."),
            FosterParent | LegalGuardian | Other => None,
        }
    }

    /// `Ms. Last`, or the full name when no title applies.
    pub fn title_name(&self) -> String {
        match self.title() {
            Some(title) => format!("{} {}", title, self.last_name),
            None => self.full_name(),
        }
    }

    /// `Ms. First Last`, or the full name when no title applies.
    pub fn title_full_name(&self) -> String {
        match self.title() {
            Some(title) => format!("{} {}", title, self.full_name()),
            None => self.full_name(),
        }
    }

    pub fn parent_or_guardian(&self) -> &'static str {
        use GuardianRelationship::*;
        match self.relationship_code {
            Mother | Father | Stepmother | Stepfather => "parent",
            _ => "guardian",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdMember {
    pub name: String,
    pub age: Option<String>,
    pub relationship: String,
}

#[derive(Debug, Clone)]
pub struct Household {
    pub city: String,
    pub state: USState,
    pub guardian_marital_status: GuardianMaritalStatus,
    pub members: Vec<HouseholdMember>,
    /// Languages spoken at home, capitalized.
    pub languages: Vec<String>,
}

impl Household {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        let count = row.get_int("residing_number")?;
        if !(0..=MAX_HOUSEHOLD_MEMBERS).contains(&count) {
            return Err(invalid("residing_number", &count.to_string()));
        }
        let mut members = Vec::new();
        for i in 1..=count {
            let code = row.get_int(&format!("peopleinhome{}_relation", i))?;
            let relationship = match HouseholdRelationship::from_code(code)? {
                HouseholdRelationship::Other => row
                    .opt_str(&format!("peopleinhome{}_relation_other", i))
                    .unwrap_or("relative")
                    .to_string(),
                known => known.to_string(),
            };
            members.push(HouseholdMember {
                name: row.get_str(&format!("peopleinhome{}", i))?.to_string(),
                age: row
                    .opt_str(&format!("peopleinhome{}_age", i))
                    .map(str::to_string),
                relationship,
            });
        }

        let mut languages = Vec::new();
        for language in descriptors::Language::ALL {
            if !row.get_bool(&format!("language___{}", language.code()))? {
                continue;
            }
            match language {
                descriptors::Language::Other => {
                    if let Some(other) = row.opt_str("language_other") {
                        languages.push(other.to_string());
                    }
                }
                known => languages.push(descriptors::title_case(known.name())),
            }
        }

        Ok(Self {
            city: row.get_str("city")?.to_string(),
            state: USState::from_code(row.get_int("state")?)?,
            guardian_marital_status: GuardianMaritalStatus::from_code(
                row.get_int("guardian_maritalstatus")?,
            )?,
            members,
            languages,
        })
    }

    pub fn state_name(&self) -> String {
        descriptors::title_case(self.state.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub fluency: LanguageFluency,
    pub spoken_whole_life: bool,
    pub spoken_since_age: Option<String>,
    pub setting: Option<String>,
}

impl Language {
    /// Child language `identifier`, or `None` when the slot was left empty.
    pub fn from_row(row: &IntakeRow, identifier: usize) -> Result<Option<Self>, IntakeError> {
        let prefix = format!("child_language{}", identifier);
        let Some(name) = row.opt_str(&prefix) else {
            return Ok(None);
        };
        Ok(Some(Self {
            name: name.to_string(),
            fluency: LanguageFluency::from_code(row.get_int(&format!("{}_fluency", prefix))?)?,
            spoken_whole_life: row.get_bool(&format!("{}_spoken", prefix))?,
            spoken_since_age: row
                .opt_str(&format!("{}_age", prefix))
                .map(str::to_string),
            setting: row
                .opt_str(&format!("{}_setting", prefix))
                .map(str::to_string),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Education {
    pub years_of_education: Option<String>,
    pub school_name: String,
    pub grade: String,
    pub individualized_education_program: IndividualizedEducationProgram,
    pub school_type: SchoolType,
}

impl Education {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        Ok(Self {
            years_of_education: row.opt_str("yrs_school").map(str::to_string),
            school_name: row.get_str("school")?.to_string(),
            grade: row.get_str("grade")?.to_string(),
            individualized_education_program: IndividualizedEducationProgram(
                descriptors::IndividualizedEducationProgram::from_code(row.get_int("iep")?)?,
            ),
            school_type: SchoolType::from_code(row.get_int("schooltype")?)?,
        })
    }

    /// The grade as a number, when it is one (`"5"`, not `"K"`).
    pub fn grade_number(&self) -> Option<i64> {
        if self.grade.is_empty() || !self.grade.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.grade.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct Development {
    pub duration_of_pregnancy: DurationOfPregnancy,
    pub delivery: BirthDelivery,
    pub delivery_location: DeliveryLocation,
    pub birth_complications: BirthComplications,
    pub premature_birth: bool,
    pub premature_birth_specify: Option<String>,
    pub adaptability: Adaptability,
    pub soothing_difficulty: SoothingDifficulty,
    pub early_intervention: EarlyIntervention,
    pub cpse: Cpse,
}

impl Development {
    pub fn from_row(row: &IntakeRow) -> Result<Self, IntakeError> {
        let mut complications = Vec::new();
        for complication in descriptors::BirthComplications::ALL {
            if row.get_bool(&format!("preg_symp___{}", complication.code()))? {
                complications.push(*complication);
            }
        }

        Ok(Self {
            duration_of_pregnancy: DurationOfPregnancy(
                row.opt_str("txt_duration_preg_num")
                    .and_then(parse_leading_number),
            ),
            delivery: BirthDelivery(descriptors::BirthDelivery::from_code(
                row.get_int("opt_delivery")?,
            )?),
            delivery_location: DeliveryLocation {
                location: descriptors::DeliveryLocation::from_code(
                    row.get_int("birth_location")?,
                )?,
                other: row.opt_str("birth_other").map(str::to_string),
            },
            birth_complications: BirthComplications::new(
                complications,
                row.opt_str("preg_symp_other").map(str::to_string),
            )?,
            premature_birth: row.get_bool("premature")?,
            premature_birth_specify: row.opt_str("premature_specify").map(str::to_string),
            adaptability: Adaptability(descriptors::Adaptability::from_code(
                row.get_int("infanttemp_adapt")?,
            )?),
            soothing_difficulty: SoothingDifficulty::from_code(row.get_int("infanttemp1")?)?,
            early_intervention: EarlyIntervention(row.opt_str("ei_age").map(str::to_string)),
            cpse: Cpse(row.opt_str("cpse_age").map(str::to_string)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::transformers::Transformer;

    const FIXTURE: &str = include_str!("../../tests/data/test_redcap_data.csv");

    fn row(identifier: i64) -> IntakeRow {
        read_subject_row(FIXTURE.as_bytes(), identifier).unwrap()
    }

    #[test]
    fn selects_row_by_survey_identifier() {
        let row = row(1);
        assert_eq!(row.get_str("firstname").unwrap(), "Lea");
        assert_eq!(row.get_int(IDENTIFIER_COLUMN).unwrap(), 1);
    }

    #[test]
    fn missing_and_duplicate_rows() {
        let err = read_subject_row(FIXTURE.as_bytes(), 999).unwrap_err();
        assert!(matches!(err, IntakeError::PatientNotFound));

        let err = read_subject_row(FIXTURE.as_bytes(), 3).unwrap_err();
        assert!(matches!(err, IntakeError::MultiplePatients));
    }

    #[test]
    fn household_size_outside_form_slots_is_rejected() {
        for value in ["9223372036854775807", "11", "-1"] {
            let mut row = row(1);
            row.set("residing_number", value);
            let err = Household::from_row(&row).unwrap_err();
            assert!(
                matches!(err, IntakeError::InvalidValue { ref column, .. } if column == "residing_number"),
                "{}",
                value
            );
        }

        let mut row = row(1);
        row.set("residing_number", "0");
        assert!(Household::from_row(&row).unwrap().members.is_empty());
    }

    #[test]
    fn non_numeric_identifiers_are_skipped() {
        let csv = b"redcap_survey_identifier,firstname\nabc,Nobody\n4,Lea\n";
        let row = read_subject_row(csv, 4).unwrap();
        assert_eq!(row.get_str("firstname").unwrap(), "Lea");
    }

    #[test]
    fn export_without_identifier_column_is_rejected() {
        let err = read_subject_row(b"record_id,firstname\n1,Lea\n", 1).unwrap_err();
        assert!(matches!(err, IntakeError::MissingColumn(ref c) if c == IDENTIFIER_COLUMN));
    }

    #[test]
    fn typed_accessors() {
        let mut row = IntakeRow::default();
        row.set("int", " 7 ");
        row.set("float_int", "7.0");
        row.set("blank", "");
        row.set("flag", "1");
        row.set("bad", "seven");

        assert_eq!(row.get_int("int").unwrap(), 7);
        assert_eq!(row.get_int("float_int").unwrap(), 7);
        assert_eq!(row.opt_int("blank").unwrap(), None);
        assert!(row.get_bool("flag").unwrap());
        assert!(!row.get_bool("blank").unwrap());
        assert!(row.opt_str("blank").is_none());
        assert!(matches!(
            row.get_int("bad").unwrap_err(),
            IntakeError::InvalidValue { ref column, .. } if column == "bad"
        ));
        assert!(matches!(
            row.get_str("absent").unwrap_err(),
            IntakeError::MissingColumn(ref c) if c == "absent"
        ));
    }

    #[test]
    fn intake_information() {
        let intake = IntakeInformation::from_row(&row(1)).unwrap();
        assert_eq!(
            intake.date_of_intake,
            NaiveDate::from_ymd_opt(2023, 10, 2).unwrap()
        );
        assert_eq!(intake.phone, "555-0100");

        let patient = &intake.patient;
        assert_eq!(patient.full_name(), "Lea Avatar");
        assert_eq!(patient.preferred_name(), "Lea");
        assert_eq!(patient.age, 10);
        assert_eq!(
            patient.date_of_birth,
            NaiveDate::from_ymd_opt(2013, 5, 2).unwrap()
        );
        assert_eq!(patient.age_gender_label(), "girl");
        assert_eq!(patient.pronouns, vec!["she", "her", "her", "hers", "herself"]);
        assert_eq!(patient.handedness.transform(), "right-handed");
        assert_eq!(patient.language_spoken_best.as_deref(), Some("English"));
    }

    #[test]
    fn nickname_and_they_pronouns() {
        let patient = IntakeInformation::from_row(&row(2)).unwrap().patient;
        assert_eq!(patient.full_name(), "Alex \"Al\" Smith");
        assert_eq!(patient.preferred_name(), "Al");
        assert_eq!(patient.age_gender_label(), "child");
        assert_eq!(patient.gender_text(), "non binary");
        assert!(patient.uses_they());
        assert_eq!(
            patient.pronouns,
            vec!["they", "them", "their", "theirs", "themselves"]
        );
    }

    #[test]
    fn other_pronouns_fall_back_to_they() {
        let pronouns = parse_pronouns(5, Some("xe/xem")).unwrap();
        assert_eq!(pronouns, vec!["xe", "xem", "their", "theirs", "themselves"]);
        assert!(parse_pronouns(9, None).is_err());
    }

    #[test]
    fn guardian() {
        let mut row = row(1);
        let guardian = Guardian::from_row(&row).unwrap();
        assert_eq!(guardian.full_name(), "Jane Avatar");
        assert_eq!(guardian.relationship(), "mother");
        assert_eq!(guardian.title_name(), "Ms. Avatar");
        assert_eq!(guardian.title_full_name(), "Ms. Jane Avatar");
        assert_eq!(guardian.parent_or_guardian(), "parent");

        row.set("guardian_relationship___1", "11");
        row.set("other_relation", "xkcd");
        let guardian = Guardian::from_row(&row).unwrap();
        assert_eq!(guardian.relationship(), "xkcd");
        assert_eq!(guardian.title_name(), "Jane Avatar");
        assert_eq!(guardian.parent_or_guardian(), "guardian");
    }

    #[test]
    fn household() {
        let household = Household::from_row(&row(1)).unwrap();
        assert_eq!(household.city, "Brooklyn");
        assert_eq!(household.state, USState::NewYork);
        assert_eq!(household.state_name(), "New York");
        assert_eq!(household.guardian_marital_status, GuardianMaritalStatus::Married);
        assert_eq!(household.members.len(), 2);
        assert_eq!(household.members[1].relationship, "brother");
        assert_eq!(household.languages, vec!["English", "Spanish"]);
    }

    #[test]
    fn languages() {
        let row = row(1);
        let language = Language::from_row(&row, 2).unwrap().unwrap();
        assert_eq!(language.name, "Spanish");
        assert_eq!(language.fluency, LanguageFluency::Conversational);
        assert!(!language.spoken_whole_life);
        assert_eq!(language.spoken_since_age.as_deref(), Some("5"));
        assert_eq!(language.setting.as_deref(), Some("school"));
        assert!(Language::from_row(&row, 3).unwrap().is_none());
    }

    #[test]
    fn education_and_development() {
        let patient = IntakeInformation::from_row(&row(2)).unwrap().patient;
        assert_eq!(patient.education.grade_number(), Some(3));
        assert!(patient.education.individualized_education_program.matches());
        assert_eq!(patient.education.school_type, SchoolType::Private);

        let development = &patient.development;
        assert_eq!(development.duration_of_pregnancy.0, Some(36.0));
        assert_eq!(development.delivery.transform(), "a cesarean section");
        assert_eq!(development.delivery_location.transform(), "a birthing center");
        assert_eq!(
            development.birth_complications.transform(),
            "the following birth complications: diabetes and anemia"
        );
        assert!(development.premature_birth);
        assert_eq!(development.adaptability.transform(), "a difficult temperament");
        assert_eq!(development.soothing_difficulty, SoothingDifficulty::Difficult);
        assert_eq!(
            development.early_intervention.transform(),
            "received Early Intervention (EI) starting at 18 months"
        );
    }

    #[test]
    fn conflicting_birth_complications_are_rejected() {
        let mut row = row(1);
        row.set("preg_symp___4", "1");
        let err = Development::from_row(&row).unwrap_err();
        assert!(matches!(err, IntakeError::ConflictingBirthComplications));
    }
}
