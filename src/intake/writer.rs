//! Lays out an intake report.
//!
//! The report starts from a fixed skeleton. Intake sections are inserted
//! before the mental status heading, then `{{PLACEHOLDER}}` fields are filled
//! in and grammar corrections run over the whole document.
//!
//! Text is coloured by where it comes from so clinicians can see what still
//! needs their attention: intake answers, testing results to fill in, and
//! boilerplate template text.

use super::language::DocumentCorrections;
use super::parser::{HouseholdMember, IntakeInformation, Patient};
use super::transformers::{LanguageFluencies, Transformer};
use crate::docx::{rgb_to_hex, Alignment, Block, Cell, Document, DocxReplace, Paragraph, Run, Table};
use crate::text::{join_with_oxford_comma, ordinal_suffix, remove_excess_whitespace};

pub const RGB_INTAKE: (u8, u8, u8) = (178, 161, 199);
pub const RGB_TESTING: (u8, u8, u8) = (155, 187, 89);
pub const RGB_TEMPLATE: (u8, u8, u8) = (247, 150, 70);
const RGB_TABLE_HEADER: (u8, u8, u8) = (217, 217, 217);

pub const PLACEHOLDER: &str = "______";

const INSERTION_HEADING: &str = "MENTAL STATUS EXAMINATION AND TESTING BEHAVIORAL OBSERVATIONS";

const SCORE_TABLE_ROWS: usize = 7;
const SCORE_TABLE_HEADERS: [&str; 4] = [
    "Domain/Index/Subtest",
    "Standard Score",
    "Percentile Rank",
    "Descriptor",
];

#[derive(Debug, Clone, Copy)]
enum Style {
    Title,
    Heading1,
    Heading2,
    Normal,
}

impl Style {
    fn id(self) -> Option<&'static str> {
        match self {
            Style::Title => Some("Title"),
            Style::Heading1 => Some("Heading1"),
            Style::Heading2 => Some("Heading2"),
            Style::Normal => None,
        }
    }
}

fn paragraph(text: &str, style: Style) -> Paragraph {
    let paragraph = Paragraph::with_text(remove_excess_whitespace(text));
    match style.id() {
        Some(id) => paragraph.style(id),
        None => paragraph,
    }
}

/// Sets the font colour of every run.
fn paint(mut paragraph: Paragraph, rgb: (u8, u8, u8)) -> Paragraph {
    let (r, g, b) = rgb;
    for run in paragraph.runs.iter_mut() {
        run.color = Some(rgb_to_hex(r, g, b));
    }
    paragraph
}

/// `text` + superscript ordinal suffix + `after`, e.g. `5` `th` ` grade`.
fn with_grade_superscript(before: &str, grade: Option<i64>, after: &str) -> Paragraph {
    let mut paragraph = Paragraph::new().run(Run::new(remove_excess_whitespace(before)));
    if let Some(grade) = grade {
        paragraph = paragraph.run(Run::new(ordinal_suffix(grade)).superscript());
    }
    paragraph.run(Run::new(format!(" {}", remove_excess_whitespace(after))))
}

pub struct ReportWriter<'a> {
    intake: &'a IntakeInformation,
    blocks: Vec<Block>,
}

impl<'a> ReportWriter<'a> {
    pub fn new(intake: &'a IntakeInformation) -> Self {
        Self {
            intake,
            blocks: Vec::new(),
        }
    }

    fn patient(&self) -> &'a Patient {
        &self.intake.patient
    }

    pub fn transform(mut self) -> Document {
        self.write_reason_for_visit();
        self.write_developmental_history();
        self.write_academic_history();
        self.write_social_history();
        self.write_psychiatric_history();
        self.write_medical_history();
        self.write_current_psychiatric_functioning();
        self.add_page_break();

        let mut report = self.skeleton();
        let index = report
            .find_paragraph(INSERTION_HEADING)
            .unwrap_or(report.body.len());
        report.insert_blocks(index, std::mem::take(&mut self.blocks));

        self.replace_patient_information(&mut report);
        DocumentCorrections::new(self.patient().uses_they(), true).correct(&mut report);
        report
    }

    fn insert(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    fn insert_text(&mut self, text: &str, style: Style, rgb: (u8, u8, u8)) {
        self.insert(paint(paragraph(text, style), rgb));
    }

    fn skeleton(&self) -> Document {
        let mut report = Document::new();
        let date_of_intake = self.intake.date_of_intake.format("%m/%d/%Y");
        let lines = [
            ("CONFIDENTIAL PSYCHOLOGICAL EVALUATION".to_string(), Style::Title),
            ("IDENTIFYING INFORMATION".to_string(), Style::Heading1),
            ("Name: {{FULL_NAME}}".to_string(), Style::Normal),
            ("Date of Birth: {{DATE_OF_BIRTH}}".to_string(), Style::Normal),
            ("Reporting Guardian: {{REPORTING_GUARDIAN}}".to_string(), Style::Normal),
            (format!("Date of Intake: {}", date_of_intake), Style::Normal),
            (format!("Dates of Evaluation: {}", PLACEHOLDER), Style::Normal),
        ];
        for (text, style) in lines {
            report.push_paragraph(paragraph(&text, style));
        }

        report.push_paragraph(paragraph(INSERTION_HEADING, Style::Heading1));
        report.push_paragraph(paint(
            paragraph(
                "{{PREFERRED_NAME}} presented as a well-groomed {{AGED_GENDER}} who \
                 appeared {{PRONOUN_2}} stated age. {{PRONOUN_0}} was cooperative \
                 and separated easily from {{PRONOUN_2}} guardian. Rapport was \
                 established easily and maintained throughout testing.",
                Style::Normal,
            ),
            RGB_TEMPLATE,
        ));

        report.push_paragraph(paragraph("CLINICAL SUMMARY AND IMPRESSIONS", Style::Heading1));
        report.push_paragraph(paint(
            paragraph(
                &format!(
                    "{{{{PREFERRED_NAME}}}} is a sociable/resourceful/pleasant/hardworking/etc. \
                     {{{{AGED_GENDER}}}} who participated in the present evaluation \
                     in the interest of participating in research/due to parental \
                     concerns regarding {}.",
                    PLACEHOLDER
                ),
                Style::Normal,
            ),
            RGB_TESTING,
        ));

        report.push_paragraph(paragraph("RECOMMENDATIONS", Style::Heading1));
        report.push_paragraph(paint(paragraph(PLACEHOLDER, Style::Normal), RGB_TEMPLATE));

        report
            .headers
            .push(vec![Block::Paragraph(paragraph("CONFIDENTIAL", Style::Normal))]);
        report.footers.push(vec![Block::Paragraph(paragraph(
            "{{FULL_NAME}}, DOB: {{DATE_OF_BIRTH}}",
            Style::Normal,
        ))]);
        report
    }

    fn replace_patient_information(&self, report: &mut Document) {
        let patient = self.patient();
        let date_of_birth = patient.date_of_birth.format("%m/%d/%Y").to_string();
        let reporting_guardian = patient.guardian.title_name();
        let full_name = patient.full_name();
        let mut replacements: Vec<(String, &str)> = vec![
            ("{{FULL_NAME}}".to_string(), full_name.as_str()),
            ("{{PREFERRED_NAME}}".to_string(), patient.preferred_name()),
            ("{{DATE_OF_BIRTH}}".to_string(), date_of_birth.as_str()),
            ("{{REPORTING_GUARDIAN}}".to_string(), reporting_guardian.as_str()),
            ("{{AGED_GENDER}}".to_string(), patient.age_gender_label()),
        ];
        for index in 0..5 {
            replacements.push((format!("{{{{PRONOUN_{}}}}}", index), patient.pronoun(index)));
        }

        let mut replacer = DocxReplace::new(report);
        for (template, replacement) in &replacements {
            replacer.replace(template, replacement);
        }
    }

    fn write_reason_for_visit(&mut self) {
        let patient = self.patient();
        let guardian = &patient.guardian;
        let education = &patient.education;
        let first = &patient.first_name;

        let description = if patient.handedness.matches() {
            format!(
                "{}-year-old, {} {}",
                patient.age,
                patient.handedness.transform(),
                patient.age_gender_label()
            )
        } else {
            format!("{}-year-old {}", patient.age, patient.age_gender_label())
        };

        let before = format!(
            "At the time of enrollment, {first} was a {description}. {first} was \
             placed in the {grade}",
            first = first,
            description = description,
            grade = education.grade,
        );
        let after = format!(
            "grade at {school}. {first} {iep}. {first} and {possessive} {relationship}, \
             {guardian}, attended the present evaluation due to concerns regarding \
             {p}. The family is hoping for {p}. The family learned of the study \
             through {p}.",
            school = education.school_name,
            first = first,
            iep = education.individualized_education_program.transform(),
            possessive = patient.pronoun(2),
            relationship = guardian.relationship(),
            guardian = guardian.title_full_name(),
            p = PLACEHOLDER,
        );

        self.insert_text("REASON FOR VISIT", Style::Heading1, RGB_INTAKE);
        let reason = with_grade_superscript(&before, education.grade_number(), &after);
        self.insert(paint(reason, RGB_INTAKE));
    }

    fn write_developmental_history(&mut self) {
        self.insert_text("DEVELOPMENTAL HISTORY", Style::Heading1, RGB_INTAKE);
        self.write_prenatal_history();
        self.write_developmental_milestones();
        self.write_early_education();
    }

    fn write_prenatal_history(&mut self) {
        let patient = self.patient();
        let development = &patient.development;
        let first = &patient.first_name;

        let mut text = format!(
            "{guardian} reported {complications}. {first} was born at {weeks} of \
             gestation with {delivery} at {location}. {first} had {adaptability} \
             during infancy and was {soothing} to soothe.",
            guardian = patient.guardian.title_name(),
            complications = development.birth_complications.transform(),
            first = first,
            weeks = development.duration_of_pregnancy.transform(),
            delivery = development.delivery.transform(),
            location = development.delivery_location.transform(),
            adaptability = development.adaptability.transform(),
            soothing = development.soothing_difficulty,
        );
        if development.premature_birth {
            match &development.premature_birth_specify {
                Some(details) => {
                    text.push_str(&format!(" {} was born prematurely ({}).", first, details))
                }
                None => text.push_str(&format!(" {} was born prematurely.", first)),
            }
        }

        self.insert_text("Prenatal and Birth History", Style::Heading2, RGB_INTAKE);
        self.insert_text(&text, Style::Normal, RGB_INTAKE);
    }

    fn write_developmental_milestones(&mut self) {
        let patient = self.patient();
        let text = format!(
            "{first}'s achievement of social, language, fine and gross motor \
             developmental milestones were within normal limits, as reported by \
             {guardian}. {first} started walking at {p} and talking at {p}. \
             {pronoun} achieved daytime and nighttime dryness at {p}.",
            first = patient.first_name,
            guardian = patient.guardian.title_name(),
            pronoun = patient.pronoun(0),
            p = PLACEHOLDER,
        );

        self.insert_text("Developmental Milestones", Style::Heading2, RGB_INTAKE);
        self.insert_text(&text, Style::Normal, RGB_TEMPLATE);
    }

    fn write_early_education(&mut self) {
        let patient = self.patient();
        let development = &patient.development;
        let text = format!(
            "{} reported that {} {} and {}.",
            patient.guardian.title_name(),
            patient.first_name,
            development.early_intervention.transform(),
            development.cpse.transform(),
        );

        self.insert_text("Early Educational Interventions", Style::Heading2, RGB_INTAKE);
        self.insert_text(&text, Style::Normal, RGB_INTAKE);
    }

    fn write_academic_history(&mut self) {
        self.insert_text("ACADEMIC AND EDUCATIONAL HISTORY", Style::Heading1, RGB_INTAKE);
        self.write_previous_testing();
        self.write_score_table();
        self.write_educational_history();
    }

    fn write_previous_testing(&mut self) {
        let first = &self.patient().first_name;
        let text = format!(
            "{first} has no history of previous psychoeducational evaluations./{first} \
             was evaluated by {p} in 20XX. Documentation of the results of the \
             evaluation(s) were unavailable at the time of writing this report/ \
             Notable results include:",
            first = first,
            p = PLACEHOLDER,
        );

        self.insert_text("Previous Testing", Style::Heading2, RGB_TEMPLATE);
        self.insert_text(&text, Style::Normal, RGB_TEMPLATE);
    }

    /// Caption and blank score table for previous testing results.
    fn write_score_table(&mut self) {
        let (r, g, b) = RGB_TABLE_HEADER;
        let caption = Paragraph::new()
            .alignment(Alignment::Center)
            .run(Run::new("Name, Date of Assessment").bold());
        self.insert(paint(caption, RGB_INTAKE));

        let header: Vec<Cell> = SCORE_TABLE_HEADERS
            .iter()
            .map(|text| Cell {
                paragraphs: vec![paint(
                    Paragraph::new()
                        .alignment(Alignment::Center)
                        .space_after(0)
                        .run(Run::new(*text).bold()),
                    RGB_INTAKE,
                )],
                shading: Some(rgb_to_hex(r, g, b)),
            })
            .collect();
        let mut rows = vec![header];
        for _ in 1..SCORE_TABLE_ROWS {
            rows.push(
                (0..SCORE_TABLE_HEADERS.len())
                    .map(|_| Cell {
                        paragraphs: vec![Paragraph::new().space_after(0)],
                        shading: None,
                    })
                    .collect(),
            );
        }
        self.blocks.push(Block::Table(Table {
            style: Some("TableGrid".to_string()),
            rows,
        }));
    }

    fn write_educational_history(&mut self) {
        let patient = self.patient();
        let education = &patient.education;
        let first = &patient.first_name;

        let iep_prior = if education.individualized_education_program.matches() {
            format!(
                "{} was granted an Individualized Education Program (IEP) in {} grade \
                 due to {} difficulties.",
                first, PLACEHOLDER, PLACEHOLDER
            )
        } else {
            format!("{} has never had an Individualized Education Program (IEP).", first)
        };
        let prior = format!(
            "{first} previously attended {p}. {pronoun} previously struggled with \
             (provide details of academic challenges and behavioral difficulties in \
             school). {iep_prior}",
            first = first,
            p = PLACEHOLDER,
            pronoun = patient.pronoun(0),
            iep_prior = iep_prior,
        );

        let before = format!("{} is currently in the {}", first, education.grade);
        let after = format!(
            "grade at {school}. {first} does/does not receive special education \
             services and maintains/does not have an IEP allowing accommodations \
             for/including {p}. {first} is generally an average/above average/below \
             average student and receives mostly (describe grades). [Describe any \
             academic issues reported by parent or child.] {first} continues to \
             exhibit weaknesses in {p}.",
            school = education.school_name,
            first = first,
            p = PLACEHOLDER,
        );

        self.insert_text("Educational History", Style::Heading2, RGB_INTAKE);
        self.insert_text(&prior, Style::Normal, RGB_INTAKE);
        let current = with_grade_superscript(&before, education.grade_number(), &after);
        self.insert(paint(current, RGB_TEMPLATE));
    }

    fn write_social_history(&mut self) {
        self.insert_text("SOCIAL HISTORY", Style::Heading1, RGB_INTAKE);
        self.write_home_and_adaptive_functioning();
        self.write_social_functioning();
    }

    fn write_home_and_adaptive_functioning(&mut self) {
        let patient = self.patient();
        let household = &patient.household;
        let guardian = &patient.guardian;
        let first = &patient.first_name;

        let members = if household.members.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            let members: Vec<String> = household.members.iter().map(describe_member).collect();
            join_with_oxford_comma(&members)
        };
        let mut home = format!(
            "{first} lives in {city}, {state}, with {members}. The {role}s are {status}.",
            first = first,
            city = household.city,
            state = household.state_name(),
            members = members,
            role = guardian.parent_or_guardian(),
            status = household.guardian_marital_status,
        );
        if !household.languages.is_empty() {
            let verb = if household.languages.len() > 1 { "are" } else { "is" };
            home.push_str(&format!(
                " {} {} spoken at home.",
                join_with_oxford_comma(&household.languages),
                verb
            ));
        }
        if let Some(language) = &patient.language_spoken_best {
            home.push_str(&format!(
                " {} is reportedly {}'s preferred language.",
                language, first
            ));
        }
        let fluencies = LanguageFluencies(&patient.languages);
        if fluencies.matches() {
            home.push_str(&format!(" {} {}.", first, fluencies.transform()));
        }

        let adaptive = format!(
            "{guardian} denied any concerns with {possessive} functioning in the home \
             setting// Per {guardian}, {first} has a history of {p} (temper outbursts, \
             oppositional behaviors, etc.) in the home setting. (Write details of \
             behavioral difficulties). (Also include any history of sleep \
             difficulties, daily living skills, poor hygiene, etc.)",
            guardian = guardian.title_name(),
            possessive = patient.pronoun(2),
            first = first,
            p = PLACEHOLDER,
        );

        self.insert_text("Home and Adaptive Functioning", Style::Heading2, RGB_INTAKE);
        self.insert_text(&home, Style::Normal, RGB_INTAKE);
        self.insert_text(&adaptive, Style::Normal, RGB_TEMPLATE);
    }

    fn write_social_functioning(&mut self) {
        let patient = self.patient();
        let text = format!(
            "{guardian} was pleased to describe {first} as a (insert adjective e.g., \
             affectionate) {label}. {guardian} reported that {subject} has \
             many/several/one friends in {possessive} peer group in school and on \
             {possessive} team/club/etc. {first} socializes with friends outside of \
             school and has a (positive/fair/poor) relationship with them. {first}'s \
             hobbies include {p}.",
            guardian = patient.guardian.title_name(),
            first = patient.first_name,
            label = patient.age_gender_label(),
            subject = patient.pronoun(0),
            possessive = patient.pronoun(2),
            p = PLACEHOLDER,
        );

        self.insert_text("Social Functioning", Style::Heading2, RGB_INTAKE);
        self.insert_text(&text, Style::Normal, RGB_INTAKE);
    }

    fn write_psychiatric_history(&mut self) {
        self.insert_text("PSYCHIATRIC HISTORY", Style::Heading1, RGB_INTAKE);

        let diagnoses = format!(
            "{{{{PREFERRED_NAME}}}} has no history of psychiatric diagnoses./\
             {{{{PREFERRED_NAME}}}} was diagnosed with {p} by {p} in {p}.",
            p = PLACEHOLDER
        );
        let sections = [
            ("Past Psychiatric Diagnoses", diagnoses.as_str()),
            (
                "Past Psychiatric Hospitalizations",
                "{{REPORTING_GUARDIAN}} denied any history of past psychiatric \
                 hospitalizations for {{PREFERRED_NAME}}.",
            ),
            (
                "Past Therapeutic Interventions",
                "{{REPORTING_GUARDIAN}} denied any history of therapeutic interventions.",
            ),
            (
                "Past Self-Injurious Behaviors and Suicidality",
                "{{REPORTING_GUARDIAN}} denied any history of self-injurious behaviors, \
                 suicidal ideation or suicide attempts for {{PREFERRED_NAME}}.",
            ),
            (
                "Past Severe Aggressive Behaviors and Homicidality",
                "{{REPORTING_GUARDIAN}} denied any history of severe aggressive \
                 behaviors or homicidal ideation for {{PREFERRED_NAME}}.",
            ),
            (
                "Exposure to Violence and Trauma",
                "{{REPORTING_GUARDIAN}} denied any history of exposure to violence or \
                 trauma for {{PREFERRED_NAME}}.",
            ),
            (
                "Administration for Children's Services (ACS) Involvement",
                "{{REPORTING_GUARDIAN}} denied any history of ACS involvement for \
                 {{PREFERRED_NAME}}.",
            ),
            (
                "Family Psychiatric History",
                "{{PREFERRED_NAME}}'s family history is largely unremarkable for \
                 psychiatric illnesses. {{REPORTING_GUARDIAN}} denied any family \
                 history related to homicidality, suicidality, depression, bipolar \
                 disorder, attention-deficit/hyperactivity disorder, autism spectrum \
                 disorder, learning disorders, psychotic disorders, eating disorders, \
                 oppositional defiant or conduct disorders, substance abuse, panic, \
                 generalized anxiety, or obsessive-compulsive disorders. Information \
                 regarding {{PREFERRED_NAME}}'s family psychiatric history was deferred.",
            ),
        ];
        for (heading, text) in sections {
            self.insert_text(heading, Style::Heading2, RGB_TEMPLATE);
            self.insert_text(text, Style::Normal, RGB_TEMPLATE);
        }
    }

    fn write_medical_history(&mut self) {
        let text = "{{PREFERRED_NAME}}'s medical history is unremarkable for significant \
                    medical conditions. {{PRONOUN_0}} is not currently taking any \
                    medications for chronic medical conditions. {{PREFERRED_NAME}} \
                    wears/does not wear prescription glasses in home and school \
                    settings. {{PRONOUN_0}} does/does not require a hearing device. \
                    {{REPORTING_GUARDIAN}} denied any history of seizures, head trauma, \
                    migraines, meningitis or encephalitis.";

        self.insert_text("MEDICAL HISTORY", Style::Heading1, RGB_TEMPLATE);
        self.insert_text(text, Style::Normal, RGB_TEMPLATE);
    }

    fn write_current_psychiatric_functioning(&mut self) {
        let patient = self.patient();
        let first = &patient.first_name;
        let guardian = patient.guardian.title_name();

        let medications = format!(
            "{first} is currently prescribed a daily/twice daily oral course of {p} \
             for {p}. {pronoun} is being treated by {p}, {p}, monthly/weekly/biweekly. \
             The medication has been ineffective/effective.",
            first = first,
            p = PLACEHOLDER,
            pronoun = patient.pronoun(0),
        );

        let rule_out = remove_excess_whitespace(&format!(
            "[Rule out presenting diagnoses, using headlines and KSADS/DSM criteria. \
             Examples of headlines include: Temper Outbursts (ending should include \
             “{} denied any consistent patterns of irritability for {}” if applicable), \
             Inattention and Hyperactivity, Autism-Related Symptoms, Oppositional \
             Defiant Behaviors, etc.]. ",
            guardian, first
        ));
        let example = remove_excess_whitespace(&format!(
            " (Ex: Though {} is generally a {} child, {} continues to have difficulties \
             with temper tantrums…).",
            first,
            PLACEHOLDER,
            patient.pronoun(0)
        ));
        let testing = Paragraph::new()
            .run(Run::new(format!("{} ", rule_out)).italic())
            .run(Run::new("Establish a baseline first for temper outbursts").italic().bold())
            .run(Run::new(format!(" {}", example)).italic());

        let denied = format!(
            "{} and {} denied any current significant symptoms related to mood, \
             suicidality, psychosis, eating, oppositional or conduct behaviors, \
             substance abuse, autism, tics, inattention/hyperactivity, \
             enuresis/encopresis, trauma, sleep, panic, anxiety or \
             obsessive-compulsive disorders.",
            guardian, first
        );

        self.insert_text("CURRENT PSYCHIATRIC FUNCTIONING", Style::Heading1, RGB_INTAKE);
        self.insert_text("Current Psychiatric Medications", Style::Heading2, RGB_INTAKE);
        self.insert_text(&medications, Style::Normal, RGB_INTAKE);
        self.insert(paint(testing, RGB_TESTING));
        self.insert_text(&denied, Style::Normal, RGB_TESTING);
    }

    fn add_page_break(&mut self) {
        self.insert(Paragraph::new().run(Run::page_break()));
    }
}

fn describe_member(member: &HouseholdMember) -> String {
    match &member.age {
        Some(age) => format!("{} ({}, age {})", member.name, member.relationship, age),
        None => format!("{} ({})", member.name, member.relationship),
    }
}
