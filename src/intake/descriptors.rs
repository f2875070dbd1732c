//! Numeric option codes of the REDCap intake form.
//!
//! Each descriptor maps the integer REDCap stores for a multiple-choice
//! question to a named option. Names use the REDCap option labels in
//! snake case; `Display` renders them with spaces.

use super::IntakeError;

macro_rules! descriptor {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_code(code: i64) -> Result<Self, IntakeError> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(IntakeError::UnknownCode {
                        descriptor: stringify!($name),
                        code,
                    }),
                }
            }

            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.name().replace('_', " "))
            }
        }
    };
}

/// `new_york` → `New York`.
pub fn title_case(name: &str) -> String {
    name.split('_')
        .map(crate::text::capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

descriptor! {
    Gender {
        Male = 1 => "male",
        Female = 2 => "female",
        NonBinary = 3 => "non_binary",
        TransgenderMale = 4 => "transgender_male",
        TransgenderFemale = 5 => "transgender_female",
        Other = 6 => "other",
    }
}

descriptor! {
    /// Subject, object, possessive determiner, possessive pronoun and
    /// reflexive forms, in that order.
    Pronouns {
        HeHimHisHisHimself = 1 => "he_him_his_his_himself",
        SheHerHerHersHerself = 2 => "she_her_her_hers_herself",
        TheyThemTheirTheirsThemselves = 3 => "they_them_their_theirs_themselves",
        ZeZirZirZirsZirself = 4 => "ze_zir_zir_zirs_zirself",
        Other = 5 => "other",
    }
}

descriptor! {
    Handedness {
        Left = 1 => "left",
        Right = 2 => "right",
        Unknown = 3 => "unknown",
    }
}

descriptor! {
    SchoolType {
        Boarding = 1 => "boarding",
        Home = 2 => "home",
        Parochial = 3 => "parochial",
        Private = 4 => "private",
        Public = 5 => "public",
        Special = 6 => "special",
        Vocational = 7 => "vocational",
        Charter = 8 => "charter",
        Other = 9 => "other",
    }
}

descriptor! {
    IndividualizedEducationProgram {
        No = 0 => "no",
        Yes = 1 => "yes",
    }
}

descriptor! {
    BirthDelivery {
        Vaginal = 1 => "vaginal",
        Cesarean = 2 => "cesarean",
        Unknown = 3 => "unknown",
    }
}

descriptor! {
    DeliveryLocation {
        Hospital = 1 => "hospital",
        Home = 2 => "home",
        Other = 3 => "other",
    }
}

descriptor! {
    Adaptability {
        Easy = 1 => "easy",
        Difficult = 2 => "difficult",
    }
}

descriptor! {
    SoothingDifficulty {
        Easy = 1 => "easy",
        Difficult = 2 => "difficult",
    }
}

descriptor! {
    /// Checkbox options `preg_symp___1` through `preg_symp___20`.
    BirthComplications {
        SpottingOrVaginalBleeding = 1 => "spotting_or_vaginal_bleeding",
        EmotionalProblems = 2 => "emotional_problems",
        ThreatenedMiscarriage = 3 => "threatened_miscarriage",
        Diabetes = 4 => "diabetes",
        HighBloodPressure = 5 => "high_blood_pressure",
        PreTermLabor = 6 => "pre_term_labor",
        KidneyDisease = 7 => "kidney_disease",
        TookAnyPrescriptions = 8 => "took_any_prescriptions",
        DrugUse = 9 => "drug_use",
        AlcoholUse = 10 => "alcohol_use",
        TobaccoUse = 11 => "tobacco_use",
        SwollenAnkles = 12 => "swollen_ankles",
        PlacentaPrevia = 13 => "placenta_previa",
        FamilyStress = 14 => "family_stress",
        RhOrOtherIncompatibilities = 15 => "rh_or_other_incompatibilities",
        FluOrVirus = 16 => "flu_or_virus",
        AccidentOrInjury = 17 => "accident_or_injury",
        Bedrest = 18 => "bedrest",
        OtherIllnesses = 19 => "other_illnesses",
        NoneOfTheAbove = 20 => "none_of_the_above",
    }
}

descriptor! {
    GuardianRelationship {
        Mother = 1 => "mother",
        Father = 2 => "father",
        Stepmother = 3 => "stepmother",
        Stepfather = 4 => "stepfather",
        Grandmother = 5 => "grandmother",
        Grandfather = 6 => "grandfather",
        Aunt = 7 => "aunt",
        Uncle = 8 => "uncle",
        FosterParent = 9 => "foster_parent",
        LegalGuardian = 10 => "legal_guardian",
        Other = 11 => "other",
    }
}

descriptor! {
    GuardianMaritalStatus {
        Married = 1 => "married",
        Divorced = 2 => "divorced",
        Separated = 3 => "separated",
        Widowed = 4 => "widowed",
        NeverMarried = 5 => "never_married",
        DomesticPartnership = 6 => "domestic_partnership",
    }
}

descriptor! {
    /// Relationship of a household member to the patient.
    HouseholdRelationship {
        Mother = 1 => "mother",
        Father = 2 => "father",
        Stepmother = 3 => "stepmother",
        Stepfather = 4 => "stepfather",
        Brother = 5 => "brother",
        Sister = 6 => "sister",
        HalfBrother = 7 => "half_brother",
        HalfSister = 8 => "half_sister",
        Stepbrother = 9 => "stepbrother",
        Stepsister = 10 => "stepsister",
        Grandmother = 11 => "grandmother",
        Grandfather = 12 => "grandfather",
        Aunt = 13 => "aunt",
        Uncle = 14 => "uncle",
        Cousin = 15 => "cousin",
        Other = 16 => "other",
    }
}

descriptor! {
    LanguageFluency {
        Fluent = 1 => "fluent",
        Proficient = 2 => "proficient",
        Conversational = 3 => "conversational",
        Basic = 4 => "basic",
    }
}

descriptor! {
    /// Checkbox options `language___1` through `language___25`.
    Language {
        English = 1 => "english",
        Spanish = 2 => "spanish",
        French = 3 => "french",
        German = 4 => "german",
        Italian = 5 => "italian",
        Portuguese = 6 => "portuguese",
        Russian = 7 => "russian",
        Arabic = 8 => "arabic",
        Hebrew = 9 => "hebrew",
        Hindi = 10 => "hindi",
        Bengali = 11 => "bengali",
        Urdu = 12 => "urdu",
        Mandarin = 13 => "mandarin",
        Cantonese = 14 => "cantonese",
        Japanese = 15 => "japanese",
        Korean = 16 => "korean",
        Vietnamese = 17 => "vietnamese",
        Tagalog = 18 => "tagalog",
        Polish = 19 => "polish",
        Greek = 20 => "greek",
        HaitianCreole = 21 => "haitian_creole",
        Yiddish = 22 => "yiddish",
        Farsi = 23 => "farsi",
        Turkish = 24 => "turkish",
        Other = 25 => "other",
    }
}

descriptor! {
    USState {
        Alabama = 1 => "alabama",
        Alaska = 2 => "alaska",
        Arizona = 3 => "arizona",
        Arkansas = 4 => "arkansas",
        California = 5 => "california",
        Colorado = 6 => "colorado",
        Connecticut = 7 => "connecticut",
        Delaware = 8 => "delaware",
        DistrictOfColumbia = 9 => "district_of_columbia",
        Florida = 10 => "florida",
        Georgia = 11 => "georgia",
        Hawaii = 12 => "hawaii",
        Idaho = 13 => "idaho",
        Illinois = 14 => "illinois",
        Indiana = 15 => "indiana",
        Iowa = 16 => "iowa",
        Kansas = 17 => "kansas",
        Kentucky = 18 => "kentucky",
        Louisiana = 19 => "louisiana",
        Maine = 20 => "maine",
        Maryland = 21 => "maryland",
        Massachusetts = 22 => "massachusetts",
        Michigan = 23 => "michigan",
        Minnesota = 24 => "minnesota",
        Mississippi = 25 => "mississippi",
        Missouri = 26 => "missouri",
        Montana = 27 => "montana",
        Nebraska = 28 => "nebraska",
        Nevada = 29 => "nevada",
        NewHampshire = 30 => "new_hampshire",
        NewJersey = 31 => "new_jersey",
        NewMexico = 32 => "new_mexico",
        NewYork = 33 => "new_york",
        NorthCarolina = 34 => "north_carolina",
        NorthDakota = 35 => "north_dakota",
        Ohio = 36 => "ohio",
        Oklahoma = 37 => "oklahoma",
        Oregon = 38 => "oregon",
        Pennsylvania = 39 => "pennsylvania",
        RhodeIsland = 40 => "rhode_island",
        SouthCarolina = 41 => "south_carolina",
        SouthDakota = 42 => "south_dakota",
        Tennessee = 43 => "tennessee",
        Texas = 44 => "texas",
        Utah = 45 => "utah",
        Vermont = 46 => "vermont",
        Virginia = 47 => "virginia",
        Washington = 48 => "washington",
        WestVirginia = 49 => "west_virginia",
        Wisconsin = 50 => "wisconsin",
        Wyoming = 51 => "wyoming",
    }
}
