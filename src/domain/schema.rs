//! Feature layout: the canonical base columns and the engineered columns.
//!
//! The order of both lists is part of the model contract. A model trained on
//! the raw layout sees exactly `BASE_FEATURES`; a feature-engineered model sees
//! `BASE_FEATURES` followed by `ENGINEERED_FEATURES`.

use serde::{Deserialize, Serialize};

pub const AGE: &str = "Age";
pub const CHOLESTEROL: &str = "Cholesterol";
pub const HEART_RATE: &str = "Heart rate";
pub const DIABETES: &str = "Diabetes";
pub const FAMILY_HISTORY: &str = "Family History";
pub const SMOKING: &str = "Smoking";
pub const OBESITY: &str = "Obesity";
pub const ALCOHOL: &str = "Alcohol Consumption";
pub const EXERCISE_HOURS: &str = "Exercise Hours Per Week";
pub const DIET: &str = "Diet";
pub const PREVIOUS_HEART_PROBLEMS: &str = "Previous Heart Problems";
pub const MEDICATION_USE: &str = "Medication Use";
pub const STRESS_LEVEL: &str = "Stress Level";
pub const SEDENTARY_HOURS: &str = "Sedentary Hours Per Day";
pub const INCOME: &str = "Income";
pub const BMI: &str = "BMI";
pub const TRIGLYCERIDES: &str = "Triglycerides";
pub const ACTIVITY_DAYS: &str = "Physical Activity Days Per Week";
pub const SLEEP_HOURS: &str = "Sleep Hours Per Day";
pub const BLOOD_SUGAR: &str = "Blood sugar";
pub const CK_MB: &str = "CK-MB";
pub const TROPONIN: &str = "Troponin";
pub const GENDER: &str = "Gender";
pub const SYSTOLIC: &str = "Systolic blood pressure";
pub const DIASTOLIC: &str = "Diastolic blood pressure";

/// Number of base columns.
pub const BASE_FEATURE_COUNT: usize = 25;

/// Number of engineered columns.
pub const ENGINEERED_FEATURE_COUNT: usize = 18;

/// Base columns in canonical order.
pub const BASE_FEATURES: [&str; BASE_FEATURE_COUNT] = [
    AGE,
    CHOLESTEROL,
    HEART_RATE,
    DIABETES,
    FAMILY_HISTORY,
    SMOKING,
    OBESITY,
    ALCOHOL,
    EXERCISE_HOURS,
    DIET,
    PREVIOUS_HEART_PROBLEMS,
    MEDICATION_USE,
    STRESS_LEVEL,
    SEDENTARY_HOURS,
    INCOME,
    BMI,
    TRIGLYCERIDES,
    ACTIVITY_DAYS,
    SLEEP_HOURS,
    BLOOD_SUGAR,
    CK_MB,
    TROPONIN,
    GENDER,
    SYSTOLIC,
    DIASTOLIC,
];

/// Engineered columns, appended after the base columns in this order.
pub const ENGINEERED_FEATURES: [&str; ENGINEERED_FEATURE_COUNT] = [
    "Lifestyle_Risk",
    "Medical_Risk",
    "Total_Risk_Score",
    "Age_BMI",
    "Age_Cholesterol",
    "Lipid_Total",
    "Pulse_Pressure",
    "Mean_Arterial_Pressure",
    "Cardiac_Biomarkers",
    "Activity_Balance",
    "Sleep_Quality",
    "Age_squared",
    "BMI_squared",
    "Cholesterol_squared",
    "Smoking_Diabetes",
    "Smoking_FamilyHistory",
    "Obesity_Diabetes",
    "Stress_Sedentary",
];

/// Columns that never carry features (row identifiers, stray index columns).
pub const NON_FEATURE_COLUMNS: [&str; 2] = ["Unnamed: 0", "id"];

/// Column carrying the caller's row identifier.
pub const ID_COLUMN: &str = "id";

/// Position of a base column in the canonical order.
#[must_use]
pub fn base_index(name: &str) -> Option<usize> {
    BASE_FEATURES.iter().position(|c| *c == name)
}

/// Which layout a trained model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// V1: the 25 base columns only.
    Raw,
    /// V2: base columns followed by the 18 engineered columns.
    Engineered,
}

impl FeatureSet {
    /// Total number of model inputs for this layout.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Self::Raw => BASE_FEATURE_COUNT,
            Self::Engineered => BASE_FEATURE_COUNT + ENGINEERED_FEATURE_COUNT,
        }
    }

    /// Column names in model input order.
    #[must_use]
    pub fn columns(self) -> Vec<&'static str> {
        match self {
            Self::Raw => BASE_FEATURES.to_vec(),
            Self::Engineered => BASE_FEATURES
                .iter()
                .chain(ENGINEERED_FEATURES.iter())
                .copied()
                .collect(),
        }
    }

    /// Identify the layout a model was trained on from its feature names.
    ///
    /// Names must match one canonical layout exactly, including order.
    #[must_use]
    pub fn detect<S: AsRef<str>>(feature_names: &[S]) -> Option<Self> {
        [Self::Raw, Self::Engineered].into_iter().find(|set| {
            let expected = set.columns();
            expected.len() == feature_names.len()
                && expected
                    .iter()
                    .zip(feature_names)
                    .all(|(e, a)| *e == a.as_ref())
        })
    }

    /// Human-readable model version label.
    #[must_use]
    pub fn version_label(self) -> &'static str {
        match self {
            Self::Raw => "V1 (raw features)",
            Self::Engineered => "V2 (with Feature Engineering)",
        }
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.version_label())
    }
}
