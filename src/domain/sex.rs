//! Sex field representations.
//!
//! Callers send the sex column in several shapes: the training label
//! (`"Male"`/`"Female"`), a stringified code (`"1"`, `"0.0"`), or a numeric
//! code. The raw shape is captured as [`SexInput`] at the boundary and resolved
//! into [`Sex`] before anything enters the numeric pipeline.

use serde::{Deserialize, Serialize};

use super::record::FieldValue;

/// Canonical sex category with its trained numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Numeric code the model was trained with (Female=0, Male=1).
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::Female => 0.0,
            Self::Male => 1.0,
        }
    }

    /// Category for a trained numeric code.
    #[must_use]
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 0.0 {
            Some(Self::Female)
        } else if code == 1.0 {
            Some(Self::Male)
        } else {
            None
        }
    }

    /// Category for a training label, ignoring case and surrounding space.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("female") {
            Some(Self::Female)
        } else if label.eq_ignore_ascii_case("male") {
            Some(Self::Male)
        } else {
            None
        }
    }

    /// Training label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw sex value as received, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum SexInput {
    /// Textual value: a label or a stringified code
    StringLabel(String),
    /// Numeric value: expected to be a trained code
    NumericCode(f64),
}

impl SexInput {
    /// Classify a record cell. Missing cells have no sex input.
    #[must_use]
    pub fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            v if v.is_missing() => None,
            FieldValue::Text(s) => Some(Self::StringLabel(s.clone())),
            FieldValue::Number(n) => Some(Self::NumericCode(*n)),
            FieldValue::Flag(b) => Some(Self::NumericCode(if *b { 1.0 } else { 0.0 })),
            FieldValue::Missing => None,
        }
    }
}

impl std::fmt::Display for SexInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StringLabel(s) => write!(f, "{s:?}"),
            Self::NumericCode(n) => write!(f, "{n}"),
        }
    }
}
