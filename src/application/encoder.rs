//! Categorical encoder for the sex column.
//!
//! Resolution is an ordered list of parse attempts. Each attempt is total
//! (it either recognises the input or declines), and the first one that
//! recognises it wins. If every attempt declines, the value is rejected with
//! a conversion error instead of leaking into the numeric pipeline.

use crate::domain::schema::GENDER;
use crate::domain::{FieldValue, Sex, SexInput};
use crate::CardioRiskError;

type ParseAttempt = fn(&SexInput) -> Option<Sex>;

/// Parse attempts in the order they are tried.
const PARSE_ATTEMPTS: [(&str, ParseAttempt); 3] = [
    ("label", parse_label),
    ("stringified code", parse_stringified_code),
    ("numeric code", parse_numeric_code),
];

/// `"Female"` / `"Male"`.
fn parse_label(input: &SexInput) -> Option<Sex> {
    match input {
        SexInput::StringLabel(s) => Sex::from_label(s),
        SexInput::NumericCode(_) => None,
    }
}

/// `"0"`, `"1"`, `"0.0"`, `"1.0"`.
fn parse_stringified_code(input: &SexInput) -> Option<Sex> {
    match input {
        SexInput::StringLabel(s) => s.trim().parse::<f64>().ok().and_then(Sex::from_code),
        SexInput::NumericCode(_) => None,
    }
}

/// `0`, `1`, `0.0`, `1.0`.
fn parse_numeric_code(input: &SexInput) -> Option<Sex> {
    match input {
        SexInput::NumericCode(n) => Sex::from_code(*n),
        SexInput::StringLabel(_) => None,
    }
}

/// Resolve a raw sex value.
///
/// # Errors
/// Returns `CardioRiskError::TypeConversion` if no parse attempt recognises
/// the input.
pub fn resolve_sex(input: &SexInput) -> Result<Sex, CardioRiskError> {
    for (name, attempt) in PARSE_ATTEMPTS {
        if let Some(sex) = attempt(input) {
            tracing::trace!("Sex value resolved as {name}");
            return Ok(sex);
        }
    }
    Err(CardioRiskError::TypeConversion {
        column: GENDER.to_string(),
        value: input.to_string(),
        reason: "not a known sex label or code (expected Female/Male or 0/1)".to_string(),
    })
}

/// Encode a sex cell into its numeric code. Missing cells stay missing.
///
/// # Errors
/// Returns `CardioRiskError::TypeConversion` for unrecognised values.
pub fn encode_sex(value: &FieldValue) -> Result<FieldValue, CardioRiskError> {
    match SexInput::from_field(value) {
        Some(input) => Ok(FieldValue::Number(resolve_sex(&input)?.code())),
        None => Ok(FieldValue::Missing),
    }
}
