//! Patient records as they arrive from callers.
//!
//! A record is a loosely shaped mapping from column name to value. Nothing
//! about it is trusted until the normalizer has projected it onto the
//! canonical base layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::ID_COLUMN;

/// A single cell of a patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value (JSON `null`, empty CSV cell, NaN)
    #[default]
    Missing,
    /// Boolean flag, coerced to 1/0
    Flag(bool),
    /// Numeric value
    Number(f64),
    /// Free text (labels, stringified numbers)
    Text(String),
}

impl FieldValue {
    /// Whether this cell should be treated as a missing value.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Parse a raw table cell: empty is missing, numeric text becomes a number.
    #[must_use]
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_nan() => Self::Missing,
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "<missing>"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One row of patient data keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Remove a column, returning its value if it was present.
    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.fields.remove(column)
    }

    /// Value of a column, if the column is present at all.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Mutable access to a column value.
    pub fn get_mut(&mut self, column: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(column)
    }

    /// Caller-supplied identifier, if the record carries a usable one.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.get(ID_COLUMN).and_then(RecordId::from_field)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Identifier attached to a prediction.
///
/// Carried through unchanged from the input when present, otherwise the
/// 0-based row position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integral identifier supplied by the caller
    Integer(i64),
    /// Textual identifier supplied by the caller
    Text(String),
    /// Row position used when the caller supplied none
    Index(usize),
}

impl RecordId {
    fn from_field(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Missing => None,
            FieldValue::Number(n) if n.is_nan() => None,
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Some(Self::Integer(*n as i64))
            }
            FieldValue::Number(n) => Some(Self::Text(n.to_string())),
            FieldValue::Flag(b) => Some(Self::Text(b.to_string())),
            FieldValue::Text(s) => Some(Self::Text(s.clone())),
        }
    }

    /// Identifier for the record at `position`: its own id, or the position.
    #[must_use]
    pub fn for_row(record: &Record, position: usize) -> Self {
        record.id().unwrap_or(Self::Index(position))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}
