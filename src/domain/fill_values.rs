//! Imputation defaults for binary and ordinal columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::schema::{
    ACTIVITY_DAYS, ALCOHOL, DIABETES, FAMILY_HISTORY, MEDICATION_USE, OBESITY,
    PREVIOUS_HEART_PROBLEMS, SMOKING, STRESS_LEVEL,
};

/// Training-set modes for the columns that had missing values in training data.
pub const DEFAULT_FILL_VALUES: [(&str, f64); 9] = [
    (DIABETES, 1.0),
    (FAMILY_HISTORY, 0.0),
    (SMOKING, 1.0),
    (OBESITY, 0.0),
    (ALCOHOL, 1.0),
    (PREVIOUS_HEART_PROBLEMS, 1.0),
    (MEDICATION_USE, 0.0),
    (STRESS_LEVEL, 5.0),
    (ACTIVITY_DAYS, 3.0),
];

/// Per-column imputation defaults. Immutable once the pipeline is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillValueMap {
    values: BTreeMap<String, f64>,
}

impl FillValueMap {
    /// Built-in training-set modes.
    #[must_use]
    pub fn builtin() -> Self {
        DEFAULT_FILL_VALUES
            .iter()
            .map(|(column, value)| (column.to_string(), *value))
            .collect()
    }

    /// Default for a column, if one is configured.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Number of configured columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over configured columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for FillValueMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FromIterator<(String, f64)> for FillValueMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults() {
        let fill = FillValueMap::builtin();
        assert_eq!(fill.len(), 9);
        assert_eq!(fill.get(DIABETES), Some(1.0));
        assert_eq!(fill.get(STRESS_LEVEL), Some(5.0));
        assert_eq!(fill.get(ACTIVITY_DAYS), Some(3.0));
        assert_eq!(fill.get("Age"), None);
    }

    #[test]
    fn test_json_shape() {
        let fill: FillValueMap =
            serde_json::from_str(r#"{"Smoking": 0.0, "Diet": 1}"#).expect("Should parse");
        assert_eq!(fill.get(SMOKING), Some(0.0));
        assert_eq!(fill.get("Diet"), Some(1.0));
        assert_eq!(fill.get(DIABETES), None);
    }
}
