//! Schema normalizer: projects records onto the canonical base layout.
//!
//! Steps run in a fixed order; later steps rely on earlier ones:
//! 1. Drop non-feature columns (`id`, `Unnamed: 0`)
//! 2. Encode the sex column
//! 3. Impute missing values for columns with a configured fill value
//! 4. Zero-fill absent base columns (logged once per column, never an error)
//! 5. Project to the 25 base columns in canonical order
//! 6. Coerce every value to `f64`
//!
//! Step 6 is the only hard failure point: a present value that is missing
//! without a fill default, or that is not numeric, is a conversion error.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::domain::schema::{BASE_FEATURES, BASE_FEATURE_COUNT, GENDER, NON_FEATURE_COLUMNS};
use crate::domain::{FeatureFrame, FieldValue, FillValueMap, Record};
use crate::CardioRiskError;

use super::encoder::encode_sex;

/// Normalizer configured with the pipeline's fill values.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    fill_values: FillValueMap,
}

impl SchemaNormalizer {
    #[must_use]
    pub fn new(fill_values: FillValueMap) -> Self {
        Self { fill_values }
    }

    /// Steps 1-6 for one record: the 25 base values in canonical order, plus
    /// the base columns the record lacked.
    ///
    /// Fails with `TypeConversion` if the sex value cannot be encoded or any
    /// base value cannot be coerced to a number.
    fn project(
        &self,
        record: &Record,
    ) -> Result<([f64; BASE_FEATURE_COUNT], Vec<&'static str>), CardioRiskError> {
        let mut record = record.clone();

        for column in NON_FEATURE_COLUMNS {
            record.remove(column);
        }

        if let Some(value) = record.get_mut(GENDER) {
            *value = encode_sex(value)?;
        }

        for (column, fill) in self.fill_values.iter() {
            if let Some(value) = record.get_mut(column) {
                if value.is_missing() {
                    *value = FieldValue::Number(fill);
                }
            }
        }

        let mut absent = Vec::new();
        let mut out = [0.0; BASE_FEATURE_COUNT];
        for (slot, column) in out.iter_mut().zip(BASE_FEATURES) {
            match record.get(column) {
                Some(value) => *slot = coerce(column, value)?,
                None => absent.push(column),
            }
        }
        Ok((out, absent))
    }

    /// Normalize a table of records into an `n x 25` frame.
    ///
    /// Rows are normalized independently. A failing row is reported with its
    /// position plus `row_offset`. Absent columns are logged once per column
    /// for the whole table.
    ///
    /// # Errors
    /// Returns `CardioRiskError::Row` wrapping the first row failure.
    pub fn normalize(
        &self,
        records: &[Record],
        row_offset: usize,
    ) -> Result<FeatureFrame, CardioRiskError> {
        let mut values = Array2::zeros((records.len(), BASE_FEATURE_COUNT));
        let mut absent: BTreeMap<&'static str, usize> = BTreeMap::new();
        for (i, (record, mut row)) in records.iter().zip(values.rows_mut()).enumerate() {
            let (normalized, missing) =
                self.project(record).map_err(|e| e.at_row(row_offset + i))?;
            for column in missing {
                *absent.entry(column).or_default() += 1;
            }
            for (dst, src) in row.iter_mut().zip(normalized) {
                *dst = src;
            }
        }
        warn_absent(absent, records.len());
        Ok(base_frame(values))
    }
}

fn warn_absent(absent: BTreeMap<&'static str, usize>, total: usize) {
    for (column, count) in absent {
        tracing::warn!("Column {column:?} absent in {count} of {total} record(s); filling with 0");
    }
}

/// Wrap an `n x 25` matrix as a base-layout frame.
pub(crate) fn base_frame(values: Array2<f64>) -> FeatureFrame {
    debug_assert_eq!(values.ncols(), BASE_FEATURE_COUNT);
    FeatureFrame::new(BASE_FEATURES.to_vec(), values)
        .unwrap_or_else(|| unreachable!("base matrix always has {BASE_FEATURE_COUNT} columns"))
}

fn conversion_error(column: &str, value: &FieldValue, reason: &str) -> CardioRiskError {
    CardioRiskError::TypeConversion {
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Coerce a single cell to a finite float.
fn coerce(column: &str, value: &FieldValue) -> Result<f64, CardioRiskError> {
    if value.is_missing() {
        return Err(conversion_error(
            column,
            value,
            "value is missing and the column has no fill default",
        ));
    }
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Flag(b) => f64::from(u8::from(*b)),
        FieldValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| conversion_error(column, value, "not a number"))?,
        FieldValue::Missing => f64::NAN,
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err(conversion_error(column, value, "not a finite number"))
    }
}
