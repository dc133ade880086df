//! Named numeric feature matrix.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Row-major feature matrix with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<&'static str>,
    values: Array2<f64>,
}

impl FeatureFrame {
    /// Pair column names with a matrix.
    ///
    /// Returns `None` if the number of names differs from the column count.
    #[must_use]
    pub fn new(columns: Vec<&'static str>, values: Array2<f64>) -> Option<Self> {
        (columns.len() == values.ncols()).then_some(Self { columns, values })
    }

    #[must_use]
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Values of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let idx = self.columns.iter().position(|c| *c == name)?;
        Some(self.values.column(idx))
    }
}
