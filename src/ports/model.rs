//! Model port: Trait for a trained probabilistic classifier.
//!
//! The pipeline never looks inside a model. It hands over a numeric feature
//! matrix laid out in the model's training order and gets back the
//! probability of the positive class for each row.

use ndarray::{Array1, ArrayView2};

/// Errors that can occur while loading or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed model artifact: {0}")]
    Malformed(String),

    #[error("Feature count mismatch: model expects {expected}, got {got}")]
    FeatureCount { expected: usize, got: usize },
}

/// Trait for trained binary classifiers.
///
/// Implementations are immutable after loading, so a single instance can
/// serve any number of concurrent prediction calls.
pub trait RiskModel: Send + Sync {
    /// Model family name, e.g. `RandomForestClassifier`.
    fn model_type(&self) -> &str;

    /// Feature names in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive class for every row of `features`.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if the column count does not match
    /// the model's feature count.
    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError>;

    /// Number of ensemble members, when the model is an ensemble.
    fn n_estimators(&self) -> Option<usize> {
        None
    }

    /// Maximum tree depth, when the model is tree-based.
    fn max_depth(&self) -> Option<usize> {
        None
    }
}
