//! Logistic regression classifier from exported coefficients.

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::ports::{ModelError, RiskModel};

/// Serialized logistic regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Logistic regression ready for inference.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    feature_names: Vec<String>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Validate an artifact and build the model.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` if coefficient and feature counts
    /// differ or any parameter is non-finite.
    pub fn from_artifact(artifact: LogisticArtifact) -> Result<Self, ModelError> {
        let n = artifact.feature_names.len();
        if n == 0 {
            return Err(ModelError::Malformed("model declares no features".into()));
        }
        if artifact.coefficients.len() != n {
            return Err(ModelError::Malformed(format!(
                "{} coefficients for {n} features",
                artifact.coefficients.len()
            )));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|w| !w.is_finite())
        {
            return Err(ModelError::Malformed("non-finite model parameter".into()));
        }

        Ok(Self {
            feature_names: artifact.feature_names,
            coefficients: Array1::from(artifact.coefficients),
            intercept: artifact.intercept,
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl RiskModel for LogisticModel {
    fn model_type(&self) -> &str {
        "LogisticRegression"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if features.ncols() != self.coefficients.len() {
            return Err(ModelError::FeatureCount {
                expected: self.coefficients.len(),
                got: features.ncols(),
            });
        }
        Ok(features
            .dot(&self.coefficients)
            .mapv(|z| sigmoid(z + self.intercept)))
    }
}
