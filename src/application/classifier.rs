//! Threshold classifier: turns model probabilities into decisions.

use ndarray::ArrayView2;

use crate::domain::FeatureSet;
use crate::ports::{ModelError, RiskModel};
use crate::CardioRiskError;

/// Binary decision for one probability. The threshold itself counts as high.
#[must_use]
pub fn classify(probability: f64, threshold: f64) -> u8 {
    u8::from(probability >= threshold)
}

/// A loaded model paired with the layout it consumes and its cut-off.
pub struct ThresholdClassifier {
    model: Box<dyn RiskModel>,
    feature_set: FeatureSet,
    threshold: f64,
}

impl std::fmt::Debug for ThresholdClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdClassifier")
            .field("model_type", &self.model.model_type())
            .field("feature_set", &self.feature_set)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl ThresholdClassifier {
    /// Pair a model with a threshold, detecting its feature layout.
    ///
    /// # Errors
    /// Returns `CardioRiskError::ModelUnavailable` if the model's feature
    /// names match neither canonical layout, and `Validation` if the
    /// threshold is outside [0, 1].
    pub fn new(model: Box<dyn RiskModel>, threshold: f64) -> Result<Self, CardioRiskError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CardioRiskError::Validation(format!(
                "threshold {threshold} outside [0, 1]"
            )));
        }
        let feature_set = FeatureSet::detect(model.feature_names()).ok_or_else(|| {
            CardioRiskError::ModelUnavailable(format!(
                "{} expects {} features in an unrecognised layout",
                model.model_type(),
                model.feature_names().len()
            ))
        })?;
        Ok(Self {
            model,
            feature_set,
            threshold,
        })
    }

    #[must_use]
    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    #[must_use]
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every row, returning `(probability, decision)` pairs in order.
    ///
    /// # Errors
    /// Returns `CardioRiskError::ModelUnavailable` if the model rejects the
    /// matrix.
    pub fn score(
        &self,
        features: ArrayView2<'_, f64>,
    ) -> Result<Vec<(f64, u8)>, CardioRiskError> {
        if features.ncols() != self.feature_set.width() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_set.width(),
                got: features.ncols(),
            }
            .into());
        }
        let probabilities = self.model.predict_proba(features)?;
        Ok(probabilities
            .iter()
            .map(|&p| (p, classify(p, self.threshold)))
            .collect())
    }
}
