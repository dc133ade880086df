//! Prediction result types.
//!
//! Represents the output of the thresholded heart-attack risk classifier.

use serde::{Deserialize, Serialize};

use super::record::RecordId;

/// Decimal places kept in reported probabilities.
pub const PROBABILITY_DECIMALS: i32 = 4;

/// Risk classification for heart-attack risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Probability below the decision threshold
    Low,
    /// Probability at or above the decision threshold
    High,
}

impl RiskLevel {
    /// Risk level for a binary decision.
    #[must_use]
    pub fn from_decision(decision: u8) -> Self {
        if decision == 1 {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Round a probability to the reported precision.
#[must_use]
pub fn round_probability(probability: f64) -> f64 {
    let scale = 10f64.powi(PROBABILITY_DECIMALS);
    (probability * scale).round() / scale
}

/// Format a probability as a percentage with one decimal, e.g. `"42.5%"`.
#[must_use]
pub fn format_percentage(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Full result for a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Caller identifier, or the row position when none was given
    pub id: RecordId,

    /// Binary decision (0 = low risk, 1 = high risk)
    pub prediction: u8,

    /// Positive-class probability rounded to 4 decimals
    pub probability: f64,

    /// Risk classification derived from the decision
    pub risk_level: RiskLevel,

    /// Unrounded probability as a percentage string
    pub risk_percentage: String,

    /// Threshold the decision was made with
    pub threshold_used: f64,
}

impl PredictionResult {
    /// Build a result from a raw probability and the decision made on it.
    #[must_use]
    pub fn new(id: RecordId, probability: f64, decision: u8, threshold: f64) -> Self {
        Self {
            id,
            prediction: decision,
            probability: round_probability(probability),
            risk_level: RiskLevel::from_decision(decision),
            risk_percentage: format_percentage(probability),
            threshold_used: threshold,
        }
    }

    /// Compact batch row for this result.
    #[must_use]
    pub fn to_batch(&self) -> BatchPrediction {
        BatchPrediction {
            id: self.id.clone(),
            prediction: self.prediction,
            probability: self.probability,
        }
    }
}

/// Compact result row returned by batch prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub id: RecordId,
    pub prediction: u8,
    pub probability: f64,
}

/// Read-only description of the loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model family, e.g. `RandomForestClassifier` (`None` until loaded)
    pub model_type: Option<String>,

    /// Where the model artifact is expected
    pub model_path: String,

    /// Threshold in effect (the configured default until loaded)
    pub threshold: f64,

    /// Whether pipeline state has been loaded
    pub is_loaded: bool,

    /// Feature layout label (`None` until loaded)
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_estimators: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// SHA-256 of the model artifact bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_sha256: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<chrono::DateTime<chrono::Utc>>,
}
