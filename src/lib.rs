//! # Cardiorisk
//!
//! Heart-attack risk inference from a pre-trained tabular classifier.
//!
//! This crate provides:
//! - Schema normalization of loosely shaped patient records
//! - Deterministic feature synthesis for feature-engineered models
//! - Threshold-based decisioning with a persisted cut-off
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (records, feature layout, sex encoding, predictions)
//! - `ports`: Trait definitions for external collaborators (the trained model)
//! - `adapters`: Concrete implementations (JSON model artifacts, persisted
//!   threshold and fill values, CSV tables)
//! - `application`: The inference pipeline and its preprocessing stages

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::InferencePipeline;
pub use config::PipelineConfig;
pub use domain::{BatchPrediction, FieldValue, PredictionResult, Record, RecordId, RiskLevel};

/// Result type for Cardiorisk operations
pub type Result<T> = std::result::Result<T, CardioRiskError>;

/// Main error type for Cardiorisk
///
/// Only conditions a caller must act on are represented here. Missing
/// threshold or fill-value artifacts and absent input columns are absorbed
/// inside the pipeline and only show up in logs.
#[derive(Debug, thiserror::Error)]
pub enum CardioRiskError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// `value` holds the offending cell. It is never part of the message.
    #[error("Cannot convert column '{column}' to a number: {reason}")]
    TypeConversion {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<CardioRiskError>,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Table error: {0}")]
    Table(#[from] csv::Error),
}

impl From<ports::ModelError> for CardioRiskError {
    fn from(e: ports::ModelError) -> Self {
        Self::ModelUnavailable(e.to_string())
    }
}

impl CardioRiskError {
    /// Whether this error means the service cannot classify anything yet.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::ModelUnavailable(_) => true,
            Self::Row { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }

    pub(crate) fn at_row(self, row: usize) -> Self {
        Self::Row {
            row,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_message_omits_value() {
        let err = CardioRiskError::TypeConversion {
            column: "Diet".to_string(),
            value: "\"patient-secret-diet\"".to_string(),
            reason: "not a number".to_string(),
        }
        .at_row(4);

        let message = format!("{err}");
        assert!(message.contains("Row 4"));
        assert!(message.contains("'Diet'"));
        assert!(!message.contains("patient-secret-diet"));
    }

    #[test]
    fn test_unavailable_through_row() {
        let err = CardioRiskError::ModelUnavailable("gone".to_string()).at_row(2);
        assert!(err.is_unavailable());
        assert!(!CardioRiskError::Validation("bad".to_string()).is_unavailable());
    }
}
