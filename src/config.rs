//! Pipeline configuration.
//!
//! Defaults point at the artifacts written by the training process under
//! `models/`. Every path and the fallback threshold can be overridden through
//! `CARDIORISK_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::CardioRiskError;

/// Threshold chosen for F1 during training; intentionally not 0.5.
pub const DEFAULT_THRESHOLD: f64 = 0.40;

/// Rows scored per chunk in batch prediction.
pub const DEFAULT_BATCH_CHUNK_SIZE: usize = 1024;

pub const MODELS_DIR_ENV: &str = "CARDIORISK_MODELS_DIR";
pub const MODEL_PATH_ENV: &str = "CARDIORISK_MODEL_PATH";
pub const THRESHOLD_PATH_ENV: &str = "CARDIORISK_THRESHOLD_PATH";
pub const FILL_VALUES_PATH_ENV: &str = "CARDIORISK_FILL_VALUES_PATH";
pub const DEFAULT_THRESHOLD_ENV: &str = "CARDIORISK_DEFAULT_THRESHOLD";
pub const BATCH_CHUNK_SIZE_ENV: &str = "CARDIORISK_BATCH_CHUNK_SIZE";

const MODEL_FILE: &str = "model_v2.json";
const THRESHOLD_FILE: &str = "threshold_v2.json";
const FILL_VALUES_FILE: &str = "fill_values.json";

/// Where pipeline artifacts live and how batches are processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub model_path: PathBuf,
    pub threshold_path: PathBuf,
    pub fill_values_path: PathBuf,
    /// Used when no valid persisted threshold exists
    pub default_threshold: f64,
    pub batch_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_models_dir("models")
    }
}

impl PipelineConfig {
    /// Configuration with the standard artifact names inside `dir`.
    #[must_use]
    pub fn with_models_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model_path: dir.join(MODEL_FILE),
            threshold_path: dir.join(THRESHOLD_FILE),
            fill_values_path: dir.join(FILL_VALUES_FILE),
            default_threshold: DEFAULT_THRESHOLD,
            batch_chunk_size: DEFAULT_BATCH_CHUNK_SIZE,
        }
    }

    /// Build from the environment on top of the defaults.
    ///
    /// Unparsable numeric overrides are ignored with a warning.
    ///
    /// # Errors
    /// Returns `CardioRiskError::Validation` if the resulting configuration is
    /// invalid.
    pub fn from_env() -> Result<Self, CardioRiskError> {
        let mut config = match std::env::var(MODELS_DIR_ENV) {
            Ok(dir) => Self::with_models_dir(dir),
            Err(_) => Self::default(),
        };

        if let Ok(p) = std::env::var(MODEL_PATH_ENV) {
            config.model_path = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(THRESHOLD_PATH_ENV) {
            config.threshold_path = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var(FILL_VALUES_PATH_ENV) {
            config.fill_values_path = PathBuf::from(p);
        }
        if let Some(t) = parse_env(DEFAULT_THRESHOLD_ENV) {
            config.default_threshold = t;
        }
        if let Some(n) = parse_env(BATCH_CHUNK_SIZE_ENV) {
            config.batch_chunk_size = n;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants.
    ///
    /// # Errors
    /// Returns `CardioRiskError::Validation` if the default threshold is
    /// outside [0, 1] or the chunk size is zero.
    pub fn validate(&self) -> Result<(), CardioRiskError> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(CardioRiskError::Validation(format!(
                "default threshold {} outside [0, 1]",
                self.default_threshold
            )));
        }
        if self.batch_chunk_size == 0 {
            return Err(CardioRiskError::Validation(
                "batch chunk size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {name}={raw:?}");
            None
        }
    }
}
