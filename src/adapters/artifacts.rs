//! Persisted configuration artifacts: decision threshold and fill values.
//!
//! Both artifacts are optional. A missing or corrupt artifact only degrades
//! accuracy, so loading never fails past this boundary: the built-in default
//! is used and a warning is logged.

use std::path::{Path, PathBuf};

use crate::domain::FillValueMap;

/// Why a persisted artifact could not be used.
#[derive(Debug, thiserror::Error)]
enum ArtifactError {
    #[error("not found")]
    NotFound,

    #[error("unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("out of range: {0}")]
    OutOfRange(f64),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound);
    }
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Store for per-column imputation defaults.
#[derive(Debug, Clone)]
pub struct FillValueStore {
    path: PathBuf,
}

impl FillValueStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted map, falling back to the built-in training modes.
    #[must_use]
    pub fn load(&self) -> FillValueMap {
        match read_json::<FillValueMap>(&self.path) {
            Ok(map) if map.is_empty() => {
                tracing::warn!(
                    "Fill values at {:?} are empty; present-but-missing cells will not be imputed",
                    self.path
                );
                map
            }
            Ok(map) => {
                tracing::info!("Loaded {} fill values from {:?}", map.len(), self.path);
                map
            }
            Err(e) => {
                tracing::warn!(
                    "Fill values at {:?} {e}; using built-in defaults \
                     (imputation may be less accurate)",
                    self.path
                );
                FillValueMap::builtin()
            }
        }
    }
}

/// Store for the persisted decision threshold.
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    path: PathBuf,
    default: f64,
}

impl ThresholdStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, default: f64) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    /// Load the persisted threshold, falling back to the configured default.
    #[must_use]
    pub fn load(&self) -> f64 {
        let loaded = read_json::<f64>(&self.path).and_then(|t| {
            if (0.0..=1.0).contains(&t) {
                Ok(t)
            } else {
                Err(ArtifactError::OutOfRange(t))
            }
        });

        match loaded {
            Ok(t) => {
                tracing::info!("Loaded decision threshold {t} from {:?}", self.path);
                t
            }
            Err(e) => {
                tracing::warn!(
                    "Threshold at {:?} {e}; using default {}",
                    self.path,
                    self.default
                );
                self.default
            }
        }
    }
}
