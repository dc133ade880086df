//! Model artifact adapter: Loads a trained classifier from disk.
//!
//! Artifacts are JSON documents tagged by `kind`:
//!
//! ```json
//! {"kind": "random_forest", "feature_names": [...], "max_depth": 8, "trees": [...]}
//! {"kind": "logistic_regression", "feature_names": [...], "coefficients": [...], "intercept": -1.2}
//! ```
//!
//! The artifact is produced by the training process and is read-only here.

mod forest;
mod logistic;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ports::{ModelError, RiskModel};

pub use forest::{DecisionTree, ForestArtifact, RandomForestModel, TreeNode};
pub use logistic::{LogisticArtifact, LogisticModel};

/// Serialized model, tagged by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(ForestArtifact),
    LogisticRegression(LogisticArtifact),
}

impl ModelArtifact {
    /// Validate and build the runtime model.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` if the artifact fails validation.
    pub fn into_model(self) -> Result<Box<dyn RiskModel>, ModelError> {
        Ok(match self {
            Self::RandomForest(a) => Box::new(RandomForestModel::from_artifact(a)?),
            Self::LogisticRegression(a) => Box::new(LogisticModel::from_artifact(a)?),
        })
    }
}

/// A model loaded from disk along with its provenance.
pub struct LoadedModel {
    pub model: Box<dyn RiskModel>,
    pub path: PathBuf,
    /// SHA-256 hex digest of the artifact bytes
    pub sha256: String,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model_type", &self.model.model_type())
            .field("path", &self.path)
            .field("sha256", &self.sha256)
            .finish()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Load and validate a model artifact.
///
/// # Errors
/// Returns `ModelError::NotFound` if the file does not exist, `Io` if it
/// cannot be read, and `Malformed` if it does not parse or validate.
pub fn load_model(path: &Path) -> Result<LoadedModel, ModelError> {
    tracing::info!("Loading model from {:?}", path);

    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|e| ModelError::Malformed(e.to_string()))?;
    let model = artifact.into_model()?;

    tracing::info!(
        "Loaded {} from {:?} (n_features={}, n_estimators={:?})",
        model.model_type(),
        path,
        model.feature_names().len(),
        model.n_estimators()
    );

    Ok(LoadedModel {
        model,
        path: path.to_path_buf(),
        sha256: sha256_hex(&bytes),
    })
}
