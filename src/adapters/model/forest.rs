//! Random forest classifier evaluated from a JSON tree dump.
//!
//! Each tree is a flat node array rooted at index 0. Split nodes send a row
//! left when `x[feature] <= threshold`, right otherwise; leaves hold the
//! positive-class probability. The forest probability is the mean over trees.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::ports::{ModelError, RiskModel};

/// A single node of a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flat decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check structure against the forest's feature count.
    ///
    /// Children must come after their parent, which rules out cycles and
    /// guarantees every traversal terminates.
    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Malformed(format!("tree {tree_idx} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(ModelError::Malformed(format!(
                            "tree {tree_idx} node {i}: feature {feature} out of range (n_features={n_features})"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Malformed(format!(
                            "tree {tree_idx} node {i}: non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(ModelError::Malformed(format!(
                                "tree {tree_idx} node {i}: invalid child index {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !(0.0..=1.0).contains(value) {
                        return Err(ModelError::Malformed(format!(
                            "tree {tree_idx} node {i}: leaf probability {value} outside [0, 1]"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf probability reached by `row`.
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of split levels on the longest root-to-leaf path.
    fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                let d = depths[i] + 1;
                depths[*left] = d;
                depths[*right] = d;
                max = max.max(d);
            }
        }
        max
    }
}

/// Serialized random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub n_estimators: Option<usize>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    pub trees: Vec<DecisionTree>,
}

/// Random forest classifier ready for inference.
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
    max_depth: Option<usize>,
}

impl RandomForestModel {
    /// Validate an artifact and build the model.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` if the forest is empty, declares an
    /// inconsistent estimator count, or any tree is structurally invalid.
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        let n_features = artifact.feature_names.len();
        if n_features == 0 {
            return Err(ModelError::Malformed("forest declares no features".into()));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::Malformed("forest has no trees".into()));
        }
        if let Some(declared) = artifact.n_estimators {
            if declared != artifact.trees.len() {
                return Err(ModelError::Malformed(format!(
                    "n_estimators is {declared} but {} trees are present",
                    artifact.trees.len()
                )));
            }
        }
        for (i, tree) in artifact.trees.iter().enumerate() {
            tree.validate(i, n_features)?;
        }

        let observed_depth = artifact.trees.iter().map(DecisionTree::depth).max();
        Ok(Self {
            feature_names: artifact.feature_names,
            trees: artifact.trees,
            max_depth: artifact.max_depth.or(observed_depth),
        })
    }
}

impl RiskModel for RandomForestModel {
    fn model_type(&self) -> &str {
        "RandomForestClassifier"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let expected = self.feature_names.len();
        if features.ncols() != expected {
            return Err(ModelError::FeatureCount {
                expected,
                got: features.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        Ok(features
            .axis_iter(Axis(0))
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }

    fn n_estimators(&self) -> Option<usize> {
        Some(self.trees.len())
    }

    fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}
