//! Serialized classifier artifacts.
//!
//! Each artifact is a JSON file describing one pre-trained binary classifier.
//! Callers only see `predict` / `predict_proba`; the parameter layout is the
//! versioned serialization contract shipped next to the training pipeline.
//! Artifacts are immutable after load and safe to share across requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CardioError, CardioResult};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Standardization applied before a linear form, captured at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: [f64; FEATURE_COUNT],
    pub std: [f64; FEATURE_COUNT],
}

impl Scaler {
    fn apply(&self, x: &FeatureVector) -> FeatureVector {
        let mut scaled = *x;
        for i in 0..FEATURE_COUNT {
            // A zero std would come from a constant training column; avoid
            // dividing by it.
            let std = if self.std[i] == 0.0 { 1.0 } else { self.std[i] };
            scaled[i] = (x[i] - self.mean[i]) / std;
        }
        scaled
    }
}

/// One node of a serialized decision tree, indexed into a flat node array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Branch left when `x[feature] <= threshold`, right otherwise
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node carrying the class-1 probability of its training leaf
    Leaf { probability: f64 },
}

/// Model parameters, tagged by classifier family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    Logistic {
        weights: [f64; FEATURE_COUNT],
        bias: f64,
        #[serde(default)]
        scaler: Option<Scaler>,
    },
    DecisionTree {
        nodes: Vec<TreeNode>,
    },
    RandomForest {
        trees: Vec<Vec<TreeNode>>,
        #[serde(default)]
        feature_importances: Option<[f64; FEATURE_COUNT]>,
    },
    /// Linear SVM with Platt scaling for probability estimates
    LinearSvm {
        weights: [f64; FEATURE_COUNT],
        bias: f64,
        platt_a: f64,
        platt_b: f64,
        #[serde(default)]
        scaler: Option<Scaler>,
    },
}

/// A named, versioned, pre-trained classifier loaded from durable storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub params: ModelParams,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(weights: &[f64; FEATURE_COUNT], x: &FeatureVector) -> f64 {
    weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum()
}

/// Walk a flat node array from the root, returning the leaf probability.
///
/// Malformed node graphs (dangling indices, cycles, out-of-range feature
/// indices) surface as inference errors rather than panics or hangs.
fn walk_tree(model: &str, nodes: &[TreeNode], x: &FeatureVector) -> CardioResult<f64> {
    let mut index = 0;
    // A well-formed tree never revisits a node; more hops than nodes means a
    // cycle in the serialized graph.
    for _ in 0..=nodes.len() {
        match nodes.get(index) {
            Some(TreeNode::Leaf { probability }) => return Ok(*probability),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                if *feature >= FEATURE_COUNT {
                    return Err(CardioError::inference(
                        model,
                        format!("tree references feature index {feature}, input has {FEATURE_COUNT}"),
                    ));
                }
                index = if x[*feature] <= *threshold { *left } else { *right };
            }
            None => {
                return Err(CardioError::inference(
                    model,
                    format!("tree node index {index} out of bounds"),
                ))
            }
        }
    }
    Err(CardioError::inference(model, "cycle in serialized tree"))
}

impl ModelArtifact {
    /// Probability of class 1 (disease present) for one encoded record
    pub fn predict_proba(&self, x: &FeatureVector) -> CardioResult<f64> {
        match &self.params {
            ModelParams::Logistic {
                weights,
                bias,
                scaler,
            } => {
                let x = scaler.as_ref().map_or(*x, |s| s.apply(x));
                Ok(sigmoid(bias + dot(weights, &x)))
            }
            ModelParams::DecisionTree { nodes } => walk_tree(&self.name, nodes, x),
            ModelParams::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(CardioError::inference(&self.name, "forest has no trees"));
                }
                let mut sum = 0.0;
                for tree in trees {
                    sum += walk_tree(&self.name, tree, x)?;
                }
                Ok(sum / trees.len() as f64)
            }
            ModelParams::LinearSvm {
                weights,
                bias,
                platt_a,
                platt_b,
                scaler,
            } => {
                let x = scaler.as_ref().map_or(*x, |s| s.apply(x));
                let margin = bias + dot(weights, &x);
                Ok(sigmoid(platt_a * margin + platt_b))
            }
        }
    }

    /// Class label for one encoded record: 1 = disease, 0 = no disease
    pub fn predict(&self, x: &FeatureVector) -> CardioResult<u8> {
        match &self.params {
            // The SVM classifies on margin sign; the Platt probability is an
            // estimate layered on top, not the decision rule.
            ModelParams::LinearSvm {
                weights,
                bias,
                scaler,
                ..
            } => {
                let x = scaler.as_ref().map_or(*x, |s| s.apply(x));
                Ok(u8::from(bias + dot(weights, &x) > 0.0))
            }
            _ => Ok(u8::from(self.predict_proba(x)? >= 0.5)),
        }
    }

    /// Feature importances, when the artifact carries them (Random Forest)
    pub fn feature_importances(&self) -> Option<&[f64; FEATURE_COUNT]> {
        match &self.params {
            ModelParams::RandomForest {
                feature_importances,
                ..
            } => feature_importances.as_ref(),
            _ => None,
        }
    }
}
