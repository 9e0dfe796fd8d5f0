//! Model registry: loads the fixed classifier set at startup.
//!
//! Loading is one-shot and non-retryable. The service cannot answer anything
//! without its full model set, so a missing or corrupt artifact fails
//! initialization outright; there is no partial-availability mode. After
//! load the registry is immutable and shared read-only across requests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::errors::{CardioError, CardioResult};
use crate::model::ModelArtifact;

/// The fixed model set: logical name and artifact file name
pub const MODEL_SET: [(&str, &str); 4] = [
    ("Decision Tree", "decision_tree.json"),
    ("Random Forest", "random_forest.json"),
    ("Logistic Regression", "logistic_regression.json"),
    ("Support Vector Machine", "svm.json"),
];

/// Optional checksum manifest written by the training pipeline
#[derive(Debug, Deserialize)]
struct ModelManifest {
    /// artifact file name -> expected sha256 (lowercase hex)
    files: BTreeMap<String, String>,
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// In-memory registry of the loaded classifier set.
///
/// Iteration order is the declaration order of [`MODEL_SET`] so panel output
/// is deterministic.
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<(String, ModelArtifact)>,
}

impl ModelRegistry {
    /// Load every artifact in [`MODEL_SET`] from `dir`.
    ///
    /// When `dir/manifest.json` exists, each artifact's sha256 is verified
    /// against it before deserialization; a manifest that omits an artifact
    /// is treated as corrupt.
    pub fn load(dir: &Path) -> CardioResult<Self> {
        let manifest = Self::read_manifest(dir)?;

        let mut models = Vec::with_capacity(MODEL_SET.len());
        for (name, file) in MODEL_SET {
            let path = dir.join(file);
            let bytes = fs::read(&path).map_err(|e| {
                CardioError::model_load(name, format!("cannot read {}: {e}", path.display()))
            })?;

            if let Some(manifest) = &manifest {
                let expected = manifest.files.get(file).ok_or_else(|| {
                    CardioError::model_load(name, format!("manifest has no entry for {file}"))
                })?;
                let actual = hash_bytes(&bytes);
                if &actual != expected {
                    return Err(CardioError::model_load(
                        name,
                        format!("checksum mismatch: manifest {expected}, file {actual}"),
                    ));
                }
            }

            let artifact: ModelArtifact = serde_json::from_slice(&bytes)
                .map_err(|e| CardioError::model_load(name, format!("malformed artifact: {e}")))?;

            tracing::info!(
                model = name,
                version = %artifact.version,
                "loaded classifier artifact"
            );
            models.push((name.to_string(), artifact));
        }

        Ok(Self { models })
    }

    /// Look up one model by its logical name
    pub fn get(&self, name: &str) -> Option<&ModelArtifact> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    /// All loaded models in fixed registry order
    pub fn all(&self) -> impl Iterator<Item = (&str, &ModelArtifact)> {
        self.models.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Logical names of the fixed model set
    pub fn names() -> impl Iterator<Item = &'static str> {
        MODEL_SET.iter().map(|(name, _)| *name)
    }

    fn read_manifest(dir: &Path) -> CardioResult<Option<ModelManifest>> {
        let path = dir.join("manifest.json");
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .map_err(|e| CardioError::model_load("manifest", format!("cannot read manifest: {e}")))?;
        let manifest = serde_json::from_slice(&bytes)
            .map_err(|e| CardioError::model_load("manifest", format!("malformed manifest: {e}")))?;
        Ok(Some(manifest))
    }
}
