//! Serialized model artifact
//!
//! The artifact is a single JSON document holding the feature order, the
//! preprocessing pipeline and the trained regressor. It is read once at
//! startup; any problem found here is fatal.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::pipeline::Preprocessor;
use super::regressor::Regressor;
use crate::contracts::{CATEGORICAL_FEATURES, FEATURE_NAMES};
use crate::error::ModelLoadError;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/house_price_model.json";

/// On-disk model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub version: String,
    /// Must equal [`FEATURE_NAMES`] exactly
    pub feature_names: Vec<String>,
    pub preprocessor: Preprocessor,
    pub regressor: Regressor,
}

impl ModelArtifact {
    /// Parse an artifact from JSON text without touching the filesystem
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Structural checks; a failing artifact must never serve traffic
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.feature_names.len() != FEATURE_NAMES.len()
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(actual, expected)| actual != expected)
        {
            return Err(ModelLoadError::invalid(format!(
                "feature names {:?} do not match the expected order {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        self.preprocessor
            .validate(&CATEGORICAL_FEATURES)
            .map_err(ModelLoadError::Invalid)?;

        self.regressor
            .validate(self.preprocessor.encoded_width())
            .map_err(ModelLoadError::Invalid)?;

        Ok(())
    }

    pub fn summary(&self, fingerprint: impl Into<String>) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            version: self.version.clone(),
            regressor: self.regressor.kind().to_string(),
            feature_count: self.feature_names.len(),
            encoded_width: self.preprocessor.encoded_width(),
            sha256: fingerprint.into(),
        }
    }
}

/// Descriptive facts about a loaded artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub version: String,
    pub regressor: String,
    pub feature_count: usize,
    pub encoded_width: usize,
    /// Hex SHA-256 of the artifact file
    pub sha256: String,
}

/// Read, parse and validate an artifact file
///
/// Returns the artifact together with the SHA-256 fingerprint of its bytes.
pub fn load_artifact(path: &Path) -> Result<(ModelArtifact, String), ModelLoadError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelLoadError::NotFound(path.to_path_buf())
        } else {
            ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    artifact.validate()?;

    Ok((artifact, fingerprint(&bytes)))
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact_json() -> serde_json::Value {
        let mut columns: Vec<serde_json::Value> =
            (0..11).map(|_| serde_json::json!({"kind": "passthrough"})).collect();
        columns.push(serde_json::json!({
            "kind": "one_hot",
            "categories": ["<1H OCEAN", "INLAND"]
        }));

        serde_json::json!({
            "name": "test-model",
            "version": "0.1.0",
            "feature_names": FEATURE_NAMES,
            "preprocessor": { "columns": columns },
            "regressor": {
                "type": "linear",
                "coefficients": vec![1.0; 13],
                "intercept": 100.0
            }
        })
    }

    #[test]
    fn test_from_json_valid() {
        let artifact = ModelArtifact::from_json(&artifact_json().to_string()).unwrap();
        let summary = artifact.summary("abc");
        assert_eq!(summary.regressor, "linear");
        assert_eq!(summary.feature_count, 12);
        assert_eq!(summary.encoded_width, 13);
    }

    #[test]
    fn test_rejects_reordered_feature_names() {
        let mut json = artifact_json();
        json["feature_names"][0] = serde_json::json!("housing_median_age");
        json["feature_names"][1] = serde_json::json!("median_income");

        let err = ModelArtifact::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Invalid(_)));
    }

    #[test]
    fn test_rejects_width_mismatch() {
        let mut json = artifact_json();
        json["regressor"]["coefficients"] = serde_json::json!(vec![1.0; 12]);

        let err = ModelArtifact::from_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("13"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifact(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95 not json").unwrap();

        let err = load_artifact(file.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Parse { .. }));
    }

    #[test]
    fn test_load_fingerprints_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = artifact_json().to_string();
        file.write_all(body.as_bytes()).unwrap();

        let (artifact, sha) = load_artifact(file.path()).unwrap();
        assert_eq!(artifact.name, "test-model");
        assert_eq!(sha.len(), 64);
        assert_eq!(sha, fingerprint(body.as_bytes()));
    }
}
