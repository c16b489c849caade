//! Making sure a converted embedding model exists on disk.
//!
//! Artifacts are written into a staging directory next to the target and
//! renamed into place, so the target directory is either absent or
//! complete. When two processes provision the same model at once, the
//! first rename wins and the other discards its staging copy.

use hf_hub::api::sync::ApiBuilder;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{EmbedError, Result};

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Default HuggingFace organization for sentence-transformer models
pub const DEFAULT_ORGANIZATION: &str = "sentence-transformers";

/// Writes `model.onnx` and `tokenizer.json` for `model_name` into `staging_dir`.
pub trait ModelProvisioner {
    fn provision(&self, model_name: &str, staging_dir: &Path) -> Result<()>;
}

/// Fetches the ONNX export published alongside a HuggingFace model.
#[derive(Debug, Clone)]
pub struct HubProvisioner {
    pub organization: String,
    pub token: Option<String>,
}

impl Default for HubProvisioner {
    fn default() -> Self {
        Self {
            organization: DEFAULT_ORGANIZATION.to_string(),
            token: None,
        }
    }
}

impl HubProvisioner {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn repo_id(&self, model_name: &str) -> String {
        format!("{}/{}", self.organization, model_name)
    }
}

impl ModelProvisioner for HubProvisioner {
    fn provision(&self, model_name: &str, staging_dir: &Path) -> Result<()> {
        let repo_id = self.repo_id(model_name);
        info!("Downloading {} from HuggingFace", repo_id);

        let api = ApiBuilder::new()
            .with_token(self.token.clone())
            .build()
            .map_err(|e| EmbedError::Provision(format!("{}: {}", repo_id, e)))?;
        let repo = api.model(repo_id.clone());

        for (remote, local) in [("onnx/model.onnx", MODEL_FILE), ("tokenizer.json", TOKENIZER_FILE)] {
            let cached = repo
                .get(remote)
                .map_err(|e| EmbedError::Provision(format!("{}/{}: {}", repo_id, remote, e)))?;
            fs::copy(&cached, staging_dir.join(local))?;
        }

        info!("Fetched {} artifacts", repo_id);
        Ok(())
    }
}

/// Whether `dir` holds a usable converted model.
pub fn is_complete(dir: &Path) -> bool {
    dir.join(MODEL_FILE).is_file() && dir.join(TOKENIZER_FILE).is_file()
}

/// Provision `model_name` into `dir` unless it is already there.
///
/// Returns `true` if this call produced the artifacts.
pub fn ensure_present(dir: &Path, model_name: &str, provisioner: &dyn ModelProvisioner) -> Result<bool> {
    if is_complete(dir) {
        return Ok(false);
    }
    if dir.exists() {
        return Err(EmbedError::Provision(format!(
            "{} exists but is missing {} or {}; remove it to re-provision",
            dir.display(),
            MODEL_FILE,
            TOKENIZER_FILE
        )));
    }

    let parent = dir.parent().ok_or_else(|| {
        EmbedError::Provision(format!("{} has no parent directory", dir.display()))
    })?;
    fs::create_dir_all(parent)?;

    info!("Provisioning {} into {}", model_name, dir.display());

    // Dropped on every early return, taking partial downloads with it
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(parent)?;

    provisioner.provision(model_name, staging.path())?;

    if !is_complete(staging.path()) {
        return Err(EmbedError::Provision(format!(
            "provisioner did not produce {} and {}",
            MODEL_FILE, TOKENIZER_FILE
        )));
    }

    match fs::rename(staging.path(), dir) {
        Ok(()) => {
            info!("Model saved to {}", dir.display());
            Ok(true)
        }
        Err(e) if is_complete(dir) => {
            warn!(
                "{} was provisioned concurrently, discarding staged copy ({})",
                dir.display(),
                e
            );
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_id() {
        let p = HubProvisioner::default();
        assert_eq!(p.repo_id("all-MiniLM-L6-v2"), "sentence-transformers/all-MiniLM-L6-v2");
    }

    #[test]
    fn test_is_complete_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_complete(dir.path()));
        fs::write(dir.path().join(MODEL_FILE), b"onnx").unwrap();
        assert!(!is_complete(dir.path()));
        fs::write(dir.path().join(TOKENIZER_FILE), b"{}").unwrap();
        assert!(is_complete(dir.path()));
    }
}
