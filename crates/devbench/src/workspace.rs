//! Workspace layout for model artifacts.
//!
//! ```text
//! <root>/
//! ├── tinyllama-npu/          # generation model (model.onnx + tokenizer.json)
//! └── models/
//!     └── all-MiniLM-L6-v2-onnx/   # converted embedding model
//! ```
//!
//! Library code takes a [`WorkspaceConfig`] explicitly. Only binaries call
//! [`WorkspaceConfig::discover`], which reads the environment.

use std::path::{Path, PathBuf};

/// Environment variable overriding the workspace root.
pub const WORKSPACE_ENV: &str = "DEVBENCH_WORKSPACE";

/// Shared OpenClaw workspace variable, checked after [`WORKSPACE_ENV`].
pub const OPENCLAW_WORKSPACE_ENV: &str = "OPENCLAW_WORKSPACE";

/// Suffix marking a converted embedding model directory.
pub const CONVERTED_SUFFIX: &str = "-onnx";

/// Where model artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
}

impl WorkspaceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the workspace root.
    ///
    /// Checks in order:
    /// 1. Explicit path (if provided)
    /// 2. `$DEVBENCH_WORKSPACE`
    /// 3. `$OPENCLAW_WORKSPACE`
    /// 4. `~/.openclaw/workspace`
    ///
    /// The directory does not need to exist yet.
    pub fn discover(explicit_path: Option<&Path>) -> crate::Result<Self> {
        if let Some(p) = explicit_path {
            return Ok(Self::new(p));
        }

        for var in [WORKSPACE_ENV, OPENCLAW_WORKSPACE_ENV] {
            if let Some(value) = std::env::var_os(var) {
                if !value.is_empty() {
                    return Ok(Self::new(value));
                }
            }
        }

        home_dir()
            .map(|home| Self::new(home.join(".openclaw").join("workspace")))
            .ok_or_else(|| {
                crate::Error::Config(format!(
                    "cannot resolve workspace: pass --workspace or set ${}",
                    WORKSPACE_ENV
                ))
            })
    }

    /// Directory of a pre-converted generation model.
    pub fn generation_model_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Parent directory of all converted embedding models.
    pub fn embedding_models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Directory of one converted embedding model.
    pub fn embedding_model_dir(&self, name: &str) -> PathBuf {
        self.embedding_models_dir()
            .join(format!("{}{}", name, CONVERTED_SUFFIX))
    }
}

/// Cross-platform home directory lookup without pulling in a heavy dep.
fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        std::env::var_os("HOME").map(PathBuf::from)
    }
    #[cfg(windows)]
    {
        std::env::var_os("USERPROFILE").map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspaceConfig::discover(Some(dir.path())).unwrap();
        assert_eq!(ws.root, dir.path());
    }

    #[test]
    fn test_generation_model_dir() {
        let ws = WorkspaceConfig::new("/srv/ws");
        assert_eq!(
            ws.generation_model_dir("tinyllama-npu"),
            PathBuf::from("/srv/ws/tinyllama-npu")
        );
    }

    #[test]
    fn test_embedding_model_dir_is_suffixed() {
        let ws = WorkspaceConfig::new("/srv/ws");
        assert_eq!(
            ws.embedding_model_dir("all-MiniLM-L6-v2"),
            PathBuf::from("/srv/ws/models/all-MiniLM-L6-v2-onnx")
        );
        assert!(ws
            .embedding_model_dir("x")
            .starts_with(ws.embedding_models_dir()));
    }
}
