use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use devbench::Device;

/// Information about the loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub device: Device,
    pub model_dir: PathBuf,
    pub max_sequence_length: usize,
}

/// Result of one batched embedding call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingBatch {
    /// One vector per input text, in input order
    pub embeddings: Vec<Vec<f32>>,
    pub inference_ms: f64,
}

impl EmbeddingBatch {
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Vector dimensionality, 0 for an empty batch.
    pub fn dimensions(&self) -> usize {
        self.embeddings.first().map(Vec::len).unwrap_or(0)
    }
}
