//! Embeddings service: one compiled model, reused for every call.

use devbench::{Device, WorkspaceConfig};
use std::fs;
use std::time::{Duration, Instant};
use tracing::info;

use crate::encoder::{EncoderLoader, HfEncoderLoader, TextEncoder};
use crate::error::{EmbedError, Result};
use crate::pooling::mean_pool;
use crate::provision::{ensure_present, HubProvisioner, ModelProvisioner, MODEL_FILE, TOKENIZER_FILE};
use crate::runtime::{CompiledModel, ModelCompiler, OrtCompiler};
use crate::similarity::cosine_similarity;
use crate::types::{EmbeddingBatch, ModelInfo};

pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Collaborators used to build an [`EmbeddingService`].
pub struct Components<'a> {
    pub compiler: &'a dyn ModelCompiler,
    pub provisioner: &'a dyn ModelProvisioner,
    pub encoders: &'a dyn EncoderLoader,
}

/// Batch text embeddings and pairwise similarity on one device.
pub struct EmbeddingService {
    model: Box<dyn CompiledModel>,
    encoder: Box<dyn TextEncoder>,
    model_info: ModelInfo,
    load_time: Duration,
}

impl EmbeddingService {
    /// Open `model_name` on `device` with the ONNX Runtime, tokenizers and
    /// HuggingFace Hub implementations.
    pub fn new(workspace: &WorkspaceConfig, model_name: &str, device: Device) -> Result<Self> {
        Self::open(
            workspace,
            model_name,
            device,
            Components {
                compiler: &OrtCompiler::default(),
                provisioner: &HubProvisioner::default(),
                encoders: &HfEncoderLoader::default(),
            },
        )
    }

    /// Ensure the converted model exists, then compile it and load its
    /// tokenizer once.
    pub fn open(
        workspace: &WorkspaceConfig,
        model_name: &str,
        device: Device,
        components: Components<'_>,
    ) -> Result<Self> {
        info!("Initializing embeddings: model={} device={}", model_name, device);

        fs::create_dir_all(workspace.embedding_models_dir())?;

        let model_dir = workspace.embedding_model_dir(model_name);
        ensure_present(&model_dir, model_name, components.provisioner)?;

        info!("Loading model on {}...", device);
        let start = Instant::now();
        let model = components
            .compiler
            .compile(&model_dir.join(MODEL_FILE), &device)?;
        let load_time = start.elapsed();
        info!("Loaded in {:.2}s", load_time.as_secs_f64());

        let encoder = components.encoders.load(&model_dir.join(TOKENIZER_FILE))?;
        let max_sequence_length = encoder.max_length();

        Ok(Self {
            model,
            encoder,
            model_info: ModelInfo {
                name: model_name.to_string(),
                device,
                model_dir,
                max_sequence_length,
            },
            load_time,
        })
    }

    pub fn model_info(&self) -> &ModelInfo {
        &self.model_info
    }

    pub fn device(&self) -> &Device {
        &self.model_info.device
    }

    /// Time spent compiling the model for the device.
    pub fn load_time(&self) -> Duration {
        self.load_time
    }

    /// Embed a batch of texts in one inference call.
    pub fn embed(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        if texts.is_empty() {
            return Err(EmbedError::InvalidInput("empty input".to_string()));
        }

        let batch = self.encoder.encode_batch(texts)?;

        let start = Instant::now();
        let hidden = self.model.infer(&batch)?;
        let elapsed = start.elapsed().as_secs_f64();

        let embeddings = mean_pool(hidden.view(), batch.attention_mask.view())?;
        if embeddings.len() != texts.len() {
            return Err(EmbedError::Inference(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        let inference_ms = elapsed * 1000.0;
        if elapsed > 0.0 {
            info!(
                "Inference: {:.1}ms for {} texts ({:.1} texts/s)",
                inference_ms,
                texts.len(),
                texts.len() as f64 / elapsed
            );
        } else {
            info!("Inference: {:.1}ms for {} texts", inference_ms, texts.len());
        }

        Ok(EmbeddingBatch {
            embeddings,
            inference_ms,
        })
    }

    /// Cosine similarity of two texts, embedded together.
    pub fn similarity(&self, text1: &str, text2: &str) -> Result<f32> {
        let batch = self.embed(&[text1.to_string(), text2.to_string()])?;
        let [a, b] = batch.embeddings.as_slice() else {
            return Err(EmbedError::Inference(
                "expected two embeddings".to_string(),
            ));
        };

        cosine_similarity(a, b).ok_or(EmbedError::ZeroNorm)
    }
}
