//! Text-generation pipelines.
//!
//! [`PipelineLoader`] and [`TextGenerator`] are the seam the benchmark harness
//! and the single-shot tool depend on. [`OnnxPipelineLoader`] is the real
//! implementation: a causal language model exported to ONNX, run through
//! ONNX Runtime on the requested device.
//!
//! Expected model directory layout:
//!
//! ```text
//! tinyllama-npu/
//! ├── model.onnx               # inputs: input_ids, attention_mask[, position_ids]; output: logits
//! ├── tokenizer.json
//! ├── generation_config.json   # optional, eos_token_id
//! └── config.json              # optional, eos_token_id fallback
//! ```

use devbench::runtime::{has_input, session_for_device};
use devbench::Device;
use ndarray::{s, Array2};
use ort::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::error::{GenerateError, Result};
use crate::sampling::select_next_token;

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Token strings tried when no config file names an EOS id.
const EOS_CANDIDATES: &[&str] = &["</s>", "<|endoftext|>", "<eos>", "<|eot_id|>"];

/// A loaded generation pipeline bound to one device.
pub trait TextGenerator {
    /// Generate a continuation of `prompt`. Returns only the new text.
    fn generate(&mut self, prompt: &str, config: &GenerationConfig) -> Result<String>;
}

/// Builds pipelines for a (model, device) pair.
pub trait PipelineLoader {
    fn load(&self, model_path: &Path, device: &Device) -> Result<Box<dyn TextGenerator>>;
}

/// Loads [`OnnxPipeline`]s from a model directory.
#[derive(Debug, Clone, Default)]
pub struct OnnxPipelineLoader {
    /// Number of threads for inference (0 = auto)
    pub num_threads: usize,
}

impl OnnxPipelineLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineLoader for OnnxPipelineLoader {
    fn load(&self, model_path: &Path, device: &Device) -> Result<Box<dyn TextGenerator>> {
        let pipeline = OnnxPipeline::load(model_path, device, self.num_threads)?;
        Ok(Box::new(pipeline))
    }
}

/// Causal LM decoding over an ONNX session.
///
/// Every step runs the full sequence; the exported graph carries no KV cache.
pub struct OnnxPipeline {
    session: Session,
    tokenizer: Tokenizer,
    eos_token_ids: Vec<u32>,
    uses_position_ids: bool,
}

impl OnnxPipeline {
    pub fn load(model_path: &Path, device: &Device, num_threads: usize) -> Result<Self> {
        info!("Loading pipeline from {} on {}", model_path.display(), device);

        if !model_path.is_dir() {
            return Err(GenerateError::PipelineLoad(format!(
                "model directory not found: {}",
                model_path.display()
            )));
        }

        let tokenizer_path = model_path.join(TOKENIZER_FILE);
        if !tokenizer_path.exists() {
            return Err(GenerateError::TokenizerLoad(format!(
                "tokenizer file not found: {}",
                tokenizer_path.display()
            )));
        }
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| GenerateError::TokenizerLoad(e.to_string()))?;

        let session = session_for_device(model_path.join(MODEL_FILE), device, num_threads)
            .map_err(|e| GenerateError::PipelineLoad(e.to_string()))?;

        let uses_position_ids = has_input(&session, "position_ids");
        let eos_token_ids = resolve_eos_ids(model_path, &tokenizer);
        debug!(
            "Pipeline ready: eos={:?}, position_ids={}",
            eos_token_ids, uses_position_ids
        );

        Ok(Self {
            session,
            tokenizer,
            eos_token_ids,
            uses_position_ids,
        })
    }

    /// Logits for the last position of `ids`.
    fn next_token_logits(&self, ids: &[i64]) -> Result<Vec<f32>> {
        let seq_len = ids.len();

        let input_ids = Array2::from_shape_vec((1, seq_len), ids.to_vec()).map_err(|e| {
            GenerateError::Inference(format!("failed to create input_ids tensor: {}", e))
        })?;
        let attention_mask = Array2::<i64>::ones((1, seq_len));

        let outputs = if self.uses_position_ids {
            let position_ids =
                Array2::from_shape_vec((1, seq_len), (0..seq_len as i64).collect()).map_err(
                    |e| GenerateError::Inference(format!("failed to create position_ids tensor: {}", e)),
                )?;
            self.session.run(ort::inputs! {
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "position_ids" => position_ids,
            }?)?
        } else {
            self.session.run(ort::inputs! {
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
            }?)?
        };

        let logits = outputs
            .get("logits")
            .ok_or_else(|| GenerateError::Inference("no logits output found".to_string()))?;
        let logits: ndarray::ArrayViewD<f32> = logits.try_extract_tensor()?;

        let shape = logits.shape().to_vec();
        if shape.len() != 3 || shape[1] == 0 {
            return Err(GenerateError::Inference(format!(
                "unexpected logits shape: {:?}",
                shape
            )));
        }

        Ok(logits
            .slice(s![0, shape[1] - 1, ..])
            .iter()
            .copied()
            .collect())
    }
}

impl TextGenerator for OnnxPipeline {
    fn generate(&mut self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        config.validate()?;

        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| GenerateError::Tokenization(e.to_string()))?;
        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        if ids.is_empty() {
            return Err(GenerateError::Tokenization(
                "prompt produced no tokens".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut generated: Vec<u32> = Vec::with_capacity(config.max_new_tokens);

        for _ in 0..config.max_new_tokens {
            let logits = self.next_token_logits(&ids)?;
            let next = select_next_token(&logits, config, &mut rng)?;
            if self.eos_token_ids.contains(&next) {
                break;
            }
            generated.push(next);
            ids.push(next as i64);
        }

        debug!("Generated {} tokens", generated.len());

        self.tokenizer
            .decode(&generated, true)
            .map_err(|e| GenerateError::Tokenization(e.to_string()))
    }
}

/// EOS ids from `generation_config.json`, then `config.json`, then well-known
/// token strings in the vocabulary.
fn resolve_eos_ids(model_path: &Path, tokenizer: &Tokenizer) -> Vec<u32> {
    for file in ["generation_config.json", "config.json"] {
        let Ok(raw) = std::fs::read_to_string(model_path.join(file)) else {
            continue;
        };
        let Ok(json) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        let ids = parse_eos_ids(&json);
        if !ids.is_empty() {
            return ids;
        }
    }

    EOS_CANDIDATES
        .iter()
        .filter_map(|token| tokenizer.token_to_id(token))
        .collect()
}

/// `eos_token_id` may be a single integer or a list.
pub fn parse_eos_ids(config: &serde_json::Value) -> Vec<u32> {
    match config.get("eos_token_id") {
        Some(serde_json::Value::Number(n)) => n.as_u64().map(|id| vec![id as u32]).unwrap_or_default(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(serde_json::Value::as_u64)
            .map(|id| id as u32)
            .collect(),
        _ => Vec::new(),
    }
}
