//! Compiled embedding models.
//!
//! A model is compiled once per device and reused for every call. Its output
//! is the token-level hidden state `[batch, seq, hidden]`; pooling happens in
//! [`crate::pooling`].

use devbench::runtime::{has_input, session_for_device};
use devbench::Device;
use ndarray::{Array3, Ix3};
use ort::session::Session;
use std::path::Path;
use tracing::debug;

use crate::encoder::EncodedBatch;
use crate::error::{EmbedError, Result};

/// Output name preferred when the model exposes several.
const HIDDEN_STATE_OUTPUT: &str = "last_hidden_state";

/// A model compiled for one device.
pub trait CompiledModel {
    /// Token-level hidden states for the batch.
    fn infer(&self, batch: &EncodedBatch) -> Result<Array3<f32>>;
}

/// Compiles a model file for a device.
pub trait ModelCompiler {
    fn compile(&self, model_file: &Path, device: &Device) -> Result<Box<dyn CompiledModel>>;
}

/// Compiles ONNX models through ONNX Runtime.
#[derive(Debug, Clone, Default)]
pub struct OrtCompiler {
    /// Number of threads for inference (0 = auto)
    pub num_threads: usize,
}

impl ModelCompiler for OrtCompiler {
    fn compile(&self, model_file: &Path, device: &Device) -> Result<Box<dyn CompiledModel>> {
        let session = session_for_device(model_file, device, self.num_threads)
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?;

        // Validate model has expected inputs/outputs
        if !has_input(&session, "input_ids") || !has_input(&session, "attention_mask") {
            return Err(EmbedError::ModelLoad(
                "model should have input_ids and attention_mask inputs".to_string(),
            ));
        }

        let output_name = if session.outputs.iter().any(|o| o.name == HIDDEN_STATE_OUTPUT) {
            HIDDEN_STATE_OUTPUT.to_string()
        } else {
            session
                .outputs
                .first()
                .map(|o| o.name.clone())
                .ok_or_else(|| EmbedError::ModelLoad("model has no outputs".to_string()))?
        };

        let uses_token_type_ids = has_input(&session, "token_type_ids");
        debug!(
            "Embedding model output={}, token_type_ids={}",
            output_name, uses_token_type_ids
        );

        Ok(Box::new(OrtModel {
            session,
            output_name,
            uses_token_type_ids,
        }))
    }
}

/// ONNX Runtime session for a sentence-transformer encoder.
pub struct OrtModel {
    session: Session,
    output_name: String,
    uses_token_type_ids: bool,
}

impl CompiledModel for OrtModel {
    fn infer(&self, batch: &EncodedBatch) -> Result<Array3<f32>> {
        let outputs = if self.uses_token_type_ids {
            self.session.run(ort::inputs! {
                "input_ids" => batch.input_ids.clone(),
                "attention_mask" => batch.attention_mask.clone(),
                "token_type_ids" => batch.token_type_ids.clone(),
            }?)?
        } else {
            self.session.run(ort::inputs! {
                "input_ids" => batch.input_ids.clone(),
                "attention_mask" => batch.attention_mask.clone(),
            }?)?
        };

        let hidden = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            EmbedError::Inference(format!("output {} not found", self.output_name))
        })?;
        let hidden: ndarray::ArrayViewD<f32> = hidden.try_extract_tensor()?;

        let shape = hidden.shape().to_vec();
        let hidden = hidden.into_dimensionality::<Ix3>().map_err(|_| {
            EmbedError::Inference(format!(
                "expected [batch, seq, hidden] output, got shape {:?}",
                shape
            ))
        })?;

        Ok(hidden.to_owned())
    }
}
