//! Error types for text generation and benchmarking.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to load pipeline: {0}")]
    PipelineLoad(String),

    #[error("failed to load tokenizer: {0}")]
    TokenizerLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("measured duration is not positive ({0}s), throughput undefined")]
    DegenerateTiming(f64),

    #[error(transparent)]
    Core(#[from] devbench::Error),
}

impl From<ort::Error> for GenerateError {
    fn from(err: ort::Error) -> Self {
        GenerateError::Inference(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
