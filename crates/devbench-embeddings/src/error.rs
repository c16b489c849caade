//! Error types for the embeddings service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("failed to load tokenizer: {0}")]
    TokenizerLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to provision model: {0}")]
    Provision(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("embedding has zero norm, cosine similarity undefined")]
    ZeroNorm,

    #[error(transparent)]
    Core(#[from] devbench::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ort::Error> for EmbedError {
    fn from(err: ort::Error) -> Self {
        EmbedError::Inference(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EmbedError>;
