//! Common error types for devbench components.

use thiserror::Error;

/// Common error type for devbench operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Inference runtime error (session creation, execution provider registration)
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl From<ort::Error> for Error {
    fn from(err: ort::Error) -> Self {
        Error::Runtime(err.to_string())
    }
}

/// Result type alias using devbench Error.
pub type Result<T> = std::result::Result<T, Error>;
