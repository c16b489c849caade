//! devbench embeddings
//!
//! Sentence embeddings on CPU, GPU or NPU. The converted model is fetched on
//! first use, compiled once for the device, and reused for every call.
//!
//! ```rust,ignore
//! use devbench::{Device, WorkspaceConfig};
//! use devbench_embeddings::EmbeddingService;
//!
//! let workspace = WorkspaceConfig::discover(None)?;
//! let service = EmbeddingService::new(&workspace, "all-MiniLM-L6-v2", Device::Npu)?;
//! let batch = service.embed(&["texto 1".to_string(), "texto 2".to_string()])?;
//! ```

pub mod demo;
pub mod encoder;
pub mod error;
pub mod pooling;
pub mod provision;
pub mod runtime;
pub mod service;
pub mod similarity;
pub mod types;

pub use error::{EmbedError, Result};
pub use service::{Components, EmbeddingService};
pub use types::{EmbeddingBatch, ModelInfo};
