//! # devbench shared library
//!
//! Infrastructure shared by the devbench tools:
//! - **error**: common error type
//! - **tracing**: logging setup
//! - **workspace**: on-disk layout for model artifacts
//! - **device**: execution target identifiers
//! - **runtime**: ONNX Runtime sessions bound to a device
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devbench::{Device, WorkspaceConfig};
//!
//! let workspace = WorkspaceConfig::new("/tmp/devbench");
//! let session = devbench::runtime::session_for_device(
//!     workspace.generation_model_dir("tinyllama-npu").join("model.onnx"),
//!     &Device::Npu,
//!     0,
//! )?;
//! ```

pub mod device;
pub mod error;
pub mod runtime;
pub mod tracing;
pub mod workspace;

pub use device::Device;
pub use error::{Error, Result};
pub use workspace::WorkspaceConfig;
