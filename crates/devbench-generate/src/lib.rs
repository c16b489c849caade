//! devbench text generation
//!
//! Generation pipelines over ONNX Runtime, the multi-device benchmark sweep,
//! and the single-shot smoke test.

pub mod cli;
pub mod config;
pub mod error;
pub mod harness;
pub mod pipeline;
pub mod report;
pub mod sampling;

pub use config::GenerationConfig;
pub use error::{GenerateError, Result};
pub use harness::{run_benchmark, BenchmarkPlan, Clock, SystemClock};
pub use pipeline::{OnnxPipeline, OnnxPipelineLoader, PipelineLoader, TextGenerator};
pub use report::{BenchmarkRecord, BenchmarkReport, DeviceEntry, DeviceFailure, DeviceOutcome, FailureStage};
