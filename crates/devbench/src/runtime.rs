//! ONNX Runtime sessions bound to an execution device.

use ort::execution_providers::OpenVINOExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{Error, Result};

/// Build a session for `model_file` on `device`.
///
/// The OpenVINO execution provider is registered with `error_on_failure`, so
/// a device that is missing or lacks a driver is reported as an error rather
/// than silently running on the default CPU provider.
///
/// `num_threads` of 0 lets the runtime decide.
pub fn session_for_device(
    model_file: impl AsRef<Path>,
    device: &Device,
    num_threads: usize,
) -> Result<Session> {
    let model_file = model_file.as_ref();
    if !model_file.exists() {
        return Err(Error::Config(format!(
            "model file not found: {}",
            model_file.display()
        )));
    }

    debug!(
        "Building session for {} on {}",
        model_file.display(),
        device
    );

    let provider = OpenVINOExecutionProvider::default()
        .with_device_type(device.as_str())
        .build()
        .error_on_failure();

    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers([provider])?;

    if num_threads > 0 {
        builder = builder.with_intra_threads(num_threads)?;
    }

    let session = builder.commit_from_file(model_file)?;

    info!("Compiled {} for {}", model_file.display(), device);
    Ok(session)
}

/// Whether a loaded session declares an input called `name`.
pub fn has_input(session: &Session, name: &str) -> bool {
    session.inputs.iter().any(|input| input.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = session_for_device(dir.path().join("model.onnx"), &Device::Cpu, 0);
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("model file not found")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }
}
