//! Multi-device benchmark sweep.
//!
//! Devices run one after another in plan order. Each gets one pipeline load,
//! one untimed warmup call, and one timed generation call. Any failure,
//! including a panic inside the runtime binding, is recorded against that
//! device and the sweep moves on.

use devbench::Device;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use crate::config::GenerationConfig;
use crate::error::{GenerateError, Result};
use crate::pipeline::PipelineLoader;
use crate::report::{BenchmarkRecord, BenchmarkReport, DeviceFailure, DeviceOutcome, FailureStage};

pub const DEFAULT_PROMPT: &str = "Once upon a time, in a land far away";
pub const WARMUP_PROMPT: &str = "test";

/// Characters of generated text shown in the per-device log.
const PREVIEW_CHARS: usize = 200;

/// Monotonic time source, in seconds since an arbitrary origin.
pub trait Clock {
    fn elapsed(&self) -> f64;
}

/// Wall-clock time via [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// What to run, and where.
#[derive(Debug, Clone)]
pub struct BenchmarkPlan {
    /// Devices in report order
    pub devices: Vec<Device>,
    pub prompt: String,
    pub warmup_prompt: String,
    pub model_path: PathBuf,
    pub config: GenerationConfig,
}

impl BenchmarkPlan {
    /// The default sweep: CPU, GPU, NPU with 100 greedy tokens.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            devices: Device::DEFAULT_SWEEP.to_vec(),
            prompt: DEFAULT_PROMPT.to_string(),
            warmup_prompt: WARMUP_PROMPT.to_string(),
            model_path: model_path.into(),
            config: GenerationConfig::greedy(100),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.devices.is_empty() {
            return Err(GenerateError::InvalidConfig(
                "no devices to benchmark".to_string(),
            ));
        }
        self.config.validate()
    }
}

/// Runs the sweep. Always returns exactly one entry per planned device.
pub fn run_benchmark<L, C>(plan: &BenchmarkPlan, loader: &L, clock: &C) -> BenchmarkReport
where
    L: PipelineLoader + ?Sized,
    C: Clock + ?Sized,
{
    let mut report = BenchmarkReport::default();

    for device in &plan.devices {
        info!("{}", "=".repeat(60));
        info!("Device: {}", device);

        let outcome = bench_device(plan, device, loader, clock);
        match &outcome {
            Ok(record) => log_record(record),
            Err(failure) => error!(
                "Error on {} during {}: {}",
                device, failure.stage, failure.error
            ),
        }

        report.push(device.clone(), outcome);
    }

    report
}

fn bench_device<L, C>(plan: &BenchmarkPlan, device: &Device, loader: &L, clock: &C) -> DeviceOutcome
where
    L: PipelineLoader + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.elapsed();
    let mut pipeline = contain(FailureStage::Load, || {
        loader.load(&plan.model_path, device)
    })?;
    let load_time = clock.elapsed() - start;

    info!("Warmup...");
    contain(FailureStage::Warmup, || {
        pipeline.generate(&plan.warmup_prompt, &plan.config)
    })?;

    info!("Measuring...");
    let start = clock.elapsed();
    let generated = contain(FailureStage::Measure, || {
        pipeline.generate(&plan.prompt, &plan.config)
    })?;
    let gen_time = clock.elapsed() - start;

    BenchmarkRecord::new(load_time, gen_time, generated).ok_or_else(|| DeviceFailure {
        stage: FailureStage::Metrics,
        error: GenerateError::DegenerateTiming(gen_time).to_string(),
    })
}

/// Runs one phase, turning errors and panics into a [`DeviceFailure`].
fn contain<T>(stage: FailureStage, f: impl FnOnce() -> Result<T>) -> std::result::Result<T, DeviceFailure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DeviceFailure {
            stage,
            error: e.to_string(),
        }),
        Err(payload) => Err(DeviceFailure {
            stage,
            error: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<no message>".to_string()
    }
}

fn log_record(record: &BenchmarkRecord) {
    info!("Load time: {:.2}s", record.load_time);
    info!("Generation time: {:.2}s", record.gen_time);
    info!("Words generated: {}", record.approx_word_count);
    info!("Throughput: {:.2} tokens/s", record.tokens_per_sec);

    let preview: String = record.generated.chars().take(PREVIEW_CHARS).collect();
    info!("Generated text: {}...", preview);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let plan = BenchmarkPlan::new("/models/tinyllama-npu");
        assert_eq!(plan.devices, vec![Device::Cpu, Device::Gpu, Device::Npu]);
        assert_eq!(plan.prompt, DEFAULT_PROMPT);
        assert_eq!(plan.warmup_prompt, WARMUP_PROMPT);
        assert_eq!(plan.config.max_new_tokens, 100);
        assert!(!plan.config.do_sample);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_empty_device_list_invalid() {
        let mut plan = BenchmarkPlan::new("/m");
        plan.devices.clear();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_contain_error() {
        let result: std::result::Result<(), _> = contain(FailureStage::Warmup, || {
            Err(GenerateError::Inference("bad tensor".to_string()))
        });
        let failure = result.unwrap_err();
        assert_eq!(failure.stage, FailureStage::Warmup);
        assert_eq!(failure.error, "inference failed: bad tensor");
    }

    #[test]
    fn test_contain_panic() {
        let result: std::result::Result<(), _> =
            contain(FailureStage::Load, || panic!("driver exploded"));
        let failure = result.unwrap_err();
        assert_eq!(failure.stage, FailureStage::Load);
        assert_eq!(failure.error, "panicked: driver exploded");
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }
}
