//! Per-device benchmark results and the summary table.

use devbench::Device;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurements for one device that completed the workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Pipeline construction wall-clock time (seconds)
    pub load_time: f64,
    /// Measured generation wall-clock time (seconds)
    pub gen_time: f64,
    /// Whitespace-delimited words in the output; approximates token count
    pub approx_word_count: usize,
    /// `approx_word_count / gen_time`
    pub tokens_per_sec: f64,
    /// Text produced by the measured call
    pub generated: String,
}

impl BenchmarkRecord {
    /// Builds a record, deriving throughput from the word count.
    ///
    /// Returns `None` when `gen_time` is not strictly positive.
    pub fn new(load_time: f64, gen_time: f64, generated: String) -> Option<Self> {
        if !(gen_time > 0.0) {
            return None;
        }
        let approx_word_count = approx_word_count(&generated);
        Some(Self {
            load_time,
            gen_time,
            approx_word_count,
            tokens_per_sec: approx_word_count as f64 / gen_time,
            generated,
        })
    }
}

/// Coarse token estimate: whitespace-separated words.
pub fn approx_word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Phase in which a device failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Load,
    Warmup,
    Measure,
    Metrics,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Load => "load",
            FailureStage::Warmup => "warmup",
            FailureStage::Measure => "measure",
            FailureStage::Metrics => "metrics",
        };
        f.write_str(name)
    }
}

/// Why a device produced no measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFailure {
    pub stage: FailureStage,
    pub error: String,
}

pub type DeviceOutcome = Result<BenchmarkRecord, DeviceFailure>;

/// One device's row in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub device: Device,
    #[serde(with = "outcome_serde")]
    pub outcome: DeviceOutcome,
}

/// Device results in sweep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub entries: Vec<DeviceEntry>,
}

impl BenchmarkReport {
    pub fn push(&mut self, device: Device, outcome: DeviceOutcome) {
        self.entries.push(DeviceEntry { device, outcome });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry recorded for `device`.
    pub fn get(&self, device: &Device) -> Option<&DeviceOutcome> {
        self.entries
            .iter()
            .find(|e| &e.device == device)
            .map(|e| &e.outcome)
    }

    pub fn successes(&self) -> impl Iterator<Item = (&Device, &BenchmarkRecord)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|r| (&e.device, r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Device, &DeviceFailure)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|f| (&e.device, f)))
    }

    /// One line per device, in sweep order.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&summary_line(&entry.device, &entry.outcome));
            out.push('\n');
        }
        out
    }
}

fn summary_line(device: &Device, outcome: &DeviceOutcome) -> String {
    match outcome {
        Ok(r) => format!(
            "{:6}: {:6.2} tokens/s (gen: {:.2}s, load: {:.2}s)",
            device, r.tokens_per_sec, r.gen_time, r.load_time
        ),
        Err(f) => format!("{:6}: ERROR - {}", device, f.error),
    }
}

/// Serializes an outcome as `{"ok": record}` or `{"error": failure}`.
mod outcome_serde {
    use super::{BenchmarkRecord, DeviceFailure, DeviceOutcome};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Tagged {
        Ok(BenchmarkRecord),
        Error(DeviceFailure),
    }

    pub fn serialize<S: Serializer>(outcome: &DeviceOutcome, s: S) -> Result<S::Ok, S::Error> {
        match outcome {
            Ok(r) => Tagged::Ok(r.clone()),
            Err(f) => Tagged::Error(f.clone()),
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DeviceOutcome, D::Error> {
        Ok(match Tagged::deserialize(d)? {
            Tagged::Ok(r) => Ok(r),
            Tagged::Error(f) => Err(f),
        })
    }
}
