//! Execution device identifiers.
//!
//! Device strings follow the OpenVINO naming used by the runtime's execution
//! provider (`CPU`, `GPU`, `NPU`, `GPU.1`, `AUTO:NPU,CPU`, ...).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An execution target for inference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Gpu,
    Npu,
    /// Any other runtime device string, kept verbatim.
    Other(String),
}

impl Device {
    /// Devices benchmarked when none are given, in report order.
    pub const DEFAULT_SWEEP: [Device; 3] = [Device::Cpu, Device::Gpu, Device::Npu];

    /// The device string handed to the runtime.
    pub fn as_str(&self) -> &str {
        match self {
            Device::Cpu => "CPU",
            Device::Gpu => "GPU",
            Device::Npu => "NPU",
            Device::Other(name) => name,
        }
    }

    /// Parse a comma-separated device list, e.g. `CPU,GPU,NPU`.
    pub fn parse_list(list: &str) -> Result<Vec<Device>, Error> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Device::from_str)
            .collect()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers like {:6} line up in reports
        f.pad(self.as_str())
    }
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Config("empty device name".to_string()));
        }

        Ok(match trimmed.to_ascii_uppercase().as_str() {
            "CPU" => Device::Cpu,
            "GPU" => Device::Gpu,
            "NPU" => Device::Npu,
            _ => Device::Other(trimmed.to_string()),
        })
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
