//! System memory provider
//!
//! Exposes a single `/ram` node backed by `/proc/meminfo`.

use std::fs;
use std::path::PathBuf;

use sj_error::{Result, SensorJsonError};
use tracing::debug;

use crate::constants::{paths, units};
use crate::model::{Hardware, HardwareCategory, HardwareType, Identifier, MonitorSettings, Sensor, SensorType};
use crate::provider::{HardwareProvider, SensorSource};

/// Parse the kB value from a meminfo line like `MemTotal:  16384000 kB`
fn parse_meminfo_value(line: &str) -> Option<u64> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// MemTotal and MemAvailable, in kB
pub fn read_meminfo(contents: &str) -> Option<(u64, u64)> {
    let mut total = None;
    let mut available = None;
    for line in contents.lines() {
        if line.starts_with("MemTotal:") {
            total = parse_meminfo_value(line);
        } else if line.starts_with("MemAvailable:") {
            available = parse_meminfo_value(line);
        }
    }
    Some((total?, available?))
}

/// Refreshes load, used and available memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    path: PathBuf,
}

impl MemorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SensorSource for MemorySource {
    fn refresh(&mut self, sensors: &mut [Sensor]) -> Result<()> {
        let contents = fs::read_to_string(&self.path).map_err(|e| SensorJsonError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let (total_kb, available_kb) = read_meminfo(&contents).ok_or_else(|| {
            SensorJsonError::hardware_read("/ram", "MemTotal or MemAvailable missing")
        })?;

        let used_kb = total_kb.saturating_sub(available_kb);
        let load = if total_kb > 0 {
            Some(used_kb as f32 / total_kb as f32 * 100.0)
        } else {
            None
        };
        let readings = [
            load,
            Some(used_kb as f32 / units::KB_PER_GB),
            Some(available_kb as f32 / units::KB_PER_GB),
        ];
        for (sensor, value) in sensors.iter_mut().zip(readings) {
            sensor.set_value(value);
        }
        Ok(())
    }
}

/// Discovers the generic memory node
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    path: PathBuf,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new(paths::PROC_MEMINFO)
    }
}

impl MemoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HardwareProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn discover(&self, settings: &MonitorSettings) -> Result<Vec<Hardware>> {
        if !settings.is_enabled(HardwareCategory::Ram) {
            return Ok(Vec::new());
        }
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No meminfo, skipping memory node");
            return Ok(Vec::new());
        }

        let mut ram = Hardware::new(
            Identifier::new(["ram"])?,
            "Generic Memory",
            HardwareType::Ram,
            Box::new(MemorySource::new(self.path.clone())),
        );
        ram.add_sensor("Memory", SensorType::Load);
        ram.add_sensor("Used Memory", SensorType::Data);
        ram.add_sensor("Available Memory", SensorType::Data);
        Ok(vec![ram])
    }
}
