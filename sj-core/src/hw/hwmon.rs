//! Linux hwmon sensor provider
//!
//! Walks `/sys/class/hwmon`, classifies each chip by its driver name and
//! exposes its channels as sensors:
//!
//! - **Temperature**: `tempN_input` files (millidegrees Celsius)
//! - **Fan**: `fanN_input` files (RPM)
//! - **Voltage**: `inN_input` files (millivolts)
//! - **Control**: `pwmN` files (0-255 duty cycle, exposed as percent)
//! - **Power**: `powerN_input` / `powerN_average` files (microwatts)
//! - **Clock**: `freqN_input` files (Hz)
//!
//! SuperIO chips and unclassified chips are grouped as sub-hardware of a
//! single mainboard node.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sj_error::{Result, SensorJsonError};
use tracing::{debug, info, trace, warn};

use crate::constants::{drivers, paths, units};
use crate::model::{
    Hardware, HardwareType, Identifier, MonitorSettings, Sensor, SensorType, SEPARATOR,
};
use crate::provider::{HardwareProvider, NullSource, SensorSource};

// ============================================================================
// Channels
// ============================================================================

/// Kind of hwmon attribute file backing a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelKind {
    Temperature,
    Fan,
    Voltage,
    Pwm,
    Power,
    Frequency,
}

impl ChannelKind {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            ChannelKind::Temperature => SensorType::Temperature,
            ChannelKind::Fan => SensorType::Fan,
            ChannelKind::Voltage => SensorType::Voltage,
            ChannelKind::Pwm => SensorType::Control,
            ChannelKind::Power => SensorType::Power,
            ChannelKind::Frequency => SensorType::Clock,
        }
    }

    /// Attribute prefix, also used for `<prefix>N_label` lookup
    fn prefix(&self) -> &'static str {
        match self {
            ChannelKind::Temperature => "temp",
            ChannelKind::Fan => "fan",
            ChannelKind::Voltage => "in",
            ChannelKind::Pwm => "pwm",
            ChannelKind::Power => "power",
            ChannelKind::Frequency => "freq",
        }
    }

    fn default_name(&self, idx: usize) -> String {
        let kind = match self {
            ChannelKind::Temperature => "Temperature",
            ChannelKind::Fan => "Fan",
            ChannelKind::Voltage => "Voltage",
            ChannelKind::Pwm => "Fan Control",
            ChannelKind::Power => "Power",
            ChannelKind::Frequency => "Clock",
        };
        format!("{} #{}", kind, idx)
    }

    /// Convert a raw sysfs integer to the sensor's unit
    pub fn convert(&self, raw: i64) -> f32 {
        let raw = raw as f32;
        match self {
            ChannelKind::Temperature => raw / units::MILLIDEGREE_DIVISOR,
            ChannelKind::Fan => raw,
            ChannelKind::Voltage => raw / units::MILLIVOLT_DIVISOR,
            ChannelKind::Pwm => raw * 100.0 / units::PWM_MAX,
            ChannelKind::Power => raw / units::MICROWATT_DIVISOR,
            ChannelKind::Frequency => raw / units::HZ_PER_MHZ,
        }
    }

    /// Parse an attribute file name into its kind and channel index
    pub fn from_file_name(fname: &str) -> Option<(ChannelKind, usize)> {
        if let Some(idx) = extract_index(fname, "temp", "_input") {
            return Some((ChannelKind::Temperature, idx));
        }
        if let Some(idx) = extract_index(fname, "fan", "_input") {
            return Some((ChannelKind::Fan, idx));
        }
        if let Some(idx) = extract_index(fname, "in", "_input") {
            return Some((ChannelKind::Voltage, idx));
        }
        if fname.starts_with("pwm") && !fname.contains('_') {
            return extract_index(fname, "pwm", "").map(|idx| (ChannelKind::Pwm, idx));
        }
        if let Some(idx) = extract_index(fname, "power", "_input")
            .or_else(|| extract_index(fname, "power", "_average"))
        {
            return Some((ChannelKind::Power, idx));
        }
        if let Some(idx) = extract_index(fname, "freq", "_input") {
            return Some((ChannelKind::Frequency, idx));
        }
        None
    }
}

/// One readable attribute file
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub kind: ChannelKind,
    pub index: usize,
    pub path: PathBuf,
    pub label: Option<String>,
}

impl Channel {
    pub fn name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.kind.default_name(self.index))
    }

    /// Current value, or `None` if the file is unreadable or not a number
    pub fn read(&self) -> Option<f32> {
        let raw = read_trimmed(&self.path).ok()?;
        let value = raw.parse::<i64>().ok()?;
        Some(self.kind.convert(value))
    }
}

/// Scan one chip directory for channels, ordered by kind then index
pub fn scan_channels(dir: &Path) -> Result<Vec<Channel>> {
    let mut channels: Vec<Channel> = Vec::new();

    for entry in fs::read_dir(dir)?.flatten() {
        let fname = entry.file_name();
        let fname = fname.to_string_lossy();
        let Some((kind, index)) = ChannelKind::from_file_name(&fname) else {
            continue;
        };
        // power has both _input and _average on some chips; keep one
        if channels.iter().any(|c| c.kind == kind && c.index == index) {
            continue;
        }
        let label = read_trimmed(dir.join(format!("{}{}_label", kind.prefix(), index)))
            .ok()
            .filter(|l| !l.is_empty());
        channels.push(Channel {
            kind,
            index,
            path: entry.path(),
            label,
        });
    }

    channels.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.index.cmp(&b.index)));
    Ok(channels)
}

/// Channels of one chip, or `None` when the chip should be skipped.
/// An unreadable chip only costs its own node.
fn chip_channels(dir: &Path, driver: &str) -> Option<Vec<Channel>> {
    match scan_channels(dir) {
        Ok(channels) if channels.is_empty() => {
            trace!(driver = %driver, "Skipped {:?} (no useful sensors)", dir);
            None
        }
        Ok(channels) => Some(channels),
        Err(e) => {
            warn!(driver = %driver, error = %e, "Skipped {:?} (unreadable)", dir);
            None
        }
    }
}

// ============================================================================
// Chip classification
// ============================================================================

/// What a chip's driver says about the hardware behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipClass {
    IntelCpu,
    AmdCpu,
    OtherCpu,
    AtiGpu,
    NvidiaGpu,
    IntelGpu,
    Storage,
    Dimm,
    FanController,
    SuperIo,
    Other,
}

impl ChipClass {
    pub fn classify(driver: &str) -> Self {
        let is = |list: &[&str]| list.iter().any(|d| *d == driver);
        if is(drivers::INTEL_CPU) {
            ChipClass::IntelCpu
        } else if is(drivers::AMD_CPU) {
            ChipClass::AmdCpu
        } else if is(drivers::OTHER_CPU) {
            ChipClass::OtherCpu
        } else if is(drivers::ATI_GPU) {
            ChipClass::AtiGpu
        } else if is(drivers::NVIDIA_GPU) {
            ChipClass::NvidiaGpu
        } else if is(drivers::INTEL_GPU) {
            ChipClass::IntelGpu
        } else if is(drivers::STORAGE) {
            ChipClass::Storage
        } else if is(drivers::RAM) {
            ChipClass::Dimm
        } else if is(drivers::FAN_CONTROLLER) {
            ChipClass::FanController
        } else if drivers::SUPERIO_PREFIXES.iter().any(|p| driver.starts_with(p)) {
            ChipClass::SuperIo
        } else {
            ChipClass::Other
        }
    }

    pub fn hardware_type(&self) -> HardwareType {
        match self {
            ChipClass::IntelCpu | ChipClass::AmdCpu | ChipClass::OtherCpu => HardwareType::Cpu,
            ChipClass::AtiGpu | ChipClass::NvidiaGpu | ChipClass::IntelGpu => HardwareType::Gpu,
            ChipClass::Storage => HardwareType::Hdd,
            ChipClass::Dimm => HardwareType::Ram,
            ChipClass::FanController => HardwareType::FanController,
            ChipClass::SuperIo | ChipClass::Other => HardwareType::SuperIo,
        }
    }

    /// Leading identifier segments, before the per-class index
    fn id_prefix(&self, driver: &str) -> Vec<String> {
        let fixed = match self {
            ChipClass::IntelCpu => "intelcpu",
            ChipClass::AmdCpu => "amdcpu",
            ChipClass::OtherCpu => "cpu",
            ChipClass::AtiGpu => "atigpu",
            ChipClass::NvidiaGpu => "nvidiagpu",
            ChipClass::IntelGpu => "intelgpu",
            ChipClass::Storage => "hdd",
            ChipClass::Dimm => "dimm",
            ChipClass::FanController => "fancontroller",
            ChipClass::SuperIo => return vec!["lpc".to_string(), driver.to_string()],
            ChipClass::Other => return vec![driver.to_string()],
        };
        vec![fixed.to_string()]
    }

    fn display_name(&self, driver: &str, index: usize) -> String {
        match self {
            ChipClass::IntelCpu => format!("Intel CPU #{}", index),
            ChipClass::AmdCpu => format!("AMD CPU #{}", index),
            ChipClass::OtherCpu => format!("CPU #{}", index),
            ChipClass::AtiGpu => format!("AMD GPU #{}", index),
            ChipClass::NvidiaGpu => format!("NVIDIA GPU #{}", index),
            ChipClass::IntelGpu => format!("Intel GPU #{}", index),
            ChipClass::Storage => format!("Drive #{}", index),
            ChipClass::Dimm => format!("DIMM #{}", index),
            ChipClass::FanController | ChipClass::SuperIo | ChipClass::Other => {
                driver.to_ascii_uppercase()
            }
        }
    }

    /// Chips that hang below the mainboard rather than the computer
    fn is_board_chip(&self) -> bool {
        matches!(self, ChipClass::SuperIo | ChipClass::Other)
    }
}

// ============================================================================
// Sensor source
// ============================================================================

/// Refreshes a chip's sensors from its sysfs directory
#[derive(Debug, Clone)]
pub struct HwmonSource {
    dir: PathBuf,
    channels: Vec<Channel>,
}

impl HwmonSource {
    pub fn new(dir: PathBuf, channels: Vec<Channel>) -> Self {
        Self { dir, channels }
    }
}

impl SensorSource for HwmonSource {
    fn refresh(&mut self, sensors: &mut [Sensor]) -> Result<()> {
        if !self.dir.is_dir() {
            return Err(SensorJsonError::hardware_read(
                self.dir.display().to_string(),
                "device disappeared",
            ));
        }
        for (channel, sensor) in self.channels.iter().zip(sensors.iter_mut()) {
            let value = channel.read();
            if value.is_none() {
                trace!(path = %channel.path.display(), "Channel unreadable");
            }
            sensor.set_value(value);
        }
        Ok(())
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Discovers hwmon chips under a sysfs root
#[derive(Debug, Clone)]
pub struct HwmonProvider {
    root: PathBuf,
    board_name_path: PathBuf,
}

impl Default for HwmonProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HwmonProvider {
    pub fn new() -> Self {
        Self::with_paths(paths::HWMON_BASE, paths::DMI_BOARD_NAME)
    }

    pub fn with_paths(root: impl Into<PathBuf>, board_name_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            board_name_path: board_name_path.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `hwmonN` directories sorted numerically
    fn chip_dirs(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(it) => it,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(root = %self.root.display(), "No hwmon interface found");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(SensorJsonError::FileRead {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };

        let mut dirs: Vec<(usize, PathBuf)> = Vec::new();
        for ent in entries.flatten() {
            let path = ent.path();
            let fname = ent.file_name();
            let Some(idx) = extract_index(&fname.to_string_lossy(), "hwmon", "") else {
                continue;
            };
            // Resolve to the actual device dir in case of symlink
            let dir = fs::canonicalize(&path).unwrap_or(path);
            if dir.is_dir() {
                dirs.push((idx, dir));
            }
        }
        dirs.sort_by_key(|(idx, _)| *idx);
        Ok(dirs.into_iter().map(|(_, dir)| dir).collect())
    }

    fn board_name(&self) -> String {
        read_trimmed(&self.board_name_path)
            .ok()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Mainboard".to_string())
    }
}

impl HardwareProvider for HwmonProvider {
    fn name(&self) -> &str {
        "hwmon"
    }

    fn discover(&self, settings: &MonitorSettings) -> Result<Vec<Hardware>> {
        debug!("Scanning hwmon chips in {:?}", self.root);

        let mut top_level: Vec<Hardware> = Vec::new();
        let mut board_chips: Vec<Hardware> = Vec::new();
        let mut counters: HashMap<Vec<String>, usize> = HashMap::new();

        for dir in self.chip_dirs()? {
            let driver = read_trimmed(dir.join("name"))
                .ok()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "unknown".into())
                .replace(SEPARATOR, "_");
            let class = ChipClass::classify(&driver);
            let hardware_type = class.hardware_type();

            if !settings.is_enabled(hardware_type.category()) {
                trace!(driver = %driver, "Skipped {:?} (category disabled)", dir);
                continue;
            }

            let Some(channels) = chip_channels(&dir, &driver) else {
                continue;
            };

            let prefix = class.id_prefix(&driver);
            let counter = counters.entry(prefix.clone()).or_insert(0);
            let index = *counter;
            *counter += 1;

            let identifier = Identifier::new(prefix)?.child(index);
            let mut hw = Hardware::new(
                identifier,
                class.display_name(&driver, index),
                hardware_type,
                Box::new(HwmonSource::new(dir.clone(), channels.clone())),
            );
            for channel in &channels {
                hw.add_sensor(channel.name(), channel.kind.sensor_type());
            }

            info!(
                chip = %driver,
                hardware = %hw.identifier(),
                sensors = hw.sensors().len(),
                "Found hwmon chip"
            );

            if class.is_board_chip() {
                board_chips.push(hw);
            } else {
                top_level.push(hw);
            }
        }

        if !board_chips.is_empty() {
            let mut board = Hardware::new(
                Identifier::new(["mainboard"])?,
                self.board_name(),
                HardwareType::Mainboard,
                Box::new(NullSource),
            );
            for chip in board_chips {
                board.add_sub_hardware(chip);
            }
            top_level.insert(0, board);
        }

        info!("Total hwmon hardware nodes: {}", top_level.len());
        Ok(top_level)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.len() >= prefix.len() + suffix.len()
        && fname.starts_with(prefix)
        && fname.ends_with(suffix)
    {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        mid.parse().ok()
    } else {
        None
    }
}
