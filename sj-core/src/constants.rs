//! Constants and configuration values for sensorjson
//!
//! Centralizes sysfs/procfs paths, unit conversions and the driver tables
//! used to classify hwmon chips.

use std::time::Duration;

/// System paths
pub mod paths {
    /// Base path for hwmon devices
    pub const HWMON_BASE: &str = "/sys/class/hwmon";

    /// Kernel memory statistics
    pub const PROC_MEMINFO: &str = "/proc/meminfo";

    /// DMI board name, used to label the mainboard node
    pub const DMI_BOARD_NAME: &str = "/sys/class/dmi/id/board_name";
}

/// Unit conversion factors for raw hwmon values
pub mod units {
    /// hwmon reports temperatures in millidegrees Celsius
    pub const MILLIDEGREE_DIVISOR: f32 = 1000.0;

    /// hwmon reports voltages in millivolts
    pub const MILLIVOLT_DIVISOR: f32 = 1000.0;

    /// hwmon reports power in microwatts
    pub const MICROWATT_DIVISOR: f32 = 1_000_000.0;

    /// hwmon reports frequencies in Hz, sensors expose MHz
    pub const HZ_PER_MHZ: f32 = 1_000_000.0;

    /// Maximum raw PWM duty cycle value
    pub const PWM_MAX: f32 = 255.0;

    /// /proc/meminfo values are in kB
    pub const KB_PER_GB: f32 = 1024.0 * 1024.0;
}

/// Sensor history retention
pub mod history {
    use super::Duration;

    /// Trailing window of values kept per sensor (24 hours)
    pub const WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

    /// Readings closer together than this are averaged into one entry
    pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

    /// Hard cap on entries per sensor, one per interval over the window
    pub const MAX_ENTRIES: usize = (WINDOW.as_secs() / SAMPLE_INTERVAL.as_secs()) as usize;
}

/// Kernel driver names used to classify hwmon chips
pub mod drivers {
    /// Intel CPU package/core temperatures
    pub const INTEL_CPU: &[&str] = &["coretemp"];

    /// AMD CPU temperatures
    pub const AMD_CPU: &[&str] = &["k10temp", "zenpower", "fam15h_power"];

    /// Other CPU-bound drivers
    pub const OTHER_CPU: &[&str] = &["cpu_thermal", "via_cputemp"];

    pub const ATI_GPU: &[&str] = &["amdgpu", "radeon"];
    pub const NVIDIA_GPU: &[&str] = &["nouveau"];
    pub const INTEL_GPU: &[&str] = &["i915", "xe"];

    /// Storage device temperatures
    pub const STORAGE: &[&str] = &["nvme", "drivetemp"];

    /// DIMM temperature sensors
    pub const RAM: &[&str] = &["jc42", "spd5118", "ee1004"];

    /// USB/HID fan controllers and AIO pumps
    pub const FAN_CONTROLLER: &[&str] = &[
        "corsaircpro",
        "corsair_psu",
        "nzxt-kraken2",
        "nzxt-kraken3",
        "nzxt-smart2",
        "aquacomputer_d5next",
        "gigabyte_waterforce",
    ];

    /// SuperIO/EC chips found on the LPC bus, matched by prefix since the
    /// driver reports the concrete chip (e.g. `nct6798`, `it8728`)
    pub const SUPERIO_PREFIXES: &[&str] = &[
        "nct6",         // Nuvoton NCT67xx family
        "it8",          // ITE IT87xx SuperIO chips
        "w83",          // Winbond W836xx
        "f718",         // Fintek F718xx
        "f8000",
        "asus-ec-sensors",
        "asus_wmi_sensors",
    ];
}
