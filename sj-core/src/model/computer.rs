//! Computer root node
//!
//! The computer is the root of the sensor tree. It is opened once at
//! startup, populating its hardware list from the configured providers, and
//! then lives for the rest of the process.

use serde::{Deserialize, Serialize};
use sj_error::Result;
use tracing::{debug, info, warn};

use crate::model::{Hardware, HardwareCategory, Identifier, Sensor};
use crate::provider::HardwareProvider;
use crate::visitor::Visitor;

/// Per-category monitoring toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub mainboard_enabled: bool,
    pub cpu_enabled: bool,
    pub ram_enabled: bool,
    pub gpu_enabled: bool,
    pub fan_controller_enabled: bool,
    pub hdd_enabled: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            mainboard_enabled: true,
            cpu_enabled: true,
            ram_enabled: true,
            gpu_enabled: true,
            fan_controller_enabled: true,
            hdd_enabled: true,
        }
    }
}

impl MonitorSettings {
    pub fn is_enabled(&self, category: HardwareCategory) -> bool {
        match category {
            HardwareCategory::Mainboard => self.mainboard_enabled,
            HardwareCategory::Cpu => self.cpu_enabled,
            HardwareCategory::Ram => self.ram_enabled,
            HardwareCategory::Gpu => self.gpu_enabled,
            HardwareCategory::FanController => self.fan_controller_enabled,
            HardwareCategory::Hdd => self.hdd_enabled,
        }
    }

    pub fn set_enabled(&mut self, category: HardwareCategory, enabled: bool) {
        let flag = match category {
            HardwareCategory::Mainboard => &mut self.mainboard_enabled,
            HardwareCategory::Cpu => &mut self.cpu_enabled,
            HardwareCategory::Ram => &mut self.ram_enabled,
            HardwareCategory::Gpu => &mut self.gpu_enabled,
            HardwareCategory::FanController => &mut self.fan_controller_enabled,
            HardwareCategory::Hdd => &mut self.hdd_enabled,
        };
        *flag = enabled;
    }
}

/// Root of the sensor tree
#[derive(Debug, Default)]
pub struct Computer {
    settings: MonitorSettings,
    hardware: Vec<Hardware>,
    open: bool,
}

impl Computer {
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            settings,
            hardware: Vec::new(),
            open: false,
        }
    }

    /// Build an already-open computer around existing hardware
    pub fn with_hardware(settings: MonitorSettings, hardware: Vec<Hardware>) -> Self {
        Self {
            settings,
            hardware,
            open: true,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Discover hardware from each provider, in order.
    ///
    /// Does nothing when already open. A provider that fails discovery is
    /// logged and skipped; hardware in disabled categories is dropped.
    pub fn open(&mut self, providers: &[&dyn HardwareProvider]) -> Result<()> {
        if self.open {
            return Ok(());
        }

        for provider in providers {
            let discovered = match provider.discover(&self.settings) {
                Ok(hw) => hw,
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Hardware discovery failed");
                    continue;
                }
            };

            for hw in discovered {
                let category = hw.hardware_type().category();
                if !self.settings.is_enabled(category) {
                    debug!(hardware = %hw.identifier(), ?category, "Skipping disabled category");
                    continue;
                }
                info!(
                    provider = provider.name(),
                    hardware = %hw.identifier(),
                    name = hw.name(),
                    sensors = hw.sensors().len(),
                    sub_hardware = hw.sub_hardware().len(),
                    "Found hardware"
                );
                self.hardware.push(hw);
            }
        }

        info!("Total hardware nodes: {}", self.hardware.len());
        self.open = true;
        Ok(())
    }

    /// Drop all hardware
    pub fn close(&mut self) {
        self.hardware.clear();
        self.open = false;
    }

    /// Top-level hardware, in provider order
    pub fn hardware(&self) -> &[Hardware] {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut [Hardware] {
        &mut self.hardware
    }

    pub fn accept(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_computer(self)
    }

    pub fn traverse(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        for hw in &mut self.hardware {
            hw.accept(visitor)?;
        }
        Ok(())
    }

    pub fn find_hardware(&self, id: &Identifier) -> Option<&Hardware> {
        self.hardware.iter().find_map(|h| h.find_hardware(id))
    }

    pub fn find_sensor(&self, id: &Identifier) -> Option<&Sensor> {
        self.hardware.iter().find_map(|h| h.find_sensor(id))
    }

    /// Follow a sensor's back-reference to its owning hardware
    pub fn owner_of(&self, sensor: &Sensor) -> Option<&Hardware> {
        self.find_hardware(sensor.hardware())
    }
}
