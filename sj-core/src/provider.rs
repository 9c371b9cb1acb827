//! Sensor provider seams
//!
//! A [`HardwareProvider`] discovers hardware once, when the computer is
//! opened. Every discovered node carries a [`SensorSource`] that refreshes
//! its sensors on demand.

use sj_error::Result;

use crate::model::{Hardware, MonitorSettings, Sensor};

/// Refreshes the sensors owned by one hardware node
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource: Send {
    /// Write current readings into `sensors`, in the order the provider
    /// created them. A sensor that cannot be read gets an absent value;
    /// an `Err` means the whole device is unavailable.
    fn refresh(&mut self, sensors: &mut [Sensor]) -> Result<()>;
}

/// Discovers hardware for the categories enabled in `settings`
pub trait HardwareProvider {
    /// Short name for logs
    fn name(&self) -> &str;

    fn discover(&self, settings: &MonitorSettings) -> Result<Vec<Hardware>>;
}

/// Source for nodes whose readings live entirely in their sub-hardware
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

impl SensorSource for NullSource {
    fn refresh(&mut self, _sensors: &mut [Sensor]) -> Result<()> {
        Ok(())
    }
}
