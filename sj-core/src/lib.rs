//! sensorjson Core Library
//!
//! Hardware sensor tree for Linux systems, refreshed on demand.
//!
//! # Module Structure
//!
//! - `model/` - Computer, hardware, sensor and parameter nodes
//! - `hw/` - Hardware providers (hwmon, memory)
//! - `provider` - Discovery and refresh seams
//! - `visitor` - Tree traversal and the refresh pass
//!
//! # Example
//!
//! ```no_run
//! use sj_core::{refresh, Computer, HardwareProvider, HwmonProvider, MemoryProvider, MonitorSettings};
//!
//! let mut computer = Computer::new(MonitorSettings::default());
//! let providers: [&dyn HardwareProvider; 2] = [&HwmonProvider::new(), &MemoryProvider::default()];
//! computer.open(&providers).unwrap();
//! refresh(&mut computer).unwrap();
//! ```

pub mod constants;
pub mod hw;
pub mod model;
pub mod provider;
pub mod visitor;

pub use hw::{HwmonProvider, MemoryProvider};
pub use model::{
    Computer, Hardware, HardwareCategory, HardwareType, Identifier, MonitorSettings, Parameter,
    Sensor, SensorType, SensorValue,
};
pub use provider::{HardwareProvider, NullSource, SensorSource};
pub use visitor::{refresh, UpdateVisitor, Visitor};

pub use sj_error::{Result, SensorJsonError};
