//! Sensor tree model
//!
//! Computer → Hardware → SubHardware → Sensor → Parameter. Parents own
//! their children; children refer back to their parent by identifier only.

mod computer;
mod hardware;
mod identifier;
mod sensor;

pub use computer::{Computer, MonitorSettings};
pub use hardware::{Hardware, HardwareCategory, HardwareType};
pub use identifier::{Identifier, SEPARATOR};
pub use sensor::{Parameter, Sensor, SensorType, SensorValue};
