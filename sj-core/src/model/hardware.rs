//! Hardware nodes
//!
//! A hardware node owns its sensors and optional sub-hardware, and the
//! [`SensorSource`] that knows how to refresh those sensors.

use std::fmt;

use sj_error::Result;
use tracing::trace;

use crate::model::{Identifier, Sensor, SensorType};
use crate::provider::SensorSource;
use crate::visitor::Visitor;

/// Kind of hardware a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareType {
    Mainboard,
    SuperIo,
    Cpu,
    Ram,
    Gpu,
    FanController,
    Hdd,
}

/// Monitoring categories that can be toggled on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareCategory {
    Mainboard,
    Cpu,
    Ram,
    Gpu,
    FanController,
    Hdd,
}

impl HardwareType {
    /// Name used in the JSON snapshot
    pub fn as_str(&self) -> &'static str {
        match self {
            HardwareType::Mainboard => "Mainboard",
            HardwareType::SuperIo => "SuperIO",
            HardwareType::Cpu => "CPU",
            HardwareType::Ram => "RAM",
            HardwareType::Gpu => "GPU",
            HardwareType::FanController => "FanController",
            HardwareType::Hdd => "HDD",
        }
    }

    /// SuperIO chips are only reachable through the mainboard
    pub fn category(&self) -> HardwareCategory {
        match self {
            HardwareType::Mainboard | HardwareType::SuperIo => HardwareCategory::Mainboard,
            HardwareType::Cpu => HardwareCategory::Cpu,
            HardwareType::Ram => HardwareCategory::Ram,
            HardwareType::Gpu => HardwareCategory::Gpu,
            HardwareType::FanController => HardwareCategory::FanController,
            HardwareType::Hdd => HardwareCategory::Hdd,
        }
    }
}

/// Hardware or sub-hardware node in the sensor tree
pub struct Hardware {
    identifier: Identifier,
    name: String,
    hardware_type: HardwareType,
    /// Back-reference to the owning hardware; `None` for top-level nodes
    parent: Option<Identifier>,
    sub_hardware: Vec<Hardware>,
    sensors: Vec<Sensor>,
    source: Box<dyn SensorSource>,
}

impl Hardware {
    pub fn new(
        identifier: Identifier,
        name: impl Into<String>,
        hardware_type: HardwareType,
        source: Box<dyn SensorSource>,
    ) -> Self {
        Self {
            identifier,
            name: name.into(),
            hardware_type,
            parent: None,
            sub_hardware: Vec::new(),
            sensors: Vec::new(),
            source,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hardware_type(&self) -> HardwareType {
        self.hardware_type
    }

    /// Identifier of the owning hardware, if this is sub-hardware
    pub fn parent(&self) -> Option<&Identifier> {
        self.parent.as_ref()
    }

    /// Repoint the back-reference. `add_sub_hardware` keeps it consistent;
    /// this is for providers that assemble nodes out of order.
    pub fn set_parent(&mut self, parent: Option<Identifier>) {
        self.parent = parent;
    }

    pub fn sub_hardware(&self) -> &[Hardware] {
        &self.sub_hardware
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut [Sensor] {
        &mut self.sensors
    }

    /// Add a sensor; its index counts existing sensors of the same type
    pub fn add_sensor(&mut self, name: impl Into<String>, sensor_type: SensorType) -> &mut Sensor {
        let index = self
            .sensors
            .iter()
            .filter(|s| s.sensor_type() == sensor_type)
            .count();
        self.sensors
            .push(Sensor::new(&self.identifier, name, sensor_type, index));
        let last = self.sensors.len() - 1;
        &mut self.sensors[last]
    }

    /// Take ownership of `child` and point its back-reference here
    pub fn add_sub_hardware(&mut self, mut child: Hardware) {
        child.parent = Some(self.identifier.clone());
        self.sub_hardware.push(child);
    }

    /// Recompute this node's sensor values. Sub-hardware is not touched.
    pub fn update(&mut self) -> Result<()> {
        trace!(hardware = %self.identifier, sensors = self.sensors.len(), "Refreshing hardware");
        self.source.refresh(&mut self.sensors)
    }

    pub fn accept(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_hardware(self)
    }

    /// Visit sensors, then sub-hardware
    pub fn traverse(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        for sensor in &mut self.sensors {
            sensor.accept(visitor)?;
        }
        for child in &mut self.sub_hardware {
            child.accept(visitor)?;
        }
        Ok(())
    }

    pub fn sub_hardware_mut(&mut self) -> &mut [Hardware] {
        &mut self.sub_hardware
    }

    /// Find a node by identifier in this subtree
    pub fn find_hardware(&self, id: &Identifier) -> Option<&Hardware> {
        if &self.identifier == id {
            return Some(self);
        }
        self.sub_hardware.iter().find_map(|h| h.find_hardware(id))
    }

    /// Find a sensor by identifier in this subtree
    pub fn find_sensor(&self, id: &Identifier) -> Option<&Sensor> {
        self.sensors
            .iter()
            .find(|s| s.identifier() == id)
            .or_else(|| self.sub_hardware.iter().find_map(|h| h.find_sensor(id)))
    }
}

impl fmt::Debug for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hardware")
            .field("identifier", &self.identifier)
            .field("name", &self.name)
            .field("hardware_type", &self.hardware_type)
            .field("parent", &self.parent)
            .field("sub_hardware", &self.sub_hardware)
            .field("sensors", &self.sensors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NullSource;

    fn hardware(id: &str, kind: HardwareType) -> Hardware {
        Hardware::new(id.parse().unwrap(), id, kind, Box::new(NullSource))
    }

    #[test]
    fn test_sensor_indices_per_type() {
        let mut hw = hardware("/lpc/nct6798/0", HardwareType::SuperIo);
        hw.add_sensor("CPU Core", SensorType::Temperature);
        hw.add_sensor("Fan #1", SensorType::Fan);
        hw.add_sensor("System", SensorType::Temperature);

        let ids: Vec<String> = hw.sensors().iter().map(|s| s.identifier().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "/lpc/nct6798/0/temperature/0",
                "/lpc/nct6798/0/fan/0",
                "/lpc/nct6798/0/temperature/1",
            ]
        );
        assert!(hw.sensors().iter().all(|s| s.hardware() == hw.identifier()));
    }

    #[test]
    fn test_sub_hardware_back_reference() {
        let mut board = hardware("/mainboard", HardwareType::Mainboard);
        board.add_sub_hardware(hardware("/lpc/it8728/0", HardwareType::SuperIo));

        assert!(board.parent().is_none());
        assert_eq!(board.sub_hardware()[0].parent(), Some(board.identifier()));
    }

    #[test]
    fn test_find_in_subtree() {
        let mut board = hardware("/mainboard", HardwareType::Mainboard);
        let mut chip = hardware("/lpc/it8728/0", HardwareType::SuperIo);
        chip.add_sensor("Fan #1", SensorType::Fan);
        board.add_sub_hardware(chip);

        let chip_id: Identifier = "/lpc/it8728/0".parse().unwrap();
        assert_eq!(board.find_hardware(&chip_id).unwrap().name(), "/lpc/it8728/0");
        let fan_id: Identifier = "/lpc/it8728/0/fan/0".parse().unwrap();
        assert_eq!(board.find_sensor(&fan_id).unwrap().name(), "Fan #1");
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(HardwareType::SuperIo.category(), HardwareCategory::Mainboard);
        assert_eq!(HardwareType::Hdd.category(), HardwareCategory::Hdd);
        assert_eq!(HardwareType::SuperIo.as_str(), "SuperIO");
    }
}
