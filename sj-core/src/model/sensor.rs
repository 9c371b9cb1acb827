//! Sensor and parameter nodes
//!
//! Sensors are the leaves that carry readings. Each one keeps its current
//! value, the observed min/max, and a trailing history window. Parameters
//! hang off a sensor and describe how its value is derived.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use sj_error::Result;

use crate::constants::history;
use crate::model::Identifier;
use crate::visitor::Visitor;

/// Kind of quantity a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorType {
    Voltage,     // V
    Clock,       // MHz
    Temperature, // °C
    Load,        // %
    Fan,         // RPM
    Flow,        // L/h
    Control,     // %
    Level,       // %
    Factor,      // 1
    Power,       // W
    Data,        // GB
    SmallData,   // MB
    Throughput,  // B/s
}

impl SensorType {
    /// Name used in the JSON snapshot
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Voltage => "Voltage",
            SensorType::Clock => "Clock",
            SensorType::Temperature => "Temperature",
            SensorType::Load => "Load",
            SensorType::Fan => "Fan",
            SensorType::Flow => "Flow",
            SensorType::Control => "Control",
            SensorType::Level => "Level",
            SensorType::Factor => "Factor",
            SensorType::Power => "Power",
            SensorType::Data => "Data",
            SensorType::SmallData => "SmallData",
            SensorType::Throughput => "Throughput",
        }
    }

    /// Identifier segment, e.g. `temperature` in `/intelcpu/0/temperature/0`
    pub fn segment(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::Voltage => "V",
            SensorType::Clock => "MHz",
            SensorType::Temperature => "°C",
            SensorType::Load | SensorType::Control | SensorType::Level => "%",
            SensorType::Fan => "RPM",
            SensorType::Flow => "L/h",
            SensorType::Factor => "",
            SensorType::Power => "W",
            SensorType::Data => "GB",
            SensorType::SmallData => "MB",
            SensorType::Throughput => "B/s",
        }
    }
}

/// One timestamped history entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorValue {
    pub value: f32,
    pub time: SystemTime,
}

/// Derivation parameter attached to a sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    identifier: Identifier,
    name: String,
    description: String,
    value: f32,
    default_value: f32,
    /// Back-reference to the owning sensor
    sensor: Identifier,
}

impl Parameter {
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default_value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Identifier of the sensor this parameter belongs to
    pub fn sensor(&self) -> &Identifier {
        &self.sensor
    }

    pub fn accept(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_parameter(self)
    }

    pub fn traverse(&mut self, _visitor: &mut dyn Visitor) -> Result<()> {
        Ok(())
    }
}

/// A single reading channel owned by a hardware node
#[derive(Debug, Clone)]
pub struct Sensor {
    identifier: Identifier,
    name: String,
    sensor_type: SensorType,
    index: usize,
    value: Option<f32>,
    min: Option<f32>,
    max: Option<f32>,
    values: VecDeque<SensorValue>,
    /// Readings averaged into the newest history entry
    bucket_count: u32,
    history_window: Duration,
    parameters: Vec<Parameter>,
    /// Back-reference to the owning hardware
    hardware: Identifier,
}

impl Sensor {
    /// Created through `Hardware::add_sensor`, which assigns the index and
    /// the back-reference.
    pub(crate) fn new(
        hardware: &Identifier,
        name: impl Into<String>,
        sensor_type: SensorType,
        index: usize,
    ) -> Self {
        Self {
            identifier: hardware.child(sensor_type.segment()).child(index),
            name: name.into(),
            sensor_type,
            index,
            value: None,
            min: None,
            max: None,
            values: VecDeque::new(),
            bucket_count: 0,
            history_window: history::WINDOW,
            parameters: Vec::new(),
            hardware: hardware.clone(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Position among the owning hardware's sensors of the same type
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn min(&self) -> Option<f32> {
        self.min
    }

    pub fn max(&self) -> Option<f32> {
        self.max
    }

    /// History of past values, oldest first
    pub fn values(&self) -> impl Iterator<Item = &SensorValue> {
        self.values.iter()
    }

    pub fn history_len(&self) -> usize {
        self.values.len()
    }

    pub fn set_history_window(&mut self, window: Duration) {
        self.history_window = window;
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [Parameter] {
        &mut self.parameters
    }

    /// Identifier of the hardware that owns this sensor
    pub fn hardware(&self) -> &Identifier {
        &self.hardware
    }

    /// Repoint the back-reference; the identifier is left unchanged
    pub fn set_hardware(&mut self, hardware: Identifier) {
        self.hardware = hardware;
    }

    /// Store a fresh reading taken now
    pub fn set_value(&mut self, value: Option<f32>) {
        self.record(value, SystemTime::now());
    }

    /// Store a reading taken at `time`. Absent values clear the current
    /// value but leave min/max and history untouched. Readings within one
    /// sample interval of the newest entry are averaged into it.
    pub fn record(&mut self, value: Option<f32>, time: SystemTime) {
        self.value = value;
        let Some(v) = value else { return };
        if v.is_nan() {
            self.value = None;
            return;
        }

        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));

        match self.values.back_mut() {
            // Same sample interval: fold into the newest entry's mean
            Some(last)
                if time
                    .duration_since(last.time)
                    .map_or(true, |d| d < history::SAMPLE_INTERVAL) =>
            {
                self.bucket_count += 1;
                last.value += (v - last.value) / self.bucket_count as f32;
            }
            _ => {
                self.values.push_back(SensorValue { value: v, time });
                self.bucket_count = 1;
            }
        }

        while let Some(oldest) = self.values.front() {
            let expired = time
                .duration_since(oldest.time)
                .map(|age| age > self.history_window)
                .unwrap_or(false);
            if !expired && self.values.len() <= history::MAX_ENTRIES {
                break;
            }
            self.values.pop_front();
        }
    }

    pub fn reset_min(&mut self) {
        self.min = None;
    }

    pub fn reset_max(&mut self) {
        self.max = None;
    }

    /// Attach a derivation parameter
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        default_value: f32,
    ) -> &mut Parameter {
        let name = name.into();
        let segment: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        self.parameters.push(Parameter {
            identifier: self.identifier.child("parameter").child(segment),
            name,
            description: description.into(),
            value: default_value,
            default_value,
            sensor: self.identifier.clone(),
        });
        let last = self.parameters.len() - 1;
        &mut self.parameters[last]
    }

    pub fn accept(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_sensor(self)
    }

    pub fn traverse(&mut self, visitor: &mut dyn Visitor) -> Result<()> {
        for parameter in &mut self.parameters {
            parameter.accept(visitor)?;
        }
        Ok(())
    }
}
