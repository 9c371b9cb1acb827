//! Tree visitors
//!
//! [`UpdateVisitor`] is the refresh pass run before every snapshot: it
//! walks the tree depth-first and asks each hardware node to recompute its
//! readings.

use sj_error::Result;
use tracing::debug;

use crate::model::{Computer, Hardware, Parameter, Sensor};

/// Double-dispatch over the five node kinds
pub trait Visitor {
    fn visit_computer(&mut self, computer: &mut Computer) -> Result<()>;
    fn visit_hardware(&mut self, hardware: &mut Hardware) -> Result<()>;
    fn visit_sensor(&mut self, sensor: &mut Sensor) -> Result<()>;
    fn visit_parameter(&mut self, parameter: &mut Parameter) -> Result<()>;
}

/// Refreshes every hardware node, pre-order.
///
/// Sensors and parameters are leaves; they are refreshed by their owning
/// hardware's source. The first failing hardware aborts the pass.
#[derive(Debug, Default)]
pub struct UpdateVisitor {
    updated: usize,
}

impl UpdateVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardware nodes refreshed so far
    pub fn updated(&self) -> usize {
        self.updated
    }
}

impl Visitor for UpdateVisitor {
    fn visit_computer(&mut self, computer: &mut Computer) -> Result<()> {
        computer.traverse(self)?;
        debug!(hardware = self.updated, "Sensor tree refreshed");
        Ok(())
    }

    fn visit_hardware(&mut self, hardware: &mut Hardware) -> Result<()> {
        hardware.update()?;
        self.updated += 1;

        for child in hardware.sub_hardware_mut() {
            child.accept(self)?;
        }
        Ok(())
    }

    fn visit_sensor(&mut self, _sensor: &mut Sensor) -> Result<()> {
        Ok(())
    }

    fn visit_parameter(&mut self, _parameter: &mut Parameter) -> Result<()> {
        Ok(())
    }
}

/// Refresh the whole tree once
pub fn refresh(computer: &mut Computer) -> Result<usize> {
    let mut visitor = UpdateVisitor::new();
    computer.accept(&mut visitor)?;
    Ok(visitor.updated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HardwareType, MonitorSettings, SensorType};
    use crate::provider::MockSensorSource;
    use sj_error::SensorJsonError;

    fn hardware_with(id: &str, source: MockSensorSource) -> Hardware {
        let mut hw = Hardware::new(id.parse().unwrap(), id, HardwareType::Cpu, Box::new(source));
        hw.add_sensor("Core", SensorType::Temperature);
        hw
    }

    fn refreshing_source(value: f32) -> MockSensorSource {
        let mut source = MockSensorSource::new();
        source.expect_refresh().times(1).returning(move |sensors| {
            for sensor in sensors.iter_mut() {
                sensor.set_value(Some(value));
            }
            Ok(())
        });
        source
    }

    #[test]
    fn test_updates_every_hardware_once() {
        let mut board = Hardware::new(
            "/mainboard".parse().unwrap(),
            "Board",
            HardwareType::Mainboard,
            Box::new(refreshing_source(0.0)),
        );
        board.add_sub_hardware(hardware_with("/lpc/nct6798/0", refreshing_source(31.0)));
        let cpu = hardware_with("/intelcpu/0", refreshing_source(45.0));

        let mut computer = Computer::with_hardware(MonitorSettings::default(), vec![board, cpu]);
        let updated = refresh(&mut computer).unwrap();

        assert_eq!(updated, 3);
        assert_eq!(computer.hardware()[1].sensors()[0].value(), Some(45.0));
        assert_eq!(
            computer.hardware()[0].sub_hardware()[0].sensors()[0].value(),
            Some(31.0)
        );
    }

    #[test]
    fn test_failure_aborts_the_pass() {
        let mut failing = MockSensorSource::new();
        failing
            .expect_refresh()
            .times(1)
            .returning(|_| Err(SensorJsonError::hardware_read("/intelcpu/0", "read failed")));

        let mut never = MockSensorSource::new();
        never.expect_refresh().times(0);

        let mut computer = Computer::with_hardware(
            MonitorSettings::default(),
            vec![
                hardware_with("/intelcpu/0", failing),
                hardware_with("/atigpu/0", never),
            ],
        );

        let err = refresh(&mut computer).unwrap_err();
        assert!(err.is_provider_failure());
        assert_eq!(computer.hardware()[1].sensors()[0].value(), None);
    }

    #[test]
    fn test_repeated_refresh_keeps_history_bounded() {
        let mut source = MockSensorSource::new();
        let mut reading = 0.0;
        source.expect_refresh().times(5_000).returning(move |sensors| {
            reading += 1.0;
            for sensor in sensors.iter_mut() {
                sensor.set_value(Some(reading));
            }
            Ok(())
        });

        let mut computer = Computer::with_hardware(
            MonitorSettings::default(),
            vec![hardware_with("/intelcpu/0", source)],
        );
        for _ in 0..5_000 {
            refresh(&mut computer).unwrap();
        }

        let sensor = &computer.hardware()[0].sensors()[0];
        assert_eq!(sensor.value(), Some(5_000.0));
        assert_eq!(sensor.max(), Some(5_000.0));
        // A tight loop spans a few sample intervals at most
        assert!(sensor.history_len() <= 10, "history grew to {}", sensor.history_len());
    }

    #[derive(Default)]
    struct CountingVisitor {
        hardware: usize,
        sensors: usize,
        parameters: usize,
    }

    impl Visitor for CountingVisitor {
        fn visit_computer(&mut self, computer: &mut Computer) -> Result<()> {
            computer.traverse(self)
        }

        fn visit_hardware(&mut self, hardware: &mut Hardware) -> Result<()> {
            self.hardware += 1;
            hardware.traverse(self)
        }

        fn visit_sensor(&mut self, sensor: &mut Sensor) -> Result<()> {
            self.sensors += 1;
            sensor.traverse(self)
        }

        fn visit_parameter(&mut self, _parameter: &mut Parameter) -> Result<()> {
            self.parameters += 1;
            Ok(())
        }
    }

    #[test]
    fn test_traverse_reaches_all_node_kinds() {
        let mut cpu = hardware_with("/intelcpu/0", MockSensorSource::new());
        cpu.sensors_mut()[0].add_parameter("TjMax [°C]", "TjMax temperature", 100.0);
        let mut board = Hardware::new(
            "/mainboard".parse().unwrap(),
            "Board",
            HardwareType::Mainboard,
            Box::new(MockSensorSource::new()),
        );
        board.add_sub_hardware(hardware_with("/lpc/it8728/0", MockSensorSource::new()));

        let mut computer = Computer::with_hardware(MonitorSettings::default(), vec![board, cpu]);
        let mut visitor = CountingVisitor::default();
        computer.accept(&mut visitor).unwrap();

        assert_eq!(visitor.hardware, 3);
        assert_eq!(visitor.sensors, 2);
        assert_eq!(visitor.parameters, 1);
    }
}
