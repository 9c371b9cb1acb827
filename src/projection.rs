/*
 * This file is part of sensorjson.
 *
 * Copyright (C) 2026 sensorjson contributors
 *
 * sensorjson is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * sensorjson is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with sensorjson. If not, see <https://www.gnu.org/licenses/>.
 */

//! Sensor tree projection
//!
//! Turns the live tree into the child-only wire representation. Back-
//! references are read only to check that the tree is well formed; they
//! never reach the output. History and parameters are not part of the
//! allow-list and are dropped.

use sj_core::{Computer, Hardware, Sensor};
use sj_error::{Result, SensorJsonError};
use sj_protocol::{HardwareNode, SensorNode};

/// Project every top-level hardware node, in source order
pub fn project(computer: &Computer) -> Result<Vec<HardwareNode>> {
    computer
        .hardware()
        .iter()
        .map(|hw| {
            if let Some(parent) = hw.parent() {
                return Err(SensorJsonError::malformed(
                    hw.identifier().to_string(),
                    format!("top-level hardware refers back to {}", parent),
                ));
            }
            project_hardware(hw, false)
        })
        .collect()
}

fn project_hardware(hw: &Hardware, is_sub: bool) -> Result<HardwareNode> {
    let mut sub_hardware = Vec::with_capacity(hw.sub_hardware().len());
    for child in hw.sub_hardware() {
        if is_sub {
            return Err(SensorJsonError::malformed(
                child.identifier().to_string(),
                "sub-hardware nested below sub-hardware",
            ));
        }
        if child.parent() != Some(hw.identifier()) {
            return Err(SensorJsonError::malformed(
                child.identifier().to_string(),
                format!("back-reference does not point to owner {}", hw.identifier()),
            ));
        }
        sub_hardware.push(project_hardware(child, true)?);
    }

    let sensors = hw
        .sensors()
        .iter()
        .map(|sensor| project_sensor(hw, sensor))
        .collect::<Result<Vec<_>>>()?;

    Ok(HardwareNode {
        name: hw.name().to_string(),
        identifier: hw.identifier().to_string(),
        hardware_type: hw.hardware_type().as_str().to_string(),
        sub_hardware,
        sensors,
    })
}

fn project_sensor(owner: &Hardware, sensor: &Sensor) -> Result<SensorNode> {
    if sensor.hardware() != owner.identifier() {
        return Err(SensorJsonError::malformed(
            sensor.identifier().to_string(),
            format!("sensor belongs to {}, found under {}", sensor.hardware(), owner.identifier()),
        ));
    }
    Ok(SensorNode {
        name: sensor.name().to_string(),
        identifier: sensor.identifier().to_string(),
        sensor_type: sensor.sensor_type().as_str().to_string(),
        index: sensor.index(),
        value: sensor.value(),
        min: sensor.min(),
        max: sensor.max(),
    })
}
