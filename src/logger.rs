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

//! Logging setup
//!
//! Logs go to the systemd journal when one is running, otherwise to stdout.

use std::env;
use std::path::Path;

use sj_error::{Result, SensorJsonError};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides every other log filter
pub const LOG_ENV: &str = "SENSORJSON_LOG";

pub const DEFAULT_FILTER: &str = "info";

const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";

/// Where log output ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Journald,
    Stdout,
}

impl LogSink {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSink::Journald => "systemd journal",
            LogSink::Stdout => "stdout",
        }
    }
}

/// Pick the filter: environment, then configuration, then the default
pub fn resolve_filter(from_env: Option<String>, configured: Option<&str>) -> String {
    from_env
        .filter(|f| !f.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?}: {}, using {}", directive, e, DEFAULT_FILTER);
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Install the global subscriber
pub fn init_logging(configured: Option<&str>) -> Result<LogSink> {
    let directive = resolve_filter(env::var(LOG_ENV).ok(), configured);

    if Path::new(JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(build_filter(&directive))
                    .try_init()
                    .map_err(|e| SensorJsonError::generic(format!("logging: {}", e)))?;
                return Ok(LogSink::Journald);
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(build_filter(&directive))
        .try_init()
        .map_err(|e| SensorJsonError::generic(format!("logging: {}", e)))?;
    Ok(LogSink::Stdout)
}
