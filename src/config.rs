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

use std::env;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sj_core::constants::paths;
use sj_core::MonitorSettings;
use sj_error::{Result, SensorJsonError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Effective server configuration. Every field may be omitted from the
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-category monitoring toggles
    pub monitor: MonitorSettings,
    /// tracing filter directive, e.g. `info` or `sj_core=debug`
    pub log_level: Option<String>,
    pub hwmon_root: PathBuf,
    pub meminfo: PathBuf,
    pub board_name: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            monitor: MonitorSettings::default(),
            log_level: None,
            hwmon_root: PathBuf::from(paths::HWMON_BASE),
            meminfo: PathBuf::from(paths::PROC_MEMINFO),
            board_name: PathBuf::from(paths::DMI_BOARD_NAME),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("sensorjson").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("sensorjson")
            .join("config.json");
    }
    match dirs::config_dir() {
        Some(dir) => dir.join("sensorjson").join("config.json"),
        None => system_config_path(),
    }
}

pub fn system_config_path() -> PathBuf {
    PathBuf::from("/etc/sensorjson/config.json")
}

impl ServerConfig {
    /// Load from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| SensorJsonError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cfg: ServerConfig = serde_json::from_str(&data)
            .map_err(|e| SensorJsonError::config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {:?}", path);
        Ok(cfg)
    }

    /// Load `explicit` if given, else the first of the user and system
    /// config files that exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        for path in [config_path(), system_config_path()] {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Resolve host and port to a socket address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| SensorJsonError::invalid_config("host", e.to_string()))?
            .next()
            .ok_or_else(|| SensorJsonError::invalid_config("host", "resolves to no address"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SensorJsonError::invalid_config("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(SensorJsonError::invalid_config("port", "must be between 1 and 65535"));
        }
        if let Some(level) = &self.log_level {
            if level.trim().is_empty() {
                return Err(SensorJsonError::invalid_config("log_level", "must not be empty"));
            }
        }
        self.bind_addr()?;
        Ok(())
    }
}
