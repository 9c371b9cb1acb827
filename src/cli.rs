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

//! Command Line Interface
//!
//! Flags override values from the configuration file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use sj_core::HardwareCategory;

use crate::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "sensorjson")]
#[command(version)]
#[command(about = "Serve live hardware sensor readings as JSON over HTTP")]
#[command(long_about = "sensorjson - Serve live hardware sensor readings as JSON over HTTP

Every request, whatever its method or path, is answered with a fresh
snapshot of the full sensor tree.

EXAMPLES:
    sensorjson                              Listen on 0.0.0.0:8080
    sensorjson --host 127.0.0.1 --port 8085
    sensorjson --disable gpu --disable hdd
    sensorjson --print-config               Show the effective configuration

ENVIRONMENT VARIABLES:
    SENSORJSON_LOG=debug    Log filter, overrides --log-level and the config file

FILES:
    ~/.config/sensorjson/config.json    User configuration
    /etc/sensorjson/config.json         System configuration")]
pub struct Cli {
    /// Configuration file (default: user, then system config)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Log filter, e.g. "info" or "sj_core=debug"
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Do not monitor a hardware category (repeatable)
    #[arg(long, value_enum, value_name = "CATEGORY")]
    pub disable: Vec<Category>,

    /// hwmon class directory
    #[arg(long, value_name = "PATH")]
    pub hwmon_root: Option<PathBuf>,

    /// meminfo file
    #[arg(long, value_name = "PATH")]
    pub meminfo: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Mainboard,
    Cpu,
    Ram,
    Gpu,
    FanController,
    Hdd,
}

impl From<Category> for HardwareCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::Mainboard => HardwareCategory::Mainboard,
            Category::Cpu => HardwareCategory::Cpu,
            Category::Ram => HardwareCategory::Ram,
            Category::Gpu => HardwareCategory::Gpu,
            Category::FanController => HardwareCategory::FanController,
            Category::Hdd => HardwareCategory::Hdd,
        }
    }
}

impl Cli {
    /// Apply flag overrides on top of `config`
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        for category in &self.disable {
            config.monitor.set_enabled((*category).into(), false);
        }
        if let Some(root) = &self.hwmon_root {
            config.hwmon_root = root.clone();
        }
        if let Some(meminfo) = &self.meminfo {
            config.meminfo = meminfo.clone();
        }
    }
}
