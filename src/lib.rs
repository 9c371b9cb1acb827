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

//! sensorjson - Serve a live hardware sensor tree as JSON over HTTP
//!
//! Each request refreshes the tree ([`sj_core::refresh`]), projects it into
//! the child-only wire form ([`projection::project`]) and writes it back as a
//! JSON array of top-level hardware.

pub mod cli;
pub mod config;
pub mod http;
pub mod logger;
pub mod projection;
pub mod server;

pub use config::ServerConfig;
pub use projection::project;
pub use server::{bind, serve, snapshot_response};
