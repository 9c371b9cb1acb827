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

//! sensorjson server binary

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use sensorjson::cli::Cli;
use sensorjson::config::ServerConfig;
use sensorjson::{logger, server};
use sj_core::{Computer, HardwareProvider, HwmonProvider, MemoryProvider};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let sink = logger::init_logging(config.log_level.as_deref())?;
    info!("STARTUP: sensorjson v{}, logging to {}", VERSION, sink.as_str());

    let mut computer = Computer::new(config.monitor);
    let hwmon = HwmonProvider::with_paths(&config.hwmon_root, &config.board_name);
    let memory = MemoryProvider::new(&config.meminfo);
    let providers: [&dyn HardwareProvider; 2] = [&hwmon, &memory];
    computer.open(&providers)?;
    if computer.hardware().is_empty() {
        warn!("No hardware discovered; serving an empty tree");
    }

    let listener = server::bind(config.bind_addr()?).await?;
    let local = listener.local_addr()?;

    println!("Listening on http://{}", local);
    println!("Press enter to quit...");

    let server_task = tokio::spawn(server::serve(listener, computer));

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = wait_for_enter() => info!("Shutdown requested from stdin"),
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
    }

    // Dropping the task drops the computer with it
    server_task.abort();
    let _ = server_task.await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on the first line of input, or when stdin closes
async fn wait_for_enter() {
    let mut line = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = stdin.read_line(&mut line).await {
        warn!("Failed to read stdin: {}", e);
    }
}
