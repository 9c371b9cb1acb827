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

//! HTTP snapshot server
//!
//! Serves the whole sensor tree as JSON to every request, whatever the
//! method or path.
//!
//! Connections are handled one at a time, inline in the accept loop. The
//! loop owns the [`Computer`] by value, so refresh and projection never
//! overlap and no lock is needed. Handling connections concurrently would
//! require a lock around refresh+projection or a copy-on-read snapshot.
//!
//! There are no read or write timeouts: a slow client holds up the loop.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, trace, warn};

use sj_core::{refresh, Computer};
use sj_error::{Result, SensorJsonError};
use sj_protocol::{encode_error, encode_snapshot, ErrorBody};

use crate::http::{self, Response, HEAD_LIMIT};
use crate::projection::project;

/// Pause after a failed accept so a persistent error (EMFILE) cannot spin
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bind the listening socket
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| SensorJsonError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Accept and answer connections forever
pub async fn serve(listener: TcpListener, mut computer: Computer) {
    match listener.local_addr() {
        Ok(addr) => info!("Serving sensor snapshots on {}", addr),
        Err(e) => warn!("Serving sensor snapshots on unknown address: {}", e),
    }

    let mut served: u64 = 0;
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                if handle_connection(stream, peer, &mut computer).await {
                    served += 1;
                    trace!(served, "Request complete");
                }
            }
            Err(e) => accept_failed(&e).await,
        }
    }
}

async fn accept_failed(e: &io::Error) {
    error!("Accept error: {}", e);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// Answer one connection. Returns false when the peer left before sending
/// a request.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, computer: &mut Computer) -> bool {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);
    let mut head: Vec<u8> = Vec::with_capacity(512);

    match http::read_request_head(&mut reader, &mut head, HEAD_LIMIT).await {
        Ok(0) => {
            debug!(%peer, "Connection closed before request");
            return false;
        }
        Ok(n) => {
            debug!(%peer, bytes = n, request = %http::request_line(&head), "Request");
        }
        Err(e) => {
            log_io_error(peer, "read", &e);
            return false;
        }
    }

    let response = snapshot_response(computer);

    let write_result = async {
        writer.write_all(&response.render()).await?;
        writer.flush().await?;
        writer.shutdown().await
    }
    .await;

    if let Err(e) = write_result {
        log_io_error(peer, "write", &e);
    }
    true
}

/// Refresh, project and encode the tree; any failure becomes a 500
pub fn snapshot_response(computer: &mut Computer) -> Response {
    match snapshot(computer) {
        Ok(body) => Response::json(200, body),
        Err(e) => {
            error!(error = %e, "Failed to build sensor snapshot");
            let body = encode_error(&ErrorBody::internal(e.to_string()))
                .unwrap_or_else(|_| br#"{"Error":"internal error","Status":500}"#.to_vec());
            Response::json(500, body)
        }
    }
}

fn snapshot(computer: &mut Computer) -> Result<Vec<u8>> {
    let updated = refresh(computer)?;
    let nodes = project(computer)?;
    trace!(updated, top_level = nodes.len(), "Snapshot projected");
    Ok(encode_snapshot(&nodes)?)
}

fn log_io_error(peer: SocketAddr, op: &str, e: &io::Error) {
    if http::is_disconnect(e) {
        debug!(%peer, "Client disconnected during {}: {}", op, e);
    } else {
        warn!(%peer, "Socket {} error: {}", op, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sj_core::{Hardware, HardwareType, MonitorSettings, Sensor, SensorSource, SensorType};
    use sj_protocol::decode_snapshot;

    struct Fixed(Option<f32>);

    impl SensorSource for Fixed {
        fn refresh(&mut self, sensors: &mut [Sensor]) -> Result<()> {
            for sensor in sensors.iter_mut() {
                sensor.set_value(self.0);
            }
            Ok(())
        }
    }

    struct Gone;

    impl SensorSource for Gone {
        fn refresh(&mut self, _sensors: &mut [Sensor]) -> Result<()> {
            Err(SensorJsonError::hardware_read("/hdd/0", "device disappeared"))
        }
    }

    fn computer_with(source: Box<dyn SensorSource>) -> Computer {
        let mut hw = Hardware::new("/hdd/0".parse().unwrap(), "Drive #0", HardwareType::Hdd, source);
        hw.add_sensor("Composite", SensorType::Temperature);
        Computer::with_hardware(MonitorSettings::default(), vec![hw])
    }

    #[test]
    fn test_snapshot_refreshes_before_projecting() {
        let mut computer = computer_with(Box::new(Fixed(Some(38.5))));
        let response = snapshot_response(&mut computer);
        assert_eq!(response.status, 200);

        let nodes = decode_snapshot(&response.body).unwrap();
        assert_eq!(nodes[0].sensors[0].value, Some(38.5));
    }

    #[test]
    fn test_provider_failure_is_500() {
        let mut computer = computer_with(Box::new(Gone));
        let response = snapshot_response(&mut computer);
        assert_eq!(response.status, 500);

        let body: ErrorBody = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body.status, 500);
        assert!(body.error.contains("/hdd/0"));
    }

    #[test]
    fn test_empty_tree_is_empty_array() {
        let mut computer = Computer::with_hardware(MonitorSettings::default(), vec![]);
        let response = snapshot_response(&mut computer);
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"[]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_backs_off() {
        let err = io::Error::from_raw_os_error(24);
        let start = tokio::time::Instant::now();
        accept_failed(&err).await;
        assert!(start.elapsed() >= ACCEPT_BACKOFF);
    }
}
