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

//! Minimal HTTP/1.1 plumbing
//!
//! Just enough to read (and discard) a request head and write a complete
//! response. Every connection carries exactly one exchange.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use sj_protocol::MAX_REQUEST_HEAD;

/// Request heads beyond this are truncated
pub const HEAD_LIMIT: usize = MAX_REQUEST_HEAD;

/// Read the request head into `out`, up to the blank line that ends it.
///
/// Stops early at EOF or once `max_len` bytes are buffered; the rest of an
/// oversized head is left unread. Returns the number of bytes buffered, 0
/// when the peer closed without sending anything.
pub async fn read_request_head<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    out: &mut Vec<u8>,
    max_len: usize,
) -> io::Result<usize> {
    out.clear();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(out.len());
        }

        let remaining = max_len.saturating_sub(out.len());
        let take_len = available.len().min(remaining);
        // Only rescan the seam between old and new bytes
        let scan_from = out.len().saturating_sub(3);
        out.extend_from_slice(&available[..take_len]);
        reader.consume(take_len);

        if head_complete(&out[scan_from..]) || out.len() >= max_len {
            return Ok(out.len());
        }
    }
}

fn head_complete(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.windows(2).any(|w| w == b"\n\n")
}

/// First line of a request head, for logging
pub fn request_line(head: &[u8]) -> String {
    let line = head.split(|b| *b == b'\n').next().unwrap_or_default();
    String::from_utf8_lossy(line).trim_end().to_string()
}

/// A complete response, rendered with `Connection: close`
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Status line, headers and body
    pub fn render(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n",
            self.status,
            self.reason(),
            self.body.len()
        );
        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

/// Errors that only mean the client went away
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}
