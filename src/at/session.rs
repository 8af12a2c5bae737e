//! # AT Command Session
//!
//! Writes one command line at a time and collects response lines until the
//! modem sends a final result code.

use bytes::{Buf, BytesMut};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::protocol::{final_result, FinalResult, COMMAND_TERMINATOR};
use crate::error::{Result, SignalInfoError};
use crate::serial::SerialPortIO;

/// Read chunk size; responses of interest are a few hundred bytes
const READ_CHUNK_SIZE: usize = 256;

/// One AT conversation over an exclusively owned port
///
/// The port is released when the session is dropped.
pub struct AtSession<P: SerialPortIO> {
    port: P,
    timeout: Duration,
    buffer: BytesMut,
}

impl<P: SerialPortIO> AtSession<P> {
    /// Create a session with a per-command response timeout
    pub fn new(port: P, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE * 4),
        }
    }

    /// Send `command` and return every line before the final `OK`
    ///
    /// The command echo, if the modem has echo enabled, is part of the
    /// returned lines.
    ///
    /// # Errors
    ///
    /// - [`SignalInfoError::Timeout`] if no final result code arrives in time
    /// - [`SignalInfoError::CommandRejected`] on `ERROR` and friends
    /// - [`SignalInfoError::Serial`] on I/O failure or end of stream
    pub async fn command(&mut self, command: &str) -> Result<Vec<String>> {
        if !self.buffer.is_empty() {
            debug!("Discarding {} stale bytes before {}", self.buffer.len(), command);
            self.buffer.clear();
        }

        let line = format!("{}{}", command, COMMAND_TERMINATOR);
        self.port
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SignalInfoError::Serial(format!("Failed to write {:?}: {}", command, e)))?;
        self.port
            .flush()
            .await
            .map_err(|e| SignalInfoError::Serial(format!("Failed to flush serial port: {}", e)))?;
        debug!("Sent {}", command);

        match tokio::time::timeout(self.timeout, self.read_response(command)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("No final result code for {} within {:?}", command, self.timeout);
                Err(SignalInfoError::Timeout {
                    command: command.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn read_response(&mut self, command: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            while let Some(line) = self.next_line() {
                trace!("< {}", line);
                match final_result(&line) {
                    Some(FinalResult::Ok) => return Ok(lines),
                    Some(FinalResult::Error) => {
                        return Err(SignalInfoError::CommandRejected {
                            command: command.to_string(),
                            response: line,
                        });
                    }
                    None => lines.push(line),
                }
            }

            let n = self
                .port
                .read(&mut chunk)
                .await
                .map_err(|e| SignalInfoError::Serial(format!("Failed to read response: {}", e)))?;
            if n == 0 {
                return Err(SignalInfoError::Serial(format!(
                    "Port closed before response to {:?} completed",
                    command
                )));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    /// Pop the next non-empty line from the buffer, if a complete one is there
    fn next_line(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.iter().position(|&b| b == b'\n')?;
            let raw = self.buffer.split_to(end);
            self.buffer.advance(1);
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() {
                return Some(line);
            }
        }
    }
}
