//! # Serial Communication Module
//!
//! Handles the serial line to the modem's AT command port.
//!
//! This module handles:
//! - Opening the AT port with standard modem framing (8N1, no flow control)
//! - Async read/write operations behind [`SerialPortIO`]
//!
//! The Onyx dongle (Quectel EG25-G) enumerates four USB serial interfaces;
//! the third one, usually `/dev/ttyUSB2`, carries NMEA and the fourth,
//! `/dev/ttyUSB3`, is the AT command port.

pub mod port_trait;

pub use port_trait::SerialPortIO;

use crate::error::{Result, SignalInfoError};
use async_trait::async_trait;
use std::io;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Default AT command port of the Onyx dongle
pub const DEFAULT_DEVICE_PATH: &str = "/dev/ttyUSB3";

/// Default baud rate. USB CDC ports ignore it, UART-attached modems do not.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Modem AT port handle
///
/// Owns the serial stream; dropping the value closes the device.
pub struct ModemSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB3)
    device_path: String,
}

impl std::fmt::Debug for ModemSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModemSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl ModemSerial {
    /// Open the modem's AT command port
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB3")
    /// * `baud_rate` - Line speed
    ///
    /// # Errors
    ///
    /// Returns [`SignalInfoError::PortOpen`] if the device does not exist or
    /// the process lacks permission to open it
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use onyx_signal_info::serial::{ModemSerial, DEFAULT_BAUD_RATE, DEFAULT_DEVICE_PATH};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = ModemSerial::open(DEFAULT_DEVICE_PATH, DEFAULT_BAUD_RATE)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", path, baud_rate);

        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| SignalInfoError::PortOpen {
                device: path.to_string(),
                reason: e.to_string(),
            })?;

        info!("Opened modem AT port at {}", path);
        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl SerialPortIO for ModemSerial {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }
}

impl Drop for ModemSerial {
    fn drop(&mut self) {
        debug!("Closing modem AT port {}", self.device_path);
    }
}
