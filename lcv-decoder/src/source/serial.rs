//! Serial port byte source
//!
//! Reads the telemetry stream from the ventilator's USB CDC serial port using
//! the `serialport` crate. The port is polled with a short timeout so that a
//! read never overshoots its deadline by more than one poll interval.

use super::ByteSource;
use crate::types::{DecoderError, Result};
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

/// Baud rate used when none is configured
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Upper bound on a single blocking read
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Byte source reading from a serial port
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    port_timeout: Duration,
}

impl SerialSource {
    /// Open `port_name` at `baud_rate` and discard any stale input
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        log::info!("Opening serial port {} at {} baud", port_name, baud_rate);

        let port = serialport::new(port_name, baud_rate)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => {
                    DecoderError::PortNotFound(port_name.to_string())
                }
                _ => DecoderError::Serial(e),
            })?;

        if let Err(e) = port.clear(ClearBuffer::Input) {
            log::debug!("Could not clear input buffer of {}: {}", port_name, e);
        }

        Ok(Self::from_port(port))
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let port_timeout = port.timeout();
        Self { port, port_timeout }
    }

    /// Name of the underlying port, if the platform reports one
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl ByteSource for SerialSource {
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            let wait = (deadline - now).min(POLL_INTERVAL);
            if wait != self.port_timeout {
                self.port.set_timeout(wait)?;
                self.port_timeout = wait;
            }

            match self.port.read(&mut buf) {
                Ok(1) => return Ok(Some(buf[0])),
                // Empty read is "no data", never a zero byte
                Ok(_) => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => {
                    return Err(DecoderError::Transport(format!(
                        "Serial read failed: {}",
                        e
                    )))
                }
            }
        }
    }
}
