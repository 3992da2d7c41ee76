//! Core types for the ventilator telemetry decoder
//!
//! This module defines the values that flow through the decoder: verified
//! frames, decoded readings and timestamped measurements, plus the error type
//! shared by every fallible operation in the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock timestamp used to anchor an acquisition run
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while acquiring or decoding telemetry
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Serial port not found: {0}")]
    PortNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid frame: expected {expected} payload bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// A checksum-verified frame payload
///
/// Frames only exist between the frame decoder and the record decoder; they
/// carry the raw payload bytes without the sync marker or checksum byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8>,
}

impl Frame {
    pub(crate) fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.payload
    }
}

/// Field values decoded from a single frame payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Measured airway pressure (cmH2O)
    pub pressure: i32,
    /// Controller pressure setpoint (cmH2O)
    pub setpoint: i32,
    /// Controller output, only present in the three-field schema
    pub output: Option<f32>,
}

impl Reading {
    /// Reading for the two-field schema
    pub fn new(pressure: i32, setpoint: i32) -> Self {
        Self {
            pressure,
            setpoint,
            output: None,
        }
    }

    /// Reading for the three-field schema
    pub fn with_output(pressure: i32, setpoint: i32, output: f32) -> Self {
        Self {
            pressure,
            setpoint,
            output: Some(output),
        }
    }
}

/// A decoded, timestamped record
///
/// `timestamp` is the monotonic offset from the start of the acquisition run,
/// captured when the frame finished decoding. It is never transmitted on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub pressure: i32,
    pub setpoint: i32,
    pub output: Option<f32>,
    pub timestamp: Duration,
}

impl Measurement {
    /// Stamp a reading with its capture time
    pub fn new(reading: Reading, timestamp: Duration) -> Self {
        Self {
            pressure: reading.pressure,
            setpoint: reading.setpoint,
            output: reading.output,
            timestamp,
        }
    }

    /// The field values without the timestamp
    pub fn reading(&self) -> Reading {
        Reading {
            pressure: self.pressure,
            setpoint: self.setpoint,
            output: self.output,
        }
    }

    /// Timestamp in fractional seconds
    pub fn seconds(&self) -> f64 {
        self.timestamp.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_keeps_reading_fields() {
        let reading = Reading::with_output(21, 20, 0.75);
        let m = Measurement::new(reading, Duration::from_millis(1500));

        assert_eq!(m.reading(), reading);
        assert_eq!(m.seconds(), 1.5);
    }

    #[test]
    fn test_error_display() {
        let err = DecoderError::InvalidFrame {
            expected: 12,
            actual: 8,
        };
        assert_eq!(
            err.to_string(),
            "Invalid frame: expected 12 payload bytes, got 8"
        );
    }
}
