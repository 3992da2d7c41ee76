//! Acquisition configuration types
//!
//! This module defines the payload schema and the parameters of one
//! acquisition run. Everything here is plain data with serde support so the
//! application layer can load it from a config file.

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Payload field layout transmitted by the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Schema {
    /// `{pressure: i32, setpoint: i32}` - 8 payload bytes
    TwoField,
    /// `{pressure: i32, setpoint: i32, output: f32}` - 12 payload bytes
    #[default]
    ThreeField,
}

impl Schema {
    /// Number of payload bytes between the sync marker and the checksum
    pub fn payload_len(&self) -> usize {
        match self {
            Schema::TwoField => 8,
            Schema::ThreeField => 12,
        }
    }

    /// Number of fields in the payload
    pub fn field_count(&self) -> usize {
        match self {
            Schema::TwoField => 2,
            Schema::ThreeField => 3,
        }
    }

    pub fn has_output(&self) -> bool {
        matches!(self, Schema::ThreeField)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::TwoField => write!(f, "two-field"),
            Schema::ThreeField => write!(f, "three-field"),
        }
    }
}

impl FromStr for Schema {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "two-field" | "two" | "2" => Ok(Schema::TwoField),
            "three-field" | "three" | "3" => Ok(Schema::ThreeField),
            other => Err(DecoderError::InvalidConfig(format!(
                "Unknown schema '{}' (expected two-field or three-field)",
                other
            ))),
        }
    }
}

/// Parameters of one acquisition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Payload layout the device is transmitting
    #[serde(default)]
    pub schema: Schema,

    /// Total wall-clock budget of the run in seconds (default: 15.0)
    #[serde(default = "default_run_duration")]
    pub run_duration_secs: f64,

    /// Deadline of a single frame attempt in milliseconds (default: 100ms)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,
}

fn default_run_duration() -> f64 {
    15.0
}

fn default_attempt_timeout() -> u64 {
    100
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            run_duration_secs: default_run_duration(),
            attempt_timeout_ms: default_attempt_timeout(),
        }
    }
}

impl AcquisitionConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the payload schema
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Builder method: set the total run duration in seconds
    pub fn with_run_duration_secs(mut self, secs: f64) -> Self {
        self.run_duration_secs = secs;
        self
    }

    /// Builder method: set the per-attempt deadline in milliseconds
    pub fn with_attempt_timeout_ms(mut self, millis: u64) -> Self {
        self.attempt_timeout_ms = millis;
        self
    }

    /// Check that the run parameters are usable
    pub fn validate(&self) -> Result<()> {
        if !self.run_duration_secs.is_finite() || self.run_duration_secs < 0.0 {
            return Err(DecoderError::InvalidConfig(format!(
                "Run duration must be a non-negative number of seconds, got {}",
                self.run_duration_secs
            )));
        }

        if self.attempt_timeout_ms == 0 {
            return Err(DecoderError::InvalidConfig(
                "Attempt timeout must be at least 1ms".to_string(),
            ));
        }

        self.run_duration()?;
        Ok(())
    }

    /// Total run budget
    pub fn run_duration(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.run_duration_secs).map_err(|e| {
            DecoderError::InvalidConfig(format!(
                "Run duration of {} seconds is out of range: {}",
                self.run_duration_secs, e
            ))
        })
    }

    /// Deadline of a single frame attempt
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}
