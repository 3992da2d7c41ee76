//! Measurement series
//!
//! The ordered output of one acquisition run. Measurements are appended in
//! the order they were decoded, which is also timestamp order.

use crate::frame_decoder::DecoderStats;
use crate::types::{Measurement, Result, Timestamp};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::time::Duration;

/// Why an acquisition run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The run budget elapsed
    Elapsed,
    /// The byte source failed and no further bytes can arrive
    TransportFailed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Elapsed => write!(f, "run duration elapsed"),
            StopReason::TransportFailed(msg) => write!(f, "transport failed: {}", msg),
        }
    }
}

/// Append-only sequence of measurements from one run
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementSeries {
    /// Wall-clock time the run started
    pub started_at: Timestamp,
    measurements: Vec<Measurement>,
    /// Decoder counters at the end of the run
    pub stats: DecoderStats,
    /// How the run ended
    pub stop_reason: StopReason,
}

/// Aggregate values over a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub span_secs: f64,
    pub pressure_min: i32,
    pub pressure_max: i32,
    pub pressure_mean: f64,
    pub setpoint_min: i32,
    pub setpoint_max: i32,
    pub output_min: Option<f32>,
    pub output_max: Option<f32>,
    /// Measurements per second over the span of the series
    pub frame_rate_hz: f64,
}

impl MeasurementSeries {
    pub(crate) fn new(started_at: Timestamp) -> Self {
        Self {
            started_at,
            measurements: Vec::new(),
            stats: DecoderStats::default(),
            stop_reason: StopReason::Elapsed,
        }
    }

    /// Append a measurement
    ///
    /// Timestamps must be non-decreasing; the acquisition loop only appends
    /// as time advances.
    pub(crate) fn push(&mut self, measurement: Measurement) {
        debug_assert!(
            self.measurements
                .last()
                .map_or(true, |last| last.timestamp <= measurement.timestamp),
            "measurement timestamps must be non-decreasing"
        );
        self.measurements.push(measurement);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn first(&self) -> Option<&Measurement> {
        self.measurements.first()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    /// Time between the first and last measurement
    pub fn duration(&self) -> Duration {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => Duration::ZERO,
        }
    }

    /// True if any measurement carries a controller output
    pub fn has_output(&self) -> bool {
        self.measurements.iter().any(|m| m.output.is_some())
    }

    /// Aggregate values, `None` for an empty series
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = self.first()?;
        let count = self.len();

        let mut summary = SeriesSummary {
            count,
            span_secs: self.duration().as_secs_f64(),
            pressure_min: first.pressure,
            pressure_max: first.pressure,
            pressure_mean: 0.0,
            setpoint_min: first.setpoint,
            setpoint_max: first.setpoint,
            output_min: None,
            output_max: None,
            frame_rate_hz: 0.0,
        };

        let mut pressure_sum = 0.0;
        for m in &self.measurements {
            summary.pressure_min = summary.pressure_min.min(m.pressure);
            summary.pressure_max = summary.pressure_max.max(m.pressure);
            summary.setpoint_min = summary.setpoint_min.min(m.setpoint);
            summary.setpoint_max = summary.setpoint_max.max(m.setpoint);
            pressure_sum += m.pressure as f64;

            if let Some(output) = m.output {
                summary.output_min = Some(summary.output_min.map_or(output, |v| v.min(output)));
                summary.output_max = Some(summary.output_max.map_or(output, |v| v.max(output)));
            }
        }

        summary.pressure_mean = pressure_sum / count as f64;
        if count > 1 && summary.span_secs > 0.0 {
            summary.frame_rate_hz = (count - 1) as f64 / summary.span_secs;
        }

        Some(summary)
    }

    /// Write the series as CSV
    ///
    /// Times are in seconds relative to the first measurement. The output
    /// column is only written when the series carries outputs.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        let with_output = self.has_output();

        if with_output {
            writeln!(writer, "time_s,pressure,setpoint,output")?;
        } else {
            writeln!(writer, "time_s,pressure,setpoint")?;
        }

        let origin = self.first().map(|m| m.timestamp).unwrap_or_default();
        for m in &self.measurements {
            let time = (m.timestamp - origin).as_secs_f64();
            if with_output {
                let output = m.output.map(|o| o.to_string()).unwrap_or_default();
                writeln!(writer, "{:.6},{},{},{}", time, m.pressure, m.setpoint, output)?;
            } else {
                writeln!(writer, "{:.6},{},{}", time, m.pressure, m.setpoint)?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the series, stats and stop reason as pretty-printed JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| crate::types::DecoderError::Io(e.into()))
    }
}

impl<'a> IntoIterator for &'a MeasurementSeries {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
