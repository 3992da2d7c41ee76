//! Time-bounded acquisition loop
//!
//! Drives the frame decoder against a byte source until the run budget is
//! spent, decoding and timestamping every verified frame.

use crate::config::AcquisitionConfig;
use crate::frame_decoder::FrameDecoder;
use crate::record_decoder::RecordDecoder;
use crate::series::{MeasurementSeries, StopReason};
use crate::source::ByteSource;
use crate::types::{Measurement, Result};
use chrono::Utc;
use std::time::{Duration, Instant};

/// One acquisition run
pub struct Acquisition {
    config: AcquisitionConfig,
    run_duration: Duration,
}

impl Acquisition {
    /// Create an acquisition for `config`
    ///
    /// Fails if the run parameters are malformed, before any byte is read.
    pub fn new(config: AcquisitionConfig) -> Result<Self> {
        config.validate()?;
        let run_duration = config.run_duration()?;
        Ok(Self {
            config,
            run_duration,
        })
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Acquire measurements from `source` until the run duration elapses
    ///
    /// A transport failure ends the run early; it is recorded in the
    /// returned series' `stop_reason` together with everything captured so
    /// far.
    pub fn run<S>(&self, source: &mut S) -> MeasurementSeries
    where
        S: ByteSource + ?Sized,
    {
        let schema = self.config.schema;
        let attempt_timeout = self.config.attempt_timeout();
        let mut decoder = FrameDecoder::new(schema);

        let start = Instant::now();
        let mut series = MeasurementSeries::new(Utc::now());

        log::info!(
            "Acquisition started ({} schema, {:.1}s budget)",
            schema,
            self.config.run_duration_secs
        );

        loop {
            let elapsed = start.elapsed();
            if elapsed >= self.run_duration {
                break;
            }

            // Attempts never run past the end of the budget
            let deadline = Instant::now() + attempt_timeout.min(self.run_duration - elapsed);
            match decoder.try_get_frame(source, deadline) {
                Ok(Some(frame)) => {
                    let reading = RecordDecoder::decode(&frame, schema);
                    let measurement = Measurement::new(reading, start.elapsed());
                    log::debug!(
                        "t={:.3}s pressure={} setpoint={} output={:?}",
                        measurement.seconds(),
                        measurement.pressure,
                        measurement.setpoint,
                        measurement.output
                    );
                    series.push(measurement);
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("Stopping acquisition: {}", e);
                    series.stop_reason = StopReason::TransportFailed(e.to_string());
                    break;
                }
            }
        }

        series.stats = decoder.stats();
        log::info!(
            "Acquisition finished: {} measurements, {} checksum failures ({})",
            series.len(),
            series.stats.checksum_failures,
            series.stop_reason
        );

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Schema;
    use crate::frame_decoder::encode_frame;
    use crate::source::MemorySource;
    use crate::types::{DecoderError, Reading};

    fn config(schema: Schema, secs: f64) -> AcquisitionConfig {
        AcquisitionConfig::new()
            .with_schema(schema)
            .with_run_duration_secs(secs)
            .with_attempt_timeout_ms(20)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Acquisition::new(AcquisitionConfig::new().with_run_duration_secs(-3.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let acquisition = Acquisition::new(config(Schema::TwoField, 0.0)).unwrap();
        let mut source = MemorySource::new(encode_frame(&[1, 0, 0, 0, 2, 0, 0, 0]));

        let started = Instant::now();
        let series = acquisition.run(&mut source);

        assert!(series.is_empty());
        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(source.remaining(), 10);
    }

    #[test]
    fn test_collects_frames_in_order() {
        let mut stream = Vec::new();
        for i in 0..5 {
            let payload = RecordDecoder::encode(&Reading::with_output(i, 10, i as f32), Schema::ThreeField);
            stream.extend(encode_frame(&payload));
        }

        let acquisition = Acquisition::new(config(Schema::ThreeField, 0.2)).unwrap();
        let series = acquisition.run(&mut MemorySource::new(stream));

        assert_eq!(series.len(), 5);
        let pressures: Vec<i32> = series.iter().map(|m| m.pressure).collect();
        assert_eq!(pressures, vec![0, 1, 2, 3, 4]);
        assert!(series
            .measurements()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(series.stop_reason, StopReason::Elapsed);
        assert_eq!(series.stats.frames, 5);
    }

    #[test]
    fn test_attempt_clamped_to_run_budget() {
        let config = AcquisitionConfig::new()
            .with_schema(Schema::TwoField)
            .with_run_duration_secs(0.1)
            .with_attempt_timeout_ms(1000);
        let acquisition = Acquisition::new(config).unwrap();

        let started = Instant::now();
        let series = acquisition.run(&mut MemorySource::new(Vec::new()));

        assert!(series.is_empty());
        assert!(started.elapsed() < Duration::from_millis(150));
    }

    #[test]
    fn test_huge_budget_does_not_overflow() {
        // Valid Duration, but too far out to add to an Instant
        let acquisition = Acquisition::new(config(Schema::TwoField, 1e19)).unwrap();
        let mut source = MemorySource::new(encode_frame(&[1, 0, 0, 0, 2, 0, 0, 0]))
            .fail_when_exhausted();

        let series = acquisition.run(&mut source);

        assert_eq!(series.len(), 1);
        assert!(matches!(series.stop_reason, StopReason::TransportFailed(_)));
    }

    #[test]
    fn test_out_of_range_budget_rejected() {
        let result = Acquisition::new(config(Schema::TwoField, 1e20));
        assert!(matches!(result, Err(DecoderError::InvalidConfig(_))));
    }

    #[test]
    fn test_transport_failure_stops_run() {
        let stream = encode_frame(&[1, 0, 0, 0, 2, 0, 0, 0]);
        let mut source = MemorySource::new(stream).fail_when_exhausted();

        let acquisition = Acquisition::new(config(Schema::TwoField, 5.0)).unwrap();
        let started = Instant::now();
        let series = acquisition.run(&mut source);

        assert_eq!(series.len(), 1);
        assert!(matches!(series.stop_reason, StopReason::TransportFailed(_)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
