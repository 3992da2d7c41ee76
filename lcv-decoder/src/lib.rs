//! Low Cost Ventilator Telemetry Decoder
//!
//! A small, reusable library for acquiring control-loop telemetry from the
//! ventilator over its USB serial link.
//!
//! # Architecture
//!
//! Data flows through four stages:
//! - A [`ByteSource`] delivers the raw stream one byte at a time, each read
//!   bounded by an absolute deadline
//! - The [`FrameDecoder`] finds the `0x5E` sync marker, collects a fixed-size
//!   payload and verifies the trailing 8-bit checksum
//! - The [`RecordDecoder`] interprets the payload as little-endian fields
//! - The [`Acquisition`] loop timestamps each reading and appends it to a
//!   [`MeasurementSeries`] until the run budget is spent
//!
//! The library does NOT:
//! - Discover which serial port the device is on
//! - Parse command-line arguments
//! - Plot or otherwise render the collected series
//!
//! All of that lives in the application layer (lcv-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use lcv_decoder::{Acquisition, AcquisitionConfig, Schema, SerialSource};
//!
//! let config = AcquisitionConfig::new()
//!     .with_schema(Schema::ThreeField)
//!     .with_run_duration_secs(15.0);
//!
//! let mut source = SerialSource::open("/dev/ttyACM0", 115_200).unwrap();
//! let series = Acquisition::new(config).unwrap().run(&mut source);
//!
//! for m in &series {
//!     println!("{:.3}s pressure={} setpoint={}", m.seconds(), m.pressure, m.setpoint);
//! }
//! ```

// Public modules
pub mod acquisition;
pub mod config;
pub mod frame_decoder;
pub mod record_decoder;
pub mod series;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use acquisition::Acquisition;
pub use config::{AcquisitionConfig, Schema};
pub use frame_decoder::{
    checksum, encode_frame, DecoderPhase, DecoderStats, FeedResult, FrameDecoder, SYNC_BYTE,
};
pub use record_decoder::RecordDecoder;
pub use series::{MeasurementSeries, SeriesSummary, StopReason};
pub use source::{ByteSource, MemorySource, SerialSource, DEFAULT_BAUD_RATE};
pub use types::{DecoderError, Frame, Measurement, Reading, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: a fresh decoder is seeking and has seen nothing
        let decoder = FrameDecoder::new(Schema::default());
        assert_eq!(decoder.phase(), DecoderPhase::Seeking);
        assert_eq!(decoder.stats(), DecoderStats::default());
    }
}
