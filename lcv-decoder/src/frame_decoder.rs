//! Frame decoding state machine
//!
//! Extracts fixed-length frames from the telemetry byte stream. The wire
//! format is:
//!
//! ```text
//! +------+----------------------+----------+
//! | 0x5E | N payload bytes      | checksum |
//! +------+----------------------+----------+
//! ```
//!
//! `N` is fixed by the configured schema (8 or 12) and the checksum is the
//! wrapping 8-bit sum of the payload bytes. The sync marker is only
//! significant while seeking; inside a payload `0x5E` is an ordinary byte.

use crate::config::Schema;
use crate::source::ByteSource;
use crate::types::{Frame, Result};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Marker byte that starts every frame
pub const SYNC_BYTE: u8 = 0x5E;

/// Phase of the frame state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    /// Discarding bytes until a sync marker arrives
    Seeking,
    /// Accumulating payload bytes
    Collecting,
    /// Payload complete, waiting for the checksum byte
    Verifying,
}

impl fmt::Display for DecoderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderPhase::Seeking => write!(f, "Seeking"),
            DecoderPhase::Collecting => write!(f, "Collecting"),
            DecoderPhase::Verifying => write!(f, "Verifying"),
        }
    }
}

/// Result of feeding a single byte into the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResult {
    /// The byte was consumed, the frame is not complete yet
    NeedMore,
    /// The byte was a matching checksum
    Complete(Frame),
    /// The byte was a checksum that did not match the payload
    ChecksumFailed { received: u8, computed: u8 },
}

/// Counters describing what the decoder has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    /// Frames that passed checksum validation
    pub frames: usize,
    /// Frames rejected because of a checksum mismatch
    pub checksum_failures: usize,
    /// Attempts that hit their deadline without a frame
    pub timeouts: usize,
    /// Bytes thrown away while looking for a sync marker
    pub discarded_bytes: usize,
}

/// Byte-at-a-time frame decoder
///
/// One decoder is owned by one acquisition run. Its state never outlives a
/// single `try_get_frame` attempt: every attempt starts from `Seeking`.
pub struct FrameDecoder {
    schema: Schema,
    phase: DecoderPhase,
    payload: Vec<u8>,
    checksum: u8,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder for frames of the given schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            phase: DecoderPhase::Seeking,
            payload: Vec::with_capacity(schema.payload_len()),
            checksum: 0,
            stats: DecoderStats::default(),
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    /// Counters accumulated since the decoder was created
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop any partial frame and go back to seeking
    pub fn reset(&mut self) {
        self.phase = DecoderPhase::Seeking;
        self.payload.clear();
        self.checksum = 0;
    }

    /// Advance the state machine by one received byte
    pub fn feed(&mut self, byte: u8) -> FeedResult {
        match self.phase {
            DecoderPhase::Seeking => {
                if byte == SYNC_BYTE {
                    self.payload.clear();
                    self.checksum = 0;
                    self.phase = DecoderPhase::Collecting;
                } else {
                    self.stats.discarded_bytes += 1;
                }
                FeedResult::NeedMore
            }
            DecoderPhase::Collecting => {
                self.payload.push(byte);
                self.checksum = self.checksum.wrapping_add(byte);
                if self.payload.len() == self.schema.payload_len() {
                    self.phase = DecoderPhase::Verifying;
                }
                FeedResult::NeedMore
            }
            DecoderPhase::Verifying => {
                let computed = self.checksum;
                if byte == computed {
                    let payload = std::mem::replace(
                        &mut self.payload,
                        Vec::with_capacity(self.schema.payload_len()),
                    );
                    self.reset();
                    self.stats.frames += 1;
                    FeedResult::Complete(Frame::new(payload))
                } else {
                    self.reset();
                    self.stats.checksum_failures += 1;
                    FeedResult::ChecksumFailed {
                        received: byte,
                        computed,
                    }
                }
            }
        }
    }

    /// Run the state machine until a frame completes, fails or times out
    ///
    /// Every byte read shares the same absolute `deadline`. Returns
    /// `Ok(Some(frame))` for a verified frame and `Ok(None)` for both a
    /// checksum mismatch (logged as a warning) and an expired deadline
    /// (silent). Transport errors are propagated. The decoder is back in
    /// `Seeking` whenever this returns.
    pub fn try_get_frame<S>(&mut self, source: &mut S, deadline: Instant) -> Result<Option<Frame>>
    where
        S: ByteSource + ?Sized,
    {
        self.reset();

        while Instant::now() < deadline {
            let byte = match source.read_byte(deadline) {
                Ok(Some(byte)) => byte,
                Ok(None) => continue,
                Err(e) => {
                    self.reset();
                    return Err(e);
                }
            };

            match self.feed(byte) {
                FeedResult::NeedMore => {}
                FeedResult::Complete(frame) => {
                    log::trace!("Frame complete ({} payload bytes)", frame.len());
                    return Ok(Some(frame));
                }
                FeedResult::ChecksumFailed { received, computed } => {
                    log::warn!(
                        "Checksum wrong: received 0x{:02X}, computed 0x{:02X}",
                        received,
                        computed
                    );
                    return Ok(None);
                }
            }
        }

        log::trace!("Frame attempt timed out in phase {}", self.phase);
        self.reset();
        self.stats.timeouts += 1;
        Ok(None)
    }
}

/// Wrapping 8-bit sum of `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Frame a payload the way the device transmits it
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push(SYNC_BYTE);
    out.extend_from_slice(payload);
    out.push(checksum(payload));
    out
}
