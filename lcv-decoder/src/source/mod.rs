//! Byte sources feeding the frame decoder
//!
//! A byte source delivers the telemetry stream one byte at a time. Every read
//! is bounded by an absolute deadline so the frame decoder can honor its
//! per-attempt budget no matter how quiet the line is.

use crate::types::Result;
use std::time::Instant;

pub mod memory;
pub mod serial;

pub use memory::MemorySource;
pub use serial::{SerialSource, DEFAULT_BAUD_RATE};

/// Common trait for everything that can deliver telemetry bytes
pub trait ByteSource {
    /// Read a single byte, waiting no later than `deadline`
    ///
    /// Returns `Ok(Some(byte))` for a received byte (including `0x00`),
    /// `Ok(None)` if nothing arrived before the deadline, and
    /// `Err(DecoderError::Transport)` if the connection is gone.
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        (**self).read_byte(deadline)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        (**self).read_byte(deadline)
    }
}
