//! In-memory byte source
//!
//! Replays a fixed buffer, either built in code or loaded from a raw capture
//! file. Once drained it behaves like an idle serial line: reads wait until
//! their deadline and return nothing.

use super::ByteSource;
use crate::types::{DecoderError, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;

/// Byte source backed by a buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: VecDeque<u8>,
    fail_when_exhausted: bool,
}

impl MemorySource {
    /// Create a source that replays `bytes`
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: VecDeque::from(bytes.into()),
            fail_when_exhausted: false,
        }
    }

    /// Load a raw byte capture from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading capture file: {:?}", path);

        if !path.exists() {
            return Err(DecoderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Capture file not found: {:?}", path),
            )));
        }

        let bytes = std::fs::read(path)?;
        log::debug!("Capture file holds {} bytes", bytes.len());
        Ok(Self::new(bytes))
    }

    /// Builder method: report a transport failure once the buffer is drained
    ///
    /// Simulates a device that disappears mid-run.
    pub fn fail_when_exhausted(mut self) -> Self {
        self.fail_when_exhausted = true;
        self
    }

    /// Append more bytes to the end of the stream
    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for MemorySource {
    fn read_byte(&mut self, deadline: Instant) -> Result<Option<u8>> {
        if let Some(byte) = self.bytes.pop_front() {
            return Ok(Some(byte));
        }

        if self.fail_when_exhausted {
            return Err(DecoderError::Transport(
                "Byte stream closed".to_string(),
            ));
        }

        // Idle line: nothing more will arrive before the deadline
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_replays_bytes_in_order() {
        let mut source = MemorySource::new(vec![0x5E, 0x00, 0xFF]);
        let deadline = Instant::now() + Duration::from_millis(10);

        assert_eq!(source.read_byte(deadline).unwrap(), Some(0x5E));
        assert_eq!(source.read_byte(deadline).unwrap(), Some(0x00));
        assert_eq!(source.read_byte(deadline).unwrap(), Some(0xFF));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_exhausted_source_waits_for_deadline() {
        let mut source = MemorySource::new(Vec::new());
        let start = Instant::now();
        let deadline = start + Duration::from_millis(20);

        assert_eq!(source.read_byte(deadline).unwrap(), None);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_fail_when_exhausted() {
        let mut source = MemorySource::new(vec![0x01]).fail_when_exhausted();
        let deadline = Instant::now() + Duration::from_millis(10);

        assert_eq!(source.read_byte(deadline).unwrap(), Some(0x01));
        assert!(matches!(
            source.read_byte(deadline),
            Err(DecoderError::Transport(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x5E, 0x01, 0x02]).unwrap();

        let source = MemorySource::from_file(file.path()).unwrap();
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn test_from_missing_file() {
        let result = MemorySource::from_file(Path::new("nonexistent.bin"));
        assert!(result.is_err());
    }
}
