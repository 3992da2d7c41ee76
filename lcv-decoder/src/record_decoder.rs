//! Record decoding
//!
//! Interprets a verified payload as packed little-endian fields:
//!
//! | bytes     | field    | type |
//! |-----------|----------|------|
//! | `[0..4)`  | pressure | i32  |
//! | `[4..8)`  | setpoint | i32  |
//! | `[8..12)` | output   | f32  |
//!
//! The output field only exists in the three-field schema.

use crate::config::Schema;
use crate::types::{DecoderError, Frame, Reading, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Record decoder - turns frames into readings
pub struct RecordDecoder;

impl RecordDecoder {
    /// Decode a frame produced for `schema`
    ///
    /// Total for any frame coming out of a `FrameDecoder` configured with the
    /// same schema, since the frame length is fixed by the schema.
    pub(crate) fn decode(frame: &Frame, schema: Schema) -> Reading {
        debug_assert_eq!(frame.len(), schema.payload_len());
        Self::decode_bytes(frame.as_bytes(), schema)
    }

    /// Decode a frame, checking its length against the schema first
    pub fn try_decode(frame: &Frame, schema: Schema) -> Result<Reading> {
        if frame.len() != schema.payload_len() {
            return Err(DecoderError::InvalidFrame {
                expected: schema.payload_len(),
                actual: frame.len(),
            });
        }
        Ok(Self::decode_bytes(frame.as_bytes(), schema))
    }

    fn decode_bytes(data: &[u8], schema: Schema) -> Reading {
        let pressure = LittleEndian::read_i32(&data[0..4]);
        let setpoint = LittleEndian::read_i32(&data[4..8]);

        match schema {
            Schema::TwoField => Reading::new(pressure, setpoint),
            Schema::ThreeField => {
                let output = LittleEndian::read_f32(&data[8..12]);
                Reading::with_output(pressure, setpoint, output)
            }
        }
    }

    /// Encode a reading into a payload for `schema`
    ///
    /// Inverse of `decode`; a missing output is sent as `0.0` in the
    /// three-field schema and an output is dropped in the two-field schema.
    pub fn encode(reading: &Reading, schema: Schema) -> Vec<u8> {
        let mut buf = [0u8; 12];
        LittleEndian::write_i32(&mut buf[0..4], reading.pressure);
        LittleEndian::write_i32(&mut buf[4..8], reading.setpoint);
        if schema.has_output() {
            LittleEndian::write_f32(&mut buf[8..12], reading.output.unwrap_or(0.0));
        }

        buf[..schema.payload_len()].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_field() {
        let frame = Frame::new(vec![0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00]);
        let reading = RecordDecoder::decode(&frame, Schema::TwoField);

        assert_eq!(reading, Reading::new(1, 2));
    }

    #[test]
    fn test_decode_negative_values() {
        let frame = Frame::new(vec![0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x80]);
        let reading = RecordDecoder::decode(&frame, Schema::TwoField);

        assert_eq!(reading.pressure, -1);
        assert_eq!(reading.setpoint, i32::MIN);
    }

    #[test]
    fn test_decode_three_field() {
        // 1.5f32 = 0x3FC00000
        let frame = Frame::new(vec![
            0x14, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x3F,
        ]);
        let reading = RecordDecoder::decode(&frame, Schema::ThreeField);

        assert_eq!(reading, Reading::with_output(20, 15, 1.5));
    }

    #[test]
    fn test_encode_matches_wire_layout() {
        let payload = RecordDecoder::encode(&Reading::with_output(20, 15, 1.5), Schema::ThreeField);
        assert_eq!(
            payload,
            vec![0x14, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x3F]
        );

        let payload = RecordDecoder::encode(&Reading::with_output(1, 2, 9.0), Schema::TwoField);
        assert_eq!(payload.len(), 8);
    }

    #[test]
    fn test_try_decode_two_field_frame_as_three_field() {
        let frame = Frame::new(RecordDecoder::encode(&Reading::new(1, 2), Schema::TwoField));

        assert!(RecordDecoder::try_decode(&frame, Schema::ThreeField).is_err());
        assert_eq!(
            RecordDecoder::try_decode(&frame, Schema::TwoField).unwrap(),
            Reading::new(1, 2)
        );
    }

    #[test]
    fn test_try_decode_rejects_wrong_length() {
        let frame = Frame::new(vec![0u8; 8]);
        let result = RecordDecoder::try_decode(&frame, Schema::ThreeField);

        assert!(matches!(
            result,
            Err(DecoderError::InvalidFrame {
                expected: 12,
                actual: 8
            })
        ));
    }
}
