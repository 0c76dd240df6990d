//! Token decoding and the main expansion loop
//!
//! A payload is a sequence of groups: one control byte followed by up to
//! eight tokens. Control bits are consumed least significant first; a set bit
//! is a literal byte, a clear bit a two-byte back-reference into the
//! dictionary.

use super::state::ExpandState;
use crate::common::{PakError, Result, MIN_MATCH_LENGTH, WINDOW_MASK};

impl ExpandState {
    /// Expand `payload` into exactly `target_len` bytes
    pub fn expand(&mut self, payload: &[u8], target_len: usize) -> Result<Vec<u8>> {
        self.reset();
        self.target_len = target_len;

        // The size field is untrusted; bound the reservation by what the payload can produce
        let capacity = target_len.min(payload.len().saturating_mul(MAX_EXPANSION));
        let mut output = Vec::with_capacity(capacity);

        while self.src_pos < payload.len() && self.dst_pos < target_len {
            let flag = payload[self.src_pos];
            self.src_pos += 1;
            self.stats.control_bytes += 1;

            for bit in 0..8 {
                if flag & (1 << bit) != 0 {
                    self.decode_literal(payload, &mut output)?;
                } else {
                    self.decode_back_reference(payload, &mut output)?;
                }

                if self.src_pos >= payload.len() || self.dst_pos >= target_len {
                    break;
                }
            }
        }

        self.stats.bytes_produced = output.len();
        if output.len() != target_len {
            return Err(self.corrupt(output.len()));
        }

        Ok(output)
    }

    /// Decode one literal token: copy a payload byte to the output and dictionary
    pub fn decode_literal(&mut self, payload: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let byte = self
            .next_byte(payload)
            .ok_or_else(|| self.corrupt(output.len()))?;

        self.emit(byte, output);
        self.dst_pos += 1;
        self.stats.literal_count += 1;
        Ok(())
    }

    /// Decode one back-reference token: copy a run of 3..=18 bytes out of the dictionary
    pub fn decode_back_reference(&mut self, payload: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let (lo, hi) = match (self.next_byte(payload), self.next_byte(payload)) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return Err(self.corrupt(output.len())),
        };

        let offset = (lo as usize) | ((((hi >> 4) & 0xF) as usize) << 8);
        let length = (hi & 0xF) as usize + MIN_MATCH_LENGTH;

        // Source and destination may overlap; copy byte by byte
        for j in 0..length {
            let byte = self.window[(offset + j) & WINDOW_MASK];
            self.emit(byte, output);
        }

        self.dst_pos += length;
        self.stats.match_count += 1;
        self.stats.longest_match = self.stats.longest_match.max(length);
        Ok(())
    }

    fn next_byte(&mut self, payload: &[u8]) -> Option<u8> {
        let byte = payload.get(self.src_pos).copied()?;
        self.src_pos += 1;
        Some(byte)
    }

    fn emit(&mut self, byte: u8, output: &mut Vec<u8>) {
        self.window[self.window_pos] = byte;
        output.push(byte);
        self.window_pos = (self.window_pos + 1) & WINDOW_MASK;
    }

    fn corrupt(&self, actual: usize) -> PakError {
        PakError::CorruptPayload {
            index: 0,
            name: String::new(),
            expected: self.target_len,
            actual,
        }
    }
}

/// Upper bound of output bytes per payload byte (a 2-byte token yields 18)
const MAX_EXPANSION: usize = 9;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MAX_MATCH_LENGTH, WINDOW_START};

    #[test]
    fn test_single_literal() -> Result<()> {
        let mut state = ExpandState::new();
        let out = state.expand(&[0x01, b'q'], 1)?;
        assert_eq!(out, b"q");
        assert_eq!(state.window()[WINDOW_START], b'q');
        assert_eq!(state.window_pos(), WINDOW_START + 1);
        Ok(())
    }

    #[test]
    fn test_back_reference_into_zeroed_window() -> Result<()> {
        // Control 0x00, token offset 0x000 length 3
        let mut state = ExpandState::new();
        let out = state.expand(&[0x00, 0x00, 0x00], 3)?;
        assert_eq!(out, vec![0, 0, 0]);
        assert_eq!(state.stats().match_count, 1);
        Ok(())
    }

    #[test]
    fn test_overlapping_copy_repeats_last_byte() -> Result<()> {
        // Literal 'a' lands at 0xFEE; back-reference to 0xFEE length 5 reads its own output
        let payload = [0b0000_0001, b'a', 0xEE, 0xF2];
        let mut state = ExpandState::new();
        let out = state.expand(&payload, 6)?;
        assert_eq!(out, b"aaaaaa");
        Ok(())
    }

    #[test]
    fn test_longest_run() -> Result<()> {
        let mut state = ExpandState::new();
        let out = state.expand(&[0x00, 0x00, 0x0F], MAX_MATCH_LENGTH)?;
        assert_eq!(out.len(), MAX_MATCH_LENGTH);
        assert_eq!(state.stats().longest_match, MAX_MATCH_LENGTH);
        Ok(())
    }

    #[test]
    fn test_missing_literal_byte_is_corrupt() {
        let mut state = ExpandState::new();
        let err = state.expand(&[0x01], 1).unwrap_err();
        assert!(matches!(
            err,
            PakError::CorruptPayload {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_half_back_reference_is_corrupt() {
        let mut state = ExpandState::new();
        let err = state.expand(&[0x00, 0x12], 3).unwrap_err();
        assert!(matches!(err, PakError::CorruptPayload { expected: 3, .. }));
    }

    #[test]
    fn test_overshoot_is_corrupt() {
        // A 3-byte run against a 2-byte target
        let mut state = ExpandState::new();
        let err = state.expand(&[0x00, 0x00, 0x00], 2).unwrap_err();
        assert!(matches!(
            err,
            PakError::CorruptPayload {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_stops_at_target_inside_group() -> Result<()> {
        // Trailing bytes after the target is reached are ignored
        let mut state = ExpandState::new();
        let out = state.expand(&[0xFF, b'a', b'b', b'c', b'd'], 2)?;
        assert_eq!(out, b"ab");
        assert_eq!(state.stats().literal_count, 2);
        Ok(())
    }

    #[test]
    fn test_state_reuse_does_not_leak() -> Result<()> {
        let mut state = ExpandState::new();
        state.expand(&[0xFF, 1, 2, 3, 4, 5, 6, 7, 8], 8)?;
        // Reading back the slots written above must now see zeros
        let out = state.expand(&[0x00, 0xEE, 0xF5], 8)?;
        assert_eq!(out, vec![0; 8]);
        Ok(())
    }
}
