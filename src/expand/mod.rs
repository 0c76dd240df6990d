//! Sliding-window expansion (decompression)
//!
//! Payloads whose stored size differs from their decoded size are LZSS
//! streams over a 4096-byte dictionary whose write cursor starts at `0xFEE`.
//! Back-references carry a 12-bit absolute dictionary offset and a 4-bit run
//! length biased by three.

mod decoder;
mod state;

pub use state::ExpandState;

use crate::common::ExpandStats;
use crate::Result;

/// Expand an LZSS payload into exactly `target_len` bytes
pub fn expand_bytes(payload: &[u8], target_len: usize) -> Result<Vec<u8>> {
    ExpandState::new().expand(payload, target_len)
}

/// Expand an LZSS payload and return the token statistics alongside it
pub fn expand_bytes_with_stats(payload: &[u8], target_len: usize) -> Result<(Vec<u8>, ExpandStats)> {
    let mut state = ExpandState::new();
    let output = state.expand(payload, target_len)?;
    Ok((output, state.stats().clone()))
}
