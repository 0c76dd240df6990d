//! Expansion state management
//!
//! This module holds the sliding dictionary and the position counters used
//! while expanding a single payload.

use crate::common::{ExpandStats, WINDOW_SIZE, WINDOW_START};

/// Decompression state for one payload
#[derive(Debug, Clone)]
pub struct ExpandState {
    /// Circular dictionary of recently produced bytes
    pub(crate) window: [u8; WINDOW_SIZE],
    /// Next dictionary slot to write
    pub(crate) window_pos: usize,
    /// Bytes consumed from the payload
    pub(crate) src_pos: usize,
    /// Output counter used for termination (bumped once per token)
    pub(crate) dst_pos: usize,
    /// Declared output length of the payload being expanded
    pub(crate) target_len: usize,
    /// Token statistics
    pub(crate) stats: ExpandStats,
}

impl ExpandState {
    /// Create a new state with a zeroed dictionary
    pub fn new() -> Self {
        Self {
            window: [0; WINDOW_SIZE],
            window_pos: WINDOW_START,
            src_pos: 0,
            dst_pos: 0,
            target_len: 0,
            stats: ExpandStats::default(),
        }
    }

    /// Return the state to its initial condition so no dictionary content
    /// carries over between payloads
    pub fn reset(&mut self) {
        self.window.fill(0);
        self.window_pos = WINDOW_START;
        self.src_pos = 0;
        self.dst_pos = 0;
        self.target_len = 0;
        self.stats = ExpandStats::default();
    }

    /// Dictionary contents
    pub fn window(&self) -> &[u8; WINDOW_SIZE] {
        &self.window
    }

    /// Next dictionary slot that will be written
    pub fn window_pos(&self) -> usize {
        self.window_pos
    }

    /// Statistics gathered by the last expansion
    pub fn stats(&self) -> &ExpandStats {
        &self.stats
    }
}

impl Default for ExpandState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ExpandState::new();
        assert_eq!(state.window_pos(), 0xFEE);
        assert!(state.window().iter().all(|&b| b == 0));
        assert_eq!(state.stats(), &ExpandStats::default());
    }

    #[test]
    fn test_reset_clears_dictionary() {
        let mut state = ExpandState::new();
        state.window[10] = 0xAA;
        state.window_pos = 12;
        state.src_pos = 5;
        state.dst_pos = 9;
        state.stats.literal_count = 3;

        state.reset();

        assert_eq!(state.window[10], 0);
        assert_eq!(state.window_pos, WINDOW_START);
        assert_eq!(state.src_pos, 0);
        assert_eq!(state.dst_pos, 0);
        assert_eq!(state.stats.literal_count, 0);
    }
}
