//! Forward-only byte cursor over a buffered archive
//!
//! The cursor never seeks backwards. The only lookahead it offers is the
//! two-byte signature check used by the archive walker.

use crate::common::{PakError, Result, SIGNATURE};

/// Sequential reader over an in-memory archive
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check whether the next two bytes are the entry signature, without consuming them
    pub fn peek_signature(&self) -> bool {
        self.data
            .get(self.pos..self.pos + SIGNATURE.len())
            .is_some_and(|bytes| bytes == SIGNATURE)
    }

    /// Consume exactly `n` bytes
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(PakError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available,
            });
        }

        let data = self.data;
        let bytes = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Current offset from the start of the input
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
