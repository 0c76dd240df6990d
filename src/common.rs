//! Common types and constants for the ZH PAK container format
//!
//! This module defines the error type, format constants and statistics shared
//! by the entry decoder, the archive walker and the sliding-window expander.

use std::path::PathBuf;
use thiserror::Error;

/// Entry signature, `ZH` (0x5A 0x48)
pub const SIGNATURE: [u8; 2] = *b"ZH";

/// Size of the fixed entry header in bytes
pub const HEADER_SIZE: usize = 12;

/// Size of the sliding dictionary (4096 bytes)
pub const WINDOW_SIZE: usize = 0x1000;

/// Mask applied to dictionary positions
pub const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Initial dictionary write position
pub const WINDOW_START: usize = 0xFEE;

/// Shortest run a back-reference can encode
pub const MIN_MATCH_LENGTH: usize = 3;

/// Longest run a back-reference can encode
pub const MAX_MATCH_LENGTH: usize = 0xF + MIN_MATCH_LENGTH; // 18 bytes

/// Error type for PAK operations
#[derive(Debug, Error)]
pub enum PakError {
    /// Fewer bytes remain than a header, name or payload field requires
    #[error("Truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Cursor offset where the read started
        offset: usize,
        /// Bytes the field requires
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// An entry name is not valid UTF-8
    #[error("Entry #{index} has a name that is not valid UTF-8")]
    InvalidEncoding {
        /// Zero-based entry index
        index: usize,
        /// Underlying decoding error
        #[source]
        source: std::str::Utf8Error,
    },

    /// Decoded size does not match the declared size
    #[error("Entry #{index} ({name}) is corrupt: expected {expected} bytes, produced {actual}")]
    CorruptPayload {
        /// Zero-based entry index
        index: usize,
        /// Entry name
        name: String,
        /// Declared decompressed size
        expected: usize,
        /// Bytes actually produced
        actual: usize,
    },

    /// No entry could be decoded from the input
    #[error("Invalid package format: no entries found")]
    InvalidFormat,

    /// The sink could not create a directory or write a file
    #[error("Cannot write output '{}': {source}", .path.display())]
    OutputUnwritable {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Entry name escapes the output directory
    #[error("Entry #{index} has an unsafe path: {name}")]
    UnsafePath {
        /// Zero-based entry index
        index: usize,
        /// Entry name as stored in the archive
        name: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PakError {
    /// Attach an entry index and name to errors raised below the walker
    pub(crate) fn in_entry(self, index: usize, name: &str) -> Self {
        match self {
            PakError::CorruptPayload {
                expected, actual, ..
            } => PakError::CorruptPayload {
                index,
                name: name.to_string(),
                expected,
                actual,
            },
            PakError::InvalidEncoding { source, .. } => PakError::InvalidEncoding { index, source },
            PakError::UnsafePath { .. } => PakError::UnsafePath {
                index,
                name: name.to_string(),
            },
            other => other,
        }
    }
}

/// Result type alias for PAK operations
pub type Result<T> = std::result::Result<T, PakError>;

/// Statistics collected while expanding one payload
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpandStats {
    /// Number of control bytes consumed
    pub control_bytes: usize,
    /// Number of literal tokens decoded
    pub literal_count: usize,
    /// Number of back-reference tokens decoded
    pub match_count: usize,
    /// Longest back-reference run
    pub longest_match: usize,
    /// Total bytes produced
    pub bytes_produced: usize,
}

/// Totals for a whole archive walk
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractStats {
    /// Entries decoded and handed to the sink
    pub entries: usize,
    /// Entries whose payload went through the expander
    pub compressed_entries: usize,
    /// Sum of payload sizes as stored
    pub input_bytes: u64,
    /// Sum of decoded sizes
    pub output_bytes: u64,
}
