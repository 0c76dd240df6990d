//! zhpak - Rust extractor for ZH PAK archives
//!
//! A ZH PAK file is a plain concatenation of entries. Each entry carries a
//! 12-byte big-endian header (`ZH` signature, stored size, decoded size,
//! name length), a UTF-8 name and a payload. Payloads whose stored and decoded
//! sizes differ are LZSS streams over a 4096-byte sliding dictionary.
//!
//! # Features
//!
//! - Byte-exact LZSS expansion (4KB window, initial write position `0xFEE`)
//! - Strict framing: truncation, bad names and size mismatches are fatal
//! - Filesystem and in-memory sinks, with path traversal protection
//! - Streaming iteration over entries
//! - Optional parallel extraction behind the `async` feature
//!
//! # Example
//!
//! ```no_run
//! use zhpak::{extract_file, unpack_bytes, ExtractOptions};
//!
//! // Extract straight to disk
//! let stats = extract_file("data.pak", "out", &ExtractOptions::new())?;
//! println!("{} entries", stats.entries);
//!
//! // Or decode in memory
//! let archive = std::fs::read("data.pak")?;
//! for (name, data) in unpack_bytes(&archive)? {
//!     println!("{name}: {} bytes", data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod archive;
pub mod common;
pub mod cursor;
pub mod entry;
pub mod error;
pub mod expand;
pub mod sink;

// Async module (only available with async feature)
#[cfg(feature = "async")]
pub mod async_extract;

// Re-export commonly used types
pub use archive::{extract_file, prepare_output_dir, EntryInfo, ExtractOptions, PakReader};
pub use common::{
    ExpandStats, ExtractStats, PakError, Result, HEADER_SIZE, MAX_MATCH_LENGTH, MIN_MATCH_LENGTH,
    SIGNATURE, WINDOW_SIZE, WINDOW_START,
};
pub use cursor::ByteCursor;
pub use entry::{decode_entry, read_entry, Entry, EntryHeader, RawEntry};
pub use expand::{expand_bytes_with_stats, ExpandState};
pub use sink::{DirectorySink, EntrySink, MemorySink, PathSafety};

#[cfg(feature = "async")]
pub use async_extract::AsyncExtractor;

// Convenience functions

/// Expand an LZSS payload
///
/// # Arguments
/// * `payload` - The stored payload bytes
/// * `target_len` - The declared decompressed size
///
/// # Returns
/// Exactly `target_len` bytes, or [`PakError::CorruptPayload`]
pub fn expand_bytes(payload: &[u8], target_len: usize) -> Result<Vec<u8>> {
    expand::expand_bytes(payload, target_len)
}

/// Decode every entry of an in-memory archive
///
/// # Arguments
/// * `archive` - The whole PAK file
///
/// # Returns
/// `(name, data)` pairs in archive order
pub fn unpack_bytes(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut sink = MemorySink::new();
    PakReader::new(archive).extract_to(&mut sink)?;
    Ok(sink.entries)
}
