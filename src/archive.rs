//! Archive walking
//!
//! A PAK file is a plain concatenation of entries with no index or footer.
//! [`PakReader`] frames entries one after another until the next two bytes
//! are not the `ZH` signature, then checks that at least one entry was found.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::Path;

use crate::common::{ExtractStats, PakError, Result};
use crate::cursor::ByteCursor;
use crate::entry::{decode_payload, read_entry, Entry, EntryHeader, RawEntry};
use crate::expand::ExpandState;
use crate::sink::{DirectorySink, EntrySink, PathSafety};

/// Summary of one entry, as produced by [`PakReader::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Zero-based position in the archive
    pub index: usize,
    /// Offset of the entry signature
    pub offset: usize,
    /// Output-relative path
    pub name: String,
    /// Parsed header
    pub header: EntryHeader,
}

impl From<&RawEntry<'_>> for EntryInfo {
    fn from(raw: &RawEntry<'_>) -> Self {
        Self {
            index: raw.index,
            offset: raw.offset,
            name: raw.name.clone(),
            header: raw.header,
        }
    }
}

/// Sequential reader over an in-memory PAK archive
#[derive(Debug)]
pub struct PakReader<'a> {
    cursor: ByteCursor<'a>,
    index: usize,
    finished: bool,
}

impl<'a> PakReader<'a> {
    /// Create a reader over a buffered archive
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            index: 0,
            finished: false,
        }
    }

    /// Frame the next entry without decoding its payload
    ///
    /// Returns `None` once the signature is absent, or
    /// [`PakError::InvalidFormat`] if it is absent before the first entry.
    /// After an error the reader is finished.
    pub fn next_raw(&mut self) -> Option<Result<RawEntry<'a>>> {
        if self.finished {
            return None;
        }

        if !self.cursor.peek_signature() {
            self.finished = true;
            if self.index == 0 {
                return Some(Err(PakError::InvalidFormat));
            }
            if !self.cursor.is_empty() {
                debug!(
                    "ignoring {} trailing bytes at offset {}",
                    self.cursor.remaining(),
                    self.cursor.position()
                );
            }
            return None;
        }

        match read_entry(&mut self.cursor, self.index) {
            Ok(raw) => {
                self.index += 1;
                Some(Ok(raw))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    /// Decode every entry and hand it to `sink`
    pub fn extract_to<S: EntrySink>(mut self, mut sink: S) -> Result<ExtractStats> {
        let mut stats = ExtractStats::default();
        let mut state = ExpandState::new();

        while let Some(raw) = self.next_raw() {
            let raw = raw?;
            sink.begin_entry(&raw)?;
            let data = decode_payload(raw.payload, &raw.header, &mut state)
                .map_err(|e| e.in_entry(raw.index, &raw.name))?;

            sink.write_entry(raw.index, &raw.name, &data)
                .map_err(|e| e.in_entry(raw.index, &raw.name))?;

            stats.entries += 1;
            if raw.header.is_compressed() {
                stats.compressed_entries += 1;
            }
            stats.input_bytes += raw.header.compressed_size as u64;
            stats.output_bytes += data.len() as u64;
        }

        // An empty walk already failed in next_raw with InvalidFormat
        debug_assert!(stats.entries > 0);
        Ok(stats)
    }

    /// Frame every entry without decoding payloads
    pub fn list(mut self) -> Result<Vec<EntryInfo>> {
        let mut entries = Vec::new();
        while let Some(raw) = self.next_raw() {
            entries.push(EntryInfo::from(&raw?));
        }
        Ok(entries)
    }
}

impl Iterator for PakReader<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.next_raw()? {
            Ok(raw) => raw,
            Err(e) => return Some(Err(e)),
        };

        let decoded = raw.decode();
        if decoded.is_err() {
            self.finished = true;
        }
        Some(decoded)
    }
}

/// Options for extracting an archive to disk
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    path_safety: PathSafety,
}

impl ExtractOptions {
    /// Default options (strict path checks)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path safety policy
    pub fn with_path_safety(mut self, policy: PathSafety) -> Self {
        self.path_safety = policy;
        self
    }

    /// Configured path safety policy
    pub fn path_safety(&self) -> PathSafety {
        self.path_safety
    }
}

/// Prepare the output directory, creating it when missing
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        if !output_dir.is_dir() {
            return Err(PakError::OutputUnwritable {
                path: output_dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            });
        }
        return Ok(());
    }

    fs::create_dir_all(output_dir).map_err(|source| PakError::OutputUnwritable {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Extract a PAK file into `output_dir`
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractStats> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    prepare_output_dir(output_dir)?;

    info!("loading package file: {}", input.display());
    let data = fs::read(input)?;

    let sink = DirectorySink::new(output_dir).with_path_safety(options.path_safety());
    let stats = PakReader::new(&data).extract_to(sink)?;

    info!(
        "extracted {} entries ({} bytes) to {}",
        stats.entries,
        stats.output_bytes,
        output_dir.display()
    );
    Ok(stats)
}
