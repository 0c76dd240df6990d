//! Entry framing and decoding
//!
//! Each entry is a 12-byte big-endian header, the entry name and the stored
//! payload:
//!
//! | Field | Size |
//! |---|---|
//! | signature `ZH` | 2 |
//! | compressed size | 4 |
//! | decompressed size | 4 |
//! | name length | 2 |
//! | name (UTF-8) | name length |
//! | payload | compressed size |
//!
//! A payload whose two sizes are equal is stored verbatim; otherwise it is
//! expanded with [`crate::expand`].

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};
use std::io::Cursor;

use crate::common::{PakError, Result, HEADER_SIZE, SIGNATURE};
use crate::cursor::ByteCursor;
use crate::expand::ExpandState;

/// Fixed entry header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Payload length as stored
    pub compressed_size: u32,
    /// Required length after decoding
    pub decompressed_size: u32,
    /// Length of the name field
    pub name_length: u16,
}

impl EntryHeader {
    /// Entry signature
    pub const SIGNATURE: [u8; 2] = SIGNATURE;
    /// Header size in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Parse a header from its 12 raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(PakError::TruncatedInput {
                offset: 0,
                needed: Self::SIZE,
                available: data.len(),
            });
        }

        if data[0..2] != Self::SIGNATURE {
            return Err(PakError::InvalidFormat);
        }

        let mut cursor = Cursor::new(&data[2..Self::SIZE]);

        Ok(Self {
            compressed_size: cursor.read_u32::<BigEndian>()?,
            decompressed_size: cursor.read_u32::<BigEndian>()?,
            name_length: cursor.read_u16::<BigEndian>()?,
        })
    }

    /// Whether the payload must go through the expander
    pub fn is_compressed(&self) -> bool {
        self.compressed_size != self.decompressed_size
    }
}

/// An entry whose extents have been read but whose payload is not decoded yet
#[derive(Debug, Clone)]
pub struct RawEntry<'a> {
    /// Zero-based position in the archive
    pub index: usize,
    /// Offset of the signature within the archive
    pub offset: usize,
    /// Parsed header
    pub header: EntryHeader,
    /// Output-relative path
    pub name: String,
    /// Stored payload bytes
    pub payload: &'a [u8],
}

impl RawEntry<'_> {
    /// Decode the payload into an [`Entry`]
    pub fn decode(self) -> Result<Entry> {
        let data = decode_payload(self.payload, &self.header, &mut ExpandState::new())
            .map_err(|e| e.in_entry(self.index, &self.name))?;

        Ok(Entry {
            index: self.index,
            name: self.name,
            header: self.header,
            data,
        })
    }
}

/// A fully decoded entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Zero-based position in the archive
    pub index: usize,
    /// Output-relative path
    pub name: String,
    /// Parsed header
    pub header: EntryHeader,
    /// Decoded bytes, exactly `header.decompressed_size` long
    pub data: Vec<u8>,
}

/// Read one entry's header, name and payload without decoding the payload
///
/// The caller is expected to have checked the signature with
/// [`ByteCursor::peek_signature`].
pub fn read_entry<'a>(cursor: &mut ByteCursor<'a>, index: usize) -> Result<RawEntry<'a>> {
    let offset = cursor.position();
    let header = EntryHeader::from_bytes(cursor.read(EntryHeader::SIZE)?)?;

    let name_bytes = cursor.read(header.name_length as usize)?;
    let name = std::str::from_utf8(name_bytes)
        .map_err(|source| PakError::InvalidEncoding { index, source })?
        .to_string();

    debug!("processing file: {name}");

    let payload = cursor.read(header.compressed_size as usize)?;

    Ok(RawEntry {
        index,
        offset,
        header,
        name,
        payload,
    })
}

/// Read and decode one entry
pub fn decode_entry(cursor: &mut ByteCursor<'_>, index: usize) -> Result<Entry> {
    read_entry(cursor, index)?.decode()
}

/// Turn a stored payload into its decoded bytes, checking the declared size
pub(crate) fn decode_payload(
    payload: &[u8],
    header: &EntryHeader,
    state: &mut ExpandState,
) -> Result<Vec<u8>> {
    let expected = header.decompressed_size as usize;

    if !header.is_compressed() {
        debug!("  not compressed");
        return Ok(payload.to_vec());
    }

    debug!("  compressed");
    let data = state.expand(payload, expected)?;
    trace!("  {:?}", state.stats());
    Ok(data)
}
