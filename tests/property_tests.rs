//! Property-based tests for zhpak
//!
//! These tests use randomized inputs to verify framing and expansion across a
//! wide range of archives and payloads.

use proptest::prelude::*;
use zhpak::{expand_bytes, unpack_bytes, PakError, PakReader};

fn entry(name: &str, compressed: u32, decompressed: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = b"ZH".to_vec();
    out.extend_from_slice(&compressed.to_be_bytes());
    out.extend_from_slice(&decompressed.to_be_bytes());
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Encode `data` as a literal-only stream (every control bit set)
fn literal_stream(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    for chunk in data.chunks(8) {
        out.push(0xFF);
        out.extend_from_slice(chunk);
    }
    out
}

proptest! {
    #[test]
    fn test_expansion_never_panics(
        payload in prop::collection::vec(any::<u8>(), 0..1000),
        target in 0..5000usize
    ) {
        // Random payloads are rarely valid, but must only ever fail with CorruptPayload
        match expand_bytes(&payload, target) {
            Ok(out) => prop_assert_eq!(out.len(), target),
            Err(e) => prop_assert!(
                matches!(e, PakError::CorruptPayload { .. }),
                "unexpected error: {:?}",
                e
            ),
        }
    }
}

proptest! {
    #[test]
    fn test_walking_never_panics(data in prop::collection::vec(any::<u8>(), 0..1000)) {
        let _ = unpack_bytes(&data);

        let mut prefixed = b"ZH".to_vec();
        prefixed.extend_from_slice(&data);
        let _ = unpack_bytes(&prefixed);
    }
}

proptest! {
    #[test]
    fn test_stored_entries_round_trip(
        files in prop::collection::vec(
            ("[a-z]{1,8}(/[a-z]{1,8}){0,2}", prop::collection::vec(any::<u8>(), 0..300)),
            1..8
        )
    ) {
        let mut archive = Vec::new();
        for (name, data) in &files {
            archive.extend(entry(name, data.len() as u32, data.len() as u32, data));
        }

        let entries = unpack_bytes(&archive)?;
        prop_assert_eq!(entries, files);
    }
}

proptest! {
    #[test]
    fn test_literal_streams_decode_verbatim(data in prop::collection::vec(any::<u8>(), 1..2000)) {
        let stream = literal_stream(&data);
        let out = expand_bytes(&stream, data.len())?;
        prop_assert_eq!(out, data);
    }
}

proptest! {
    #[test]
    fn test_single_byte_runs(byte_value in any::<u8>(), runs in 1..50usize) {
        // One literal, then back-references that keep copying it
        let mut stream = vec![0x01, byte_value];
        let mut remaining = runs;
        let mut first_group = true;
        while remaining > 0 {
            let tokens = if first_group { remaining.min(7) } else { remaining.min(8) };
            if !first_group {
                stream.push(0x00);
            }
            for _ in 0..tokens {
                // Offset 0xFEE, length 3
                stream.extend_from_slice(&[0xEE, 0xF0]);
            }
            remaining -= tokens;
            first_group = false;
        }

        let expected = vec![byte_value; 1 + runs * 3];
        let out = expand_bytes(&stream, expected.len())?;
        prop_assert_eq!(out, expected);
    }
}

proptest! {
    #[test]
    fn test_truncation_is_always_reported(
        data in prop::collection::vec(any::<u8>(), 1..200),
        cut in 1..200usize
    ) {
        let archive = entry("file.bin", data.len() as u32, data.len() as u32, &data);
        let cut = cut.min(archive.len() - 2);
        let truncated = &archive[..archive.len() - cut];

        let err = PakReader::new(truncated).list().unwrap_err();
        let truncated_input = matches!(err, PakError::TruncatedInput { .. });
        prop_assert!(truncated_input, "unexpected error: {:?}", err);
    }
}
