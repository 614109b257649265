//! Outer container of a trace file.
//!
//! Layout: 2 byte magic, 8 byte header length, zstd header section,
//! zstd sample section running to the end of the file. The magic is also
//! the only source of truth for the byte order of everything after it.

use super::cursor::{ByteCursor, ByteOrder};
use crate::utils::config::{CONTAINER_PREAMBLE_LEN, TRACE_MAGIC};
use crate::utils::error::{DecodeError, Section};
use log::debug;

/// Both sections of a trace, decompressed, plus the detected byte order
#[derive(Debug, Clone)]
pub struct Container {
    pub order: ByteOrder,
    pub header: Vec<u8>,
    pub samples: Vec<u8>,
}

/// Split and decompress a raw trace buffer
///
/// **Public** - first stage of every decode
///
/// # Errors
/// * `DecodeError::MalformedContainer` - magic matches in neither byte order
/// * `DecodeError::TruncatedInput` - header length runs past the buffer
/// * `DecodeError::Decompress` - either section is not a valid zstd stream
pub fn open_container(bytes: &[u8]) -> Result<Container, DecodeError> {
    let order = detect_byte_order(bytes)?;

    let mut cursor = ByteCursor::new(bytes, order);
    cursor.bytes(2)?;
    let header_len = cursor.len_u64()?;

    let header_start = CONTAINER_PREAMBLE_LEN;
    let header_end = header_start.checked_add(header_len).filter(|end| *end <= bytes.len());
    let Some(header_end) = header_end else {
        return Err(DecodeError::TruncatedInput {
            offset: header_start,
            needed: header_len,
            available: bytes.len() - header_start,
        });
    };

    debug!(
        "Container: {:?} endian, {} byte header section, {} byte sample section",
        order,
        header_len,
        bytes.len() - header_end
    );

    let header = decompress_section(Section::Header, &bytes[header_start..header_end])?;
    let samples = decompress_section(Section::Samples, &bytes[header_end..])?;

    debug!(
        "Decompressed sections: header {} bytes, samples {} bytes",
        header.len(),
        samples.len()
    );

    Ok(Container {
        order,
        header,
        samples,
    })
}

/// Probe the magic little-endian first, then big-endian
///
/// **Public** - also used by tests to check the probe in isolation
pub fn detect_byte_order(bytes: &[u8]) -> Result<ByteOrder, DecodeError> {
    let mut probe = ByteCursor::new(bytes, ByteOrder::Little);
    let found = probe.bytes(2)?;
    let found = [found[0], found[1]];

    if u16::from_le_bytes(found) == TRACE_MAGIC {
        Ok(ByteOrder::Little)
    } else if u16::from_be_bytes(found) == TRACE_MAGIC {
        Ok(ByteOrder::Big)
    } else {
        Err(DecodeError::MalformedContainer {
            expected: TRACE_MAGIC,
            found,
        })
    }
}

/// Inflate one zstd section
///
/// **Private** - the codec is treated as a black box
fn decompress_section(section: Section, compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    zstd::stream::decode_all(compressed).map_err(|source| DecodeError::Decompress { section, source })
}
