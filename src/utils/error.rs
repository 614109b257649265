//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Trace section names, used to say which decompression failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Samples,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Header => f.write_str("header"),
            Section::Samples => f.write_str("sample"),
        }
    }
}

/// Errors that can occur while decoding a trace
///
/// Every variant is fatal: a decode either yields a complete profile or one of these.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Bad magic: expected {expected:#06x} in either byte order, found bytes {found:02x?}")]
    MalformedContainer { expected: u16, found: [u8; 2] },

    #[error("Truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unknown marker tag {tag:#x} at offset {offset}")]
    UnknownMarkerTag { tag: u32, offset: usize },

    #[error("Metadata at offset {offset} is not a valid JSON object: {source}")]
    InvalidMetadata {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decompress {section} section: {source}")]
    Decompress {
        section: Section,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
