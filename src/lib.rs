//! RP Trace Studio
//!
//! Decodes zstd-compressed "RP" sampling-profiler traces into Gecko
//! processed-profile JSON, ready to load in the Firefox Profiler.
//!
//! This crate provides the core implementation for the
//! `rp-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! rp-trace convert --input client.rp
//! rp-trace info --input client.rp
//! ```
//!
//! As a library, `decode` is a pure transform from trace bytes to a
//! serializable document:
//!
//! ```ignore
//! let document = rp_trace_studio::decode(&std::fs::read("client.rp")?)?;
//! let json = serde_json::to_string(&document)?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

use parser::schema::Profile;
use parser::trace::{decode_trace, to_profile, ParsedTrace};
use serde::{Serialize, Serializer};
use utils::config::DecodeOptions;
use utils::error::DecodeError;

/// A fully decoded trace that serializes as a Gecko profile
///
/// Owns every table; `profile()` borrows them into the output layout.
#[derive(Debug, Clone)]
pub struct Document {
    trace: ParsedTrace,
}

impl Document {
    /// Borrow the document in its output layout
    pub fn profile(&self) -> Profile<'_> {
        to_profile(&self.trace)
    }

    pub fn trace(&self) -> &ParsedTrace {
        &self.trace
    }

    pub fn into_trace(self) -> ParsedTrace {
        self.trace
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.profile().serialize(serializer)
    }
}

/// Decode a trace with default options
///
/// **Public** - pure transform, `meta.startTime` is 0
///
/// # Errors
/// Any `DecodeError`; a corrupt tick fails the whole decode
pub fn decode(bytes: &[u8]) -> Result<Document, DecodeError> {
    decode_with_options(bytes, &DecodeOptions::default())
}

/// Decode a trace with explicit options
///
/// **Public** - used by the convert command
pub fn decode_with_options(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Document, DecodeError> {
    let trace = decode_trace(bytes, options)?;
    Ok(Document { trace })
}
