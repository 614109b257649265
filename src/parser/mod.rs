//! Trace decoding and output schema definitions.
//!
//! This module handles:
//! - Splitting and decompressing the container
//! - Decoding the header (metadata, threads, methods)
//! - Decoding the per-tick sample and marker streams
//! - Defining the Gecko output schema

pub mod container;
pub mod cursor;
pub mod header;
pub mod markers;
pub mod samples;
pub mod schema;
pub mod trace;

// Re-export main types
pub use cursor::{ByteCursor, ByteOrder};
pub use header::{MethodTable, TraceHeader};
pub use schema::Profile;
pub use trace::{decode_header, decode_trace, to_profile, ParsedTrace};
