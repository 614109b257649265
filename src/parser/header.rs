//! Header section decoding.
//!
//! Counts, a free-form JSON metadata blob, thread names and the method table.

use super::cursor::ByteCursor;
use crate::utils::config::UNRESOLVED_METHOD;
use crate::utils::error::DecodeError;
use log::{debug, warn};
use serde_json::{Map, Value};

/// Decoded header section
#[derive(Debug, Clone)]
pub struct TraceHeader {
    /// Number of ticks in the sample section
    pub sample_count: usize,

    /// Wall time covered by the recording
    pub duration_micros: u64,

    /// Arbitrary key/value metadata recorded alongside the trace
    pub metadata: Map<String, Value>,

    /// Sampled threads, in the order their samples appear in every tick
    pub thread_names: Vec<String>,

    pub methods: MethodTable,
}

impl TraceHeader {
    /// Metadata value as display text, numbers included
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Dense method display names indexed by method id
///
/// Index 0 always holds the unresolved sentinel.
#[derive(Debug, Clone)]
pub struct MethodTable {
    names: Vec<String>,
}

impl MethodTable {
    pub fn with_count(count: usize) -> Self {
        Self {
            names: vec![UNRESOLVED_METHOD.to_string(); count + 1],
        }
    }

    /// Store a method; ids past the declared count are dropped
    pub fn insert(&mut self, id: u32, name: String) -> bool {
        let index = id as usize;
        if index == 0 || index >= self.names.len() {
            return false;
        }
        self.names[index] = name;
        true
    }

    /// Display name for a method id, or the sentinel
    pub fn name(&self, id: u32) -> &str {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .unwrap_or(UNRESOLVED_METHOD)
    }

    /// Number of slots including the sentinel
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

/// Parse the decompressed header section
///
/// **Public** - second stage of every decode
///
/// # Errors
/// * `DecodeError::TruncatedInput` - a count, string or record runs off the end
/// * `DecodeError::InvalidMetadata` - the metadata blob is not a JSON object
pub fn parse_header(cursor: &mut ByteCursor<'_>) -> Result<TraceHeader, DecodeError> {
    let sample_count = cursor.len_u64()?;
    let duration_micros = cursor.u64()?;
    let metadata_len = cursor.len_u64()?;
    let thread_count = cursor.len_u64()?;
    let method_count = cursor.len_u64()?;

    debug!(
        "Header: {} samples over {}us, {} threads, {} methods",
        sample_count, duration_micros, thread_count, method_count
    );

    let metadata_offset = cursor.offset();
    let metadata = parse_metadata(cursor.bytes(metadata_len)?, metadata_offset)?;

    let thread_names = (0..thread_count)
        .map(|_| cursor.cstr())
        .collect::<Result<Vec<_>, _>>()?;

    // Counts come from the file; don't let a corrupt one drive a huge allocation
    if method_count > cursor.remaining() {
        return Err(DecodeError::TruncatedInput {
            offset: cursor.offset(),
            needed: method_count,
            available: cursor.remaining(),
        });
    }

    let mut methods = MethodTable::with_count(method_count);
    for _ in 0..method_count {
        let id = cursor.u32()?;
        let class_name = cursor.cstr()?;
        let method_name = cursor.cstr()?;
        let signature = cursor.cstr()?;

        let display = format!("{}::{}{}", strip_descriptor(&class_name), method_name, signature);
        if !methods.insert(id, display) {
            warn!("Ignoring method record with out-of-range id {}", id);
        }
    }

    Ok(TraceHeader {
        sample_count,
        duration_micros,
        metadata,
        thread_names,
        methods,
    })
}

/// Parse the metadata blob as a JSON object
///
/// **Private** - internal helper for parse_header
fn parse_metadata(raw: &[u8], offset: usize) -> Result<Map<String, Value>, DecodeError> {
    let text = String::from_utf8_lossy(raw);
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DecodeError::InvalidMetadata {
            offset,
            source: <serde_json::Error as serde::de::Error>::custom(format!(
                "expected an object, found {}",
                other
            )),
        }),
        Err(source) => Err(DecodeError::InvalidMetadata { offset, source }),
    }
}

/// Drop the leading `L` and trailing `;` of a class descriptor
///
/// **Private** - operates on characters, never splits a code point
fn strip_descriptor(class_name: &str) -> &str {
    let mut chars = class_name.char_indices();
    let start = match chars.next() {
        Some((_, c)) => c.len_utf8(),
        None => return "",
    };
    let end = match chars.next_back() {
        Some((i, _)) => i,
        None => return "",
    };
    &class_name[start..end]
}
