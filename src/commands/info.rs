//! Info command implementation.
//!
//! Decodes only the container and header of a trace and prints what the
//! recording was made with: metadata, threads, method count and duration.

use crate::parser::header::TraceHeader;
use crate::parser::trace::decode_header;
use anyhow::{Context, Result};
use log::info;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

/// Execute the info command
///
/// **Public** - main entry point called from main.rs
pub fn execute_info(input: &Path) -> Result<()> {
    info!("Reading trace header: {}", input.display());

    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read trace file {}", input.display()))?;
    let header = decode_header(&bytes).context("Failed to decode trace header")?;

    print!("{}", format_info(input, &header));
    Ok(())
}

/// Render the header summary shown by `info`
///
/// **Public** - separated from printing for tests
pub fn format_info(input: &Path, header: &TraceHeader) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "Trace: {}", input.display());
    let _ = writeln!(out, "  Samples:  {}", header.sample_count);
    let _ = writeln!(
        out,
        "  Duration: {:.3}s",
        header.duration_micros as f64 / 1_000_000.0
    );
    let _ = writeln!(out, "  Methods:  {}", header.methods.len().saturating_sub(1));
    let _ = writeln!(out, "  Threads:  {}", header.thread_names.len());
    for name in &header.thread_names {
        let _ = writeln!(out, "    - {}", name);
    }

    if !header.metadata.is_empty() {
        let _ = writeln!(out, "  Metadata:");
        for (key, value) in &header.metadata {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let _ = writeln!(out, "    {}: {}", key, text);
        }
    }

    out
}
