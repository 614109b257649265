//! Convert command implementation.
//!
//! The convert command:
//! 1. Reads the trace file
//! 2. Decodes container, header and sample stream
//! 3. Assembles the Gecko profile
//! 4. Writes the JSON output

use crate::output::{validate_path, write_profile, write_profile_compact};
use crate::parser::trace::{decode_trace, to_profile};
use crate::utils::config::{DecodeOptions, MemoryTotal, OUTPUT_SUFFIX};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Trace file to decode
    pub input: PathBuf,

    /// Output path for the JSON profile (None = next to the input)
    pub output: Option<PathBuf>,

    /// How each tick's memory total is computed
    pub memory_total: MemoryTotal,

    /// Write JSON without indentation
    pub compact: bool,
}

impl ConvertArgs {
    /// Output path, falling back to `<input file name>.gecko_profile.json`
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output_path(&self.input),
        }
    }
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Convert command arguments
///
/// # Returns
/// Path of the written profile
///
/// # Errors
/// * Input file cannot be read
/// * Trace decoding errors
/// * File write errors
pub fn execute_convert(args: &ConvertArgs) -> Result<PathBuf> {
    let started = Instant::now();
    let output_path = args.output_path();

    info!("Converting trace: {}", args.input.display());

    info!("Step 1/3: Reading trace file...");
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read trace file {}", args.input.display()))?;
    debug!("Read {} bytes", bytes.len());

    info!("Step 2/3: Decoding trace...");
    let options = DecodeOptions::default()
        .with_memory_total(args.memory_total)
        .with_start_time(chrono::Utc::now().timestamp_millis() as f64);
    let trace = decode_trace(&bytes, &options).context("Failed to decode trace")?;

    for thread in &trace.threads {
        debug!(
            "Thread {:?}: {} samples, {} stacks, {} frames, {} markers",
            thread.name,
            thread.samples.length,
            thread.stack_table.length,
            thread.frame_table.length,
            thread.markers.length
        );
    }

    info!("Step 3/3: Writing profile...");
    let profile = to_profile(&trace);
    let written = if args.compact {
        write_profile_compact(&profile, &output_path)
    } else {
        write_profile(&profile, &output_path)
    };
    written.context("Failed to write profile JSON")?;

    info!("✓ Profile written to: {}", output_path.display());
    info!(
        "Convert completed in {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(output_path)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input trace not found: {}", args.input.display());
    }

    let output_path = args.output_path();
    validate_path(&output_path).context("Invalid output path")?;

    if output_path == args.input {
        anyhow::bail!("Output path would overwrite the input trace");
    }

    Ok(())
}

/// Default output path for a trace: the input file name plus the profile suffix
///
/// **Public** - used by ConvertArgs and tests
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "trace".into());
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}
