//! JSON profile output writer.
//!
//! Writes any serializable profile document to JSON files, pretty or
//! compact.

use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a profile to a pretty-printed JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `profile` - Profile data to write
/// * `output_path` - Path to output JSON file
///
/// # Returns
/// Ok if file written successfully
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let document = decode(&bytes)?;
/// write_profile(&document, "client.rp.gecko_profile.json")?;
/// ```
pub fn write_profile<T: Serialize + ?Sized>(
    profile: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_with(profile, output_path.as_ref(), true)
}

/// Write profile as compact JSON (no formatting)
///
/// **Public** - profiles get large; the viewer does not care about layout
pub fn write_profile_compact<T: Serialize + ?Sized>(
    profile: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_with(profile, output_path.as_ref(), false)
}

/// Write profile to a string (for testing or in-memory use)
///
/// **Public** - useful for tests and debugging
pub fn profile_to_string<T: Serialize + ?Sized>(profile: &T) -> Result<String, OutputError> {
    serde_json::to_string_pretty(profile).map_err(OutputError::SerializationFailed)
}

/// **Private** - shared body of the two file writers
fn write_with<T: Serialize + ?Sized>(
    profile: &T,
    output_path: &Path,
    pretty: bool,
) -> Result<(), OutputError> {
    info!("Writing profile to: {}", output_path.display());

    validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, profile)
    } else {
        serde_json::to_writer(&mut writer, profile)
    };
    written.map_err(OutputError::SerializationFailed)?;

    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "Profile written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Validate that output path is writable
///
/// **Public** - commands check the path before spending time on a decode
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path or an existing directory
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Parent directory will be created: {}", parent.display());
        }
    }

    Ok(())
}

/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
