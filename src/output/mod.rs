//! Output writers for profile data.
//!
//! This module handles writing Gecko profiles to disk as JSON, pretty or
//! compact.

pub mod json;

// Re-export main functions
pub use json::{profile_to_string, validate_path, write_profile, write_profile_compact};
