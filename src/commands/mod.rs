//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod info;
pub mod utils;

// Re-export main command functions
pub use convert::{default_output_path, execute_convert, validate_args, ConvertArgs};
pub use info::{execute_info, format_info};
pub use utils::display_version;
