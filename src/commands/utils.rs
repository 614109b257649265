use crate::utils::config::{GECKO_VERSION, PREPROCESSED_PROFILE_VERSION, TRACE_MAGIC};

/// Display version information
pub fn display_version() {
    println!("RP Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Gecko profile: v{} (processed v{})",
        GECKO_VERSION, PREPROCESSED_PROFILE_VERSION
    );
    println!("Trace magic: {:#06x}", TRACE_MAGIC);
    println!();
    println!("Converts RP sampling-profiler traces for the Firefox Profiler.");
}
