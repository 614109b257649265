//! RP Trace Studio CLI
//!
//! Converts compressed RP sampling-profiler traces into Gecko profiles
//! for the Firefox Profiler.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use rp_trace_studio::commands::{
    display_version, execute_convert, execute_info, validate_args, ConvertArgs,
};
use rp_trace_studio::utils::config::MemoryTotal;

/// RP Trace Studio - RP traces to Firefox Profiler JSON
#[derive(Parser, Debug)]
#[command(name = "rp-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a trace into a Gecko profile
    Convert {
        /// Trace file to decode
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON profile (default: <input>.gecko_profile.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Count only heap used in the memory track
        #[arg(long)]
        heap_only_memory: bool,

        /// Write JSON without indentation
        #[arg(long)]
        compact: bool,
    },

    /// Print a trace's header and metadata
    Info {
        /// Trace file to inspect
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Convert {
            input,
            output,
            heap_only_memory,
            compact,
        } => {
            let args = ConvertArgs {
                input,
                output,
                memory_total: if heap_only_memory {
                    MemoryTotal::HeapOnly
                } else {
                    MemoryTotal::HeapAndOffHeap
                },
                compact,
            };

            // Validate args first
            validate_args(&args)?;

            execute_convert(&args)?;
        }

        Commands::Info { input } => {
            execute_info(&input)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
