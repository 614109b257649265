//! Per-thread aggregation of decoded samples.
//!
//! This module holds the state the sample stream is folded into:
//! - The fixed category taxonomy and synthetic frame ids
//! - Per-thread interning tables (stacks, frames, functions, strings)
//! - The memory counter track

pub mod categories;
pub mod memory;
pub mod thread;

// Re-export main types
pub use categories::{CategoryPair, CategoryTaxonomy};
pub use memory::{MemorySnapshot, MemoryTrack};
pub use thread::{FrameResolver, StringTable, ThreadModel};
