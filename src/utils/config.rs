//! Configuration and constants for the decoder and CLI.

/// Container magic, ASCII "RP" packed big-endian within the value
pub const TRACE_MAGIC: u16 = u16::from_be_bytes(*b"RP");

/// Byte offset of the compressed header section
/// (2 bytes of magic followed by the 8 byte header length)
pub const CONTAINER_PREAMBLE_LEN: usize = 10;

/// Gecko profile format version written to `meta.version`
pub const GECKO_VERSION: u32 = 23;

/// Processed profile version written to `meta.preprocessedProfileVersion`
pub const PREPROCESSED_PROFILE_VERSION: u32 = 36;

/// Product name shown by the profiler front-end
pub const PRODUCT_NAME: &str = "RuneLite";

/// Process name every exported thread belongs to
pub const PROCESS_NAME: &str = "Client";

/// The thread named after the process is exported as the main thread
pub const MAIN_THREAD_EXPORT_NAME: &str = "GeckoMain";

/// Display name written at method id 0 and for ids without a record
pub const UNRESOLVED_METHOD: &str = "bug!";

/// Nominal scheduling delay attached to every sample (ms)
pub const NOMINAL_EVENT_DELAY_MS: f64 = 0.0001;

/// Flag bit marking a frame id as a synthetic (category, subcategory) pair
pub const SYNTHETIC_FRAME_FLAG: u32 = 0x4000_0000;
pub const SYNTHETIC_CATEGORY_MASK: u32 = 0xFFFF;
pub const SYNTHETIC_SUBCATEGORY_MASK: u32 = 0x3FFF;
pub const SYNTHETIC_SUBCATEGORY_SHIFT: u32 = 16;

/// Resource type the seeded empty resource row is tagged with
pub const RESOURCE_TYPE_LIBRARY: u32 = 2;

/// Suffix appended to the input file name for the default output path
pub const OUTPUT_SUFFIX: &str = ".gecko_profile.json";

pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// How the per-tick memory total is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryTotal {
    /// Heap used only, as older converters computed it
    HeapOnly,
    /// Heap used plus off-heap used
    #[default]
    HeapAndOffHeap,
}

/// Knobs for a single decode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecodeOptions {
    pub memory_total: MemoryTotal,

    /// Written to `meta.startTime` (ms since the epoch)
    pub start_time_ms: f64,
}

impl DecodeOptions {
    pub fn with_memory_total(mut self, memory_total: MemoryTotal) -> Self {
        self.memory_total = memory_total;
        self
    }

    pub fn with_start_time(mut self, start_time_ms: f64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }
}
