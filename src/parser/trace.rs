//! Whole-trace decoding and profile assembly.
//!
//! `decode_trace` runs container -> header -> sample stream over an owned
//! buffer; `to_profile` turns the result into the Gecko document without any
//! further computation.

use super::container::open_container;
use super::cursor::ByteCursor;
use super::header::{parse_header, TraceHeader};
use super::samples::decode_samples;
use super::schema::{Profile, ProfileMeta, SampleUnits, ThreadProfile};
use crate::aggregator::categories::CategoryTaxonomy;
use crate::aggregator::memory::MemoryTrack;
use crate::aggregator::thread::ThreadModel;
use crate::utils::config::{
    DecodeOptions, GECKO_VERSION, MAIN_THREAD_EXPORT_NAME, PREPROCESSED_PROFILE_VERSION,
    PROCESS_NAME, PRODUCT_NAME,
};
use crate::utils::error::DecodeError;
use log::debug;

/// Fully decoded trace (internal representation)
#[derive(Debug, Clone)]
pub struct ParsedTrace {
    pub header: TraceHeader,
    pub taxonomy: CategoryTaxonomy,
    pub memory: MemoryTrack,
    pub threads: Vec<ThreadModel>,
    pub options: DecodeOptions,
}

/// Decode a raw trace file
///
/// **Public** - main entry point for decoding
///
/// # Arguments
/// * `bytes` - Entire trace file
/// * `options` - Decode options
///
/// # Returns
/// Decoded trace ready for `to_profile`
///
/// # Errors
/// Any `DecodeError`; there is no partial result
pub fn decode_trace(bytes: &[u8], options: &DecodeOptions) -> Result<ParsedTrace, DecodeError> {
    let container = open_container(bytes)?;

    let header = read_header(&container.header, container.order)?;

    let taxonomy = CategoryTaxonomy::standard();
    let mut cursor = ByteCursor::new(&container.samples, container.order);
    let stream = decode_samples(&mut cursor, &header, &taxonomy, options)?;

    Ok(ParsedTrace {
        header,
        taxonomy,
        memory: stream.memory,
        threads: stream.threads,
        options: *options,
    })
}

/// Decode only the container and header
///
/// **Public** - cheap path for inspecting a trace's metadata
pub fn decode_header(bytes: &[u8]) -> Result<TraceHeader, DecodeError> {
    let container = open_container(bytes)?;
    read_header(&container.header, container.order)
}

/// **Private** - shared by decode_trace and decode_header
fn read_header(
    section: &[u8],
    order: super::cursor::ByteOrder,
) -> Result<TraceHeader, DecodeError> {
    let mut cursor = ByteCursor::new(section, order);
    let header = parse_header(&mut cursor)?;
    if cursor.remaining() > 0 {
        debug!("{} unread bytes at the end of the header", cursor.remaining());
    }
    Ok(header)
}

/// Convert a decoded trace to the Gecko profile format
///
/// **Public** - used by commands to create final output
///
/// The returned profile borrows the thread tables and categories from `trace`.
pub fn to_profile(trace: &ParsedTrace) -> Profile<'_> {
    let header = &trace.header;

    let os_name = header.metadata_text("os.name");
    let os_arch = header.metadata_text("os.arch");
    let oscpu = match (&os_name, &os_arch) {
        (None, None) => None,
        (name, arch) => Some(format!(
            "{} {}",
            name.as_deref().unwrap_or_default(),
            arch.as_deref().unwrap_or_default()
        )),
    };

    let meta = ProfileMeta {
        version: GECKO_VERSION,
        start_time: trace.options.start_time_ms,
        preprocessed_profile_version: PREPROCESSED_PROFILE_VERSION,
        misc: header.metadata_text("version"),
        product: PRODUCT_NAME.to_string(),
        oscpu,
        abi: os_arch,
        app_build_id: header.metadata_text("buildID"),
        interval: header.metadata_f64("delay").map(|us| us / 1_000.0),
        categories: trace.taxonomy.categories(),
        marker_schema: Vec::new(),
        sample_units: SampleUnits::default(),
    };

    Profile {
        meta,
        libs: Vec::new(),
        pages: Vec::new(),
        counters: vec![trace.memory.to_counter()],
        threads: trace.threads.iter().map(export_thread).collect(),
    }
}

/// Borrow one thread's tables into its exported shape
///
/// **Private** - internal helper for to_profile
fn export_thread(thread: &ThreadModel) -> ThreadProfile<'_> {
    let name = if thread.name == PROCESS_NAME {
        MAIN_THREAD_EXPORT_NAME.to_string()
    } else {
        thread.name.clone()
    };

    ThreadProfile {
        name,
        process_name: PROCESS_NAME.to_string(),
        pid: 1,
        libs: Vec::new(),
        paused_ranges: Vec::new(),
        frame_table: &thread.frame_table,
        func_table: &thread.func_table,
        stack_table: &thread.stack_table,
        samples: &thread.samples,
        markers: &thread.markers,
        resource_table: &thread.resource_table,
        string_array: thread.strings.as_slice(),
    }
}
