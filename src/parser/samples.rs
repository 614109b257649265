//! Sample section decoding.
//!
//! The section is `sampleCount` ticks back to back. A tick carries the time
//! since the previous tick, a memory snapshot, one stack sample per declared
//! thread, and a marker block for the first thread.

use super::cursor::ByteCursor;
use super::header::TraceHeader;
use super::markers::MarkerDecoder;
use crate::aggregator::categories::{pack_synthetic_frame, CategoryTaxonomy};
use crate::aggregator::memory::{MemorySnapshot, MemoryTrack};
use crate::aggregator::thread::{FrameResolver, ThreadModel};
use crate::utils::config::{DecodeOptions, NANOS_PER_MILLI, NOMINAL_EVENT_DELAY_MS};
use crate::utils::error::DecodeError;
use log::debug;

/// Everything the sample section produces
#[derive(Debug, Clone)]
pub struct SampleStream {
    pub threads: Vec<ThreadModel>,
    pub memory: MemoryTrack,
}

/// Decode every tick of the sample section
///
/// **Public** - third stage of every decode
///
/// # Arguments
/// * `cursor` - Reader over the decompressed sample section
/// * `header` - Decoded header (tick count, threads, methods)
/// * `taxonomy` - Category table used to classify thread states
/// * `options` - Decode options (memory total mode)
///
/// # Errors
/// * `DecodeError::TruncatedInput` - the section ends mid-tick
/// * `DecodeError::UnknownMarkerTag` - bad tag in a marker block
pub fn decode_samples(
    cursor: &mut ByteCursor<'_>,
    header: &TraceHeader,
    taxonomy: &CategoryTaxonomy,
    options: &DecodeOptions,
) -> Result<SampleStream, DecodeError> {
    let mut decoder = SampleDecoder {
        resolver: FrameResolver {
            methods: &header.methods,
            taxonomy,
        },
        threads: header
            .thread_names
            .iter()
            .map(|name| ThreadModel::new(name.as_str()))
            .collect(),
        detached: ThreadModel::new(""),
        memory: MemoryTrack::new(options.memory_total),
        markers: MarkerDecoder::new(),
        frames: Vec::new(),
    };

    for tick in 0..header.sample_count {
        decoder.decode_tick(cursor).map_err(|e| {
            debug!("Tick {} failed at offset {}", tick, cursor.offset());
            e
        })?;
    }

    if cursor.remaining() > 0 {
        debug!("{} trailing bytes after the last tick", cursor.remaining());
    }
    debug!(
        "Decoded {} ticks for {} threads, {} memory rows",
        header.sample_count,
        decoder.threads.len(),
        decoder.memory.samples().length
    );

    Ok(SampleStream {
        threads: decoder.threads,
        memory: decoder.memory,
    })
}

/// Mutable state of one pass over the sample section
///
/// **Private** - owned by decode_samples, never shared
struct SampleDecoder<'a> {
    resolver: FrameResolver<'a>,
    threads: Vec<ThreadModel>,
    /// Marker sink when the trace declares no threads at all
    detached: ThreadModel,
    memory: MemoryTrack,
    markers: MarkerDecoder,
    /// Scratch for one thread's frames, root first; reused across ticks
    frames: Vec<u32>,
}

impl SampleDecoder<'_> {
    fn decode_tick(&mut self, cursor: &mut ByteCursor<'_>) -> Result<(), DecodeError> {
        let delta_ms = cursor.u32()? as f64 / NANOS_PER_MILLI;

        let snapshot = MemorySnapshot {
            heap_used: cursor.u64()?,
            heap_committed: cursor.u64()?,
            offheap_used: cursor.u64()?,
            offheap_committed: cursor.u64()?,
        };
        // Memory rows are stamped with the first thread's clock before this tick
        let now = self.threads.first().map(ThreadModel::time_ms).unwrap_or(0.0);
        self.memory.observe(now, &snapshot);

        for thread in self.threads.iter_mut() {
            let state = cursor.u32()?;
            let frame_count = cursor.u32()? as usize;
            read_frames(cursor, frame_count, &mut self.frames)?;

            let pair = self.resolver.taxonomy.classify(state);
            if pair.category != CategoryTaxonomy::JAVA {
                self.frames.push(pack_synthetic_frame(pair));
            }

            // bytecode location of the leaf frame; not exported
            let _location = cursor.u32()?;

            let stack = thread.intern_stack(&self.frames, &self.resolver);
            let time = thread.advance(delta_ms);
            thread.push_sample(stack, time, NOMINAL_EVENT_DELAY_MS);
        }

        let marker_thread = match self.threads.first_mut() {
            Some(thread) => thread,
            None => &mut self.detached,
        };
        self.markers.decode_tick(cursor, marker_thread)?;

        Ok(())
    }
}

/// Read `count` leaf-first frame ids into `frames`, root first
///
/// **Private** - the count is checked against the section before reserving
fn read_frames(
    cursor: &mut ByteCursor<'_>,
    count: usize,
    frames: &mut Vec<u32>,
) -> Result<(), DecodeError> {
    let needed = count.saturating_mul(4);
    if needed > cursor.remaining() {
        return Err(DecodeError::TruncatedInput {
            offset: cursor.offset(),
            needed,
            available: cursor.remaining(),
        });
    }

    frames.clear();
    frames.reserve(count + 1);
    for _ in 0..count {
        frames.push(cursor.u32()?);
    }
    frames.reverse();
    Ok(())
}
