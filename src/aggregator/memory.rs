//! Memory usage counter ("malloc" track).
//!
//! The Gecko counter format stores deltas, so a row is only written when the
//! observed total actually changes between ticks.

use crate::parser::schema::{Counter, CounterSampleGroup, CounterSampleRow, CounterSampleTable};
use crate::utils::config::MemoryTotal;

/// Heap figures recorded once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub heap_used: u64,
    pub heap_committed: u64,
    pub offheap_used: u64,
    pub offheap_committed: u64,
}

impl MemorySnapshot {
    pub fn total(&self, mode: MemoryTotal) -> u64 {
        match mode {
            MemoryTotal::HeapOnly => self.heap_used,
            MemoryTotal::HeapAndOffHeap => self.heap_used.saturating_add(self.offheap_used),
        }
    }
}

/// Counter samples plus the last total they were computed against
#[derive(Debug, Clone)]
pub struct MemoryTrack {
    samples: CounterSampleTable,
    last_total: u64,
    mode: MemoryTotal,
}

impl MemoryTrack {
    /// Start a track holding its single seed row
    pub fn new(mode: MemoryTotal) -> Self {
        let mut samples = CounterSampleTable::default();
        samples.push(CounterSampleRow {
            time: 0.0,
            number: 1,
            count: 1,
        });
        Self {
            samples,
            last_total: 0,
            mode,
        }
    }

    /// Record one tick's snapshot; returns true if a row was emitted
    pub fn observe(&mut self, time: f64, snapshot: &MemorySnapshot) -> bool {
        let total = snapshot.total(self.mode);
        if total == self.last_total {
            return false;
        }

        self.samples.push(CounterSampleRow {
            time,
            number: 1,
            count: total.wrapping_sub(self.last_total) as i64,
        });
        self.last_total = total;
        true
    }

    pub fn samples(&self) -> &CounterSampleTable {
        &self.samples
    }

    /// Export as the profile's memory counter
    pub fn to_counter(&self) -> Counter {
        Counter {
            name: "malloc".to_string(),
            category: "Memory".to_string(),
            description: "Allocated memory".to_string(),
            pid: 1,
            main_thread_index: 0,
            sample_groups: vec![CounterSampleGroup {
                id: 0,
                samples: self.samples.clone(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(heap_used: u64, offheap_used: u64) -> MemorySnapshot {
        MemorySnapshot {
            heap_used,
            heap_committed: heap_used * 2,
            offheap_used,
            offheap_committed: offheap_used * 2,
        }
    }

    #[test]
    fn test_seed_row() {
        let track = MemoryTrack::new(MemoryTotal::HeapAndOffHeap);
        assert_eq!(track.samples().length, 1);
        assert_eq!(
            track.samples().row(0),
            Some(CounterSampleRow {
                time: 0.0,
                number: 1,
                count: 1
            })
        );
    }

    #[test]
    fn test_emits_only_on_change() {
        let mut track = MemoryTrack::new(MemoryTotal::HeapAndOffHeap);

        assert!(track.observe(1.0, &snapshot(100, 20)));
        assert!(!track.observe(2.0, &snapshot(100, 20)));
        assert!(track.observe(3.0, &snapshot(90, 20)));

        let rows = track.samples();
        assert_eq!(rows.length, 3);
        assert_eq!(rows.count, vec![1, 120, -10]);
        assert_eq!(rows.time, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_heap_only_ignores_offheap() {
        let mut track = MemoryTrack::new(MemoryTotal::HeapOnly);

        assert!(track.observe(1.0, &snapshot(100, 20)));
        assert!(!track.observe(2.0, &snapshot(100, 55)));
        assert_eq!(track.samples().count, vec![1, 100]);
    }

    #[test]
    fn test_counter_export() {
        let track = MemoryTrack::new(MemoryTotal::HeapOnly);
        let value = serde_json::to_value(track.to_counter()).unwrap();

        assert_eq!(value["name"], "malloc");
        assert_eq!(value["mainThreadIndex"], 0);
        assert_eq!(value["sampleGroups"][0]["samples"]["length"], 1);
    }
}
