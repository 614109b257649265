//! Output JSON schema definitions for Gecko profiles.
//!
//! The Firefox Profiler reads tables column-wise: every table is an object of
//! equally long arrays plus a `length`. Each table here has a matching row
//! struct so rows are always pushed whole, with explicit defaults for the
//! columns the decoder never fills.

use crate::aggregator::categories::Category;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A column the front-end expects to exist but that this profile never fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyColumn;

impl Serialize for EmptyColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_seq(Some(0))?.end()
    }
}

/// Marker phase, serialized as its integer tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPhase {
    Instant = 0,
    Interval = 1,
    IntervalStart = 2,
    IntervalEnd = 3,
}

impl Serialize for MarkerPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

// ---- stack table ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRow {
    pub frame: usize,
    pub prefix: Option<usize>,
    pub category: u16,
    pub subcategory: u16,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StackTable {
    pub frame: Vec<usize>,
    pub prefix: Vec<Option<usize>>,
    pub category: Vec<u16>,
    pub subcategory: Vec<u16>,
    pub length: usize,
}

impl StackTable {
    pub fn push(&mut self, row: StackRow) -> usize {
        self.frame.push(row.frame);
        self.prefix.push(row.prefix);
        self.category.push(row.category);
        self.subcategory.push(row.subcategory);
        self.length += 1;
        self.length - 1
    }

    pub fn row(&self, index: usize) -> Option<StackRow> {
        (index < self.length).then(|| StackRow {
            frame: self.frame[index],
            prefix: self.prefix[index],
            category: self.category[index],
            subcategory: self.subcategory[index],
        })
    }
}

// ---- frame table ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRow {
    pub func: usize,
    pub category: u16,
    pub subcategory: u16,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTable {
    pub func: Vec<usize>,
    pub category: Vec<u16>,
    pub subcategory: Vec<u16>,
    pub address: EmptyColumn,
    pub native_symbol: EmptyColumn,
    #[serde(rename = "innerWindowID")]
    pub inner_window_id: EmptyColumn,
    pub implementation: EmptyColumn,
    pub line: EmptyColumn,
    pub column: EmptyColumn,
    pub optimizations: EmptyColumn,
    pub length: usize,
}

impl FrameTable {
    pub fn push(&mut self, row: FrameRow) -> usize {
        self.func.push(row.func);
        self.category.push(row.category);
        self.subcategory.push(row.subcategory);
        self.length += 1;
        self.length - 1
    }

    pub fn row(&self, index: usize) -> Option<FrameRow> {
        (index < self.length).then(|| FrameRow {
            func: self.func[index],
            category: self.category[index],
            subcategory: self.subcategory[index],
        })
    }
}

// ---- func table ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncRow {
    pub name: usize,
    pub resource: usize,
    pub file_name: Option<usize>,
}

impl FuncRow {
    /// A function attributed to the seeded empty resource
    pub fn named(name: usize) -> Self {
        Self {
            name,
            resource: 0,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncTable {
    pub name: Vec<usize>,
    pub resource: Vec<usize>,
    pub file_name: Vec<Option<usize>>,
    #[serde(rename = "isJS")]
    pub is_js: EmptyColumn,
    #[serde(rename = "relevantForJS")]
    pub relevant_for_js: EmptyColumn,
    pub line_number: EmptyColumn,
    pub column_number: EmptyColumn,
    pub length: usize,
}

impl FuncTable {
    pub fn push(&mut self, row: FuncRow) -> usize {
        self.name.push(row.name);
        self.resource.push(row.resource);
        self.file_name.push(row.file_name);
        self.length += 1;
        self.length - 1
    }
}

// ---- resource table ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRow {
    pub name: usize,
    pub kind: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceTable {
    pub name: Vec<usize>,
    #[serde(rename = "type")]
    pub kind: Vec<u32>,
    pub lib: EmptyColumn,
    pub host: EmptyColumn,
    pub length: usize,
}

impl ResourceTable {
    pub fn push(&mut self, row: ResourceRow) -> usize {
        self.name.push(row.name);
        self.kind.push(row.kind);
        self.length += 1;
        self.length - 1
    }
}

// ---- sample table ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub stack: Option<usize>,
    pub time: f64,
    pub event_delay: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleTable {
    pub stack: Vec<Option<usize>>,
    pub time: Vec<f64>,
    pub event_delay: Vec<f64>,
    pub length: usize,
}

impl SampleTable {
    pub fn push(&mut self, row: SampleRow) -> usize {
        self.stack.push(row.stack);
        self.time.push(row.time);
        self.event_delay.push(row.event_delay);
        self.length += 1;
        self.length - 1
    }
}

// ---- marker table ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRow {
    pub name: usize,
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub phase: MarkerPhase,
    pub category: u16,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerTable {
    /// Payloads are never recorded; always `null`
    pub data: Vec<Option<()>>,
    pub name: Vec<usize>,
    pub start_time: Vec<f64>,
    pub end_time: Vec<Option<f64>>,
    pub phase: Vec<MarkerPhase>,
    pub category: Vec<u16>,
    pub length: usize,
}

impl MarkerTable {
    pub fn push(&mut self, row: MarkerRow) -> usize {
        self.data.push(None);
        self.name.push(row.name);
        self.start_time.push(row.start_time);
        self.end_time.push(row.end_time);
        self.phase.push(row.phase);
        self.category.push(row.category);
        self.length += 1;
        self.length - 1
    }

    pub fn row(&self, index: usize) -> Option<MarkerRow> {
        (index < self.length).then(|| MarkerRow {
            name: self.name[index],
            start_time: self.start_time[index],
            end_time: self.end_time[index],
            phase: self.phase[index],
            category: self.category[index],
        })
    }
}

// ---- counters ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSampleRow {
    pub time: f64,
    /// Number of changes folded into this row
    pub number: u64,
    /// Change of the counter value since the previous row
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CounterSampleTable {
    pub time: Vec<f64>,
    pub number: Vec<u64>,
    pub count: Vec<i64>,
    pub length: usize,
}

impl CounterSampleTable {
    pub fn push(&mut self, row: CounterSampleRow) -> usize {
        self.time.push(row.time);
        self.number.push(row.number);
        self.count.push(row.count);
        self.length += 1;
        self.length - 1
    }

    pub fn row(&self, index: usize) -> Option<CounterSampleRow> {
        (index < self.length).then(|| CounterSampleRow {
            time: self.time[index],
            number: self.number[index],
            count: self.count[index],
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterSampleGroup {
    pub id: u32,
    pub samples: CounterSampleTable,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub name: String,
    pub category: String,
    pub description: String,
    pub pid: u32,
    pub main_thread_index: usize,
    pub sample_groups: Vec<CounterSampleGroup>,
}

// ---- document ----

/// Top-level Gecko profile written to JSON
#[derive(Debug, Clone, Serialize)]
pub struct Profile<'a> {
    pub meta: ProfileMeta<'a>,
    pub libs: Vec<Value>,
    pub pages: Vec<Value>,
    pub counters: Vec<Counter>,
    pub threads: Vec<ThreadProfile<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMeta<'a> {
    pub version: u32,
    pub start_time: f64,
    pub preprocessed_profile_version: u32,
    pub misc: Option<String>,
    pub product: String,
    pub oscpu: Option<String>,
    pub abi: Option<String>,
    #[serde(rename = "appBuildID")]
    pub app_build_id: Option<String>,
    /// Sampling interval in milliseconds
    pub interval: Option<f64>,
    pub categories: &'a [Category],
    pub marker_schema: Vec<Value>,
    pub sample_units: SampleUnits,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleUnits {
    pub time: String,
    pub event_delay: String,
}

impl Default for SampleUnits {
    fn default() -> Self {
        Self {
            time: "ms".to_string(),
            event_delay: "ms".to_string(),
        }
    }
}

/// One exported thread; tables are borrowed from the decoded thread model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadProfile<'a> {
    pub name: String,
    pub process_name: String,
    pub pid: u32,
    pub libs: Vec<Value>,
    pub paused_ranges: Vec<Value>,
    pub frame_table: &'a FrameTable,
    pub func_table: &'a FuncTable,
    pub stack_table: &'a StackTable,
    pub samples: &'a SampleTable,
    pub markers: &'a MarkerTable,
    pub resource_table: &'a ResourceTable,
    pub string_array: &'a [String],
}
