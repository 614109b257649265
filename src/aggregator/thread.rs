//! Per-thread interning tables.
//!
//! Each sampled thread owns its own id space for stacks, frames, functions
//! and strings. Ids are dense, handed out in first-seen order, and never
//! reused; the tables only ever grow for the lifetime of a decode.

use super::categories::{unpack_synthetic_frame, CategoryPair, CategoryTaxonomy};
use crate::parser::header::MethodTable;
use crate::parser::schema::{
    FrameRow, FrameTable, FuncRow, FuncTable, MarkerRow, MarkerTable, ResourceRow, ResourceTable,
    SampleRow, SampleTable, StackRow, StackTable,
};
use crate::utils::config::RESOURCE_TYPE_LIBRARY;
use log::warn;
use std::collections::HashMap;

/// Deduplicated string storage; id = first-seen insertion index
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    ids: HashMap<String, usize>,
}

impl StringTable {
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = self.strings.len();
        self.strings.push(text.to_string());
        self.ids.insert(text.to_string(), id);
        id
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.strings.get(id).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Read-only inputs needed to resolve a frame id into a display name
#[derive(Debug, Clone, Copy)]
pub struct FrameResolver<'a> {
    pub methods: &'a MethodTable,
    pub taxonomy: &'a CategoryTaxonomy,
}

impl FrameResolver<'_> {
    /// Category pair and display name of a frame id
    ///
    /// Synthetic ids naming a category outside the taxonomy are clamped to
    /// `Other/Other` so every emitted row references a valid category.
    fn resolve(&self, frame_id: u32) -> (CategoryPair, &str) {
        let Some(pair) = unpack_synthetic_frame(frame_id) else {
            return (CategoryPair::new(CategoryTaxonomy::JAVA, 0), self.methods.name(frame_id));
        };

        let pair = if self.taxonomy.contains(pair) {
            pair
        } else {
            warn!(
                "Frame id {:#x} names unknown category {}/{}, using Other",
                frame_id, pair.category, pair.subcategory
            );
            CategoryPair::new(CategoryTaxonomy::OTHER, 0)
        };

        let name = self
            .taxonomy
            .get(pair.category)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        (pair, name)
    }
}

/// One sampled thread: its output tables plus the memo maps behind them
#[derive(Debug, Clone)]
pub struct ThreadModel {
    pub name: String,

    pub stack_table: StackTable,
    pub frame_table: FrameTable,
    pub func_table: FuncTable,
    pub resource_table: ResourceTable,
    pub samples: SampleTable,
    pub markers: MarkerTable,
    pub strings: StringTable,

    /// Cumulative sampled time in milliseconds
    time_ms: f64,

    /// Full root-to-leaf frame sequence -> stack id
    stack_ids: HashMap<Vec<u32>, usize>,
    /// (parent stack, frame id) -> stack id; the trie edges
    stack_children: HashMap<(Option<usize>, u32), usize>,
    frame_ids: HashMap<u32, usize>,
    /// Function name string id -> func id
    func_ids: HashMap<usize, usize>,
}

impl ThreadModel {
    /// Create an empty thread
    ///
    /// The empty string is seeded as string 0 and backs the single resource row.
    pub fn new(name: impl Into<String>) -> Self {
        let mut thread = Self {
            name: name.into(),
            stack_table: StackTable::default(),
            frame_table: FrameTable::default(),
            func_table: FuncTable::default(),
            resource_table: ResourceTable::default(),
            samples: SampleTable::default(),
            markers: MarkerTable::default(),
            strings: StringTable::default(),
            time_ms: 0.0,
            stack_ids: HashMap::new(),
            stack_children: HashMap::new(),
            frame_ids: HashMap::new(),
            func_ids: HashMap::new(),
        };

        let empty = thread.intern_string("");
        thread.resource_table.push(ResourceRow {
            name: empty,
            kind: RESOURCE_TYPE_LIBRARY,
        });
        thread
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    /// Advance the thread clock and return the new cumulative time
    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        self.time_ms += delta_ms;
        self.time_ms
    }

    pub fn intern_string(&mut self, text: &str) -> usize {
        self.strings.intern(text)
    }

    /// Stack id for a root-to-leaf frame sequence
    ///
    /// Returns `None` for an empty sequence. On a miss, the trie is walked
    /// from the root, creating every missing node on the way to the leaf.
    pub fn intern_stack(&mut self, frames: &[u32], resolver: &FrameResolver<'_>) -> Option<usize> {
        if frames.is_empty() {
            return None;
        }
        if let Some(&id) = self.stack_ids.get(frames) {
            return Some(id);
        }

        let mut prefix = None;
        for &frame_id in frames {
            let id = match self.stack_children.get(&(prefix, frame_id)) {
                Some(&id) => id,
                None => {
                    let (frame, pair) = self.intern_frame(frame_id, resolver);
                    let id = self.stack_table.push(StackRow {
                        frame,
                        prefix,
                        category: pair.category,
                        subcategory: pair.subcategory,
                    });
                    self.stack_children.insert((prefix, frame_id), id);
                    id
                }
            };
            prefix = Some(id);
        }

        self.stack_ids.insert(frames.to_vec(), prefix?);
        prefix
    }

    /// Frame id (and its category) for a method or synthetic frame id
    pub fn intern_frame(&mut self, frame_id: u32, resolver: &FrameResolver<'_>) -> (usize, CategoryPair) {
        if let Some(&id) = self.frame_ids.get(&frame_id) {
            return (id, self.frame_category(id));
        }

        let (pair, name) = resolver.resolve(frame_id);
        let func = self.intern_func(name);
        let id = self.frame_table.push(FrameRow {
            func,
            category: pair.category,
            subcategory: pair.subcategory,
        });
        self.frame_ids.insert(frame_id, id);
        (id, pair)
    }

    /// Function id for a display name, created on first use
    pub fn intern_func(&mut self, name: &str) -> usize {
        let name = self.intern_string(name);
        if let Some(&id) = self.func_ids.get(&name) {
            return id;
        }
        let id = self.func_table.push(FuncRow::named(name));
        self.func_ids.insert(name, id);
        id
    }

    pub fn push_sample(&mut self, stack: Option<usize>, time: f64, event_delay: f64) -> usize {
        self.samples.push(SampleRow {
            stack,
            time,
            event_delay,
        })
    }

    pub fn push_marker(&mut self, row: MarkerRow) -> usize {
        self.markers.push(row)
    }

    fn frame_category(&self, frame: usize) -> CategoryPair {
        self.frame_table
            .row(frame)
            .map(|row| CategoryPair::new(row.category, row.subcategory))
            .unwrap_or(CategoryPair::new(CategoryTaxonomy::JAVA, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::categories::pack_synthetic_frame;
    use crate::utils::config::UNRESOLVED_METHOD;

    fn methods() -> MethodTable {
        let mut table = MethodTable::with_count(3);
        table.insert(1, "a::run()V".to_string());
        table.insert(2, "b::call()V".to_string());
        table.insert(3, "c::wait()V".to_string());
        table
    }

    #[test]
    fn test_string_interning() {
        let mut strings = StringTable::default();
        assert_eq!(strings.intern("x"), 0);
        assert_eq!(strings.intern("y"), 1);
        assert_eq!(strings.intern("x"), 0);
        assert_eq!(strings.as_slice(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_new_thread_seeds_empty_resource() {
        let thread = ThreadModel::new("Client");
        assert_eq!(thread.strings.get(0), Some(""));
        assert_eq!(thread.resource_table.length, 1);
        assert_eq!(thread.resource_table.kind, vec![RESOURCE_TYPE_LIBRARY]);
    }

    #[test]
    fn test_identical_stacks_share_id() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        let first = thread.intern_stack(&[2, 1], &resolver);
        let second = thread.intern_stack(&[2, 1], &resolver);
        let other = thread.intern_stack(&[2, 3], &resolver);

        assert_eq!(first, second);
        assert_ne!(first, other);
        // [2], [2,1], [2,3]
        assert_eq!(thread.stack_table.length, 3);
    }

    #[test]
    fn test_stack_trie_links_prefixes() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        let root = thread.intern_stack(&[1], &resolver).unwrap();
        let leaf = thread.intern_stack(&[1, 2, 3], &resolver).unwrap();

        let leaf_row = thread.stack_table.row(leaf).unwrap();
        let middle_row = thread.stack_table.row(leaf_row.prefix.unwrap()).unwrap();
        assert_eq!(middle_row.prefix, Some(root));
        assert_eq!(thread.stack_table.row(root).unwrap().prefix, None);
    }

    #[test]
    fn test_deep_stacks_do_not_collide() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        let a = thread.intern_stack(&[1, 2, 3, 1, 2], &resolver);
        let b = thread.intern_stack(&[1, 2, 3, 1, 3], &resolver);
        let c = thread.intern_stack(&[2, 2, 3, 1, 2], &resolver);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_empty_stack() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        assert_eq!(thread.intern_stack(&[], &resolver), None);
        assert_eq!(thread.stack_table.length, 0);
    }

    #[test]
    fn test_synthetic_frame_uses_category_name() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        let idle = pack_synthetic_frame(CategoryPair::new(CategoryTaxonomy::IDLE, 4));
        let stack = thread.intern_stack(&[3, idle], &resolver).unwrap();
        let row = thread.stack_table.row(stack).unwrap();
        let frame = thread.frame_table.row(row.frame).unwrap();

        assert_eq!((row.category, row.subcategory), (CategoryTaxonomy::IDLE, 4));
        assert_eq!((frame.category, frame.subcategory), (CategoryTaxonomy::IDLE, 4));
        let name = thread.func_table.name[frame.func];
        assert_eq!(thread.strings.get(name), Some("Idle"));
    }

    #[test]
    fn test_functions_dedupe_by_name() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        // two unknown ids both resolve to the sentinel
        let (a, _) = thread.intern_frame(40, &resolver);
        let (b, _) = thread.intern_frame(41, &resolver);

        assert_ne!(a, b);
        assert_eq!(thread.func_table.length, 1);
        let name = thread.func_table.name[0];
        assert_eq!(thread.strings.get(name), Some(UNRESOLVED_METHOD));
    }

    #[test]
    fn test_unknown_synthetic_category_is_clamped() {
        let methods = methods();
        let taxonomy = CategoryTaxonomy::standard();
        let resolver = FrameResolver {
            methods: &methods,
            taxonomy: &taxonomy,
        };
        let mut thread = ThreadModel::new("t");

        let bogus = pack_synthetic_frame(CategoryPair::new(99, 7));
        let (_, pair) = thread.intern_frame(bogus, &resolver);

        assert_eq!(pair, CategoryPair::new(CategoryTaxonomy::OTHER, 0));
    }

    #[test]
    fn test_clock_is_cumulative() {
        let mut thread = ThreadModel::new("t");
        assert_eq!(thread.advance(1.5), 1.5);
        assert_eq!(thread.advance(2.0), 3.5);
        assert_eq!(thread.time_ms(), 3.5);
    }
}
