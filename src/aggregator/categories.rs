//! Fixed category taxonomy and synthetic frame ids.
//!
//! Samples of threads that are not running Java code get one extra leaf
//! frame whose id carries a (category, subcategory) pair instead of a
//! method id, so the state shows up both in the call tree and in the
//! category graph.

use crate::utils::config::{
    SYNTHETIC_CATEGORY_MASK, SYNTHETIC_FRAME_FLAG, SYNTHETIC_SUBCATEGORY_MASK,
    SYNTHETIC_SUBCATEGORY_SHIFT,
};
use serde::Serialize;

/// JVMTI thread state bits consumed by `CategoryTaxonomy::classify`
pub mod thread_state {
    pub const RUNNABLE: u32 = 0x0004;
    pub const WAITING_INDEFINITELY: u32 = 0x0010;
    pub const WAITING_WITH_TIMEOUT: u32 = 0x0020;
    pub const SLEEPING: u32 = 0x0040;
    pub const WAITING: u32 = 0x0080;
    pub const IN_OBJECT_WAIT: u32 = 0x0100;
    pub const PARKED: u32 = 0x0200;
    pub const BLOCKED_ON_MONITOR_ENTER: u32 = 0x0400;
}

/// One entry of the category list, serialized as-is into `meta.categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: String,
    /// Index 0 is always "Other"
    pub subcategories: Vec<String>,
}

impl Category {
    fn new(name: &str, color: &str, subcategories: &[&str]) -> Self {
        let mut subs = vec!["Other".to_string()];
        subs.extend(subcategories.iter().map(|s| s.to_string()));
        Self {
            name: name.to_string(),
            color: color.to_string(),
            subcategories: subs,
        }
    }
}

/// Classification result for a sampled thread state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryPair {
    pub category: u16,
    pub subcategory: u16,
}

impl CategoryPair {
    pub const fn new(category: u16, subcategory: u16) -> Self {
        Self {
            category,
            subcategory,
        }
    }
}

/// Immutable category table shared by every thread of a decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTaxonomy {
    categories: Vec<Category>,
}

impl CategoryTaxonomy {
    pub const JAVA: u16 = 0;
    pub const BLOCKED: u16 = 1;
    pub const IDLE: u16 = 2;
    pub const OTHER: u16 = 3;

    pub const IDLE_WAITING_INDEFINITELY: u16 = 1;
    pub const IDLE_WAITING_WITH_TIMEOUT: u16 = 2;
    pub const IDLE_OBJECT_WAIT: u16 = 3;
    pub const IDLE_PARKED: u16 = 4;
    pub const IDLE_SLEEPING: u16 = 5;

    /// The taxonomy every trace is classified with
    pub fn standard() -> Self {
        Self {
            categories: vec![
                Category::new("Java", "blue", &[]),
                Category::new("Blocked", "red", &[]),
                Category::new(
                    "Idle",
                    "transparent",
                    &[
                        "Waiting indefinitely",
                        "Waiting with timeout",
                        "Object wait",
                        "Parked",
                        "Sleeping",
                    ],
                ),
                Category::new("Other", "grey", &[]),
            ],
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, index: u16) -> Option<&Category> {
        self.categories.get(index as usize)
    }

    pub fn contains(&self, pair: CategoryPair) -> bool {
        self.get(pair.category)
            .is_some_and(|c| (pair.subcategory as usize) < c.subcategories.len())
    }

    /// Map a thread state bitmask to a category; first match wins
    ///
    /// A `JAVA` result means the thread was running and gets no synthetic frame.
    pub fn classify(&self, state: u32) -> CategoryPair {
        use thread_state::*;

        if state & RUNNABLE != 0 {
            CategoryPair::new(Self::JAVA, 0)
        } else if state & BLOCKED_ON_MONITOR_ENTER != 0 {
            CategoryPair::new(Self::BLOCKED, 0)
        } else if state & WAITING != 0 {
            let subcategory = if state & WAITING_INDEFINITELY != 0 {
                Self::IDLE_WAITING_INDEFINITELY
            } else if state & WAITING_WITH_TIMEOUT != 0 {
                Self::IDLE_WAITING_WITH_TIMEOUT
            } else if state & IN_OBJECT_WAIT != 0 {
                Self::IDLE_OBJECT_WAIT
            } else if state & PARKED != 0 {
                Self::IDLE_PARKED
            } else if state & SLEEPING != 0 {
                Self::IDLE_SLEEPING
            } else {
                0
            };
            CategoryPair::new(Self::IDLE, subcategory)
        } else {
            CategoryPair::new(Self::OTHER, 0)
        }
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pack a category pair into a synthetic frame id
pub fn pack_synthetic_frame(pair: CategoryPair) -> u32 {
    SYNTHETIC_FRAME_FLAG
        | (pair.category as u32 & SYNTHETIC_CATEGORY_MASK)
        | ((pair.subcategory as u32 & SYNTHETIC_SUBCATEGORY_MASK) << SYNTHETIC_SUBCATEGORY_SHIFT)
}

/// Category pair of a synthetic frame id, `None` for a real method id
pub fn unpack_synthetic_frame(frame_id: u32) -> Option<CategoryPair> {
    if frame_id & SYNTHETIC_FRAME_FLAG == 0 {
        return None;
    }
    Some(CategoryPair::new(
        (frame_id & SYNTHETIC_CATEGORY_MASK) as u16,
        ((frame_id >> SYNTHETIC_SUBCATEGORY_SHIFT) & SYNTHETIC_SUBCATEGORY_MASK) as u16,
    ))
}
