//! Size cache keyed by layout context.
//!
//! Stores the full per-row size array measured against one
//! [`LayoutContext`]. An entry is only trusted when its length matches
//! the current row collection: a structural change (reset, append)
//! invalidates everything, and there is no per-row eviction because a
//! context change invalidates geometry uniformly.

use crate::model::{LayoutContext, RowSizes};
use std::collections::HashMap;

/// Memoized row sizes per layout context.
#[derive(Debug, Default)]
pub struct SizeCache {
    entries: HashMap<LayoutContext, Vec<RowSizes>>,
}

impl SizeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the sizes measured against `context`.
    ///
    /// Returns `None` unless an entry exists *and* its length equals
    /// `row_count`: an entry computed against a different collection
    /// shape is a miss, never a partial hit.
    pub fn lookup(&self, context: &LayoutContext, row_count: usize) -> Option<&[RowSizes]> {
        self.entries
            .get(context)
            .filter(|sizes| sizes.len() == row_count)
            .map(Vec::as_slice)
    }

    /// Store the full size array for `context`, replacing any previous
    /// entry for that exact context.
    pub fn store(&mut self, context: LayoutContext, sizes: Vec<RowSizes>) {
        self.entries.insert(context, sizes);
    }

    /// Drop every entry. Triggered by memory pressure and by structural
    /// changes to the row collection.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Number of cached contexts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
