//! Cumulative row heights over the collection.
//!
//! A Fenwick tree keeps the running sums the pagination proximity check
//! and offset-to-row mapping need: `total` and `set` are O(log n),
//! `row_at_offset` is O(log² n). Heights are presentation heights, so an
//! expansion toggle is a single `set` rather than a rebuild.

/// Prefix sums over per-row heights.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    tree: Vec<isize>,
    len: usize,
}

impl HeightIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with the given heights.
    pub fn rebuild<I>(&mut self, heights: I)
    where
        I: IntoIterator<Item = u16>,
    {
        let heights: Vec<u16> = heights.into_iter().collect();
        self.reset_backing(heights.len().max(self.tree.len()));
        for height in heights {
            let index = self.len;
            self.len += 1;
            fenwick::array::update(&mut self.tree, index, height as isize);
        }
    }

    /// Append one row's height.
    pub fn push(&mut self, height: u16) {
        if self.len == self.tree.len() {
            self.regrow((self.len.max(1)) * 2);
        }
        let index = self.len;
        self.len += 1;
        fenwick::array::update(&mut self.tree, index, height as isize);
    }

    /// Update the height of the row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, height: u16) {
        assert!(index < self.len, "index {} out of bounds (len: {})", index, self.len);
        let delta = height as isize - self.height_at(index) as isize;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Height of the row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn height_at(&self, index: usize) -> usize {
        if index == 0 {
            self.prefix_sum(0)
        } else {
            self.prefix_sum(index) - self.prefix_sum(index - 1)
        }
    }

    /// Line offset at which the row at `index` starts.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn offset_of(&self, index: usize) -> usize {
        if index == 0 {
            0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// The row containing the given line offset, or `None` when the
    /// offset falls at or past the total height.
    pub fn row_at_offset(&self, offset: usize) -> Option<usize> {
        if self.is_empty() || offset >= self.total() {
            return None;
        }
        // First index whose inclusive prefix sum exceeds the offset.
        let mut low = 0;
        let mut high = self.len;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.prefix_sum(mid) > offset {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        Some(low)
    }

    /// Total height of all rows in lines.
    pub fn total(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.prefix_sum(self.len - 1)
        }
    }

    /// Number of rows tracked.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index tracks no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop all rows, retaining capacity.
    pub fn clear(&mut self) {
        let capacity = self.tree.len();
        self.reset_backing(capacity);
    }

    /// Zero the backing array at the given capacity and forget all rows.
    ///
    /// The whole array must be zeroed, not just the first `len` slots:
    /// updates propagate into positions past `len`, and residue there
    /// would corrupt a later rebuild that grows beyond the old length.
    fn reset_backing(&mut self, capacity: usize) {
        self.tree.clear();
        self.tree.resize(capacity, 0);
        self.len = 0;
    }

    /// Grow the backing array, re-inserting every height.
    ///
    /// A Fenwick node covers a range of lower indexes; a node that only
    /// comes into existence after those indexes were updated would miss
    /// their contributions, so growth has to re-materialize the tree
    /// rather than extend it in place.
    fn regrow(&mut self, capacity: usize) {
        let heights: Vec<isize> = (0..self.len).map(|i| self.height_at(i) as isize).collect();
        let len = self.len;
        self.reset_backing(capacity);
        self.len = len;
        for (index, height) in heights.into_iter().enumerate() {
            fenwick::array::update(&mut self.tree, index, height);
        }
    }

    fn prefix_sum(&self, index: usize) -> usize {
        assert!(index < self.len, "index {} out of bounds (len: {})", index, self.len);
        fenwick::array::prefix_sum(&self.tree, index).max(0) as usize
    }
}
