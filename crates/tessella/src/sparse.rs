//! Sparse index-to-value table.
//!
//! This module provides [`SparseTable`], a sorted, non-overlapping map from
//! ranges of integer addresses to values. The grid uses it to track
//! per-slot state over a large, mutable address space without materializing
//! one entry per slot:
//!
//! - Group-header placement (`SparseTable<RowGroupInfo>`)
//! - Collapsed-subtree state (`SparseTable<bool>`)
//! - Row-details visibility (`SparseTable<bool>`)
//!
//! Addresses shift when slots are inserted or removed, so the table
//! supports shifting insert/remove alongside point and neighbor queries.
//! All operations preserve the sorted, non-overlapping range invariant.
//!
//! # Example
//!
//! ```
//! use tessella::sparse::SparseTable;
//!
//! let mut table = SparseTable::new();
//! table.set_values(10, 5, true);
//!
//! assert!(table.contains(12));
//! assert_eq!(table.next_index(12), Some(13));
//! assert_eq!(table.previous_index(10), None);
//!
//! // Inserting addresses shifts everything after the insertion point.
//! table.insert_indexes(0, 3);
//! assert!(table.contains(13));
//! assert!(!table.contains(10));
//! ```

/// One contiguous run of mapped addresses.
#[derive(Debug, Clone, PartialEq)]
struct IndexRange<T> {
    start: usize,
    count: usize,
    value: T,
}

impl<T> IndexRange<T> {
    /// Exclusive end of the range.
    fn end(&self) -> usize {
        self.start + self.count
    }

    fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }
}

/// A sorted, non-overlapping index-range-to-value map.
///
/// Point queries beyond the known range return `None`. Adjacent ranges with
/// equal values are merged, so the range count stays proportional to the
/// number of distinct runs rather than the number of mapped addresses.
#[derive(Debug, Clone)]
pub struct SparseTable<T: Clone + PartialEq> {
    ranges: Vec<IndexRange<T>>,
}

// Not derived: the derive would demand `T: Default`, which values like the
// group-info entries never implement. An empty table needs no `T` at all.
impl<T: Clone + PartialEq> Default for SparseTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> SparseTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Returns the mapped value at `index`, or `None` if unmapped.
    pub fn get_value_at(&self, index: usize) -> Option<&T> {
        let i = self.ranges.partition_point(|r| r.end() <= index);
        self.ranges
            .get(i)
            .filter(|r| r.contains(index))
            .map(|r| &r.value)
    }

    /// Returns whether `index` is mapped.
    pub fn contains(&self, index: usize) -> bool {
        self.get_value_at(index).is_some()
    }

    /// Returns whether every address in `[start, start + count)` is mapped.
    pub fn contains_all(&self, start: usize, count: usize) -> bool {
        self.index_count_in(start, start + count.saturating_sub(1)) == count
    }

    /// Maps `[start, start + count)` to `value`, overwriting any existing
    /// mappings in that span. Does not shift other addresses. A zero count
    /// is a no-op.
    pub fn set_values(&mut self, start: usize, count: usize, value: T) {
        if count == 0 {
            return;
        }
        self.clear_values(start, count);
        let pos = self.ranges.partition_point(|r| r.start < start);
        self.ranges.insert(
            pos,
            IndexRange {
                start,
                count,
                value,
            },
        );
        self.try_merge(pos);
        if pos > 0 {
            self.try_merge(pos - 1);
        }
        self.check_invariant();
    }

    /// Maps a single address to `value`.
    pub fn set_value(&mut self, index: usize, value: T) {
        self.set_values(index, 1, value);
    }

    /// Unmaps every address in `[start, start + count)` without shifting.
    pub fn clear_values(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let end = start + count;
        let i = self.ranges.partition_point(|r| r.end() <= start);
        let mut j = i;
        let mut replacement = Vec::new();
        while j < self.ranges.len() && self.ranges[j].start < end {
            let r = &self.ranges[j];
            if r.start < start {
                replacement.push(IndexRange {
                    start: r.start,
                    count: start - r.start,
                    value: r.value.clone(),
                });
            }
            if r.end() > end {
                replacement.push(IndexRange {
                    start: end,
                    count: r.end() - end,
                    value: r.value.clone(),
                });
            }
            j += 1;
        }
        self.ranges.splice(i..j, replacement);
        self.check_invariant();
    }

    /// Unmaps a single address.
    pub fn clear_value(&mut self, index: usize) {
        self.clear_values(index, 1);
    }

    /// Inserts `count` mapped entries with `value` at `start`, shifting
    /// every later address by `+count`. A zero count is a no-op.
    pub fn add_values(&mut self, start: usize, count: usize, value: T) {
        self.insert_indexes(start, count);
        self.set_values(start, count, value);
    }

    /// Inserts `count` unmapped addresses at `start`, shifting every later
    /// address by `+count`. A mapped range spanning `start` is split around
    /// the inserted gap.
    pub fn insert_indexes(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let i = self.ranges.partition_point(|r| r.end() <= start);
        if i < self.ranges.len() && self.ranges[i].start < start {
            // Range spans the insertion point; split it.
            let left_count = start - self.ranges[i].start;
            let tail_count = self.ranges[i].count - left_count;
            let value = self.ranges[i].value.clone();
            self.ranges[i].count = left_count;
            self.ranges.insert(
                i + 1,
                IndexRange {
                    start,
                    count: tail_count,
                    value,
                },
            );
            for r in &mut self.ranges[i + 1..] {
                r.start += count;
            }
        } else {
            for r in &mut self.ranges[i..] {
                r.start += count;
            }
        }
        self.check_invariant();
    }

    /// Removes the addresses `[start, start + count)`, shifting every later
    /// address by `-count`. Mapped values inside the span are dropped.
    pub fn remove_indexes(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.clear_values(start, count);
        let end = start + count;
        let i = self.ranges.partition_point(|r| r.start < end);
        for r in &mut self.ranges[i..] {
            r.start -= count;
        }
        if i > 0 {
            self.try_merge(i - 1);
        }
        self.check_invariant();
    }

    /// Removes the mapped entries in `[start, start + count)` along with
    /// their addresses, shifting every later address by `-count`.
    pub fn remove_values(&mut self, start: usize, count: usize) {
        self.remove_indexes(start, count);
    }

    /// Returns the smallest mapped address strictly greater than `index`.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let target = index.checked_add(1)?;
        let i = self.ranges.partition_point(|r| r.end() <= target);
        self.ranges.get(i).map(|r| r.start.max(target))
    }

    /// Returns the largest mapped address strictly less than `index`.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let target = index.checked_sub(1)?;
        let i = self.ranges.partition_point(|r| r.start <= target);
        let r = self.ranges.get(i.checked_sub(1)?)?;
        if r.contains(target) {
            Some(target)
        } else {
            Some(r.end() - 1)
        }
    }

    /// Returns the smallest unmapped address strictly greater than `index`.
    pub fn next_gap(&self, index: usize) -> usize {
        let mut target = index + 1;
        let mut i = self.ranges.partition_point(|r| r.end() <= target);
        while i < self.ranges.len() && self.ranges[i].start <= target {
            target = self.ranges[i].end();
            i += 1;
        }
        target
    }

    /// Returns the largest unmapped address strictly less than `index`, or
    /// `None` if every lower address is mapped.
    pub fn previous_gap(&self, index: usize) -> Option<usize> {
        let mut target = index.checked_sub(1)?;
        let mut i = self.ranges.partition_point(|r| r.start <= target);
        while i > 0 && self.ranges[i - 1].contains(target) {
            target = self.ranges[i - 1].start.checked_sub(1)?;
            i -= 1;
        }
        Some(target)
    }

    /// Returns the total number of mapped addresses.
    pub fn index_count(&self) -> usize {
        self.ranges.iter().map(|r| r.count).sum()
    }

    /// Returns the number of mapped addresses in `[lower, upper]`
    /// (inclusive bounds).
    pub fn index_count_in(&self, lower: usize, upper: usize) -> usize {
        if lower > upper {
            return 0;
        }
        self.ranges
            .iter()
            .map(|r| {
                let lo = r.start.max(lower);
                let hi = (r.end() - 1).min(upper);
                (hi + 1).saturating_sub(lo)
            })
            .sum()
    }

    /// Returns the number of distinct ranges.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Returns whether the table maps no addresses.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Removes all mappings.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// Iterates the mapped runs as `(start, count, value)` in address order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.ranges.iter().map(|r| (r.start, r.count, &r.value))
    }

    /// Iterates every mapped address with its value, in address order.
    pub fn indexes(&self) -> impl Iterator<Item = (usize, &T)> {
        self.ranges
            .iter()
            .flat_map(|r| (r.start..r.end()).map(move |i| (i, &r.value)))
    }

    /// Merges `ranges[pos]` with its successor when they touch and carry
    /// equal values.
    fn try_merge(&mut self, pos: usize) {
        if pos + 1 < self.ranges.len()
            && self.ranges[pos].end() == self.ranges[pos + 1].start
            && self.ranges[pos].value == self.ranges[pos + 1].value
        {
            self.ranges[pos].count += self.ranges[pos + 1].count;
            self.ranges.remove(pos + 1);
        }
    }

    #[cfg(debug_assertions)]
    fn check_invariant(&self) {
        for pair in self.ranges.windows(2) {
            debug_assert!(
                pair[0].end() <= pair[1].start,
                "sparse table ranges out of order or overlapping"
            );
        }
        debug_assert!(self.ranges.iter().all(|r| r.count > 0));
    }

    #[cfg(not(debug_assertions))]
    fn check_invariant(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_queries() {
        let table: SparseTable<u32> = SparseTable::new();
        assert_eq!(table.get_value_at(0), None);
        assert_eq!(table.get_value_at(1000), None);
        assert!(!table.contains(5));
        assert_eq!(table.next_index(0), None);
        assert_eq!(table.previous_index(100), None);
        assert_eq!(table.index_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut table = SparseTable::new();
        table.set_values(5, 3, 'a');
        assert_eq!(table.get_value_at(4), None);
        assert_eq!(table.get_value_at(5), Some(&'a'));
        assert_eq!(table.get_value_at(7), Some(&'a'));
        assert_eq!(table.get_value_at(8), None);
        assert_eq!(table.index_count(), 3);
        assert_eq!(table.range_count(), 1);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut table = SparseTable::new();
        table.set_values(5, 0, 1);
        table.add_values(5, 0, 1);
        table.insert_indexes(5, 0);
        table.remove_indexes(5, 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_adjacent_equal_ranges_merge() {
        let mut table = SparseTable::new();
        table.set_values(0, 2, true);
        table.set_values(2, 2, true);
        assert_eq!(table.range_count(), 1);
        assert_eq!(table.index_count(), 4);

        // Unequal values stay separate.
        let mut table = SparseTable::new();
        table.set_values(0, 2, 1);
        table.set_values(2, 2, 2);
        assert_eq!(table.range_count(), 2);
    }

    #[test]
    fn test_overwrite_middle_splits() {
        let mut table = SparseTable::new();
        table.set_values(0, 10, 'x');
        table.set_values(3, 4, 'y');
        assert_eq!(table.get_value_at(2), Some(&'x'));
        assert_eq!(table.get_value_at(3), Some(&'y'));
        assert_eq!(table.get_value_at(6), Some(&'y'));
        assert_eq!(table.get_value_at(7), Some(&'x'));
        assert_eq!(table.range_count(), 3);
    }

    #[test]
    fn test_clear_values() {
        let mut table = SparseTable::new();
        table.set_values(0, 10, 1);
        table.clear_values(2, 3);
        assert!(table.contains(1));
        assert!(!table.contains(2));
        assert!(!table.contains(4));
        assert!(table.contains(5));
        assert_eq!(table.index_count(), 7);
    }

    #[test]
    fn test_add_values_shifts_later_indices() {
        let mut table = SparseTable::new();
        table.set_values(10, 2, 'b');
        table.add_values(0, 3, 'a');
        assert_eq!(table.get_value_at(0), Some(&'a'));
        assert_eq!(table.get_value_at(2), Some(&'a'));
        assert_eq!(table.get_value_at(10), None);
        assert_eq!(table.get_value_at(13), Some(&'b'));
        assert_eq!(table.index_count(), 5);
    }

    #[test]
    fn test_insert_indexes_splits_spanning_range() {
        let mut table = SparseTable::new();
        table.set_values(0, 6, true);
        table.insert_indexes(3, 2);
        assert!(table.contains(2));
        assert!(!table.contains(3));
        assert!(!table.contains(4));
        assert!(table.contains(5));
        assert!(table.contains(7));
        assert!(!table.contains(8));
        assert_eq!(table.index_count(), 6);
    }

    #[test]
    fn test_remove_indexes_shifts_left() {
        let mut table = SparseTable::new();
        table.set_values(0, 2, 'a');
        table.set_values(5, 2, 'b');
        table.remove_indexes(2, 3);
        assert_eq!(table.get_value_at(1), Some(&'a'));
        assert_eq!(table.get_value_at(2), Some(&'b'));
        assert_eq!(table.get_value_at(3), Some(&'b'));
        assert_eq!(table.get_value_at(4), None);
    }

    #[test]
    fn test_remove_indexes_drops_mapped_span() {
        let mut table = SparseTable::new();
        table.set_values(0, 10, 1);
        table.remove_indexes(3, 4);
        assert_eq!(table.index_count(), 6);
        assert_eq!(table.range_count(), 1);
        assert!(table.contains(5));
        assert!(!table.contains(6));
    }

    #[test]
    fn test_neighbor_queries() {
        let mut table = SparseTable::new();
        table.set_values(3, 2, 'a');
        table.set_values(9, 1, 'b');

        assert_eq!(table.next_index(0), Some(3));
        assert_eq!(table.next_index(3), Some(4));
        assert_eq!(table.next_index(4), Some(9));
        assert_eq!(table.next_index(9), None);

        assert_eq!(table.previous_index(0), None);
        assert_eq!(table.previous_index(3), None);
        assert_eq!(table.previous_index(4), Some(3));
        assert_eq!(table.previous_index(9), Some(4));
        assert_eq!(table.previous_index(100), Some(9));
    }

    #[test]
    fn test_gap_queries() {
        let mut table = SparseTable::new();
        table.set_values(0, 3, true);
        table.set_values(5, 2, true);

        assert_eq!(table.next_gap(0), 3);
        assert_eq!(table.next_gap(2), 3);
        assert_eq!(table.next_gap(4), 7);
        assert_eq!(table.previous_gap(5), Some(4));
        assert_eq!(table.previous_gap(3), None);
        assert_eq!(table.previous_gap(0), None);
    }

    #[test]
    fn test_gap_skips_touching_unequal_ranges() {
        let mut table = SparseTable::new();
        table.set_values(0, 2, 1);
        table.set_values(2, 2, 2);
        assert_eq!(table.next_gap(0), 4);
        assert_eq!(table.previous_gap(3), None);
    }

    #[test]
    fn test_index_count_in() {
        let mut table = SparseTable::new();
        table.set_values(2, 4, true);
        table.set_values(10, 2, true);
        assert_eq!(table.index_count_in(0, 20), 6);
        assert_eq!(table.index_count_in(3, 10), 4);
        assert_eq!(table.index_count_in(6, 9), 0);
        assert_eq!(table.index_count_in(5, 2), 0);
    }

    /// Reference implementation: a plain vector with one entry per address.
    struct NaiveTable<T> {
        cells: Vec<Option<T>>,
    }

    impl<T: Clone + PartialEq> NaiveTable<T> {
        fn new() -> Self {
            Self { cells: Vec::new() }
        }

        fn grow_to(&mut self, len: usize) {
            if self.cells.len() < len {
                self.cells.resize(len, None);
            }
        }

        fn set_values(&mut self, start: usize, count: usize, value: T) {
            self.grow_to(start + count);
            for cell in &mut self.cells[start..start + count] {
                *cell = Some(value.clone());
            }
        }

        fn clear_values(&mut self, start: usize, count: usize) {
            let end = (start + count).min(self.cells.len());
            for cell in &mut self.cells[start.min(end)..end] {
                *cell = None;
            }
        }

        fn insert_indexes(&mut self, start: usize, count: usize) {
            self.grow_to(start);
            for _ in 0..count {
                self.cells.insert(start, None);
            }
        }

        fn add_values(&mut self, start: usize, count: usize, value: T) {
            self.insert_indexes(start, count);
            self.set_values(start, count, value);
        }

        fn remove_indexes(&mut self, start: usize, count: usize) {
            let end = (start + count).min(self.cells.len());
            self.cells.drain(start.min(end)..end);
        }

        fn get(&self, index: usize) -> Option<&T> {
            self.cells.get(index).and_then(|c| c.as_ref())
        }

        fn index_count(&self) -> usize {
            self.cells.iter().filter(|c| c.is_some()).count()
        }
    }

    #[test]
    fn test_replay_matches_naive_reference() {
        let mut table = SparseTable::new();
        let mut naive = NaiveTable::new();

        // Deterministic pseudo-random operation sequence.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut rand = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };

        for step in 0..2000 {
            let start = rand() % 64;
            let count = rand() % 8;
            let value = (rand() % 4) as u32;
            match rand() % 5 {
                0 => {
                    table.set_values(start, count, value);
                    naive.set_values(start, count, value);
                }
                1 => {
                    table.clear_values(start, count);
                    naive.clear_values(start, count);
                }
                2 => {
                    table.add_values(start, count, value);
                    naive.add_values(start, count, value);
                }
                3 => {
                    table.insert_indexes(start, count);
                    naive.insert_indexes(start, count);
                }
                _ => {
                    table.remove_indexes(start, count);
                    naive.remove_indexes(start, count);
                }
            }

            assert_eq!(table.index_count(), naive.index_count(), "step {step}");
            for i in 0..128 {
                assert_eq!(
                    table.get_value_at(i),
                    naive.get(i),
                    "step {step}, index {i}"
                );
            }
        }
    }
}
