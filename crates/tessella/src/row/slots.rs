//! Slot addressing.
//!
//! A *slot* is a vertical position in the grid: one per data row plus one
//! per group header. Slots are dense addresses; which of them are actually
//! visible depends on collapsed group subtrees. All per-slot state lives in
//! sparse tables so a million-row grid with three groups costs three header
//! entries, not a million.
//!
//! Incremental row insert/remove shifts the tables in slot space. Grouped
//! or sorted shaping changes arrive as a reset and rebuild the layout from
//! the connection's group spans.

use tracing::debug;

use crate::logging::targets;
use crate::model::{CellValue, GroupSpan};
use crate::sparse::SparseTable;

/// A group header occupying one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupInfo {
    /// Nesting level; 0 is outermost.
    pub level: usize,
    /// The shared key value of the rows under this header.
    pub key: CellValue,
    /// Number of data rows under this header, across all deeper levels.
    pub row_count: usize,
}

/// Maps slots to rows, group headers, collapsed state, and row-details
/// state.
#[derive(Debug, Default)]
pub struct SlotLayout {
    /// Header placement, keyed by header slot.
    headers: SparseTable<RowGroupInfo>,
    /// Headers the user has collapsed, keyed by header slot.
    collapsed_headers: SparseTable<bool>,
    /// Slots hidden because an enclosing header is collapsed. Derived from
    /// `collapsed_headers`.
    hidden: SparseTable<bool>,
    /// Data slots showing their details section.
    details: SparseTable<bool>,
    row_count: usize,
}

impl SlotLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds header placement from the connection's group spans,
    /// discarding collapse and details state.
    pub fn rebuild(&mut self, row_count: usize, spans: &[GroupSpan]) {
        self.headers.clear();
        self.collapsed_headers.clear();
        self.hidden.clear();
        self.details.clear();
        self.row_count = row_count;

        // Spans arrive sorted by (start_row, level), so headers sharing a
        // start row stack outermost-first and each lands after every header
        // already placed before it.
        let mut placed = 0;
        for span in spans {
            let slot = span.start_row + placed;
            self.headers.set_value(
                slot,
                RowGroupInfo {
                    level: span.level,
                    key: span.key.clone(),
                    row_count: span.row_count,
                },
            );
            placed += 1;
        }
        debug!(
            target: targets::SLOTS,
            row_count,
            headers = placed,
            "slot layout rebuilt"
        );
    }

    /// Total slots: data rows plus group headers, collapsed or not.
    pub fn slot_count(&self) -> usize {
        self.row_count + self.headers.index_count()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Slots not hidden by a collapsed ancestor.
    pub fn visible_slot_count(&self) -> usize {
        self.slot_count() - self.hidden.index_count()
    }

    /// Whether `slot` holds a group header.
    pub fn is_header_slot(&self, slot: usize) -> bool {
        self.headers.contains(slot)
    }

    /// The header at `slot`, if it is a header slot.
    pub fn group_info(&self, slot: usize) -> Option<&RowGroupInfo> {
        self.headers.get_value_at(slot)
    }

    /// Whether `slot` is visible (no collapsed ancestor).
    pub fn is_slot_visible(&self, slot: usize) -> bool {
        slot < self.slot_count() && !self.hidden.contains(slot)
    }

    // =========================================================================
    // Slot <-> Row Conversion
    // =========================================================================

    /// The slot holding view row `row`.
    pub fn slot_of_row(&self, row: usize) -> usize {
        let mut slot = row;
        for (header_slot, _) in self.headers.indexes() {
            if header_slot <= slot {
                slot += 1;
            } else {
                break;
            }
        }
        slot
    }

    /// The view row at `slot`, or `None` for header slots.
    pub fn row_of_slot(&self, slot: usize) -> Option<usize> {
        if self.headers.contains(slot) || slot >= self.slot_count() {
            return None;
        }
        let headers_before = if slot == 0 {
            0
        } else {
            self.headers.index_count_in(0, slot - 1)
        };
        Some(slot - headers_before)
    }

    // =========================================================================
    // Visibility Walks
    // =========================================================================

    /// The first visible slot, or `None` when the grid is empty.
    pub fn first_visible_slot(&self) -> Option<usize> {
        let count = self.slot_count();
        if count == 0 {
            return None;
        }
        let slot = if self.hidden.contains(0) {
            self.hidden.next_gap(0)
        } else {
            0
        };
        (slot < count).then_some(slot)
    }

    /// The smallest visible slot strictly after `slot`.
    pub fn next_visible_slot(&self, slot: usize) -> Option<usize> {
        let next = self.hidden.next_gap(slot);
        (next < self.slot_count()).then_some(next)
    }

    /// The largest visible slot strictly before `slot`.
    pub fn previous_visible_slot(&self, slot: usize) -> Option<usize> {
        let mut candidate = self.hidden.previous_gap(slot)?;
        loop {
            if candidate < self.slot_count() {
                return Some(candidate);
            }
            candidate = self.hidden.previous_gap(candidate)?;
        }
    }

    /// The last visible slot, or `None` when everything is hidden or empty.
    pub fn last_visible_slot(&self) -> Option<usize> {
        let count = self.slot_count();
        if count == 0 {
            return None;
        }
        if self.is_slot_visible(count - 1) {
            Some(count - 1)
        } else {
            self.previous_visible_slot(count - 1)
        }
    }

    /// The chain of header slots enclosing `slot`, outermost first.
    ///
    /// Walks backwards through headers with strictly decreasing level; the
    /// nearest preceding header is the innermost ancestor.
    pub fn group_chain(&self, slot: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = slot;
        let mut floor: Option<usize> = None;
        while let Some(header_slot) = self.headers.previous_index(cursor) {
            if let Some(info) = self.headers.get_value_at(header_slot) {
                if floor.map_or(true, |f| info.level < f) {
                    chain.push(header_slot);
                    floor = Some(info.level);
                    if info.level == 0 {
                        break;
                    }
                }
            }
            cursor = header_slot;
        }
        chain.reverse();
        chain
    }

    // =========================================================================
    // Collapse / Expand
    // =========================================================================

    /// The slots under the header at `header_slot`: its data rows and every
    /// nested header, excluding the header itself. Returns `(start, count)`.
    pub fn subtree_extent(&self, header_slot: usize) -> Option<(usize, usize)> {
        let level = self.headers.get_value_at(header_slot)?.level;
        let start = header_slot + 1;
        let mut end = self.slot_count();
        let mut cursor = header_slot;
        while let Some(next) = self.headers.next_index(cursor) {
            match self.headers.get_value_at(next) {
                Some(info) if info.level > level => cursor = next,
                _ => {
                    end = next;
                    break;
                }
            }
        }
        Some((start, end - start))
    }

    /// Whether the header at `header_slot` is collapsed.
    pub fn is_collapsed(&self, header_slot: usize) -> bool {
        self.collapsed_headers.contains(header_slot)
    }

    /// Collapses the header at `header_slot`, hiding its subtree. Returns
    /// whether the state changed.
    pub fn collapse(&mut self, header_slot: usize) -> bool {
        if !self.headers.contains(header_slot) || self.is_collapsed(header_slot) {
            return false;
        }
        self.collapsed_headers.set_value(header_slot, true);
        self.rebuild_hidden();
        debug!(target: targets::SLOTS, slot = header_slot, "group collapsed");
        true
    }

    /// Expands the header at `header_slot`. Collapsed subgroups inside it
    /// stay collapsed. Returns whether the state changed.
    pub fn expand(&mut self, header_slot: usize) -> bool {
        if !self.is_collapsed(header_slot) {
            return false;
        }
        self.collapsed_headers.clear_value(header_slot);
        self.rebuild_hidden();
        debug!(target: targets::SLOTS, slot = header_slot, "group expanded");
        true
    }

    fn rebuild_hidden(&mut self) {
        self.hidden.clear();
        let collapsed: Vec<usize> = self.collapsed_headers.indexes().map(|(s, _)| s).collect();
        for header_slot in collapsed {
            if let Some((start, count)) = self.subtree_extent(header_slot) {
                self.hidden.set_values(start, count, true);
            }
        }
    }

    // =========================================================================
    // Row Details
    // =========================================================================

    /// Whether the data slot at `slot` shows its details section.
    pub fn details_visible(&self, slot: usize) -> bool {
        self.details.contains(slot)
    }

    /// Shows or hides the details section of a data slot. Header slots are
    /// ignored.
    pub fn set_details_visible(&mut self, slot: usize, visible: bool) {
        if self.headers.contains(slot) {
            return;
        }
        if visible {
            self.details.set_value(slot, true);
        } else {
            self.details.clear_value(slot);
        }
    }

    // =========================================================================
    // Incremental Shifts
    // =========================================================================

    /// Applies an incremental row insertion at view row `row`, shifting
    /// every per-slot table. Only valid while no grouping is active; grouped
    /// changes arrive as resets and go through [`rebuild`](Self::rebuild).
    pub fn rows_inserted(&mut self, row: usize, count: usize) {
        let slot = self.slot_of_row(row);
        self.headers.insert_indexes(slot, count);
        self.collapsed_headers.insert_indexes(slot, count);
        self.hidden.insert_indexes(slot, count);
        self.details.insert_indexes(slot, count);
        self.row_count += count;
    }

    /// Applies an incremental row removal at view row `row`.
    pub fn rows_removed(&mut self, row: usize, count: usize) {
        let slot = self.slot_of_row(row);
        self.headers.remove_indexes(slot, count);
        self.collapsed_headers.remove_indexes(slot, count);
        self.hidden.remove_indexes(slot, count);
        self.details.remove_indexes(slot, count);
        self.row_count = self.row_count.saturating_sub(count);
    }
}
