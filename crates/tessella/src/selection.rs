//! Selection and currency tracking.
//!
//! Selection is a set of view rows plus an anchor slot for range gestures;
//! currency is the single current cell, addressed as `(column, slot)`.
//! Currency notifications can be deferred: a gesture that moves currency
//! several times inside one scope raises a single coalesced
//! `currency_changed` at the end.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use tessella_core::{DeferralCounter, Signal};

use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::row::SlotLayout;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Selection is disabled.
    None,
    /// At most one row.
    #[default]
    Single,
    /// Any number of rows, with range and toggle gestures.
    Extended,
}

/// The current cell: a column's logical index and a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCell {
    /// Logical column index.
    pub column: usize,
    /// The cell's slot.
    pub slot: usize,
}

/// Tracks the selected rows and the current cell.
pub struct SelectionTracker {
    mode: SelectionMode,
    selected: HashSet<usize>,
    /// Range-gesture anchor, as a slot.
    anchor: Option<usize>,
    current: Option<CurrentCell>,
    defer: Arc<DeferralCounter>,

    /// The selected row set changed.
    pub selection_changed: Signal<()>,
    /// Currency moved. Carries the new current cell, or `None` when
    /// currency was cleared.
    pub currency_changed: Signal<Option<CurrentCell>>,
}

impl SelectionTracker {
    /// Creates an empty tracker in [`SelectionMode::Single`].
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            selected: HashSet::new(),
            anchor: None,
            current: None,
            defer: Arc::new(DeferralCounter::new()),
            selection_changed: Signal::new(),
            currency_changed: Signal::new(),
        }
    }

    /// The active selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switches selection mode, clearing any selection that the new mode
    /// cannot represent.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        let trim = match mode {
            SelectionMode::None => !self.selected.is_empty(),
            SelectionMode::Single => self.selected.len() > 1,
            SelectionMode::Extended => false,
        };
        if trim {
            self.selected.clear();
            self.anchor = None;
            self.selection_changed.emit(());
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Whether view row `row` is selected.
    pub fn is_row_selected(&self, row: usize) -> bool {
        self.selected.contains(&row)
    }

    /// The selected view rows, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.selected.iter().copied().collect();
        rows.sort_unstable();
        rows
    }

    /// Selects the row at `slot`, replacing the previous selection and
    /// moving the anchor.
    pub fn select_slot(&mut self, slot: usize, layout: &SlotLayout) -> Result<()> {
        if matches!(self.mode, SelectionMode::None) {
            return Ok(());
        }
        let row = self.data_row(slot, layout)?;
        self.selected.clear();
        self.selected.insert(row);
        self.anchor = Some(slot);
        self.selection_changed.emit(());
        Ok(())
    }

    /// Toggles the row at `slot` in or out of the selection without
    /// touching other rows. In [`SelectionMode::Single`] this degenerates
    /// to select-or-clear.
    pub fn toggle_slot(&mut self, slot: usize, layout: &SlotLayout) -> Result<()> {
        match self.mode {
            SelectionMode::None => return Ok(()),
            SelectionMode::Single => {
                let row = self.data_row(slot, layout)?;
                if self.selected.contains(&row) {
                    self.clear_selection();
                } else {
                    self.select_slot(slot, layout)?;
                }
                return Ok(());
            }
            SelectionMode::Extended => {}
        }
        let row = self.data_row(slot, layout)?;
        if !self.selected.remove(&row) {
            self.selected.insert(row);
        }
        self.anchor = Some(slot);
        self.selection_changed.emit(());
        Ok(())
    }

    /// Replaces the selection with the range between the anchor and `slot`,
    /// inclusive. Without an anchor, or outside
    /// [`SelectionMode::Extended`], this is a plain select.
    pub fn extend_to_slot(&mut self, slot: usize, layout: &SlotLayout) -> Result<()> {
        if !matches!(self.mode, SelectionMode::Extended) {
            return self.select_slot(slot, layout);
        }
        let Some(anchor) = self.anchor else {
            return self.select_slot(slot, layout);
        };
        let row = self.data_row(slot, layout)?;
        let anchor_row = layout.row_of_slot(anchor).unwrap_or(row);
        let (lo, hi) = if anchor_row <= row {
            (anchor_row, row)
        } else {
            (row, anchor_row)
        };
        self.selected.clear();
        self.selected.extend(lo..=hi);
        self.selection_changed.emit(());
        Ok(())
    }

    /// Selects every data row. Group headers never select. Only available
    /// in [`SelectionMode::Extended`].
    pub fn select_all(&mut self, layout: &SlotLayout) {
        if !matches!(self.mode, SelectionMode::Extended) {
            return;
        }
        self.selected.clear();
        self.selected.extend(0..layout.row_count());
        debug!(
            target: targets::SELECTION,
            rows = layout.row_count(),
            "select all"
        );
        self.selection_changed.emit(());
    }

    /// Clears the selection and the anchor.
    pub fn clear_selection(&mut self) {
        if self.selected.is_empty() && self.anchor.is_none() {
            return;
        }
        self.selected.clear();
        self.anchor = None;
        self.selection_changed.emit(());
    }

    fn data_row(&self, slot: usize, layout: &SlotLayout) -> Result<usize> {
        if !layout.is_slot_visible(slot) {
            return Err(GridError::NotADataSlot { slot });
        }
        layout
            .row_of_slot(slot)
            .ok_or(GridError::NotADataSlot { slot })
    }

    // =========================================================================
    // Currency
    // =========================================================================

    /// The current cell, if any.
    pub fn current(&self) -> Option<CurrentCell> {
        self.current
    }

    /// Moves currency. Emits `currency_changed` immediately, or coalesces
    /// it when inside a deferral scope.
    pub fn set_current(&mut self, cell: Option<CurrentCell>) {
        if self.current == cell {
            return;
        }
        self.current = cell;
        debug!(target: targets::SELECTION, ?cell, "currency moved");
        if self.defer.is_deferred() {
            self.defer.mark_pending();
        } else {
            self.currency_changed.emit(cell);
        }
    }

    /// Runs `f` with currency notifications deferred; if currency moved
    /// inside the scope, one coalesced `currency_changed` fires at the end
    /// with the final value.
    pub fn with_deferred_currency<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let defer = Arc::clone(&self.defer);
        let (result, fire) = defer.scoped(|| f(self));
        if fire {
            self.currency_changed.emit(self.current);
        }
        result
    }

    // =========================================================================
    // Index Maintenance
    // =========================================================================

    /// Shifts selected rows after `count` rows were inserted at `row`.
    pub fn rows_inserted(&mut self, row: usize, count: usize) {
        self.selected = self
            .selected
            .iter()
            .map(|&r| if r >= row { r + count } else { r })
            .collect();
    }

    /// Drops and shifts selected rows after `count` rows were removed at
    /// `row`.
    pub fn rows_removed(&mut self, row: usize, count: usize) {
        let end = row + count;
        let before = self.selected.len();
        self.selected = self
            .selected
            .iter()
            .filter(|&&r| r < row || r >= end)
            .map(|&r| if r >= end { r - count } else { r })
            .collect();
        if self.selected.len() != before {
            self.selection_changed.emit(());
        }
    }

    /// Shifts the anchor and current slot after slots were inserted.
    pub fn slots_inserted(&mut self, slot: usize, count: usize) {
        if let Some(anchor) = self.anchor.as_mut() {
            if *anchor >= slot {
                *anchor += count;
            }
        }
        if let Some(current) = self.current.as_mut() {
            if current.slot >= slot {
                current.slot += count;
            }
        }
    }

    /// Shifts or clears the anchor and current slot after slots were
    /// removed.
    pub fn slots_removed(&mut self, slot: usize, count: usize) {
        let end = slot + count;
        self.anchor = match self.anchor {
            Some(a) if a >= end => Some(a - count),
            Some(a) if a >= slot => None,
            other => other,
        };
        match self.current {
            Some(mut c) if c.slot >= end => {
                c.slot -= count;
                self.current = Some(c);
            }
            Some(c) if c.slot >= slot => self.set_current(None),
            _ => {}
        }
    }

    /// Drops all state on a reset; currency is re-established by the owner.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.set_current(None);
        self.selection_changed.emit(());
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("mode", &self.mode)
            .field("selected", &self.selected.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn flat_layout(rows: usize) -> SlotLayout {
        let mut layout = SlotLayout::new();
        layout.rebuild(rows, &[]);
        layout
    }

    #[test]
    fn test_single_mode_replaces() {
        let layout = flat_layout(10);
        let mut tracker = SelectionTracker::new();
        tracker.select_slot(2, &layout).unwrap();
        tracker.select_slot(5, &layout).unwrap();
        assert_eq!(tracker.selected_rows(), vec![5]);
    }

    #[test]
    fn test_extended_toggle_and_range() {
        let layout = flat_layout(10);
        let mut tracker = SelectionTracker::new();
        tracker.set_mode(SelectionMode::Extended);

        tracker.select_slot(2, &layout).unwrap();
        tracker.toggle_slot(4, &layout).unwrap();
        assert_eq!(tracker.selected_rows(), vec![2, 4]);

        // Range extends from the toggle anchor.
        tracker.extend_to_slot(7, &layout).unwrap();
        assert_eq!(tracker.selected_rows(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_mode_none_ignores_gestures() {
        let layout = flat_layout(5);
        let mut tracker = SelectionTracker::new();
        tracker.set_mode(SelectionMode::None);
        tracker.select_slot(1, &layout).unwrap();
        assert!(tracker.selected_rows().is_empty());
    }

    #[test]
    fn test_header_slot_rejected() {
        let mut layout = SlotLayout::new();
        layout.rebuild(
            4,
            &[crate::model::GroupSpan {
                level: 0,
                start_row: 0,
                row_count: 4,
                key: crate::model::CellValue::from("g"),
            }],
        );
        let mut tracker = SelectionTracker::new();
        let err = tracker.select_slot(0, &layout).unwrap_err();
        assert_eq!(err, GridError::NotADataSlot { slot: 0 });
    }

    #[test]
    fn test_select_all_is_extended_only() {
        let layout = flat_layout(6);
        let mut tracker = SelectionTracker::new();
        tracker.select_all(&layout);
        assert!(tracker.selected_rows().is_empty());

        tracker.set_mode(SelectionMode::Extended);
        tracker.select_all(&layout);
        assert_eq!(tracker.selected_rows(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_deferred_currency_coalesces() {
        let mut tracker = SelectionTracker::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            tracker
                .currency_changed
                .connect(move |cell| seen.lock().push(*cell));
        }

        tracker.with_deferred_currency(|tracker| {
            tracker.set_current(Some(CurrentCell { column: 0, slot: 1 }));
            tracker.set_current(Some(CurrentCell { column: 1, slot: 3 }));
        });

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], Some(CurrentCell { column: 1, slot: 3 }));
    }

    #[test]
    fn test_undeferred_currency_fires_immediately() {
        let mut tracker = SelectionTracker::new();
        let count = Arc::new(Mutex::new(0));
        {
            let count = Arc::clone(&count);
            tracker.currency_changed.connect(move |_| *count.lock() += 1);
        }
        tracker.set_current(Some(CurrentCell { column: 0, slot: 0 }));
        tracker.set_current(Some(CurrentCell { column: 0, slot: 0 }));
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_row_shifts() {
        let layout = flat_layout(10);
        let mut tracker = SelectionTracker::new();
        tracker.set_mode(SelectionMode::Extended);
        tracker.select_slot(2, &layout).unwrap();
        tracker.toggle_slot(6, &layout).unwrap();

        tracker.rows_inserted(4, 3);
        assert_eq!(tracker.selected_rows(), vec![2, 9]);

        tracker.rows_removed(0, 3);
        assert_eq!(tracker.selected_rows(), vec![6]);
    }

    #[test]
    fn test_slot_removal_clears_current() {
        let mut tracker = SelectionTracker::new();
        tracker.set_current(Some(CurrentCell { column: 0, slot: 5 }));
        tracker.slots_removed(4, 3);
        assert_eq!(tracker.current(), None);

        tracker.set_current(Some(CurrentCell { column: 0, slot: 8 }));
        tracker.slots_removed(0, 2);
        assert_eq!(tracker.current(), Some(CurrentCell { column: 0, slot: 6 }));
    }
}
