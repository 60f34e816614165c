//! Materialized visual rows and the recycle pools.
//!
//! Only the slots inside the scrolling window own a visual. Visuals leaving
//! the window are unbound and parked in a pool keyed by kind, so steady
//! scrolling reuses a bounded set of visuals no matter how many rows the
//! model holds.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use tessella_core::Signal;

use crate::column::CellElement;
use crate::logging::targets;

use super::slots::RowGroupInfo;

/// Default height for a data row visual, in pixels.
pub const DEFAULT_ROW_HEIGHT: f32 = 22.0;

/// Default height for a group-header visual, in pixels.
pub const DEFAULT_HEADER_HEIGHT: f32 = 24.0;

/// What a visual row presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    /// A data row.
    Row,
    /// A group header.
    GroupHeader,
}

/// One recyclable visual: a data row's cells or a group header's caption,
/// plus its measured height.
#[derive(Debug, Clone)]
pub struct VisualRow {
    kind: VisualKind,
    /// Measured height, seeded with the kind's default.
    pub height: f32,
    /// Cell content, one element per visible column. Empty for headers.
    pub cells: Vec<CellElement>,
    /// Header content. `None` for data rows.
    pub group: Option<RowGroupInfo>,
    /// Whether the bound slot shows its details section.
    pub details_visible: bool,
}

impl VisualRow {
    fn reset(&mut self) {
        self.cells.clear();
        self.group = None;
        self.details_visible = false;
    }

    /// The visual's kind.
    pub fn kind(&self) -> VisualKind {
        self.kind
    }
}

/// Creates and prepares visuals.
///
/// The default implementation produces empty visuals at the default
/// heights; an embedding layer substitutes its own factory to attach real
/// widgets to each visual.
pub trait RowFactory: Send + Sync {
    /// Creates an unbound visual of `kind`.
    fn create(&self, kind: VisualKind) -> VisualRow;

    /// Prepares a visual, new or recycled, before it is bound to `slot`.
    fn prepare(&self, visual: &mut VisualRow, slot: usize) {
        let _ = slot;
        visual.reset();
    }
}

/// The default factory.
#[derive(Debug, Default)]
pub struct DefaultRowFactory;

impl RowFactory for DefaultRowFactory {
    fn create(&self, kind: VisualKind) -> VisualRow {
        VisualRow {
            kind,
            height: match kind {
                VisualKind::Row => DEFAULT_ROW_HEIGHT,
                VisualKind::GroupHeader => DEFAULT_HEADER_HEIGHT,
            },
            cells: Vec::new(),
            group: None,
            details_visible: false,
        }
    }
}

/// The materialized window: live visuals keyed by slot, the scrolling
/// bounds, and the recycle pools.
pub struct DisplayData {
    factory: Arc<dyn RowFactory>,
    visuals: BTreeMap<usize, VisualRow>,
    row_pool: Vec<VisualRow>,
    header_pool: Vec<VisualRow>,
    first_scrolling_slot: usize,
    last_scrolling_slot: usize,
    /// Total visuals ever created, for pool-bound assertions.
    created: usize,

    /// A slot's visual was materialized and bound.
    pub loading_row: Signal<usize>,
    /// A slot's visual is about to be recycled.
    pub unloading_row: Signal<usize>,
    /// A group-header slot was materialized.
    pub loading_row_group: Signal<usize>,
    /// A group-header slot is about to be recycled.
    pub unloading_row_group: Signal<usize>,
}

impl DisplayData {
    /// Creates an empty display with the given factory.
    pub fn new(factory: Arc<dyn RowFactory>) -> Self {
        Self {
            factory,
            visuals: BTreeMap::new(),
            row_pool: Vec::new(),
            header_pool: Vec::new(),
            first_scrolling_slot: 0,
            last_scrolling_slot: 0,
            created: 0,
            loading_row: Signal::new(),
            unloading_row: Signal::new(),
            loading_row_group: Signal::new(),
            unloading_row_group: Signal::new(),
        }
    }

    /// First slot inside the scrolling window.
    pub fn first_scrolling_slot(&self) -> usize {
        self.first_scrolling_slot
    }

    /// Last slot inside the scrolling window.
    pub fn last_scrolling_slot(&self) -> usize {
        self.last_scrolling_slot
    }

    pub(crate) fn set_window(&mut self, first: usize, last: usize) {
        self.first_scrolling_slot = first;
        self.last_scrolling_slot = last;
    }

    /// Number of live (bound) visuals.
    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    /// Number of visuals parked in the pools.
    pub fn pooled_count(&self) -> usize {
        self.row_pool.len() + self.header_pool.len()
    }

    /// Total visuals created over the display's lifetime. Bounded by the
    /// largest window seen, not by the model size.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// The visual bound to `slot`, if materialized.
    pub fn visual(&self, slot: usize) -> Option<&VisualRow> {
        self.visuals.get(&slot)
    }

    /// Mutable access to the visual bound to `slot`.
    pub fn visual_mut(&mut self, slot: usize) -> Option<&mut VisualRow> {
        self.visuals.get_mut(&slot)
    }

    /// Slots with live visuals, ascending.
    pub fn materialized_slots(&self) -> Vec<usize> {
        self.visuals.keys().copied().collect()
    }

    /// Materializes a visual for `slot`, reusing a pooled visual of the
    /// right kind when one is available, and returns it for binding.
    pub fn materialize(&mut self, slot: usize, kind: VisualKind) -> &mut VisualRow {
        // Rebinding an already-live slot parks the old visual first.
        self.recycle(slot);
        let pool = match kind {
            VisualKind::Row => &mut self.row_pool,
            VisualKind::GroupHeader => &mut self.header_pool,
        };
        let mut visual = match pool.pop() {
            Some(visual) => visual,
            None => {
                self.created += 1;
                self.factory.create(kind)
            }
        };
        self.factory.prepare(&mut visual, slot);
        match kind {
            VisualKind::Row => self.loading_row.emit(slot),
            VisualKind::GroupHeader => self.loading_row_group.emit(slot),
        }
        trace!(target: targets::VIRTUALIZER, slot, "visual materialized");
        self.visuals.entry(slot).or_insert(visual)
    }

    /// Unbinds the visual at `slot` and parks it in its pool.
    pub fn recycle(&mut self, slot: usize) {
        let Some(visual) = self.visuals.remove(&slot) else {
            return;
        };
        match visual.kind {
            VisualKind::Row => {
                self.unloading_row.emit(slot);
                self.row_pool.push(visual);
            }
            VisualKind::GroupHeader => {
                self.unloading_row_group.emit(slot);
                self.header_pool.push(visual);
            }
        }
        trace!(target: targets::VIRTUALIZER, slot, "visual recycled");
    }

    /// Recycles every live visual.
    pub fn recycle_all(&mut self) {
        let slots: Vec<usize> = self.visuals.keys().copied().collect();
        for slot in slots {
            self.recycle(slot);
        }
    }

    /// Rekeys live visuals after `count` slots were inserted at `slot`.
    pub fn slots_inserted(&mut self, slot: usize, count: usize) {
        let shifted: Vec<(usize, VisualRow)> = {
            let keys: Vec<usize> = self
                .visuals
                .keys()
                .copied()
                .filter(|&s| s >= slot)
                .collect();
            keys.into_iter()
                .rev()
                .filter_map(|s| self.visuals.remove(&s).map(|v| (s + count, v)))
                .collect()
        };
        for (s, v) in shifted {
            self.visuals.insert(s, v);
        }
        if self.first_scrolling_slot >= slot {
            self.first_scrolling_slot += count;
        }
        if self.last_scrolling_slot >= slot {
            self.last_scrolling_slot += count;
        }
    }

    /// Recycles visuals in the removed span and rekeys the rest after
    /// `count` slots were removed at `slot`.
    pub fn slots_removed(&mut self, slot: usize, count: usize) {
        let end = slot + count;
        let removed: Vec<usize> = self
            .visuals
            .keys()
            .copied()
            .filter(|&s| s >= slot && s < end)
            .collect();
        for s in removed {
            self.recycle(s);
        }
        let shifted: Vec<(usize, VisualRow)> = {
            let keys: Vec<usize> = self
                .visuals
                .keys()
                .copied()
                .filter(|&s| s >= end)
                .collect();
            keys.into_iter()
                .filter_map(|s| self.visuals.remove(&s).map(|v| (s - count, v)))
                .collect()
        };
        for (s, v) in shifted {
            self.visuals.insert(s, v);
        }
        self.first_scrolling_slot = self.first_scrolling_slot.saturating_sub(count);
        self.last_scrolling_slot = self.last_scrolling_slot.saturating_sub(count);
    }
}

impl std::fmt::Debug for DisplayData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayData")
            .field("visuals", &self.visuals.len())
            .field("pooled", &self.pooled_count())
            .field("window", &(self.first_scrolling_slot, self.last_scrolling_slot))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn display() -> DisplayData {
        DisplayData::new(Arc::new(DefaultRowFactory))
    }

    #[test]
    fn test_materialize_and_recycle_reuses_visuals() {
        let mut display = display();
        display.materialize(0, VisualKind::Row);
        display.materialize(1, VisualKind::Row);
        assert_eq!(display.visual_count(), 2);
        assert_eq!(display.created_count(), 2);

        display.recycle(0);
        assert_eq!(display.pooled_count(), 1);

        // The pooled visual is reused; nothing new is created.
        display.materialize(5, VisualKind::Row);
        assert_eq!(display.created_count(), 2);
        assert_eq!(display.pooled_count(), 0);
    }

    #[test]
    fn test_pools_are_per_kind() {
        let mut display = display();
        display.materialize(0, VisualKind::Row);
        display.recycle(0);

        // A header request must not drain the row pool.
        display.materialize(0, VisualKind::GroupHeader);
        assert_eq!(display.created_count(), 2);
        assert_eq!(display.visual(0).unwrap().kind(), VisualKind::GroupHeader);
    }

    #[test]
    fn test_loading_signals_fire() {
        let mut display = display();
        let loaded = Arc::new(Mutex::new(Vec::new()));
        let unloaded = Arc::new(Mutex::new(Vec::new()));
        {
            let loaded = Arc::clone(&loaded);
            display.loading_row.connect(move |&slot| loaded.lock().push(slot));
        }
        {
            let unloaded = Arc::clone(&unloaded);
            display
                .unloading_row
                .connect(move |&slot| unloaded.lock().push(slot));
        }

        display.materialize(3, VisualKind::Row);
        display.recycle(3);
        assert_eq!(*loaded.lock(), vec![3]);
        assert_eq!(*unloaded.lock(), vec![3]);
    }

    #[test]
    fn test_slot_shift_rekeys_visuals() {
        let mut display = display();
        display.materialize(2, VisualKind::Row);
        display.materialize(4, VisualKind::Row);
        display.set_window(2, 4);

        display.slots_inserted(3, 2);
        assert!(display.visual(2).is_some());
        assert!(display.visual(4).is_none());
        assert!(display.visual(6).is_some());
        assert_eq!(display.last_scrolling_slot(), 6);

        display.slots_removed(0, 2);
        assert!(display.visual(0).is_some());
        assert!(display.visual(4).is_some());
        assert_eq!(display.first_scrolling_slot(), 0);
    }

    #[test]
    fn test_slots_removed_recycles_span() {
        let mut display = display();
        display.materialize(1, VisualKind::Row);
        display.materialize(2, VisualKind::Row);
        display.slots_removed(1, 1);
        assert_eq!(display.visual_count(), 1);
        assert_eq!(display.pooled_count(), 1);
        assert!(display.visual(1).is_some());
    }
}
