//! The grid façade.
//!
//! [`DataGrid`] owns the whole stack: the data connection, the column
//! collection, the slot layout, the materialized display, selection,
//! editing, and the interaction machines. It is the coordinator the
//! individual layers stay ignorant of: collection changes fan out to every
//! per-slot structure, currency changes resolve edits first, header drops
//! raise the cancellable reorder notifications, and viewport updates re-run
//! width resolution and the window fill.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessella::column::{ColumnWidth, GridColumn};
//! use tessella::grid::DataGrid;
//! use tessella::model::{CellValue, VecModel};
//!
//! let model = VecModel::from_rows(2, rows);
//! let mut grid = DataGrid::new(model);
//! grid.add_column(GridColumn::new("Name", 0).with_width(ColumnWidth::STAR));
//! grid.add_column(GridColumn::new("Size", 1).with_width(ColumnWidth::Pixel(80.0)));
//! grid.set_viewport(640.0, 480.0);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use tessella_core::Signal;

use crate::column::{resolve_widths, ColumnCollection, EditTrigger, GridColumn};
use crate::editing::{CommitResult, EditingMachine};
use crate::error::{GridError, Result};
use crate::geometry::Size;
use crate::interaction::{
    HeaderInteraction, HeaderReleaseOutcome, PointerEvent, RowReleaseOutcome,
    RowReorderInteraction,
};
use crate::logging::targets;
use crate::model::{
    CollectionChange, DataConnection, GridModel, GroupDescription, SortOrder,
};
use crate::row::{
    DefaultRowFactory, DisplayData, RowFactory, RowVirtualizer, SlotLayout, VisualKind,
    DEFAULT_ROW_HEIGHT,
};
use crate::selection::{CurrentCell, SelectionTracker};

/// Payload of the cancellable column-reordering notification.
#[derive(Clone)]
pub struct ColumnReordering {
    /// Logical index of the dragged column.
    pub column: usize,
    /// Requested insertion display index.
    pub target: usize,
    canceled: Arc<AtomicBool>,
}

impl ColumnReordering {
    /// Prevents the reorder from being applied.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

/// Payload of the cancellable row-reordering notification.
#[derive(Clone)]
pub struct RowReordering {
    /// View row being dragged.
    pub from: usize,
    /// Requested insertion row.
    pub to: usize,
    canceled: Arc<AtomicBool>,
}

impl RowReordering {
    /// Prevents the move from being applied.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

/// The virtualized data grid.
pub struct DataGrid {
    connection: DataConnection,
    columns: ColumnCollection,
    layout: SlotLayout,
    display: DisplayData,
    virtualizer: RowVirtualizer,
    selection: SelectionTracker,
    editing: EditingMachine,
    header: HeaderInteraction,
    row_drag: RowReorderInteraction,
    viewport: Size,
    /// Width reserved at the leading edge for row headers.
    row_header_width: f32,
    /// Width reserved for a vertical scrollbar.
    scrollbar_reserve: f32,
    first_slot: usize,
    /// Collection changes captured from the connection's signal, applied on
    /// the next refresh.
    pending: Arc<Mutex<Vec<CollectionChange>>>,

    /// A column is about to move to a new display index; cancellable.
    pub column_reordering: Signal<ColumnReordering>,
    /// A column moved. Args: (logical, old display index, new display index).
    pub column_reordered: Signal<(usize, usize, usize)>,
    /// A column's display index changed, by drag or by
    /// [`set_column_display_index`](DataGrid::set_column_display_index).
    /// Args: (logical, new display index).
    pub column_display_index_changed: Signal<(usize, usize)>,
    /// A row is about to move in the backing collection; cancellable.
    pub row_reordering: Signal<RowReordering>,
    /// A row moved in the backing collection. Args: (from, to).
    pub row_reordered: Signal<(usize, usize)>,
    /// A column header was clicked (sort toggled). Args: (logical, order).
    pub sort_toggled: Signal<(usize, SortOrder)>,
}

impl DataGrid {
    /// Creates a grid over `model` with the default row factory and no
    /// columns.
    pub fn new(model: Arc<dyn GridModel>) -> Self {
        Self::with_row_factory(model, Arc::new(DefaultRowFactory))
    }

    /// Creates a grid over `model` with a custom visual-row factory.
    pub fn with_row_factory(model: Arc<dyn GridModel>, factory: Arc<dyn RowFactory>) -> Self {
        let connection = DataConnection::new(model);
        let pending = Arc::new(Mutex::new(Vec::new()));
        {
            let pending = Arc::clone(&pending);
            connection
                .changed
                .connect(move |change| pending.lock().push(*change));
        }

        let mut layout = SlotLayout::new();
        layout.rebuild(connection.row_count(), &connection.group_spans());

        Self {
            connection,
            columns: ColumnCollection::new(),
            layout,
            display: DisplayData::new(factory),
            virtualizer: RowVirtualizer::new(),
            selection: SelectionTracker::new(),
            editing: EditingMachine::new(),
            header: HeaderInteraction::new(),
            row_drag: RowReorderInteraction::new(),
            viewport: Size::ZERO,
            row_header_width: 0.0,
            scrollbar_reserve: 0.0,
            first_slot: 0,
            pending,
            column_reordering: Signal::new(),
            column_reordered: Signal::new(),
            column_display_index_changed: Signal::new(),
            row_reordering: Signal::new(),
            row_reordered: Signal::new(),
            sort_toggled: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The data connection.
    pub fn connection(&self) -> &DataConnection {
        &self.connection
    }

    /// The column collection.
    pub fn columns(&self) -> &ColumnCollection {
        &self.columns
    }

    /// The slot layout.
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// The materialized display. Its loading/unloading signals live here.
    pub fn display(&self) -> &DisplayData {
        &self.display
    }

    /// The selection and currency tracker. Its `selection_changed` and
    /// `currency_changed` signals live here.
    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Mutable access to the selection tracker.
    pub fn selection_mut(&mut self) -> &mut SelectionTracker {
        &mut self.selection
    }

    /// The edit-state machine. Its edit ending/ended signals live here.
    pub fn editing(&self) -> &EditingMachine {
        &self.editing
    }

    /// Mutable access to the edit machine, for the embedding layer to reach
    /// the live editor.
    pub fn editing_mut(&mut self) -> &mut EditingMachine {
        &mut self.editing
    }

    /// Number of view rows.
    pub fn row_count(&self) -> usize {
        self.connection.row_count()
    }

    /// Total slots (rows plus group headers).
    pub fn slot_count(&self) -> usize {
        self.layout.slot_count()
    }

    /// Slots not hidden by collapsed groups.
    pub fn visible_slot_count(&self) -> usize {
        self.layout.visible_slot_count()
    }

    /// The current cell, if any.
    pub fn current_cell(&self) -> Option<CurrentCell> {
        self.selection.current()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Appends a column and re-resolves widths. Returns the logical index.
    pub fn add_column(&mut self, column: GridColumn) -> usize {
        let logical = self.columns.push(column);
        self.resolve_column_widths();
        logical
    }

    /// Replaces a column's width intent and re-resolves.
    pub fn set_column_width(&mut self, column: usize, width: crate::column::ColumnWidth) -> Result<()> {
        self.columns.column_mut(column)?.set_width(width);
        self.resolve_column_widths();
        Ok(())
    }

    /// Shows or hides a column and re-resolves widths.
    pub fn set_column_visible(&mut self, column: usize, visible: bool) -> Result<()> {
        self.columns.column_mut(column)?.set_visible(visible);
        self.resolve_column_widths();
        Ok(())
    }

    /// Moves a column to a new display index, raising the cancellable
    /// `column_reordering` notification first.
    pub fn set_column_display_index(&mut self, column: usize, target: usize) -> Result<()> {
        let canceled = Arc::new(AtomicBool::new(false));
        self.column_reordering.emit(ColumnReordering {
            column,
            target,
            canceled: Arc::clone(&canceled),
        });
        if canceled.load(Ordering::SeqCst) {
            return Ok(());
        }
        let from = self
            .columns
            .display_index(column)
            .ok_or(GridError::ColumnOutOfBounds {
                index: column,
                count: self.columns.len(),
            })?;
        self.columns.set_display_index(column, target)?;
        self.column_reordered.emit((column, from, target));
        self.column_display_index_changed.emit((column, target));
        Ok(())
    }

    /// Pins the first `count` visible columns to the leading edge.
    pub fn set_frozen_leading_columns(&mut self, count: usize) -> Result<()> {
        self.columns.set_frozen_leading(count)
    }

    /// Pins the last `count` visible columns to the trailing edge.
    pub fn set_frozen_trailing_columns(&mut self, count: usize) -> Result<()> {
        self.columns.set_frozen_trailing(count)
    }

    /// Sets the width reserved for row headers, re-resolving widths.
    pub fn set_row_header_width(&mut self, width: f32) {
        self.row_header_width = width.max(0.0);
        self.resolve_column_widths();
    }

    /// Sets the width reserved for a vertical scrollbar, re-resolving
    /// widths.
    pub fn set_scrollbar_reserve(&mut self, width: f32) {
        self.scrollbar_reserve = width.max(0.0);
        self.resolve_column_widths();
    }

    /// Re-runs width resolution against the current viewport, minus the
    /// row-header and scrollbar reserves. Suspended while a resize drag is
    /// live.
    fn resolve_column_widths(&mut self) {
        if self.header.is_resizing() {
            return;
        }
        let available =
            (self.viewport.width - self.row_header_width - self.scrollbar_reserve).max(0.0);
        resolve_widths(&mut self.columns, available);
    }

    // =========================================================================
    // Shaping
    // =========================================================================

    /// Toggles sorting on a column's values: unsorted becomes ascending,
    /// ascending descending, descending ascending. The resulting reset is
    /// processed immediately.
    pub fn toggle_sort(&mut self, column: usize) -> Result<SortOrder> {
        let value_column = self.columns.column(column)?.value_column();
        let order = self.connection.toggle_sort(value_column);
        self.columns.set_sort_indicator(column, order);
        self.sort_toggled.emit((column, order));
        self.refresh();
        Ok(order)
    }

    /// Groups rows by the given columns' values, outermost first.
    pub fn set_group_columns(&mut self, columns: Vec<usize>) -> Result<()> {
        let mut descriptions = Vec::with_capacity(columns.len());
        for column in columns {
            descriptions.push(GroupDescription {
                column: self.columns.column(column)?.value_column(),
            });
        }
        self.connection.set_group_descriptions(descriptions);
        self.refresh();
        Ok(())
    }

    // =========================================================================
    // Viewport & Scrolling
    // =========================================================================

    /// Sets the viewport size, re-resolving widths and refilling the
    /// window.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Size::new(width, height);
        self.resolve_column_widths();
        self.refresh();
    }

    /// Scrolls so `slot` is the first scrolling slot.
    pub fn scroll_to_slot(&mut self, slot: usize) -> Result<()> {
        self.process_pending();
        if slot >= self.layout.slot_count() {
            return Err(GridError::SlotOutOfBounds {
                slot,
                count: self.layout.slot_count(),
            });
        }
        self.first_slot = slot;
        self.fill_window();
        Ok(())
    }

    /// Applies pending collection changes and refills the window.
    pub fn refresh(&mut self) {
        self.process_pending();
        self.fill_window();
    }

    /// Estimated total content height for scroll-extent calculations.
    pub fn estimated_extent(&self) -> f32 {
        self.virtualizer.estimated_extent(&self.layout)
    }

    /// Feeds a measured row height into the estimator and stores it on the
    /// slot's visual.
    pub fn note_row_height(&mut self, slot: usize, height: f32) {
        if let Some(visual) = self.display.visual_mut(slot) {
            visual.height = height;
            if visual.kind() == VisualKind::Row {
                self.virtualizer.estimator_mut().note(height);
            }
        }
    }

    fn fill_window(&mut self) {
        let connection = &self.connection;
        let columns = &self.columns;
        let layout = &self.layout;
        let display = &mut self.display;
        let virtualizer = &mut self.virtualizer;
        let result = virtualizer.refresh(
            display,
            layout,
            self.first_slot,
            self.viewport.height.max(0.0),
            |slot, visual| {
                if let Some(info) = layout.group_info(slot) {
                    visual.group = Some(info.clone());
                } else if let Some(row) = layout.row_of_slot(slot) {
                    visual.details_visible = layout.details_visible(slot);
                    visual.cells = columns
                        .visible_iter()
                        .map(|(_, column)| {
                            let value = connection.value(row, column.value_column());
                            column.factory().generate_element(row, &value)
                        })
                        .collect();
                }
            },
        );
        if let Some((first, _)) = result {
            self.first_slot = first;
        }
    }

    // =========================================================================
    // Collection Changes
    // =========================================================================

    /// Applies collection changes captured since the last refresh.
    ///
    /// Incremental inserts and removes shift the slot structures in place;
    /// a reset rebuilds the layout, abandons any edit session, and drops
    /// selection and currency. A reset supersedes earlier incremental
    /// changes still in the queue.
    pub fn process_pending(&mut self) {
        let changes: Vec<CollectionChange> = std::mem::take(&mut *self.pending.lock());
        if changes.is_empty() {
            return;
        }
        if changes.iter().any(|c| matches!(c, CollectionChange::Reset)) {
            self.apply_reset();
            return;
        }
        for change in changes {
            match change {
                CollectionChange::Inserted { index, count } => self.apply_inserted(index, count),
                CollectionChange::Removed { index, count } => self.apply_removed(index, count),
                CollectionChange::Replaced { index, count } => self.apply_replaced(index, count),
                CollectionChange::Reset => {}
            }
        }
    }

    fn apply_inserted(&mut self, row: usize, count: usize) {
        let slot = self.layout.slot_of_row(row);
        self.layout.rows_inserted(row, count);
        self.display.slots_inserted(slot, count);
        self.selection.rows_inserted(row, count);
        self.selection.slots_inserted(slot, count);
        self.editing.rows_inserted(row, count);
        debug!(target: targets::CORE, row, count, "rows inserted");
    }

    fn apply_removed(&mut self, row: usize, count: usize) {
        let slot = self.layout.slot_of_row(row);
        self.editing.rows_removed(row, count);
        self.layout.rows_removed(row, count);
        self.display.slots_removed(slot, count);
        self.selection.rows_removed(row, count);
        self.selection.slots_removed(slot, count);
        debug!(target: targets::CORE, row, count, "rows removed");
    }

    fn apply_replaced(&mut self, row: usize, count: usize) {
        // Rebind by recycling; the next fill re-materializes from the pool.
        for r in row..row + count {
            let slot = self.layout.slot_of_row(r);
            self.display.recycle(slot);
        }
    }

    fn apply_reset(&mut self) {
        self.editing.abandon();
        self.layout
            .rebuild(self.connection.row_count(), &self.connection.group_spans());
        self.display.recycle_all();
        self.selection.reset();
        self.first_slot = 0;
        debug!(target: targets::CORE, rows = self.connection.row_count(), "view reset");
    }

    // =========================================================================
    // Currency & Selection
    // =========================================================================

    /// Moves the current cell to `(column, slot)`.
    ///
    /// Moving to a different row resolves any open edit session with a
    /// commit first; a failed commit rejects the currency change and
    /// returns `Ok(false)` with all prior state retained.
    pub fn set_current_cell(&mut self, column: usize, slot: usize) -> Result<bool> {
        self.process_pending();
        self.columns.column(column)?;
        if self.connection.row_count() == 0 {
            return Err(GridError::NoCurrentRow);
        }
        if slot >= self.layout.slot_count() {
            return Err(GridError::SlotOutOfBounds {
                slot,
                count: self.layout.slot_count(),
            });
        }
        let row = self
            .layout
            .row_of_slot(slot)
            .filter(|_| self.layout.is_slot_visible(slot))
            .ok_or(GridError::NotADataSlot { slot })?;

        // Any move off the edited cell ends the cell session; the row
        // session survives a move within the same row.
        if let Some((open_row, open_column)) = self.editing.editing_cell() {
            if open_row != row || open_column != column {
                let result = if open_row == row {
                    self.editing.commit_cell_edit(&self.connection)?
                } else {
                    self.editing.commit_row_edit(&self.connection)?
                };
                if result == CommitResult::Invalid {
                    debug!(
                        target: targets::SELECTION,
                        row, "currency change rejected by failing commit"
                    );
                    return Ok(false);
                }
            }
        } else if self.editing.editing_row().is_some_and(|r| r != row) {
            if self.editing.commit_row_edit(&self.connection)? == CommitResult::Invalid {
                debug!(
                    target: targets::SELECTION,
                    row, "currency change rejected by failing commit"
                );
                return Ok(false);
            }
        }

        self.selection.set_current(Some(CurrentCell { column, slot }));
        Ok(true)
    }

    /// Clears currency, resolving any open edit with a commit first.
    pub fn clear_current_cell(&mut self) -> Result<bool> {
        if self.editing.editing_row().is_some() {
            if self.editing.commit_row_edit(&self.connection)? == CommitResult::Invalid {
                return Ok(false);
            }
        }
        self.selection.set_current(None);
        Ok(true)
    }

    /// Selects the row at `slot`, replacing the selection.
    pub fn select_slot(&mut self, slot: usize) -> Result<()> {
        self.selection.select_slot(slot, &self.layout)
    }

    /// Selects every data row (extended mode only).
    pub fn select_all(&mut self) {
        self.process_pending();
        self.selection.select_all(&self.layout);
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Begins editing the current cell. Returns `Ok(false)` when there is
    /// nothing current or the edit was refused.
    pub fn begin_edit(&mut self, trigger: EditTrigger) -> Result<bool> {
        let Some(current) = self.selection.current() else {
            return Ok(false);
        };
        let row = self
            .layout
            .row_of_slot(current.slot)
            .ok_or(GridError::NotADataSlot { slot: current.slot })?;
        self.editing
            .begin_cell_edit(row, current.column, trigger, &self.columns, &self.connection)
    }

    /// Commits the open cell edit.
    pub fn commit_edit(&mut self) -> Result<CommitResult> {
        self.editing.commit_cell_edit(&self.connection)
    }

    /// Cancels the open cell edit.
    pub fn cancel_edit(&mut self) -> Result<()> {
        self.editing.cancel_cell_edit()
    }

    /// Commits the row session (any open cell edit first).
    pub fn commit_row_edit(&mut self) -> Result<CommitResult> {
        self.editing.commit_row_edit(&self.connection)
    }

    /// Cancels the row session and any open cell edit.
    pub fn cancel_row_edit(&mut self) -> Result<()> {
        self.editing.cancel_row_edit()
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Collapses the group header at `slot`, then refills the window.
    pub fn collapse_group(&mut self, slot: usize) -> bool {
        if !self.layout.collapse(slot) {
            return false;
        }
        // Currency may now point into the hidden subtree.
        if let Some(current) = self.selection.current() {
            if !self.layout.is_slot_visible(current.slot) {
                self.selection.set_current(None);
            }
        }
        self.fill_window();
        true
    }

    /// Expands the group header at `slot`, then refills the window.
    pub fn expand_group(&mut self, slot: usize) -> bool {
        if !self.layout.expand(slot) {
            return false;
        }
        self.fill_window();
        true
    }

    /// Shows or hides the details section of the data slot at `slot`.
    pub fn set_details_visible(&mut self, slot: usize, visible: bool) {
        self.layout.set_details_visible(slot, visible);
        if let Some(visual) = self.display.visual_mut(slot) {
            visual.details_visible = visible;
        }
    }

    // =========================================================================
    // Pointer Plumbing
    // =========================================================================

    /// Feeds a header-area pointer event through the header state machine.
    ///
    /// A plain click toggles sorting on the clicked column. A resize drop
    /// re-resolves widths with the resized column fixed. A reorder drop
    /// raises `column_reordering` (cancellable) before being applied.
    pub fn handle_header_event(&mut self, event: &PointerEvent) -> Result<()> {
        use crate::interaction::PointerPhase;
        match event.phase {
            PointerPhase::Pressed => {
                self.header.on_pointer_pressed(&self.columns, event);
            }
            PointerPhase::Moved => {
                self.header
                    .on_pointer_moved(&mut self.columns, self.viewport.width, event);
            }
            PointerPhase::Released => {
                // The cancellable notification must precede the drop.
                if self.header.is_reordering() {
                    if let (Some(column), Some(target)) =
                        (self.header.dragged_column(), self.header.reorder_target())
                    {
                        let canceled = Arc::new(AtomicBool::new(false));
                        self.column_reordering.emit(ColumnReordering {
                            column,
                            target,
                            canceled: Arc::clone(&canceled),
                        });
                        if canceled.load(Ordering::SeqCst) {
                            self.header.cancel(&mut self.columns);
                            return Ok(());
                        }
                    }
                }
                match self.header.on_pointer_released(&mut self.columns) {
                    HeaderReleaseOutcome::Clicked { column } => {
                        self.toggle_sort(column)?;
                    }
                    HeaderReleaseOutcome::Resized { .. } => {
                        self.resolve_column_widths();
                        self.fill_window();
                    }
                    HeaderReleaseOutcome::Reordered { column, from, to } => {
                        self.column_reordered.emit((column, from, to));
                        self.column_display_index_changed.emit((column, to));
                        self.fill_window();
                    }
                    HeaderReleaseOutcome::ReorderRejected { .. }
                    | HeaderReleaseOutcome::Idle => {}
                }
            }
        }
        Ok(())
    }

    /// Cancels any live header drag (pointer capture loss).
    pub fn cancel_header_drag(&mut self) {
        self.header.cancel(&mut self.columns);
    }

    /// Feeds a row-area pointer event through the row-drag machine.
    /// `pressed_row` names the row under the pointer for press events.
    pub fn handle_row_event(&mut self, pressed_row: Option<usize>, event: &PointerEvent) {
        use crate::interaction::PointerPhase;
        match event.phase {
            PointerPhase::Pressed => {
                if let Some(row) = pressed_row {
                    self.row_drag.on_pointer_pressed(row, event);
                }
            }
            PointerPhase::Moved => {
                self.row_drag.on_pointer_moved(
                    self.connection.row_count(),
                    DEFAULT_ROW_HEIGHT,
                    self.viewport.height,
                    event,
                );
            }
            PointerPhase::Released => {
                // Raise the cancellable notification before the drop.
                if self.row_drag.is_dragging() {
                    if let (Some(from), Some(to)) =
                        (self.row_drag.drag_source(), self.row_drag.drag_target())
                    {
                        if from == to {
                            // An in-place drop moves nothing; raise nothing.
                            self.row_drag.cancel();
                            return;
                        }
                        let canceled = Arc::new(AtomicBool::new(false));
                        self.row_reordering.emit(RowReordering {
                            from,
                            to,
                            canceled: Arc::clone(&canceled),
                        });
                        if canceled.load(Ordering::SeqCst) {
                            self.row_drag.cancel();
                            return;
                        }
                    }
                }
                if let RowReleaseOutcome::Moved { from, to } =
                    self.row_drag.on_pointer_released(&self.connection)
                {
                    self.row_reordered.emit((from, to));
                    self.refresh();
                }
            }
        }
    }

    /// Cancels any live row drag (pointer capture loss).
    pub fn cancel_row_drag(&mut self) {
        self.row_drag.cancel();
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("rows", &self.connection.row_count())
            .field("columns", &self.columns.len())
            .field("slots", &self.layout.slot_count())
            .field("current", &self.selection.current())
            .finish_non_exhaustive()
    }
}
