//! Header drag interaction.
//!
//! One state machine covers the three things a header press can become: a
//! click (sort toggle), a resize drag on a boundary hot-zone, or a reorder
//! drag. The press arms the machine; the first move past the start
//! threshold decides which drag it is; release applies the result and
//! resets. Losing pointer capture cancels the drag and restores any live
//! resize.

use tracing::debug;

use crate::column::{ColumnCollection, ColumnWidth};
use crate::error::GridError;
use crate::interaction::events::PointerEvent;
use crate::logging::targets;

/// Width of the resize hot-zone straddling each column boundary.
pub const RESIZE_HANDLE_WIDTH: f32 = 5.0;

/// Distance the pointer must travel from the press before a drag starts.
pub const DRAG_START_THRESHOLD: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragMode {
    #[default]
    None,
    /// Pressed, not yet past the threshold.
    MouseDown,
    Resize,
    Reorder,
}

/// Per-move feedback for the embedding layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeaderDragUpdate {
    /// A resize is live; the column's display width already reflects it.
    pub resizing: Option<(usize, f32)>,
    /// A reorder is live: the floating indicator x and the insertion
    /// display index under the pointer.
    pub reordering: Option<(f32, usize)>,
    /// The pointer left the viewport horizontally; the embedding layer
    /// should scroll in the given direction (negative = left).
    pub auto_scroll: Option<f32>,
}

/// What a release resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderReleaseOutcome {
    /// Nothing was armed.
    Idle,
    /// Press and release without a drag.
    Clicked { column: usize },
    /// A resize finished; the column's width intent is now fixed pixels.
    Resized { column: usize, width: f32 },
    /// A reorder drop was applied.
    Reordered { column: usize, from: usize, to: usize },
    /// A reorder drop was rejected at a frozen boundary; display order is
    /// unchanged.
    ReorderRejected { column: usize, target: usize },
}

/// The header drag-mode state machine.
#[derive(Debug, Default)]
pub struct HeaderInteraction {
    mode: DragMode,
    press_x: f32,
    /// Logical index of the pressed column.
    column: Option<usize>,
    /// Press landed in a boundary hot-zone; a drag becomes a resize.
    resize_armed: bool,
    resize_original: f32,
    indicator_x: f32,
    target_display: Option<usize>,
}

impl HeaderInteraction {
    /// Creates an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resize drag is live. While it is, star redistribution is
    /// suspended; the owner re-resolves widths on release.
    pub fn is_resizing(&self) -> bool {
        self.mode == DragMode::Resize
    }

    /// Whether a reorder drag is live.
    pub fn is_reordering(&self) -> bool {
        self.mode == DragMode::Reorder
    }

    /// The insertion display index under the pointer during a reorder.
    pub fn reorder_target(&self) -> Option<usize> {
        self.target_display
    }

    /// Logical index of the column being dragged, if any.
    pub fn dragged_column(&self) -> Option<usize> {
        self.column
    }

    /// Feeds a press. Arms the machine when the press lands on a header or
    /// boundary hot-zone.
    pub fn on_pointer_pressed(&mut self, columns: &ColumnCollection, event: &PointerEvent) {
        let x = event.position.x;
        self.press_x = x;
        if let Some(column) = Self::boundary_at(columns, x) {
            self.column = Some(column);
            self.resize_armed = true;
            self.mode = DragMode::MouseDown;
        } else if let Some(column) = Self::column_at(columns, x) {
            self.column = Some(column);
            self.resize_armed = false;
            self.mode = DragMode::MouseDown;
        } else {
            self.reset();
        }
    }

    /// Feeds a move, advancing `MouseDown` into a drag past the threshold
    /// and updating the live drag.
    pub fn on_pointer_moved(
        &mut self,
        columns: &mut ColumnCollection,
        viewport_width: f32,
        event: &PointerEvent,
    ) -> HeaderDragUpdate {
        let x = event.position.x;
        let mut update = HeaderDragUpdate::default();
        let Some(column) = self.column else {
            return update;
        };

        if self.mode == DragMode::MouseDown && (x - self.press_x).abs() >= DRAG_START_THRESHOLD {
            if self.resize_armed {
                self.mode = DragMode::Resize;
                self.resize_original = columns
                    .get(column)
                    .map(|c| c.display_width())
                    .unwrap_or(0.0);
                debug!(target: targets::INTERACTION, column, "resize drag started");
            } else {
                self.mode = DragMode::Reorder;
                debug!(target: targets::INTERACTION, column, "reorder drag started");
            }
        }

        match self.mode {
            DragMode::Resize => {
                if let Ok(col) = columns.column_mut(column) {
                    let width = col.clamp(self.resize_original + (x - self.press_x));
                    col.set_display_width(width);
                    update.resizing = Some((column, width));
                }
            }
            DragMode::Reorder => {
                self.indicator_x = x;
                let target = Self::insertion_index(columns, x);
                self.target_display = Some(target);
                update.reordering = Some((x, target));
                if x < 0.0 {
                    update.auto_scroll = Some(-1.0);
                } else if x > viewport_width {
                    update.auto_scroll = Some(1.0);
                }
            }
            _ => {}
        }
        update
    }

    /// Feeds a release, applying the armed drag.
    pub fn on_pointer_released(&mut self, columns: &mut ColumnCollection) -> HeaderReleaseOutcome {
        let outcome = match (self.mode, self.column) {
            (DragMode::MouseDown, Some(column)) => HeaderReleaseOutcome::Clicked { column },
            (DragMode::Resize, Some(column)) => {
                let width = columns.get(column).map(|c| c.display_width()).unwrap_or(0.0);
                if let Ok(col) = columns.column_mut(column) {
                    col.set_width(ColumnWidth::Pixel(width));
                }
                HeaderReleaseOutcome::Resized { column, width }
            }
            (DragMode::Reorder, Some(column)) => {
                let from = columns.display_index(column).unwrap_or(0);
                let target = self.target_display.unwrap_or(from);
                match columns.set_display_index(column, target) {
                    Ok(()) => HeaderReleaseOutcome::Reordered {
                        column,
                        from,
                        to: target,
                    },
                    Err(GridError::FrozenBoundary { .. }) => {
                        HeaderReleaseOutcome::ReorderRejected { column, target }
                    }
                    Err(_) => HeaderReleaseOutcome::Idle,
                }
            }
            _ => HeaderReleaseOutcome::Idle,
        };
        self.reset();
        outcome
    }

    /// Capture loss: restores a live resize and clears all drag state.
    pub fn cancel(&mut self, columns: &mut ColumnCollection) {
        if self.mode == DragMode::Resize {
            if let Some(column) = self.column {
                if let Ok(col) = columns.column_mut(column) {
                    col.set_display_width(self.resize_original);
                }
            }
        }
        if self.mode != DragMode::None {
            debug!(target: targets::INTERACTION, "header drag cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self {
            press_x: self.press_x,
            ..Self::default()
        };
    }

    /// The column whose trailing boundary hot-zone contains `x`.
    fn boundary_at(columns: &ColumnCollection, x: f32) -> Option<usize> {
        let mut left = 0.0;
        for (logical, column) in columns.visible_iter() {
            let right = left + column.display_width();
            if (x - right).abs() <= RESIZE_HANDLE_WIDTH / 2.0 {
                return Some(logical);
            }
            left = right;
        }
        None
    }

    /// The column whose header contains `x`.
    fn column_at(columns: &ColumnCollection, x: f32) -> Option<usize> {
        let mut left = 0.0;
        for (logical, column) in columns.visible_iter() {
            let right = left + column.display_width();
            if x >= left && x < right {
                return Some(logical);
            }
            left = right;
        }
        None
    }

    /// The display index a drop at `x` would insert at: before the first
    /// visible column whose center lies past `x`, or at the end.
    fn insertion_index(columns: &ColumnCollection, x: f32) -> usize {
        let mut left = 0.0;
        let mut last = 0;
        for (logical, column) in columns.visible_iter() {
            let center = left + column.display_width() / 2.0;
            let display = columns.display_index(logical).unwrap_or(0);
            if x < center {
                return display;
            }
            last = display;
            left += column.display_width();
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::GridColumn;
    use crate::interaction::events::PointerPhase;

    fn press(x: f32) -> PointerEvent {
        PointerEvent::new(PointerPhase::Pressed, x, 0.0)
    }

    fn mov(x: f32) -> PointerEvent {
        PointerEvent::new(PointerPhase::Moved, x, 0.0)
    }

    /// Three 100px columns.
    fn columns() -> ColumnCollection {
        let mut columns = ColumnCollection::new();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            let logical = columns.push(
                GridColumn::new(*name, i).with_width(ColumnWidth::Pixel(100.0)),
            );
            if let Ok(c) = columns.column_mut(logical) {
                c.set_display_width(100.0);
            }
        }
        columns
    }

    #[test]
    fn test_click_without_drag() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        header.on_pointer_pressed(&columns, &press(150.0));
        header.on_pointer_moved(&mut columns, 300.0, &mov(151.0));
        assert_eq!(
            header.on_pointer_released(&mut columns),
            HeaderReleaseOutcome::Clicked { column: 1 }
        );
    }

    #[test]
    fn test_resize_drag_clamps_and_fixes_width() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        // Press on the boundary after column A.
        header.on_pointer_pressed(&columns, &press(100.0));
        let update = header.on_pointer_moved(&mut columns, 300.0, &mov(140.0));
        assert!(header.is_resizing());
        assert_eq!(update.resizing, Some((0, 140.0)));
        assert_eq!(columns.get(0).unwrap().display_width(), 140.0);

        let outcome = header.on_pointer_released(&mut columns);
        assert_eq!(
            outcome,
            HeaderReleaseOutcome::Resized {
                column: 0,
                width: 140.0
            }
        );
        assert_eq!(columns.get(0).unwrap().width(), ColumnWidth::Pixel(140.0));
    }

    #[test]
    fn test_resize_respects_min_width() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        header.on_pointer_pressed(&columns, &press(100.0));
        header.on_pointer_moved(&mut columns, 300.0, &mov(-200.0));
        // Default minimum is 20px.
        assert_eq!(columns.get(0).unwrap().display_width(), 20.0);
        header.on_pointer_released(&mut columns);
    }

    #[test]
    fn test_reorder_drag_applies_on_drop() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        // Press in the middle of column A, drag to the middle of column C.
        header.on_pointer_pressed(&columns, &press(50.0));
        let update = header.on_pointer_moved(&mut columns, 300.0, &mov(260.0));
        assert!(header.is_reordering());
        assert_eq!(update.reordering, Some((260.0, 2)));

        let outcome = header.on_pointer_released(&mut columns);
        assert_eq!(
            outcome,
            HeaderReleaseOutcome::Reordered {
                column: 0,
                from: 0,
                to: 2
            }
        );
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_reorder_rejected_at_frozen_boundary() {
        let mut columns = columns();
        columns.set_frozen_leading(1).unwrap();
        let mut header = HeaderInteraction::new();
        header.on_pointer_pressed(&columns, &press(250.0));
        header.on_pointer_moved(&mut columns, 300.0, &mov(20.0));

        let outcome = header.on_pointer_released(&mut columns);
        assert_eq!(
            outcome,
            HeaderReleaseOutcome::ReorderRejected {
                column: 2,
                target: 0
            }
        );
        // Display order unchanged.
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_auto_scroll_requested_outside_viewport() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        header.on_pointer_pressed(&columns, &press(50.0));
        let update = header.on_pointer_moved(&mut columns, 300.0, &mov(320.0));
        assert_eq!(update.auto_scroll, Some(1.0));
        let update = header.on_pointer_moved(&mut columns, 300.0, &mov(-10.0));
        assert_eq!(update.auto_scroll, Some(-1.0));
    }

    #[test]
    fn test_capture_loss_restores_resize() {
        let mut columns = columns();
        let mut header = HeaderInteraction::new();
        header.on_pointer_pressed(&columns, &press(100.0));
        header.on_pointer_moved(&mut columns, 300.0, &mov(180.0));
        assert_eq!(columns.get(0).unwrap().display_width(), 180.0);

        header.cancel(&mut columns);
        assert_eq!(columns.get(0).unwrap().display_width(), 100.0);
        assert!(!header.is_resizing());
        assert_eq!(
            header.on_pointer_released(&mut columns),
            HeaderReleaseOutcome::Idle
        );
    }
}
