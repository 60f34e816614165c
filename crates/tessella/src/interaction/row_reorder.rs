//! Row drag interaction.
//!
//! The vertical mirror of the header reorder drag: a press on a row header
//! arms the machine, a move past the threshold starts the drag with a
//! floating indicator and a target insertion row, and the drop moves the
//! item in the backing collection. The connection rejects moves while a
//! sort or grouping shapes the view, so a drop simply fails there.

use tracing::debug;

use crate::interaction::events::PointerEvent;
use crate::interaction::header::DRAG_START_THRESHOLD;
use crate::logging::targets;
use crate::model::DataConnection;

/// Per-move feedback during a row drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowDragUpdate {
    /// A drag is live: the floating indicator y and the insertion row
    /// under the pointer.
    pub dragging: Option<(f32, usize)>,
    /// The pointer left the viewport vertically; the embedding layer
    /// should scroll in the given direction (negative = up).
    pub auto_scroll: Option<f32>,
}

/// What a row-drag release resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowReleaseOutcome {
    /// Nothing was armed.
    Idle,
    /// Press and release without a drag.
    Clicked { row: usize },
    /// The drag ended back on its origin row; the collection is untouched.
    DroppedInPlace { row: usize },
    /// The item was moved in the backing collection.
    Moved { from: usize, to: usize },
    /// The backing collection refused the move (shaped view, or the model
    /// does not reorder).
    Rejected { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Armed,
    Dragging,
}

/// The row drag state machine.
#[derive(Debug, Default)]
pub struct RowReorderInteraction {
    state: DragState,
    press_y: f32,
    source_row: Option<usize>,
    target_row: Option<usize>,
}

impl RowReorderInteraction {
    /// Creates an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is live.
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// The insertion row under the pointer during a drag.
    pub fn drag_target(&self) -> Option<usize> {
        self.target_row
    }

    /// The view row being dragged, if any.
    pub fn drag_source(&self) -> Option<usize> {
        self.source_row
    }

    /// Feeds a press on the row at view index `row`.
    pub fn on_pointer_pressed(&mut self, row: usize, event: &PointerEvent) {
        self.state = DragState::Armed;
        self.press_y = event.position.y;
        self.source_row = Some(row);
        self.target_row = None;
    }

    /// Feeds a move. `row_height` is the estimated uniform row height used
    /// to map the pointer to an insertion row.
    pub fn on_pointer_moved(
        &mut self,
        row_count: usize,
        row_height: f32,
        viewport_height: f32,
        event: &PointerEvent,
    ) -> RowDragUpdate {
        let y = event.position.y;
        let mut update = RowDragUpdate::default();
        if self.source_row.is_none() {
            return update;
        }

        if self.state == DragState::Armed && (y - self.press_y).abs() >= DRAG_START_THRESHOLD {
            self.state = DragState::Dragging;
            debug!(
                target: targets::INTERACTION,
                row = self.source_row,
                "row drag started"
            );
        }
        if self.state != DragState::Dragging {
            return update;
        }

        let target = if row_height > 0.0 {
            ((y / row_height).floor().max(0.0) as usize).min(row_count.saturating_sub(1))
        } else {
            0
        };
        self.target_row = Some(target);
        update.dragging = Some((y, target));
        if y < 0.0 {
            update.auto_scroll = Some(-1.0);
        } else if y > viewport_height {
            update.auto_scroll = Some(1.0);
        }
        update
    }

    /// Feeds a release, moving the item in the backing collection on a
    /// completed drag.
    pub fn on_pointer_released(&mut self, connection: &DataConnection) -> RowReleaseOutcome {
        let outcome = match (self.state, self.source_row, self.target_row) {
            (DragState::Armed, Some(row), _) => RowReleaseOutcome::Clicked { row },
            (DragState::Dragging, Some(from), Some(to)) if from == to => {
                RowReleaseOutcome::DroppedInPlace { row: from }
            }
            (DragState::Dragging, Some(from), Some(to)) => {
                if connection.move_row(from, to) {
                    RowReleaseOutcome::Moved { from, to }
                } else {
                    debug!(target: targets::INTERACTION, from, to, "row move rejected");
                    RowReleaseOutcome::Rejected { from, to }
                }
            }
            _ => RowReleaseOutcome::Idle,
        };
        self.cancel();
        outcome
    }

    /// Capture loss: clears all drag state.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.source_row = None;
        self.target_row = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::events::PointerPhase;
    use crate::model::{CellValue, SortDescription, VecModel};

    fn connection() -> DataConnection {
        let model = VecModel::from_rows(
            1,
            vec![
                vec![CellValue::from("a")],
                vec![CellValue::from("b")],
                vec![CellValue::from("c")],
            ],
        );
        DataConnection::new(model)
    }

    fn at(y: f32) -> PointerEvent {
        PointerEvent::new(PointerPhase::Moved, 0.0, y)
    }

    #[test]
    fn test_drag_moves_row() {
        let connection = connection();
        let mut reorder = RowReorderInteraction::new();
        reorder.on_pointer_pressed(0, &at(5.0));
        let update = reorder.on_pointer_moved(3, 22.0, 300.0, &at(50.0));
        assert!(reorder.is_dragging());
        assert_eq!(update.dragging, Some((50.0, 2)));

        assert_eq!(
            reorder.on_pointer_released(&connection),
            RowReleaseOutcome::Moved { from: 0, to: 2 }
        );
        assert_eq!(connection.value(2, 0), CellValue::from("a"));
    }

    #[test]
    fn test_click_without_drag() {
        let connection = connection();
        let mut reorder = RowReorderInteraction::new();
        reorder.on_pointer_pressed(1, &at(30.0));
        reorder.on_pointer_moved(3, 22.0, 300.0, &at(31.0));
        assert_eq!(
            reorder.on_pointer_released(&connection),
            RowReleaseOutcome::Clicked { row: 1 }
        );
    }

    #[test]
    fn test_drop_on_origin_is_not_a_move() {
        let connection = connection();
        let mut reorder = RowReorderInteraction::new();
        reorder.on_pointer_pressed(0, &at(5.0));
        reorder.on_pointer_moved(3, 22.0, 300.0, &at(60.0));
        reorder.on_pointer_moved(3, 22.0, 300.0, &at(8.0));
        assert_eq!(
            reorder.on_pointer_released(&connection),
            RowReleaseOutcome::DroppedInPlace { row: 0 }
        );
        assert_eq!(connection.value(0, 0), CellValue::from("a"));
    }

    #[test]
    fn test_drop_rejected_on_shaped_view() {
        let connection = connection();
        connection.set_sort_descriptions(vec![SortDescription::descending(0)]);
        let mut reorder = RowReorderInteraction::new();
        reorder.on_pointer_pressed(0, &at(5.0));
        reorder.on_pointer_moved(3, 22.0, 300.0, &at(60.0));
        assert_eq!(
            reorder.on_pointer_released(&connection),
            RowReleaseOutcome::Rejected { from: 0, to: 2 }
        );
    }

    #[test]
    fn test_cancel_clears_state() {
        let connection = connection();
        let mut reorder = RowReorderInteraction::new();
        reorder.on_pointer_pressed(0, &at(5.0));
        reorder.on_pointer_moved(3, 22.0, 300.0, &at(60.0));
        reorder.cancel();
        assert!(!reorder.is_dragging());
        assert_eq!(
            reorder.on_pointer_released(&connection),
            RowReleaseOutcome::Idle
        );
    }
}
