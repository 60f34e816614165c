//! Interaction layer: pointer-driven state machines.
//!
//! The embedding layer feeds [`PointerEvent`]s; the machines here turn them
//! into clicks, resize drags, and reorder drags, and report what happened
//! through small outcome types the grid façade translates into
//! notifications.

pub mod events;
pub mod header;
pub mod row_reorder;

pub use events::{Modifiers, PointerEvent, PointerPhase};
pub use header::{
    HeaderDragUpdate, HeaderInteraction, HeaderReleaseOutcome, DRAG_START_THRESHOLD,
    RESIZE_HANDLE_WIDTH,
};
pub use row_reorder::{RowDragUpdate, RowReleaseOutcome, RowReorderInteraction};
