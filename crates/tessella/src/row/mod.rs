//! Row layer: slot addressing, materialized visuals, and the virtualizer.
//!
//! Vertical positions are *slots* (data rows plus group headers). Only the
//! slots inside the scrolling window carry a visual; everything else exists
//! as sparse per-slot state. See [`slots::SlotLayout`] for addressing,
//! [`display::DisplayData`] for the recycled visuals, and
//! [`virtualizer::RowVirtualizer`] for window maintenance.

pub mod display;
pub mod slots;
pub mod virtualizer;

pub use display::{
    DefaultRowFactory, DisplayData, RowFactory, VisualKind, VisualRow, DEFAULT_HEADER_HEIGHT,
    DEFAULT_ROW_HEIGHT,
};
pub use slots::{RowGroupInfo, SlotLayout};
pub use virtualizer::{RowHeightEstimator, RowVirtualizer};
