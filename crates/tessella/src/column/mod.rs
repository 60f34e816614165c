//! Column layer: definitions, ordering, frozen bands, and width
//! resolution.
//!
//! # Example
//!
//! ```ignore
//! use tessella::column::{ColumnCollection, ColumnWidth, GridColumn, resolve_widths};
//!
//! let mut columns = ColumnCollection::new();
//! columns.push(GridColumn::new("Name", 0).with_width(ColumnWidth::STAR));
//! columns.push(GridColumn::new("Size", 1).with_width(ColumnWidth::Pixel(80.0)));
//! columns.set_frozen_leading(1)?;
//! resolve_widths(&mut columns, 640.0);
//! ```

pub mod collection;
pub mod column;
pub mod content;
pub mod sizing;
pub mod width;

pub use collection::ColumnCollection;
pub use column::{Frozen, GridColumn, DEFAULT_MAX_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH};
pub use content::{CellElement, CellFactory, EditElement, EditTrigger, TextCellFactory};
pub use sizing::{resolve_widths, MAXIMUM_STAR_COLUMN_WIDTH, MINIMUM_STAR_COLUMN_WIDTH};
pub use width::ColumnWidth;
