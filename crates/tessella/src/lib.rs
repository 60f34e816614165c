//! Tessella - A virtualized, groupable, editable data-grid core.
//!
//! Tessella is the headless engine of a data grid: it owns the mapping from
//! a backing collection to the rows and cells on screen, but draws nothing
//! itself. An embedding layer feeds it viewport geometry and pointer events
//! and realizes the visual rows it materializes.
//!
//! The major pieces:
//!
//! - [`model`] - [`GridModel`] backing collections, [`CellValue`]s, and the
//!   [`DataConnection`] that shapes them with sorting and grouping
//! - [`column`] - Column definitions, display order, frozen bands, and the
//!   star-width distribution algorithm
//! - [`row`] - The slot layout (rows plus group headers), the recycling
//!   visual-row store, and the height-driven virtualizer
//! - [`selection`] and [`editing`] - Row selection, cell currency, and the
//!   two-level cell/row edit state machine
//! - [`interaction`] - Pointer state machines for header resize/reorder
//!   drags and row drags
//! - [`DataGrid`] - The façade tying the above together
//!
//! # Example
//!
//! ```no_run
//! use tessella::{CellValue, DataGrid, GridColumn, VecModel};
//!
//! let model = VecModel::from_rows(
//!     2,
//!     vec![
//!         vec![CellValue::from("ada"), CellValue::Int(36)],
//!         vec![CellValue::from("grace"), CellValue::Int(85)],
//!     ],
//! );
//! let mut grid = DataGrid::new(model);
//! grid.add_column(GridColumn::new("Name", 0));
//! grid.add_column(GridColumn::new("Age", 1));
//! grid.set_viewport(640.0, 480.0);
//! grid.refresh();
//! ```

pub use tessella_core::logging;
pub use tessella_core::{ConnectionGuard, ConnectionId, DeferralCounter, Signal};

pub mod column;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod model;
pub mod row;
pub mod selection;
pub mod sparse;

pub use column::{ColumnCollection, ColumnWidth, EditTrigger, Frozen, GridColumn};
pub use editing::CommitResult;
pub use error::{GridError, Result};
pub use geometry::{Point, Rect, Size};
pub use grid::DataGrid;
pub use model::{
    CellValue, DataConnection, GridModel, GroupDescription, SortDescription, SortOrder, VecModel,
};
pub use row::{RowFactory, VisualKind, VisualRow};
pub use selection::{CurrentCell, SelectionMode};
pub use sparse::SparseTable;
