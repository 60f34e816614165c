//! A single grid column.

use std::sync::Arc;

use crate::model::SortOrder;

use super::content::{CellFactory, TextCellFactory};
use super::width::ColumnWidth;

/// Default minimum width for a column, in pixels.
pub const DEFAULT_MIN_COLUMN_WIDTH: f32 = 20.0;

/// Default maximum width for a column, in pixels.
pub const DEFAULT_MAX_COLUMN_WIDTH: f32 = 10_000.0;

/// Which edge a column is pinned to, if any.
///
/// Frozen columns are excluded from horizontal scrolling. The collection
/// derives this from the frozen counts and display order; it is not stored
/// per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frozen {
    /// Scrolls with the middle band.
    #[default]
    None,
    /// Pinned to the leading (left) edge.
    Leading,
    /// Pinned to the trailing (right) edge.
    Trailing,
}

/// One column of the grid: width intent, constraints, visibility, and the
/// content factory that generates its cells.
///
/// Columns display one value column of the model, identified by
/// [`value_column`](GridColumn::value_column). The resolved on-screen width
/// (display) and the content-natural width (desired) are tracked
/// separately; both survive re-resolution so either can be queried at any
/// time.
pub struct GridColumn {
    header: String,
    value_column: usize,
    width: ColumnWidth,
    min_width: f32,
    max_width: f32,
    read_only: bool,
    visible: bool,
    factory: Arc<dyn CellFactory>,
    /// Sort-indicator state shown in the header, set by the grid when a
    /// sort toggles.
    sort_order: Option<SortOrder>,

    /// Resolved on-screen width.
    display_width: f32,
    /// Content-natural width (the width the column wants, unclamped).
    desired_width: f32,
    /// Widest measured cell, fed by the virtualizer as rows materialize.
    desired_cell_width: f32,
    /// Measured header width.
    desired_header_width: f32,
}

impl GridColumn {
    /// Creates an auto-width, editable, visible column over model value
    /// column `value_column`.
    pub fn new(header: impl Into<String>, value_column: usize) -> Self {
        Self {
            header: header.into(),
            value_column,
            width: ColumnWidth::Auto,
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            max_width: DEFAULT_MAX_COLUMN_WIDTH,
            read_only: false,
            visible: true,
            factory: Arc::new(TextCellFactory::new()),
            sort_order: None,
            display_width: 0.0,
            desired_width: 0.0,
            desired_cell_width: 0.0,
            desired_header_width: 0.0,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Sets the width mode using builder pattern.
    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Sets the minimum width using builder pattern.
    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = min_width.max(0.0);
        self
    }

    /// Sets the maximum width using builder pattern.
    pub fn with_max_width(mut self, max_width: f32) -> Self {
        self.max_width = max_width.max(0.0);
        self
    }

    /// Sets the read-only flag using builder pattern.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets visibility using builder pattern.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the content factory using builder pattern.
    pub fn with_factory(mut self, factory: Arc<dyn CellFactory>) -> Self {
        self.factory = factory;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The header caption.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The model value column this column displays.
    pub fn value_column(&self) -> usize {
        self.value_column
    }

    /// The width intent.
    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Replaces the width intent. The caller re-runs width resolution.
    pub fn set_width(&mut self, width: ColumnWidth) {
        self.width = width;
    }

    /// Minimum allowed resolved width.
    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    /// Maximum allowed resolved width.
    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Whether cells in this column reject editing.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Sets the read-only flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Whether the column participates in layout.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the column. The caller re-runs width resolution.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The content factory for this column.
    pub fn factory(&self) -> &Arc<dyn CellFactory> {
        &self.factory
    }

    /// The sort-indicator state for this column's header, if it is the
    /// sorted column.
    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    pub(crate) fn set_sort_order(&mut self, order: Option<SortOrder>) {
        self.sort_order = order;
    }

    /// The resolved on-screen width.
    pub fn display_width(&self) -> f32 {
        self.display_width
    }

    /// The content-natural width, independent of the resolved width.
    pub fn desired_width(&self) -> f32 {
        self.desired_width
    }

    /// Clamps `width` to this column's `[min, max]` constraint.
    pub fn clamp(&self, width: f32) -> f32 {
        width.clamp(self.min_width, self.max_width.max(self.min_width))
    }

    pub(crate) fn set_display_width(&mut self, width: f32) {
        self.display_width = width;
    }

    pub(crate) fn set_desired_width(&mut self, width: f32) {
        self.desired_width = width;
    }

    /// Records a measured cell width; widens only (natural width is the
    /// widest content seen so far).
    pub fn note_cell_width(&mut self, width: f32) {
        self.desired_cell_width = self.desired_cell_width.max(width);
    }

    /// Records the measured header width.
    pub fn note_header_width(&mut self, width: f32) {
        self.desired_header_width = width;
    }

    pub(crate) fn desired_cell_width(&self) -> f32 {
        self.desired_cell_width
    }

    pub(crate) fn desired_header_width(&self) -> f32 {
        self.desired_header_width
    }
}

impl std::fmt::Debug for GridColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridColumn")
            .field("header", &self.header)
            .field("value_column", &self.value_column)
            .field("width", &self.width)
            .field("display_width", &self.display_width)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let column = GridColumn::new("Name", 0)
            .with_min_width(50.0)
            .with_max_width(200.0);
        assert_eq!(column.clamp(10.0), 50.0);
        assert_eq!(column.clamp(500.0), 200.0);
        assert_eq!(column.clamp(120.0), 120.0);
    }

    #[test]
    fn test_note_cell_width_widens_only() {
        let mut column = GridColumn::new("Name", 0);
        column.note_cell_width(80.0);
        column.note_cell_width(40.0);
        assert_eq!(column.desired_cell_width(), 80.0);
    }
}
