//! Error types for the grid core.

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised for caller contract violations.
///
/// These are usage errors, intentionally not swallowed: the caller passed an
/// argument the grid cannot honor. Recoverable conditions (a commit that
/// fails validation, a reorder drop on an illegal target) are expressed
/// through result enums on the relevant operations instead, and constraint
/// violations on widths clamp silently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A column index was out of bounds for this grid.
    #[error("column index {index} out of bounds (column count {count})")]
    ColumnOutOfBounds { index: usize, count: usize },

    /// A slot was outside the current slot space.
    #[error("slot {slot} out of bounds (slot count {count})")]
    SlotOutOfBounds { slot: usize, count: usize },

    /// Currency was set with no rows present.
    #[error("cannot set the current cell: the grid has no rows")]
    NoCurrentRow,

    /// Currency was pointed at a group-header or collapsed slot.
    #[error("slot {slot} cannot be current: it is not a visible data row")]
    NotADataSlot { slot: usize },

    /// A frozen count exceeding the visible column count was requested.
    #[error("frozen column count {requested} exceeds visible column count {visible}")]
    InvalidFrozenCount { requested: usize, visible: usize },

    /// A column reorder would cross a frozen/unfrozen boundary.
    #[error("display index {target} would move column {column} across a frozen boundary")]
    FrozenBoundary { column: usize, target: usize },

    /// An edit operation was attempted in the wrong state.
    #[error("no edit session is active")]
    NoActiveEdit,
}
