//! The ordered column set.
//!
//! Columns live in a stable *logical* order (the order they were added) and
//! are presented in a *display* order the user can rearrange. Frozen columns
//! are expressed as leading and trailing counts over the visible display
//! order, so each frozen band stays contiguous by construction.

use tracing::debug;

use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::model::SortOrder;

use super::column::{Frozen, GridColumn};

/// The grid's columns, their display order, and the frozen bands.
///
/// Logical indices are stable for the lifetime of a column and are what the
/// rest of the grid (selection, editing, the model connection) uses to name
/// a column. Display indices are only meaningful to layout and reordering.
#[derive(Debug, Default)]
pub struct ColumnCollection {
    columns: Vec<GridColumn>,
    /// Display position -> logical index.
    display_order: Vec<usize>,
    frozen_leading: usize,
    frozen_trailing: usize,
}

impl ColumnCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column at the end of both orders, returning its logical
    /// index.
    pub fn push(&mut self, column: GridColumn) -> usize {
        let logical = self.columns.len();
        self.columns.push(column);
        self.display_order.push(logical);
        logical
    }

    /// Number of columns, visible or not.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the collection holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column at `logical`, or an error if out of bounds.
    pub fn column(&self, logical: usize) -> Result<&GridColumn> {
        self.columns.get(logical).ok_or(GridError::ColumnOutOfBounds {
            index: logical,
            count: self.columns.len(),
        })
    }

    /// Mutable access to the column at `logical`.
    pub fn column_mut(&mut self, logical: usize) -> Result<&mut GridColumn> {
        let count = self.columns.len();
        self.columns
            .get_mut(logical)
            .ok_or(GridError::ColumnOutOfBounds {
                index: logical,
                count,
            })
    }

    /// The column at `logical`, if present.
    pub fn get(&self, logical: usize) -> Option<&GridColumn> {
        self.columns.get(logical)
    }

    /// Iterates columns in logical order.
    pub fn iter(&self) -> impl Iterator<Item = &GridColumn> {
        self.columns.iter()
    }

    /// Iterates `(logical, column)` pairs in display order.
    pub fn display_iter(&self) -> impl Iterator<Item = (usize, &GridColumn)> {
        self.display_order
            .iter()
            .map(move |&logical| (logical, &self.columns[logical]))
    }

    /// Iterates visible `(logical, column)` pairs in display order. This is
    /// the order layout and the header controller operate in.
    pub fn visible_iter(&self) -> impl Iterator<Item = (usize, &GridColumn)> {
        self.display_iter().filter(|(_, c)| c.is_visible())
    }

    /// Number of visible columns.
    pub fn visible_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_visible()).count()
    }

    /// The display position of column `logical`, or `None` if out of
    /// bounds.
    pub fn display_index(&self, logical: usize) -> Option<usize> {
        self.display_order.iter().position(|&l| l == logical)
    }

    /// The logical index of the column at display position `display`.
    pub fn logical_at_display(&self, display: usize) -> Option<usize> {
        self.display_order.get(display).copied()
    }

    /// Sets the sort indicator on column `logical`, clearing it everywhere
    /// else. One column at most carries an indicator.
    pub(crate) fn set_sort_indicator(&mut self, logical: usize, order: SortOrder) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.set_sort_order((i == logical).then_some(order));
        }
    }

    // =========================================================================
    // Frozen Bands
    // =========================================================================

    /// Number of visible columns pinned to the leading edge.
    pub fn frozen_leading(&self) -> usize {
        self.frozen_leading
    }

    /// Number of visible columns pinned to the trailing edge.
    pub fn frozen_trailing(&self) -> usize {
        self.frozen_trailing
    }

    /// Pins the first `count` visible display positions to the leading
    /// edge.
    ///
    /// The combined frozen counts may not exceed the visible column count.
    pub fn set_frozen_leading(&mut self, count: usize) -> Result<()> {
        let visible = self.visible_count();
        if count + self.frozen_trailing > visible {
            return Err(GridError::InvalidFrozenCount {
                requested: count,
                visible,
            });
        }
        debug!(target: targets::SIZING, count, "frozen leading count changed");
        self.frozen_leading = count;
        Ok(())
    }

    /// Pins the last `count` visible display positions to the trailing
    /// edge.
    pub fn set_frozen_trailing(&mut self, count: usize) -> Result<()> {
        let visible = self.visible_count();
        if count + self.frozen_leading > visible {
            return Err(GridError::InvalidFrozenCount {
                requested: count,
                visible,
            });
        }
        debug!(target: targets::SIZING, count, "frozen trailing count changed");
        self.frozen_trailing = count;
        Ok(())
    }

    /// Which band column `logical` falls in. Hidden columns are never
    /// frozen.
    pub fn frozen_band(&self, logical: usize) -> Frozen {
        let Some(pos) = self.visible_position(logical) else {
            return Frozen::None;
        };
        self.band_at_visible_position(pos)
    }

    /// The visible-display position of `logical` (hidden columns excluded),
    /// or `None` if the column is hidden or out of bounds.
    fn visible_position(&self, logical: usize) -> Option<usize> {
        if !self.columns.get(logical)?.is_visible() {
            return None;
        }
        let mut pos = 0;
        for &l in &self.display_order {
            if l == logical {
                return Some(pos);
            }
            if self.columns[l].is_visible() {
                pos += 1;
            }
        }
        None
    }

    fn band_at_visible_position(&self, pos: usize) -> Frozen {
        let visible = self.visible_count();
        if pos < self.frozen_leading {
            Frozen::Leading
        } else if pos >= visible.saturating_sub(self.frozen_trailing) {
            Frozen::Trailing
        } else {
            Frozen::None
        }
    }

    // =========================================================================
    // Reordering
    // =========================================================================

    /// Moves column `logical` to display position `target`.
    ///
    /// A visible column may only move within its own frozen band; a move
    /// that would cross a band boundary is rejected with
    /// [`GridError::FrozenBoundary`]. Hidden columns move freely.
    pub fn set_display_index(&mut self, logical: usize, target: usize) -> Result<()> {
        let count = self.columns.len();
        if logical >= count {
            return Err(GridError::ColumnOutOfBounds {
                index: logical,
                count,
            });
        }
        if target >= count {
            return Err(GridError::ColumnOutOfBounds {
                index: target,
                count,
            });
        }
        let current = self
            .display_index(logical)
            .ok_or(GridError::ColumnOutOfBounds {
                index: logical,
                count,
            })?;
        if current == target {
            return Ok(());
        }

        if self.columns[logical].is_visible() {
            let from_band = self.frozen_band(logical);
            let to_band = self.band_at_visible_position(self.visible_position_at(target, logical));
            if from_band != to_band {
                debug!(
                    target: targets::INTERACTION,
                    column = logical,
                    target,
                    "column reorder rejected at frozen boundary"
                );
                return Err(GridError::FrozenBoundary {
                    column: logical,
                    target,
                });
            }
        }

        self.display_order.remove(current);
        self.display_order.insert(target, logical);
        debug!(
            target: targets::INTERACTION,
            column = logical,
            from = current,
            to = target,
            "column display index changed"
        );
        Ok(())
    }

    /// The visible position column `moving` would occupy if inserted at
    /// display position `target` (with `moving` removed from the order
    /// first).
    fn visible_position_at(&self, target: usize, moving: usize) -> usize {
        let mut pos = 0;
        let mut seen = 0;
        for &l in &self.display_order {
            if l == moving {
                continue;
            }
            if seen == target {
                break;
            }
            if self.columns[l].is_visible() {
                pos += 1;
            }
            seen += 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_columns() -> ColumnCollection {
        let mut columns = ColumnCollection::new();
        columns.push(GridColumn::new("A", 0));
        columns.push(GridColumn::new("B", 1));
        columns.push(GridColumn::new("C", 2));
        columns
    }

    #[test]
    fn test_display_order_follows_insertion() {
        let columns = three_columns();
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(columns.display_index(2), Some(2));
    }

    #[test]
    fn test_reorder_within_unfrozen() {
        let mut columns = three_columns();
        columns.set_display_index(2, 0).unwrap();
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!(columns.display_index(0), Some(1));
    }

    #[test]
    fn test_reorder_across_frozen_boundary_rejected() {
        let mut columns = three_columns();
        columns.set_frozen_leading(1).unwrap();

        let err = columns.set_display_index(2, 0).unwrap_err();
        assert_eq!(err, GridError::FrozenBoundary { column: 2, target: 0 });

        // Order unchanged after the rejection.
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![0, 1, 2]);

        // The frozen column cannot leave its band either.
        let err = columns.set_display_index(0, 2).unwrap_err();
        assert_eq!(err, GridError::FrozenBoundary { column: 0, target: 2 });
    }

    #[test]
    fn test_reorder_within_band_allowed() {
        let mut columns = three_columns();
        columns.push(GridColumn::new("D", 3));
        columns.set_frozen_leading(2).unwrap();

        // Swap the two frozen columns.
        columns.set_display_index(1, 0).unwrap();
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![1, 0, 2, 3]);

        // Swap the two unfrozen columns.
        columns.set_display_index(3, 2).unwrap();
        let order: Vec<usize> = columns.display_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec![1, 0, 3, 2]);
    }

    #[test]
    fn test_frozen_count_validation() {
        let mut columns = three_columns();
        assert!(columns.set_frozen_leading(3).is_ok());
        columns.set_frozen_leading(0).unwrap();
        columns.set_frozen_trailing(2).unwrap();

        let err = columns.set_frozen_leading(2).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidFrozenCount {
                requested: 2,
                visible: 3,
            }
        );
    }

    #[test]
    fn test_hidden_columns_skip_bands() {
        let mut columns = three_columns();
        columns.column_mut(0).unwrap().set_visible(false);
        columns.set_frozen_leading(1).unwrap();

        // Column 1 is the first visible column, so it is the frozen one.
        assert_eq!(columns.frozen_band(0), Frozen::None);
        assert_eq!(columns.frozen_band(1), Frozen::Leading);
        assert_eq!(columns.frozen_band(2), Frozen::None);
    }

    #[test]
    fn test_trailing_band() {
        let mut columns = three_columns();
        columns.set_frozen_trailing(1).unwrap();
        assert_eq!(columns.frozen_band(2), Frozen::Trailing);
        assert_eq!(columns.frozen_band(1), Frozen::None);
    }
}
