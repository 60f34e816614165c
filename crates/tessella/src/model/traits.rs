//! Core traits for the model layer.
//!
//! This module defines [`GridModel`], the interface a backing collection
//! implements to feed the grid, and [`ModelSignals`], the structured change
//! notifications views consume to stay synchronized.

use std::sync::Arc;

use parking_lot::RwLock;
use tessella_core::Signal;

use super::value::CellValue;

/// The interface between a backing collection and the grid.
///
/// A model is a flat, ordered collection of rows with a fixed number of
/// value columns. The grid never stores row data itself; it queries the
/// model for values on demand and observes [`ModelSignals`] for changes.
///
/// # Implementation Requirements
///
/// At minimum, implement [`row_count`](GridModel::row_count),
/// [`column_count`](GridModel::column_count),
/// [`value`](GridModel::value), and [`signals`](GridModel::signals).
/// Editable models also implement [`set_value`](GridModel::set_value);
/// row-reorderable models implement [`move_row`](GridModel::move_row).
///
/// Implementations must emit the appropriate signal *after* each
/// modification, with the affected index and count, so the grid can shift
/// only the affected tail of its slot mappings instead of rebuilding.
pub trait GridModel: Send + Sync {
    /// Returns the number of rows in the collection.
    fn row_count(&self) -> usize;

    /// Returns the number of value columns each row carries.
    fn column_count(&self) -> usize;

    /// Returns the value at `(row, column)`, or `CellValue::None` when out
    /// of bounds.
    fn value(&self, row: usize, column: usize) -> CellValue;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    /// Sets the value at `(row, column)`.
    ///
    /// Returns `false` if the value was rejected (validation failure); the
    /// collection must be left unchanged in that case. The default
    /// implementation is read-only.
    fn set_value(&self, _row: usize, _column: usize, _value: CellValue) -> bool {
        false
    }

    /// Moves the row at `from` so it ends up at position `to`.
    ///
    /// Returns `false` if the model does not support reordering. The
    /// default implementation does not.
    fn move_row(&self, _from: usize, _to: usize) -> bool {
        false
    }

    /// Returns whether the row at `row` may be edited at all.
    ///
    /// The default assumes every row of an editable model is editable.
    fn is_row_read_only(&self, _row: usize) -> bool {
        false
    }
}

/// Collection of signals emitted by grid models.
///
/// All payloads use source-collection row indices. `rows_inserted` and
/// `rows_removed` carry `(index, count)`; `rows_replaced` carries the same
/// for in-place item replacement; `rows_moved` carries `(from, to)`.
/// `model_reset` signals a change too broad for incremental handling -
/// every consumer must rebuild its mappings.
pub struct ModelSignals {
    /// Emitted after rows have been inserted. Args: (first index, count).
    pub rows_inserted: Signal<(usize, usize)>,
    /// Emitted after rows have been removed. Args: (first index, count).
    pub rows_removed: Signal<(usize, usize)>,
    /// Emitted after rows have been replaced in place. Args: (first index, count).
    pub rows_replaced: Signal<(usize, usize)>,
    /// Emitted after a row has been moved. Args: (from, to).
    pub rows_moved: Signal<(usize, usize)>,
    /// Emitted when individual values change. Args: (row, column).
    pub value_changed: Signal<(usize, usize)>,
    /// Emitted after the model has been reset.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            rows_replaced: Signal::new(),
            rows_moved: Signal::new(),
            value_changed: Signal::new(),
            model_reset: Signal::new(),
        }
    }
}

/// A ready-made [`GridModel`] backed by a vector of rows.
///
/// Each row is a `Vec<CellValue>` of uniform width. Mutating methods emit
/// the matching signal so connected grids stay synchronized. Used by tests
/// and simple applications; larger applications typically implement
/// [`GridModel`] over their own storage.
pub struct VecModel {
    rows: RwLock<Vec<Vec<CellValue>>>,
    column_count: usize,
    signals: ModelSignals,
}

impl VecModel {
    /// Creates an empty model with `column_count` value columns.
    pub fn new(column_count: usize) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            column_count,
            signals: ModelSignals::new(),
        }
    }

    /// Creates a model from existing rows.
    ///
    /// Rows narrower than `column_count` read as `CellValue::None` in the
    /// missing columns.
    pub fn from_rows(column_count: usize, rows: Vec<Vec<CellValue>>) -> Arc<Self> {
        Arc::new(Self {
            rows: RwLock::new(rows),
            column_count,
            signals: ModelSignals::new(),
        })
    }

    /// Appends a row and emits `rows_inserted`.
    pub fn push_row(&self, row: Vec<CellValue>) {
        let index = {
            let mut rows = self.rows.write();
            rows.push(row);
            rows.len() - 1
        };
        self.signals.rows_inserted.emit((index, 1));
    }

    /// Inserts rows at `index` and emits `rows_inserted`.
    pub fn insert_rows(&self, index: usize, new_rows: Vec<Vec<CellValue>>) {
        let count = new_rows.len();
        if count == 0 {
            return;
        }
        {
            let mut rows = self.rows.write();
            let index = index.min(rows.len());
            rows.splice(index..index, new_rows);
        }
        self.signals.rows_inserted.emit((index, count));
    }

    /// Removes `count` rows starting at `index` and emits `rows_removed`.
    pub fn remove_rows(&self, index: usize, count: usize) {
        let removed = {
            let mut rows = self.rows.write();
            let end = (index + count).min(rows.len());
            let start = index.min(end);
            rows.drain(start..end).count()
        };
        if removed > 0 {
            self.signals.rows_removed.emit((index, removed));
        }
    }

    /// Replaces all rows and emits `model_reset`.
    pub fn reset(&self, new_rows: Vec<Vec<CellValue>>) {
        *self.rows.write() = new_rows;
        self.signals.model_reset.emit(());
    }
}

impl GridModel for VecModel {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn value(&self, row: usize, column: usize) -> CellValue {
        self.rows
            .read()
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or(CellValue::None)
    }

    fn set_value(&self, row: usize, column: usize, value: CellValue) -> bool {
        if column >= self.column_count {
            return false;
        }
        {
            let mut rows = self.rows.write();
            let Some(r) = rows.get_mut(row) else {
                return false;
            };
            if r.len() <= column {
                r.resize(column + 1, CellValue::None);
            }
            r[column] = value;
        }
        self.signals.value_changed.emit((row, column));
        true
    }

    fn move_row(&self, from: usize, to: usize) -> bool {
        {
            let mut rows = self.rows.write();
            if from >= rows.len() || to >= rows.len() {
                return false;
            }
            let row = rows.remove(from);
            rows.insert(to, row);
        }
        if from != to {
            self.signals.rows_moved.emit((from, to));
        }
        true
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn person(name: &str, age: i64) -> Vec<CellValue> {
        vec![CellValue::from(name), CellValue::Int(age)]
    }

    #[test]
    fn test_vec_model_basics() {
        let model = VecModel::from_rows(2, vec![person("Ada", 36), person("Brian", 41)]);
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.column_count(), 2);
        assert_eq!(model.value(0, 0), CellValue::from("Ada"));
        assert_eq!(model.value(1, 1), CellValue::Int(41));
        assert_eq!(model.value(5, 0), CellValue::None);
    }

    #[test]
    fn test_insert_emits_index_and_count() {
        let model = VecModel::from_rows(2, vec![person("Ada", 36)]);
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        model
            .signals()
            .rows_inserted
            .connect(move |(index, count)| recv.lock().push((*index, *count)));

        model.insert_rows(1, vec![person("Grace", 45), person("Edsger", 39)]);
        assert_eq!(*received.lock(), vec![(1, 2)]);
        assert_eq!(model.row_count(), 3);
    }

    #[test]
    fn test_set_value_out_of_bounds_is_rejected() {
        let model = VecModel::from_rows(2, vec![person("Ada", 36)]);
        assert!(!model.set_value(3, 0, CellValue::Int(1)));
        assert!(!model.set_value(0, 2, CellValue::Int(1)));
        assert!(model.set_value(0, 1, CellValue::Int(37)));
        assert_eq!(model.value(0, 1), CellValue::Int(37));
    }

    #[test]
    fn test_move_row() {
        let model = VecModel::from_rows(1, vec![person("a", 0), person("b", 0), person("c", 0)]);
        assert!(model.move_row(0, 2));
        assert_eq!(model.value(0, 0), CellValue::from("b"));
        assert_eq!(model.value(2, 0), CellValue::from("a"));
        assert!(!model.move_row(0, 9));
    }
}
