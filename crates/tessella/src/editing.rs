//! The edit-state machine.
//!
//! At most one cell edit session exists grid-wide, optionally wrapped in a
//! row session spanning several cell edits on the same row. Beginning an
//! edit raises a cancellable notification; committing reads the edited
//! value back through the column's factory and applies it to the model,
//! where a validation failure keeps the session alive; cancelling restores
//! the captured pre-edit value and leaves the item untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use tessella_core::Signal;

use crate::column::{CellFactory, ColumnCollection, EditElement, EditTrigger};
use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::model::{CellValue, DataConnection};

/// How an edit session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// The edited value was (or is being) applied.
    Commit,
    /// The pre-edit value was (or is being) restored.
    Cancel,
}

/// Outcome of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    /// The value was applied and the session closed.
    Committed,
    /// The model rejected the value; the session stays open with the edited
    /// value intact so the user can correct it.
    Invalid,
}

/// Payload of the cancellable edit-beginning notification.
#[derive(Clone)]
pub struct CellEditBeginning {
    /// View row about to enter edit.
    pub row: usize,
    /// Logical column index.
    pub column: usize,
    /// What initiated the session.
    pub trigger: EditTrigger,
    canceled: Arc<AtomicBool>,
}

impl CellEditBeginning {
    /// Prevents the session from starting.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

/// Payload of the edit ending/ended notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEditResolution {
    /// View row of the session.
    pub row: usize,
    /// Logical column index.
    pub column: usize,
    /// Commit or cancel.
    pub action: EditAction,
}

/// Payload of the row-level ending/ended notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEditResolution {
    /// The row whose session resolved.
    pub row: usize,
    /// Commit or cancel.
    pub action: EditAction,
}

struct CellSession {
    row: usize,
    column: usize,
    value_column: usize,
    trigger: EditTrigger,
    factory: Arc<dyn CellFactory>,
    editor: EditElement,
    original: CellValue,
}

/// The grid-wide edit state: at most one cell session, at most one row
/// session.
pub struct EditingMachine {
    cell: Option<CellSession>,
    /// Row with an open row-level session. Outlives individual cell
    /// sessions on that row.
    editing_row: Option<usize>,

    /// A cell edit is about to begin; handlers may cancel it.
    pub cell_edit_beginning: Signal<CellEditBeginning>,
    /// A cell session is resolving.
    pub cell_edit_ending: Signal<CellEditResolution>,
    /// A cell session resolved.
    pub cell_edit_ended: Signal<CellEditResolution>,
    /// A row session is resolving.
    pub row_edit_ending: Signal<RowEditResolution>,
    /// A row session resolved.
    pub row_edit_ended: Signal<RowEditResolution>,
}

impl EditingMachine {
    /// Creates an idle machine.
    pub fn new() -> Self {
        Self {
            cell: None,
            editing_row: None,
            cell_edit_beginning: Signal::new(),
            cell_edit_ending: Signal::new(),
            cell_edit_ended: Signal::new(),
            row_edit_ending: Signal::new(),
            row_edit_ended: Signal::new(),
        }
    }

    /// Whether a cell session is open.
    pub fn is_editing(&self) -> bool {
        self.cell.is_some()
    }

    /// The open cell session's `(row, column)`, if any.
    pub fn editing_cell(&self) -> Option<(usize, usize)> {
        self.cell.as_ref().map(|s| (s.row, s.column))
    }

    /// The row with an open row-level session, if any.
    pub fn editing_row(&self) -> Option<usize> {
        self.editing_row
    }

    /// The live editing element, for the embedding layer to mutate.
    pub fn editor_mut(&mut self) -> Option<&mut EditElement> {
        self.cell.as_mut().map(|s| &mut s.editor)
    }

    /// The live editing element.
    pub fn editor(&self) -> Option<&EditElement> {
        self.cell.as_ref().map(|s| &s.editor)
    }

    /// Begins a cell edit at `(row, column)`.
    ///
    /// Returns `Ok(false)` when the edit cannot start for a recoverable
    /// reason: the column or row is read-only, a handler cancelled the
    /// beginning notification, or an implicit commit of the previous
    /// session failed validation. A session already open on the same cell
    /// returns `Ok(true)`.
    ///
    /// Beginning on a different row first resolves the previous row's
    /// session with a commit; beginning on a different cell of the same row
    /// commits just the cell session.
    pub fn begin_cell_edit(
        &mut self,
        row: usize,
        column: usize,
        trigger: EditTrigger,
        columns: &ColumnCollection,
        connection: &DataConnection,
    ) -> Result<bool> {
        let grid_column = columns.column(column)?;
        if grid_column.is_read_only() || connection.is_row_read_only(row) {
            return Ok(false);
        }

        if let Some((open_row, open_column)) = self.editing_cell() {
            if open_row == row && open_column == column {
                return Ok(true);
            }
            // Implicit resolution of the previous session; a validation
            // failure blocks the new edit.
            let result = if open_row == row {
                self.commit_cell_edit(connection)?
            } else {
                self.commit_row_edit(connection)?
            };
            if result == CommitResult::Invalid {
                return Ok(false);
            }
        } else if self.editing_row.is_some_and(|r| r != row) {
            if self.commit_row_edit(connection)? == CommitResult::Invalid {
                return Ok(false);
            }
        }

        let canceled = Arc::new(AtomicBool::new(false));
        self.cell_edit_beginning.emit(CellEditBeginning {
            row,
            column,
            trigger,
            canceled: Arc::clone(&canceled),
        });
        if canceled.load(Ordering::SeqCst) {
            debug!(target: targets::EDITING, row, column, "edit beginning cancelled");
            return Ok(false);
        }

        let factory = Arc::clone(grid_column.factory());
        let value_column = grid_column.value_column();
        let value = connection.value(row, value_column);
        let mut editor = factory.generate_editing_element(row, &value);
        let original = factory.prepare_cell_for_edit(&mut editor, trigger);

        self.cell = Some(CellSession {
            row,
            column,
            value_column,
            trigger,
            factory,
            editor,
            original,
        });
        self.editing_row = Some(row);
        debug!(target: targets::EDITING, row, column, "cell edit began");
        Ok(true)
    }

    /// Commits the open cell session, applying the edited value to the
    /// model.
    ///
    /// On validation failure the session stays open with the edited value
    /// intact. Errors when no session is open.
    pub fn commit_cell_edit(&mut self, connection: &DataConnection) -> Result<CommitResult> {
        let session = self.cell.as_ref().ok_or(GridError::NoActiveEdit)?;
        let resolution = CellEditResolution {
            row: session.row,
            column: session.column,
            action: EditAction::Commit,
        };
        self.cell_edit_ending.emit(resolution);

        let session = self.cell.as_ref().ok_or(GridError::NoActiveEdit)?;
        let value = session.factory.read_editing_value(&session.editor);
        if !connection.set_value(session.row, session.value_column, value) {
            debug!(
                target: targets::EDITING,
                row = session.row,
                column = session.column,
                "commit rejected by model"
            );
            return Ok(CommitResult::Invalid);
        }

        self.cell = None;
        self.cell_edit_ended.emit(resolution);
        debug!(
            target: targets::EDITING,
            row = resolution.row,
            column = resolution.column,
            "cell edit committed"
        );
        Ok(CommitResult::Committed)
    }

    /// Cancels the open cell session, restoring the captured pre-edit value
    /// to the editor and leaving the item untouched.
    pub fn cancel_cell_edit(&mut self) -> Result<()> {
        let session = self.cell.as_mut().ok_or(GridError::NoActiveEdit)?;
        let resolution = CellEditResolution {
            row: session.row,
            column: session.column,
            action: EditAction::Cancel,
        };
        self.cell_edit_ending.emit(resolution);

        let session = self.cell.as_mut().ok_or(GridError::NoActiveEdit)?;
        let original = session.original.clone();
        session.factory.cancel_cell_edit(&mut session.editor, &original);
        self.cell = None;
        self.cell_edit_ended.emit(resolution);
        debug!(
            target: targets::EDITING,
            row = resolution.row,
            column = resolution.column,
            "cell edit cancelled"
        );
        Ok(())
    }

    /// Commits the row session: the open cell session first, then the row
    /// itself. Errors when no session of either kind is open.
    pub fn commit_row_edit(&mut self, connection: &DataConnection) -> Result<CommitResult> {
        if self.cell.is_some() {
            if self.commit_cell_edit(connection)? == CommitResult::Invalid {
                return Ok(CommitResult::Invalid);
            }
        }
        let row = self.editing_row.ok_or(GridError::NoActiveEdit)?;
        let resolution = RowEditResolution {
            row,
            action: EditAction::Commit,
        };
        self.row_edit_ending.emit(resolution);
        self.editing_row = None;
        self.row_edit_ended.emit(resolution);
        debug!(target: targets::EDITING, row, "row edit committed");
        Ok(CommitResult::Committed)
    }

    /// Cancels the row session, cancelling any open cell session with it.
    pub fn cancel_row_edit(&mut self) -> Result<()> {
        if self.cell.is_some() {
            self.cancel_cell_edit()?;
        }
        let row = self.editing_row.ok_or(GridError::NoActiveEdit)?;
        let resolution = RowEditResolution {
            row,
            action: EditAction::Cancel,
        };
        self.row_edit_ending.emit(resolution);
        self.editing_row = None;
        self.row_edit_ended.emit(resolution);
        debug!(target: targets::EDITING, row, "row edit cancelled");
        Ok(())
    }

    /// The trigger that started the open session, if any.
    pub fn trigger(&self) -> Option<EditTrigger> {
        self.cell.as_ref().map(|s| s.trigger)
    }

    /// Shifts session row indices after `count` rows were inserted at
    /// `row`.
    pub fn rows_inserted(&mut self, row: usize, count: usize) {
        if let Some(session) = self.cell.as_mut() {
            if session.row >= row {
                session.row += count;
            }
        }
        if let Some(r) = self.editing_row.as_mut() {
            if *r >= row {
                *r += count;
            }
        }
    }

    /// Shifts session row indices after `count` rows were removed at
    /// `row`. A session on a removed row is cancelled.
    pub fn rows_removed(&mut self, row: usize, count: usize) {
        let end = row + count;
        let editing = self.editing_cell().map(|(r, _)| r).or(self.editing_row);
        if let Some(r) = editing {
            if r >= row && r < end {
                // The edited item is gone; there is nothing to restore to.
                if self.cell.is_some() {
                    let _ = self.cancel_cell_edit();
                }
                if self.editing_row.is_some() {
                    let _ = self.cancel_row_edit();
                }
                return;
            }
        }
        if let Some(session) = self.cell.as_mut() {
            if session.row >= end {
                session.row -= count;
            }
        }
        if let Some(r) = self.editing_row.as_mut() {
            if *r >= end {
                *r -= count;
            }
        }
    }

    /// Drops any open session without notifications; used on model resets
    /// where the edited item may no longer exist.
    pub fn abandon(&mut self) {
        self.cell = None;
        self.editing_row = None;
    }
}

impl Default for EditingMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditingMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingMachine")
            .field("editing_cell", &self.editing_cell())
            .field("editing_row", &self.editing_row)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::column::GridColumn;
    use crate::model::{GridModel, ModelSignals, VecModel};

    fn setup() -> (DataConnection, ColumnCollection, EditingMachine) {
        let model = VecModel::from_rows(
            2,
            vec![
                vec![CellValue::from("Ada"), CellValue::Int(36)],
                vec![CellValue::from("Brian"), CellValue::Int(41)],
            ],
        );
        let connection = DataConnection::new(model);
        let mut columns = ColumnCollection::new();
        columns.push(GridColumn::new("Name", 0));
        columns.push(GridColumn::new("Age", 1).with_read_only(true));
        (connection, columns, EditingMachine::new())
    }

    #[test]
    fn test_begin_edit_and_commit() {
        let (connection, columns, mut editing) = setup();
        assert!(editing
            .begin_cell_edit(0, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap());
        assert_eq!(editing.editing_cell(), Some((0, 0)));

        editing
            .editor_mut()
            .unwrap()
            .set_value(CellValue::from("Augusta"));
        assert_eq!(
            editing.commit_cell_edit(&connection).unwrap(),
            CommitResult::Committed
        );
        assert!(!editing.is_editing());
        assert_eq!(connection.value(0, 0), CellValue::from("Augusta"));
        // The row session stays open until resolved at row level.
        assert_eq!(editing.editing_row(), Some(0));
        assert_eq!(
            editing.commit_row_edit(&connection).unwrap(),
            CommitResult::Committed
        );
        assert_eq!(editing.editing_row(), None);
    }

    #[test]
    fn test_cancel_restores_original() {
        let (connection, columns, mut editing) = setup();
        editing
            .begin_cell_edit(0, 0, EditTrigger::Pointer, &columns, &connection)
            .unwrap();
        editing
            .editor_mut()
            .unwrap()
            .set_value(CellValue::from("garbage"));
        editing.cancel_cell_edit().unwrap();
        assert!(!editing.is_editing());
        assert_eq!(connection.value(0, 0), CellValue::from("Ada"));
    }

    #[test]
    fn test_read_only_column_rejected() {
        let (connection, columns, mut editing) = setup();
        assert!(!editing
            .begin_cell_edit(0, 1, EditTrigger::Keyboard, &columns, &connection)
            .unwrap());
        assert!(!editing.is_editing());
    }

    #[test]
    fn test_beginning_notification_can_cancel() {
        let (connection, columns, mut editing) = setup();
        editing
            .cell_edit_beginning
            .connect(|beginning| beginning.cancel());
        assert!(!editing
            .begin_cell_edit(0, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap());
        assert!(!editing.is_editing());
    }

    #[test]
    fn test_second_begin_resolves_first() {
        let (connection, columns, mut editing) = setup();
        editing
            .begin_cell_edit(0, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap();
        editing
            .editor_mut()
            .unwrap()
            .set_value(CellValue::from("Augusta"));

        let rows_ended = Arc::new(Mutex::new(Vec::new()));
        {
            let rows_ended = Arc::clone(&rows_ended);
            editing
                .row_edit_ended
                .connect(move |r| rows_ended.lock().push(r.row));
        }

        // A different row commits the whole previous row session.
        assert!(editing
            .begin_cell_edit(1, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap());
        assert_eq!(editing.editing_cell(), Some((1, 0)));
        assert_eq!(connection.value(0, 0), CellValue::from("Augusta"));
        assert_eq!(*rows_ended.lock(), vec![0]);
    }

    #[test]
    fn test_commit_without_session_errors() {
        let (connection, _, mut editing) = setup();
        assert_eq!(
            editing.commit_cell_edit(&connection).unwrap_err(),
            GridError::NoActiveEdit
        );
        assert_eq!(editing.cancel_cell_edit().unwrap_err(), GridError::NoActiveEdit);
    }

    /// A model that rejects every write.
    struct ReadOnlyModel {
        inner: Arc<VecModel>,
        signals: ModelSignals,
    }

    impl GridModel for ReadOnlyModel {
        fn row_count(&self) -> usize {
            self.inner.row_count()
        }
        fn column_count(&self) -> usize {
            self.inner.column_count()
        }
        fn value(&self, row: usize, column: usize) -> CellValue {
            self.inner.value(row, column)
        }
        fn set_value(&self, _row: usize, _column: usize, _value: CellValue) -> bool {
            false
        }
        fn signals(&self) -> &ModelSignals {
            &self.signals
        }
    }

    #[test]
    fn test_invalid_commit_keeps_session() {
        let inner = VecModel::from_rows(1, vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]]);
        let connection = DataConnection::new(Arc::new(ReadOnlyModel {
            inner,
            signals: ModelSignals::new(),
        }));
        let mut columns = ColumnCollection::new();
        columns.push(GridColumn::new("N", 0));
        let mut editing = EditingMachine::new();

        editing
            .begin_cell_edit(0, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap();
        editing.editor_mut().unwrap().set_value(CellValue::Int(9));
        assert_eq!(
            editing.commit_cell_edit(&connection).unwrap(),
            CommitResult::Invalid
        );
        // Session retained, edited value intact.
        assert!(editing.is_editing());
        assert_eq!(editing.editor().unwrap().value(), &CellValue::Int(9));

        // A begin on another row is blocked by the failing implicit commit.
        assert!(!editing
            .begin_cell_edit(1, 0, EditTrigger::Keyboard, &columns, &connection)
            .unwrap());
        assert_eq!(editing.editing_cell(), Some((0, 0)));
    }
}
