//! The column content contract.
//!
//! Columns are polymorphic over what they display and how they edit. The
//! grid core is agnostic to the visual a column produces; it drives the
//! [`CellFactory`] capability interface at the edit-state transitions and
//! when visual rows are bound. Rendering a [`CellElement`] is the embedding
//! toolkit's concern.

use crate::model::CellValue;

/// What caused an edit session to begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditTrigger {
    /// Begun from code.
    #[default]
    Programmatic,
    /// Begun by a pointer gesture (double-click, typically).
    Pointer,
    /// Begun from the keyboard (F2 / typing).
    Keyboard,
}

/// A display visual for one cell.
///
/// The core models a cell visual as its textual content plus the natural
/// width the content wants; a rendering layer wraps or replaces this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellElement {
    /// Text representation of the cell's value.
    pub text: String,
    /// Natural (content-measured) width, if known.
    pub desired_width: Option<f32>,
}

/// An editing visual for one cell.
///
/// Holds the value under edit. The embedding layer mutates it through
/// [`set_value`](EditElement::set_value) as the user types; the edit-state
/// machine reads it back on commit and restores it on cancel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditElement {
    value: CellValue,
}

impl EditElement {
    /// Creates an editor seeded with `value`.
    pub fn new(value: CellValue) -> Self {
        Self { value }
    }

    /// Returns the value currently in the editor.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Replaces the value in the editor.
    pub fn set_value(&mut self, value: CellValue) {
        self.value = value;
    }
}

/// Per-column-kind capability interface for generating and editing cell
/// content.
///
/// Implementations are selected polymorphically per column; the grid never
/// switches on column kinds. All methods are invoked on the grid's logical
/// thread.
pub trait CellFactory: Send + Sync {
    /// Produces the display element for a cell.
    fn generate_element(&self, row: usize, value: &CellValue) -> CellElement;

    /// Produces the editing element for a cell, seeded from the current
    /// value.
    fn generate_editing_element(&self, row: usize, value: &CellValue) -> EditElement;

    /// Prepares the editing element when the session begins (select-all,
    /// caret placement) and returns the pre-edit value to restore on
    /// cancel.
    fn prepare_cell_for_edit(&self, element: &mut EditElement, trigger: EditTrigger) -> CellValue {
        let _ = trigger;
        element.value().clone()
    }

    /// Reads the edited value back out of the editing element.
    fn read_editing_value(&self, element: &EditElement) -> CellValue {
        element.value().clone()
    }

    /// Restores `original` into the editing element, leaving the bound
    /// item untouched.
    fn cancel_cell_edit(&self, element: &mut EditElement, original: &CellValue) {
        element.set_value(original.clone());
    }
}

/// The default factory: plain text display, value-passthrough editing.
#[derive(Debug, Default)]
pub struct TextCellFactory;

impl TextCellFactory {
    /// Creates a text factory.
    pub fn new() -> Self {
        Self
    }
}

impl CellFactory for TextCellFactory {
    fn generate_element(&self, _row: usize, value: &CellValue) -> CellElement {
        CellElement {
            text: value.to_string(),
            desired_width: None,
        }
    }

    fn generate_editing_element(&self, _row: usize, value: &CellValue) -> EditElement {
        EditElement::new(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_factory_round_trip() {
        let factory = TextCellFactory::new();
        let value = CellValue::from("hello");

        let element = factory.generate_element(0, &value);
        assert_eq!(element.text, "hello");

        let mut editor = factory.generate_editing_element(0, &value);
        let original = factory.prepare_cell_for_edit(&mut editor, EditTrigger::Pointer);
        assert_eq!(original, value);

        editor.set_value(CellValue::from("changed"));
        assert_eq!(factory.read_editing_value(&editor), CellValue::from("changed"));

        factory.cancel_cell_edit(&mut editor, &original);
        assert_eq!(editor.value(), &value);
    }
}
