//! Pointer event feed.
//!
//! The grid core does not listen to any windowing system. The embedding
//! layer translates its native input into these types and feeds them to the
//! interaction state machines. Positions are in grid content coordinates.

use crate::geometry::Point;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift held (range gestures).
    pub shift: bool,
    /// Control (or Command) held (toggle gestures).
    pub control: bool,
    /// Alt held.
    pub alt: bool,
}

/// What the pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Primary button went down.
    Pressed,
    /// The pointer moved.
    Moved,
    /// Primary button went up.
    Released,
}

/// One pointer event in grid content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pressed, moved, or released.
    pub phase: PointerPhase,
    /// Pointer position.
    pub position: Point,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Convenience constructor with no modifiers.
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }
}
