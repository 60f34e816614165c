//! Cell values exchanged between models, columns, and editors.

use std::cmp::Ordering;
use std::fmt;

/// A value held by one cell of the backing collection.
///
/// `CellValue` is the currency of the model layer: models hand values to
/// column content generators, editors hand edited values back, and sort and
/// group descriptions compare them. A total ordering is defined so that any
/// column can be sorted or grouped without per-type comparators:
/// `None < Bool < Int < Float < String`, with the natural ordering inside
/// each variant (floats by `total_cmp`).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// No value.
    #[default]
    None,
    /// Boolean data.
    Bool(bool),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
}

impl CellValue {
    /// Returns the string content, if this is a `String` value.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns whether this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::String(_) => 4,
        }
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_within_variant() {
        assert!(CellValue::Int(1) < CellValue::Int(2));
        assert!(CellValue::from("apple") < CellValue::from("banana"));
        assert!(CellValue::Float(1.5) < CellValue::Float(2.5));
    }

    #[test]
    fn test_none_sorts_first() {
        assert!(CellValue::None < CellValue::Int(i64::MIN));
        assert!(CellValue::None < CellValue::from(""));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::from("abc").to_string(), "abc");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::None.to_string(), "");
    }
}
