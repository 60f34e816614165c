//! Column width specifications.

/// How a column's width is determined.
///
/// A width has a *mode* and, for `Pixel` and `Star`, a value. The resolved
/// on-screen width (display value) and the content-natural width (desired
/// value) are tracked separately on [`GridColumn`](super::GridColumn) and
/// are independently queryable; this enum only records intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Size to the larger of header and cell content.
    Auto,
    /// Fixed width in pixels.
    Pixel(f32),
    /// Size to the widest measured cell.
    SizeToCells,
    /// Size to the measured header.
    SizeToHeader,
    /// Proportional share of the leftover width, by weight.
    Star(f32),
}

impl ColumnWidth {
    /// A star width with weight 1.
    pub const STAR: Self = Self::Star(1.0);

    /// Returns whether this is a star (proportional) width.
    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star(_))
    }

    /// Returns the star weight, or `None` for non-star widths.
    pub fn star_weight(&self) -> Option<f32> {
        match self {
            Self::Star(weight) => Some(*weight),
            _ => None,
        }
    }
}

impl Default for ColumnWidth {
    fn default() -> Self {
        Self::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_weight() {
        assert_eq!(ColumnWidth::Star(2.0).star_weight(), Some(2.0));
        assert_eq!(ColumnWidth::Pixel(100.0).star_weight(), None);
        assert!(ColumnWidth::STAR.is_star());
    }
}
