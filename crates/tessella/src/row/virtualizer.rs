//! Window fill and height estimation.
//!
//! The virtualizer decides which slots are inside the scrolling window:
//! starting from the first scrolling slot it walks forward over visible
//! slots, accumulating measured heights where a visual exists and estimated
//! heights where one does not, until the viewport height is spent. The old
//! and new windows are then diffed; visuals leaving the window are
//! recycled, slots entering it are materialized from the pools and handed
//! to the caller's binder.

use std::collections::VecDeque;

use tracing::trace;

use crate::logging::targets;

use super::display::{DisplayData, VisualKind, VisualRow, DEFAULT_HEADER_HEIGHT, DEFAULT_ROW_HEIGHT};
use super::slots::SlotLayout;

/// Number of recent measurements blended into the row-height estimate.
const HEIGHT_SAMPLE_WINDOW: usize = 16;

/// A running blend of recently measured row heights.
///
/// Scroll extent is `estimate * rows` for the unmaterialized majority, so
/// the estimate tracks a moving average of the last few real measurements
/// rather than jumping on every bind.
#[derive(Debug, Clone)]
pub struct RowHeightEstimator {
    samples: VecDeque<f32>,
}

impl RowHeightEstimator {
    /// Creates an estimator with no samples; estimates start at the default
    /// row height.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HEIGHT_SAMPLE_WINDOW),
        }
    }

    /// Blends one measured height into the estimate.
    pub fn note(&mut self, height: f32) {
        if !height.is_finite() || height <= 0.0 {
            return;
        }
        if self.samples.len() == HEIGHT_SAMPLE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(height);
    }

    /// The current estimated data-row height.
    pub fn estimate(&self) -> f32 {
        if self.samples.is_empty() {
            return DEFAULT_ROW_HEIGHT;
        }
        let sum: f32 = self.samples.iter().sum();
        sum / self.samples.len() as f32
    }
}

impl Default for RowHeightEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Fills and maintains the scrolling window over a [`DisplayData`].
#[derive(Debug, Default)]
pub struct RowVirtualizer {
    estimator: RowHeightEstimator,
}

impl RowVirtualizer {
    /// Creates a virtualizer with a fresh estimator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The height estimator, for feeding measurements.
    pub fn estimator_mut(&mut self) -> &mut RowHeightEstimator {
        &mut self.estimator
    }

    /// Estimated total content height: measured-or-estimated data rows plus
    /// headers, skipping collapsed slots.
    pub fn estimated_extent(&self, layout: &SlotLayout) -> f32 {
        let headers = layout.slot_count() - layout.row_count();
        let visible_headers = (0..layout.slot_count())
            .filter(|&s| layout.is_header_slot(s) && layout.is_slot_visible(s))
            .count();
        let hidden = layout.slot_count() - layout.visible_slot_count();
        let visible_rows = layout.row_count() - (hidden - (headers - visible_headers));
        visible_rows as f32 * self.estimator.estimate()
            + visible_headers as f32 * DEFAULT_HEADER_HEIGHT
    }

    /// Recomputes the window from `first_slot` over `available_height`
    /// pixels, recycling leavers and binding joiners through `bind`.
    ///
    /// `first_slot` snaps forward to the nearest visible slot. Returns the
    /// new `(first, last)` scrolling window, or `None` when no slot is
    /// visible.
    pub fn refresh(
        &mut self,
        display: &mut DisplayData,
        layout: &SlotLayout,
        first_slot: usize,
        available_height: f32,
        mut bind: impl FnMut(usize, &mut VisualRow),
    ) -> Option<(usize, usize)> {
        let first = if layout.is_slot_visible(first_slot) {
            Some(first_slot)
        } else {
            // Snap forward past a collapsed run; if nothing follows, snap
            // back to the last visible slot instead.
            layout
                .next_visible_slot(first_slot)
                .or_else(|| layout.previous_visible_slot(first_slot))
        };
        let Some(first) = first else {
            display.recycle_all();
            display.set_window(0, 0);
            return None;
        };

        // Walk forward accumulating heights until the viewport is spent.
        // The slot that crosses the boundary stays in the window (it is
        // partially visible).
        let mut wanted: Vec<(usize, VisualKind)> = Vec::new();
        let mut used = 0.0;
        let mut cursor = Some(first);
        while let Some(slot) = cursor {
            let kind = if layout.is_header_slot(slot) {
                VisualKind::GroupHeader
            } else {
                VisualKind::Row
            };
            wanted.push((slot, kind));
            used += match display.visual(slot) {
                Some(visual) => visual.height,
                None => match kind {
                    VisualKind::Row => self.estimator.estimate(),
                    VisualKind::GroupHeader => DEFAULT_HEADER_HEIGHT,
                },
            };
            if used >= available_height {
                break;
            }
            cursor = layout.next_visible_slot(slot);
        }

        let last = wanted.last().map(|&(slot, _)| slot).unwrap_or(first);

        // Recycle leavers before materializing joiners so their visuals are
        // available in the pools.
        for slot in display.materialized_slots() {
            if !wanted.iter().any(|&(s, _)| s == slot) {
                display.recycle(slot);
            }
        }
        for &(slot, kind) in &wanted {
            if display.visual(slot).is_none() {
                let visual = display.materialize(slot, kind);
                bind(slot, visual);
            }
        }

        display.set_window(first, last);
        let visuals = display.visual_count();
        trace!(
            target: targets::VIRTUALIZER,
            first,
            last,
            visuals,
            "window refreshed"
        );
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::display::DefaultRowFactory;
    use super::*;
    use crate::model::{CellValue, GroupSpan};

    fn display() -> DisplayData {
        DisplayData::new(Arc::new(DefaultRowFactory))
    }

    fn flat_layout(rows: usize) -> SlotLayout {
        let mut layout = SlotLayout::new();
        layout.rebuild(rows, &[]);
        layout
    }

    #[test]
    fn test_estimator_blends_recent_samples() {
        let mut estimator = RowHeightEstimator::new();
        assert_eq!(estimator.estimate(), DEFAULT_ROW_HEIGHT);
        estimator.note(30.0);
        estimator.note(50.0);
        assert_eq!(estimator.estimate(), 40.0);
        // Garbage measurements are ignored.
        estimator.note(f32::NAN);
        estimator.note(-5.0);
        assert_eq!(estimator.estimate(), 40.0);
    }

    #[test]
    fn test_window_covers_viewport() {
        let mut virtualizer = RowVirtualizer::new();
        let mut display = display();
        let layout = flat_layout(1000);

        let (first, last) = virtualizer
            .refresh(&mut display, &layout, 0, 400.0, |_, _| {})
            .unwrap();
        assert_eq!(first, 0);
        // 400px at 22px default height: 19 slots, the last partially visible.
        assert_eq!(last, 18);
        assert_eq!(display.visual_count(), 19);
    }

    #[test]
    fn test_scroll_reuses_bounded_pool() {
        let mut virtualizer = RowVirtualizer::new();
        let mut display = display();
        let layout = flat_layout(10_000);

        let mut first = 0;
        while first < layout.slot_count() {
            virtualizer.refresh(&mut display, &layout, first, 400.0, |_, _| {});
            first += 7;
        }
        // Scrolling end to end materializes a bounded visual pool, not one
        // visual per row.
        assert!(display.created_count() <= 50, "created {}", display.created_count());
    }

    #[test]
    fn test_window_skips_collapsed_slots() {
        let mut virtualizer = RowVirtualizer::new();
        let mut display = display();
        let mut layout = SlotLayout::new();
        layout.rebuild(
            10,
            &[
                GroupSpan {
                    level: 0,
                    start_row: 0,
                    row_count: 5,
                    key: CellValue::from("a"),
                },
                GroupSpan {
                    level: 0,
                    start_row: 5,
                    row_count: 5,
                    key: CellValue::from("b"),
                },
            ],
        );
        layout.collapse(0);

        let (first, last) = virtualizer
            .refresh(&mut display, &layout, 0, 1000.0, |_, _| {})
            .unwrap();
        assert_eq!(first, 0);
        assert_eq!(last, 11);
        // Headers plus the five rows of the expanded group.
        assert_eq!(display.visual_count(), 7);
        assert!(display.visual(1).is_none());
        assert!(display.visual(7).is_some());
    }

    #[test]
    fn test_first_slot_snaps_to_visible() {
        let mut virtualizer = RowVirtualizer::new();
        let mut display = display();
        let mut layout = SlotLayout::new();
        layout.rebuild(
            10,
            &[GroupSpan {
                level: 0,
                start_row: 0,
                row_count: 10,
                key: CellValue::from("a"),
            }],
        );
        layout.collapse(0);

        // Every data slot is hidden; the window snaps back to the header.
        let (first, last) = virtualizer
            .refresh(&mut display, &layout, 1, 400.0, |_, _| {})
            .unwrap();
        assert_eq!((first, last), (0, 0));
        assert_eq!(display.visual_count(), 1);
    }

    #[test]
    fn test_empty_layout_clears_window() {
        let mut virtualizer = RowVirtualizer::new();
        let mut display = display();
        display.materialize(0, VisualKind::Row);
        let layout = flat_layout(0);

        assert!(virtualizer
            .refresh(&mut display, &layout, 0, 400.0, |_, _| {})
            .is_none());
        assert_eq!(display.visual_count(), 0);
    }
}
