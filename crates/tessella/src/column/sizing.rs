//! Width resolution.
//!
//! Non-star columns resolve from their own intent (fixed pixels or measured
//! content) and are clamped to their constraints. Star columns then split
//! whatever width remains in proportion to their weights, with a
//! clamp-and-redistribute pass: when a proportional share violates a
//! column's constraint, that column is fixed at the bound and the leftover
//! is redistributed among the remaining star columns. Each pass fixes at
//! least one column, so the loop is bounded by the star column count.

use tracing::trace;

use crate::logging::targets;

use super::collection::ColumnCollection;
use super::width::ColumnWidth;

/// Smallest width a star column may resolve to, keeping its share strictly
/// positive so it never degenerates to zero and vanishes from hit testing.
pub const MINIMUM_STAR_COLUMN_WIDTH: f32 = 0.001;

/// Largest width a star column may resolve to.
pub const MAXIMUM_STAR_COLUMN_WIDTH: f32 = 10_000.0;

/// Resolves the display width of every visible column against
/// `available_width` pixels of viewport.
///
/// Hidden columns are left untouched. Desired widths are updated alongside
/// display widths so content-natural sizes remain queryable after
/// resolution.
pub fn resolve_widths(columns: &mut ColumnCollection, available_width: f32) {
    let available_width = available_width.max(0.0);

    // Pass 1: non-star columns resolve independently.
    let mut fixed_total = 0.0;
    let mut stars: Vec<(usize, f32)> = Vec::new();
    let visible: Vec<usize> = columns.visible_iter().map(|(logical, _)| logical).collect();

    for &logical in &visible {
        let column = match columns.column_mut(logical) {
            Ok(column) => column,
            Err(_) => continue,
        };
        match column.width() {
            ColumnWidth::Pixel(width) => {
                column.set_desired_width(width);
                column.set_display_width(column.clamp(width));
                fixed_total += column.display_width();
            }
            ColumnWidth::Auto => {
                let desired = column
                    .desired_cell_width()
                    .max(column.desired_header_width());
                column.set_desired_width(desired);
                column.set_display_width(column.clamp(desired));
                fixed_total += column.display_width();
            }
            ColumnWidth::SizeToCells => {
                let desired = column.desired_cell_width();
                column.set_desired_width(desired);
                column.set_display_width(column.clamp(desired));
                fixed_total += column.display_width();
            }
            ColumnWidth::SizeToHeader => {
                let desired = column.desired_header_width();
                column.set_desired_width(desired);
                column.set_display_width(column.clamp(desired));
                fixed_total += column.display_width();
            }
            ColumnWidth::Star(weight) => {
                stars.push((logical, weight.max(0.0)));
            }
        }
    }

    if stars.is_empty() {
        return;
    }

    // Pass 2: distribute the remainder among star columns, fixing clamped
    // columns one at a time and redistributing.
    let mut pool = (available_width - fixed_total).max(0.0);
    let mut active = stars;

    loop {
        let total_weight: f32 = active.iter().map(|&(_, w)| w).sum();
        let mut violator: Option<(usize, f32)> = None;

        for (slot, &(logical, weight)) in active.iter().enumerate() {
            let share = if total_weight > 0.0 {
                pool * weight / total_weight
            } else {
                0.0
            };
            let clamped = clamp_star(columns, logical, share);
            if (clamped - share).abs() > f32::EPSILON {
                violator = Some((slot, clamped));
                break;
            }
        }

        match violator {
            Some((slot, width)) => {
                let (logical, weight) = active.remove(slot);
                if let Ok(column) = columns.column_mut(logical) {
                    let share = if total_weight > 0.0 {
                        pool * weight / total_weight
                    } else {
                        0.0
                    };
                    column.set_desired_width(share);
                    column.set_display_width(width);
                }
                pool = (pool - width).max(0.0);
                trace!(
                    target: targets::SIZING,
                    column = logical,
                    width,
                    "star column fixed at constraint"
                );
                if active.is_empty() {
                    break;
                }
            }
            None => {
                // No violations: assign every remaining share and finish.
                for &(logical, weight) in &active {
                    let share = if total_weight > 0.0 {
                        pool * weight / total_weight
                    } else {
                        0.0
                    };
                    if let Ok(column) = columns.column_mut(logical) {
                        column.set_desired_width(share);
                        column.set_display_width(share);
                    }
                }
                break;
            }
        }
    }
}

/// Clamps a star share to the column's constraint intersected with the
/// global star bounds.
fn clamp_star(columns: &ColumnCollection, logical: usize, share: f32) -> f32 {
    let Some(column) = columns.get(logical) else {
        return share;
    };
    let min = column.min_width().max(MINIMUM_STAR_COLUMN_WIDTH);
    let max = column.max_width().min(MAXIMUM_STAR_COLUMN_WIDTH).max(min);
    share.clamp(min, max)
}
