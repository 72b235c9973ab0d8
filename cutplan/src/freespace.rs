//! Per-sheet free-rectangle bookkeeping.
//!
//! Free space is subdivided with a guillotine split: at most two disjoint
//! children replace a consumed rectangle. This bounds the free-list growth to
//! O(placements) and keeps the bookkeeping simple, at the cost of some packing
//! density compared to full maximal-rectangle maintenance.

use crate::geometry::Rect;
use crate::util::FPA;

/// Cutoff below which leftover fragments are discarded. Slivers narrower than
/// this on either axis are statistically unusable and only bloat the
/// candidate-search space.
pub const DEFAULT_MIN_FRAGMENT: f32 = 50.0;

/// The set of empty axis-aligned regions of one sheet, pairwise disjoint.
#[derive(Clone, Debug)]
pub struct FreeSpace {
    rects: Vec<Rect>,
}

impl FreeSpace {
    /// A fresh sheet: one free rectangle spanning the whole sheet.
    pub fn full_sheet(length: f32, width: f32) -> Self {
        Self {
            rects: vec![
                Rect::try_new(0.0, 0.0, length, width)
                    .expect("sheet dimensions must be positive"),
            ],
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn total_area(&self) -> f32 {
        self.rects.iter().map(|r| r.area()).sum()
    }

    /// Guillotine split: consumes the free rectangle at `idx` around `placed`.
    ///
    /// Produces a full-height strip right of the placement (offset by the kerf)
    /// and a strip below it. The bottom strip is bounded at the right strip's
    /// start so the two children partition the leftover and stay disjoint.
    /// Children with width or height below `min_fragment` are discarded.
    pub fn consume(&mut self, idx: usize, placed: &Rect, kerf: f32, min_fragment: f32) {
        let free = self.rects.swap_remove(idx);
        debug_assert!(
            free.contains(placed),
            "consumed placement {placed:?} outside free rect {free:?}"
        );

        let keep = |w: f32, h: f32| w > 0.0 && h > 0.0 && w >= min_fragment && h >= min_fragment;

        let right_x = placed.x_max + kerf;
        let right_kept = keep(free.x_max - right_x, free.height());
        if right_kept {
            self.rects.push(Rect {
                x_min: right_x,
                y_min: free.y_min,
                x_max: free.x_max,
                y_max: free.y_max,
            });
        }

        let bottom_y = placed.y_max + kerf;
        // if the right strip was dropped, let the bottom strip recover its area
        let bottom_x_max = match right_kept {
            true => f32::min(right_x, free.x_max),
            false => free.x_max,
        };
        if keep(bottom_x_max - free.x_min, free.y_max - bottom_y) {
            self.rects.push(Rect {
                x_min: free.x_min,
                y_min: bottom_y,
                x_max: bottom_x_max,
                y_max: free.y_max,
            });
        }
    }

    /// Coalesces coplanar adjacent free rectangles to recover some of the
    /// density lost to the guillotine split. Disjointness is preserved.
    pub fn merge_adjacent(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.rects.len() {
                for j in (i + 1)..self.rects.len() {
                    if let Some(m) = try_merge(self.rects[i], self.rects[j]) {
                        self.rects[i] = m;
                        self.rects.swap_remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }
}

/// Merges two rectangles sharing a full edge into one, if possible.
fn try_merge(a: Rect, b: Rect) -> Option<Rect> {
    let same_rows = FPA(a.y_min) == FPA(b.y_min) && FPA(a.y_max) == FPA(b.y_max);
    let same_cols = FPA(a.x_min) == FPA(b.x_min) && FPA(a.x_max) == FPA(b.x_max);

    if same_rows {
        if FPA(a.x_max) == FPA(b.x_min) {
            return Some(Rect { x_max: b.x_max, ..a });
        }
        if FPA(b.x_max) == FPA(a.x_min) {
            return Some(Rect { x_min: b.x_min, ..a });
        }
    }
    if same_cols {
        if FPA(a.y_max) == FPA(b.y_min) {
            return Some(Rect { y_max: b.y_max, ..a });
        }
        if FPA(b.y_max) == FPA(a.y_min) {
            return Some(Rect { y_min: b.y_min, ..a });
        }
    }
    None
}
