//! Placement scoring and candidate search.
//!
//! Candidate orientations are pre-filtered through the grain resolver, and every
//! candidate is bounds- and collision-validated before it can win, so a returned
//! candidate is always acceptable against the sheet state it was searched on.

use ordered_float::OrderedFloat;

use cutplan::collision;
use cutplan::entities::{PartType, Sheet};
use cutplan::geometry::Rect;
use cutplan::grain;

use crate::config::Strategy;

/// Min-ordered score triple: dominant term, origin-distance tie-break, position
/// tie-break. Every component is a function of the placement corner and the
/// consumed free rectangle only, so scores can never choose between
/// orientations; when both orientations tie, the strict comparison in
/// [`find_best`] keeps the first one searched (unrotated).
pub type Score = (OrderedFloat<f32>, OrderedFloat<f32>, OrderedFloat<f32>);

/// A validated candidate placement proposed by a strategy.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub free_idx: usize,
    pub rect: Rect,
    pub rotated: bool,
    pub score: Score,
}

/// Searches all free rectangles of `sheet` for the best placement of `part`.
/// Returns `None` if every free rectangle rejects the part; this is an expected
/// outcome, signalling the orchestrator to try a new sheet.
pub fn find_best(
    part: &PartType,
    sheet: &Sheet,
    kerf: f32,
    eps: f32,
    strategy: Strategy,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let rotations = grain::allowed_rotations(part.grain, sheet.grain);
    for &rotated in rotations {
        // both orientations of a square are identical
        if rotated && rotations.len() == 2 && part.length == part.width {
            continue;
        }
        let (l, w) = part.dims(rotated);
        for (free_idx, free) in sheet.free.rects().iter().enumerate() {
            if l > free.width() || w > free.height() {
                continue;
            }
            let rect = Rect {
                x_min: free.x_min,
                y_min: free.y_min,
                x_max: free.x_min + l,
                y_max: free.y_min + w,
            };
            if !collision::validate(&rect, sheet, kerf, eps) {
                continue;
            }
            let score = score(strategy, &rect, free);
            if best.map_or(true, |b| score < b.score) {
                best = Some(Candidate {
                    free_idx,
                    rect,
                    rotated,
                    score,
                });
            }
        }
    }
    best
}

fn score(strategy: Strategy, rect: &Rect, free: &Rect) -> Score {
    match strategy {
        Strategy::BottomLeft => (
            OrderedFloat(rect.y_min),
            OrderedFloat(rect.x_min),
            OrderedFloat(0.0),
        ),
        // space utilization of the consumed free rectangle dominates
        Strategy::BestFit | Strategy::MixedSize => (
            OrderedFloat(free.area() - rect.area()),
            OrderedFloat(rect.sq_origin_distance()),
            OrderedFloat(rect.x_min),
        ),
    }
}

/// A planned contiguous run of identical parts along the x-axis of one free
/// rectangle.
#[derive(Debug, Clone)]
pub struct StripRun {
    pub free_idx: usize,
    pub rects: Vec<Rect>,
    pub rotated: bool,
}

/// Plans a strip-cut: up to `max_count` copies of `part` in one contiguous run,
/// kerf-spaced along the x-axis of a single free rectangle. Runs are preferred
/// by length, then by bottom-left position. Placing the run as a block avoids
/// fragmenting free space into many small, individually-scored slivers.
pub fn find_strip_run(
    part: &PartType,
    max_count: usize,
    sheet: &Sheet,
    kerf: f32,
    eps: f32,
) -> Option<StripRun> {
    debug_assert!(max_count > 0);
    let mut best: Option<(usize, Score, StripRun)> = None;
    let rotations = grain::allowed_rotations(part.grain, sheet.grain);
    for &rotated in rotations {
        if rotated && rotations.len() == 2 && part.length == part.width {
            continue;
        }
        let (l, w) = part.dims(rotated);
        for (free_idx, free) in sheet.free.rects().iter().enumerate() {
            if l > free.width() || w > free.height() {
                continue;
            }
            let mut rects: Vec<Rect> = Vec::new();
            let mut x = free.x_min;
            while rects.len() < max_count && x + l <= free.x_max {
                let rect = Rect {
                    x_min: x,
                    y_min: free.y_min,
                    x_max: x + l,
                    y_max: free.y_min + w,
                };
                if !collision::validate(&rect, sheet, kerf, eps) {
                    break;
                }
                x = rect.x_max + kerf;
                rects.push(rect);
            }
            if rects.is_empty() {
                continue;
            }
            let count = rects.len();
            let pos: Score = (
                OrderedFloat(free.y_min),
                OrderedFloat(free.x_min),
                OrderedFloat(0.0),
            );
            let better = match &best {
                None => true,
                Some((best_count, best_pos, _)) => {
                    count > *best_count || (count == *best_count && pos < *best_pos)
                }
            };
            if better {
                best = Some((
                    count,
                    pos,
                    StripRun {
                        free_idx,
                        rects,
                        rotated,
                    },
                ));
            }
        }
    }
    best.map(|(_, _, run)| run)
}
