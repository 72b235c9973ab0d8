//! Kerf-aware collision detection.
//!
//! Stateless free functions; the single authority through which every placement
//! pathway (primary strategy, strip-cut runs, rebalancing moves) must pass
//! before a placement is accepted.

use crate::entities::{Placement, Sheet};
use crate::geometry::Rect;

/// Tolerance absorbing floating-point drift at nominally-touching boundaries.
/// Two kerf-adjacent parts whose coordinates differ by ~1e-13 units must not be
/// flagged as colliding.
pub const DEFAULT_EPS: f32 = 0.01;

/// Whether `candidate`, with its trailing edges (right, bottom) expanded by
/// `kerf`, overlaps any existing placement by more than `eps` on both axes.
///
/// Independently of the geometric test, a candidate whose top-left corner
/// exactly equals an existing placement's is always rejected. This guards
/// against upstream bugs producing duplicate positions that the epsilon
/// tolerance would otherwise have to arbitrate.
pub fn collides(candidate: &Rect, placements: &[Placement], kerf: f32, eps: f32) -> bool {
    let expanded = candidate.expand_trailing(kerf);
    placements.iter().any(|p| {
        (p.rect.x_min == candidate.x_min && p.rect.y_min == candidate.y_min)
            || overlaps(&expanded, &p.rect, eps)
    })
}

/// Two rectangles overlap iff neither is fully to the left/right/above/below
/// the other; penetration of at most `eps` is tolerated on either axis.
#[inline(always)]
fn overlaps(a: &Rect, b: &Rect, eps: f32) -> bool {
    f32::min(a.x_max, b.x_max) - f32::max(a.x_min, b.x_min) > eps
        && f32::min(a.y_max, b.y_max) - f32::max(a.y_min, b.y_min) > eps
}

/// Symmetric variant used by validity checks: whether two committed placements
/// conflict once either one's kerf clearance is accounted for.
pub fn kerf_expanded_overlap(a: &Rect, b: &Rect, kerf: f32, eps: f32) -> bool {
    overlaps(&a.expand_trailing(kerf), b, eps) || overlaps(&b.expand_trailing(kerf), a, eps)
}

/// Whether `candidate` lies within the sheet, with room for the kerf of the
/// final cut along its trailing edges.
pub fn within_bounds(candidate: &Rect, sheet_length: f32, sheet_width: f32, kerf: f32) -> bool {
    candidate.x_min >= 0.0
        && candidate.y_min >= 0.0
        && candidate.x_max + kerf <= sheet_length
        && candidate.y_max + kerf <= sheet_width
}

/// Full acceptance check of a candidate rectangle against a sheet's current state.
pub fn validate(candidate: &Rect, sheet: &Sheet, kerf: f32, eps: f32) -> bool {
    within_bounds(candidate, sheet.length, sheet.width, kerf)
        && !collides(candidate, &sheet.placements, kerf, eps)
}
