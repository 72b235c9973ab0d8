use serde::{Deserialize, Serialize};

/// Fiber orientation of a sheet or part face, along the length or the width axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrainDirection {
    Horizontal,
    Vertical,
}

/// Whether placing a part in the given rotation state respects the grain constraint.
///
/// A part without a grain requirement can be placed either way. When both the part
/// and the stock specify a grain, exactly one rotation state aligns them:
/// `rotated == (part != stock)`. This is a hard filter; callers must never offer
/// the disallowed orientation as a candidate.
#[inline(always)]
pub fn rotation_allowed(
    part: Option<GrainDirection>,
    stock: Option<GrainDirection>,
    rotated: bool,
) -> bool {
    match (part, stock) {
        (Some(p), Some(s)) => rotated == (p != s),
        _ => true,
    }
}

/// The set of legal rotation states for a part/stock grain pair.
/// Candidate generation must be restricted to this set.
pub fn allowed_rotations(
    part: Option<GrainDirection>,
    stock: Option<GrainDirection>,
) -> &'static [bool] {
    match (part, stock) {
        (Some(p), Some(s)) if p == s => &[false],
        (Some(_), Some(_)) => &[true],
        _ => &[false, true],
    }
}
