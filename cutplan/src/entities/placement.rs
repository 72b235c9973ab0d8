use serde::{Deserialize, Serialize};

use crate::entities::InstanceId;
use crate::geometry::Rect;

/// A committed placement of one part instance on a sheet. Immutable once accepted.
///
/// Coordinates are sheet-local with a top-left origin and carry the same length
/// unit as the stock dimensions. `rect` holds the placed (possibly rotated)
/// dimensions, so consumers never need to re-derive them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub instance_id: InstanceId,
    pub sheet_id: usize,
    pub rect: Rect,
    pub rotated: bool,
}

impl Placement {
    pub fn x(&self) -> f32 {
        self.rect.x_min
    }

    pub fn y(&self) -> f32 {
        self.rect.y_min
    }

    pub fn area(&self) -> f32 {
        self.rect.area()
    }
}
