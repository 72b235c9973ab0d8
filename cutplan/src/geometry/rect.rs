use anyhow::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

///Axis-aligned rectangle on a sheet.
///Sheet-local coordinates with a top-left origin: y grows towards the bottom edge.
#[derive(Clone, Debug, PartialEq, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Rect {
    pub fn try_new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Builds a rectangle from its top-left corner and dimensions.
    pub fn from_corner(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        Rect::try_new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> f32 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }

    /// Returns a copy with the trailing edges (right, bottom) grown by `amount`.
    /// Used to reserve the kerf clearance of a cut along those edges.
    #[inline(always)]
    pub fn expand_trailing(self, amount: f32) -> Self {
        Rect {
            x_max: self.x_max + amount,
            y_max: self.y_max + amount,
            ..self
        }
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = f32::max(a.x_min, b.x_min);
        let y_min = f32::max(a.y_min, b.y_min);
        let x_max = f32::min(a.x_max, b.x_max);
        let y_max = f32::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Whether `other` lies entirely within `self`.
    #[inline(always)]
    pub fn contains(&self, other: &Rect) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Squared distance from the sheet origin to the top-left corner.
    #[inline(always)]
    pub fn sq_origin_distance(&self) -> f32 {
        self.x_min.powi(2) + self.y_min.powi(2)
    }
}
