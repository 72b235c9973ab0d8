use std::fmt;

use anyhow::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::grain::GrainDirection;

/// A demanded part type: one entry of the cutting list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartType {
    pub id: usize,
    pub name: String,
    pub length: f32,
    pub width: f32,
    pub thickness: f32,
    pub material: String,
    /// Required grain direction on the finished part, `None` if unconstrained
    pub grain: Option<GrainDirection>,
    /// Number of copies of this part to produce
    pub qty: usize,
    /// Higher priority parts are placed first among parts of equal area
    pub priority: u32,
}

impl PartType {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        name: impl Into<String>,
        length: f32,
        width: f32,
        thickness: f32,
        material: impl Into<String>,
        grain: Option<GrainDirection>,
        qty: usize,
        priority: u32,
    ) -> Result<Self> {
        let name = name.into();
        ensure!(
            length > 0.0 && width > 0.0 && thickness > 0.0,
            "part '{name}' has non-positive dimensions: {length} x {width} x {thickness}"
        );
        ensure!(qty > 0, "part '{name}' has zero quantity");
        Ok(Self {
            id,
            name,
            length,
            width,
            thickness,
            material: material.into(),
            grain,
            qty,
            priority,
        })
    }

    pub fn area(&self) -> f32 {
        self.length * self.width
    }

    /// Placed dimensions `(length, width)` for the given rotation state.
    #[inline(always)]
    pub fn dims(&self, rotated: bool) -> (f32, f32) {
        match rotated {
            false => (self.length, self.width),
            true => (self.width, self.length),
        }
    }
}

/// Uniquely identifies one unit of a [`PartType`]'s demanded quantity.
/// Derived once at expansion time from the part id and the copy ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId {
    pub part_id: usize,
    pub ordinal: usize,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}.{}", self.part_id, self.ordinal)
    }
}

/// One unit of a [`PartType`], created at expansion and consumed exactly once:
/// either placed on a sheet or recorded as unplaced.
#[derive(Clone, Copy, Debug)]
pub struct PartInstance {
    pub id: InstanceId,
}

impl PartInstance {
    pub fn new(part_id: usize, ordinal: usize) -> Self {
        Self {
            id: InstanceId { part_id, ordinal },
        }
    }
}
