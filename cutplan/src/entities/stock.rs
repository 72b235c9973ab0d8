use anyhow::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::grain::GrainDirection;

/// A type of stock sheet available in inventory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stock {
    pub id: usize,
    pub length: f32,
    pub width: f32,
    pub thickness: f32,
    pub material: String,
    /// Grain direction of the sheet face, `None` if the material has no grain
    pub grain: Option<GrainDirection>,
    /// Number of sheets of this exact type available
    pub qty: usize,
}

impl Stock {
    pub fn new(
        id: usize,
        length: f32,
        width: f32,
        thickness: f32,
        material: impl Into<String>,
        grain: Option<GrainDirection>,
        qty: usize,
    ) -> Result<Self> {
        ensure!(
            length > 0.0 && width > 0.0 && thickness > 0.0,
            "stock {id} has non-positive dimensions: {length} x {width} x {thickness}"
        );
        ensure!(qty > 0, "stock {id} has zero quantity");
        Ok(Self {
            id,
            length,
            width,
            thickness,
            material: material.into(),
            grain,
            qty,
        })
    }

    /// Area of a single sheet of this type.
    pub fn area(&self) -> f32 {
        self.length * self.width
    }
}
