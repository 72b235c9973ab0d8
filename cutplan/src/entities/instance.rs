use anyhow::Result;
use anyhow::ensure;
use log::info;
use serde::{Deserialize, Serialize};

use crate::entities::{PartType, Stock};

/// A fully validated problem instance: the available inventory, the demanded
/// parts and the saw kerf. Immutable once constructed.
///
/// Construction is the fail-fast validation boundary: non-positive dimensions,
/// zero quantities, a negative kerf or misnumbered ids are rejected here,
/// before any packing work begins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    pub stock: Vec<Stock>,
    pub parts: Vec<PartType>,
    /// Material width consumed by the saw blade, reserved between adjacent cuts
    pub kerf: f32,
}

impl Instance {
    pub fn new(stock: Vec<Stock>, parts: Vec<PartType>, kerf: f32) -> Result<Self> {
        ensure!(kerf >= 0.0, "kerf must be non-negative, got {kerf}");
        ensure!(
            stock.iter().enumerate().all(|(i, s)| s.id == i),
            "stock ids must match their index in the list"
        );
        ensure!(
            parts.iter().enumerate().all(|(i, p)| p.id == i),
            "part ids must match their index in the list"
        );
        for s in &stock {
            ensure!(
                s.length > 0.0 && s.width > 0.0 && s.thickness > 0.0 && s.qty > 0,
                "stock {} has non-positive dimensions or quantity",
                s.id
            );
        }
        for p in &parts {
            ensure!(
                p.length > 0.0 && p.width > 0.0 && p.thickness > 0.0 && p.qty > 0,
                "part '{}' has non-positive dimensions or quantity",
                p.name
            );
        }
        let instance = Self { stock, parts, kerf };
        info!(
            "instance created: {} stock types, {} part types ({} instances), kerf {}",
            instance.stock.len(),
            instance.parts.len(),
            instance.total_part_qty(),
            instance.kerf
        );
        Ok(instance)
    }

    pub fn part(&self, id: usize) -> &PartType {
        &self.parts[id]
    }

    pub fn stock(&self, id: usize) -> &Stock {
        &self.stock[id]
    }

    /// Total number of part instances demanded across all part types.
    pub fn total_part_qty(&self) -> usize {
        self.parts.iter().map(|p| p.qty).sum()
    }
}
