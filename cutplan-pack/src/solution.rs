use itertools::Itertools;
use serde::{Deserialize, Serialize};

use cutplan::entities::{Instance, InstanceId, Placement, Sheet};

/// Failure detected before any packing work began. Returned inside the
/// [`Solution`], never thrown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Aggregate demanded part area exceeds the compatible stock area of a
    /// material group
    InsufficientInventory {
        material: String,
        thickness: f32,
        shortfall: f32,
    },
}

/// Why an individual instance could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnplacedReason {
    /// No stock shares the part's material and thickness
    NoCompatibleStock,
    /// Eligible stock was exhausted before the instance could be placed
    NoSpaceLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedInstance {
    pub id: InstanceId,
    pub reason: UnplacedReason,
}

/// Final accounting of one finalized sheet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SheetStats {
    pub sheet_id: usize,
    pub stock_id: usize,
    pub length: f32,
    pub width: f32,
    pub placements: Vec<Placement>,
    pub used_area: f32,
    pub waste_area: f32,
    /// `used_area / sheet area`, in `[0, 1]`
    pub efficiency: f32,
}

impl SheetStats {
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let used_area = sheet.used_area();
        Self {
            sheet_id: sheet.id,
            stock_id: sheet.stock_id,
            length: sheet.length,
            width: sheet.width,
            placements: sheet.placements.clone(),
            used_area,
            waste_area: sheet.area() - used_area,
            efficiency: used_area / sheet.area(),
        }
    }

    pub fn area(&self) -> f32 {
        self.length * self.width
    }
}

/// The complete outcome of a packing run.
///
/// Always fully inspectable: per-part incompatibilities and partial placement
/// are accumulated here rather than thrown, so callers receive every placement
/// that succeeded alongside every instance that did not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Solution {
    /// `true` iff every demanded instance was placed
    pub success: bool,
    pub message: String,
    pub failure: Option<FailureKind>,
    pub sheets: Vec<SheetStats>,
    /// Instances that could not be placed, never silently dropped
    pub unplaced: Vec<UnplacedInstance>,
    pub total_sheets_used: usize,
    pub total_used_area: f32,
    pub total_waste_area: f32,
    /// Used area over total consumed sheet area
    pub overall_efficiency: f32,
}

impl Solution {
    pub(crate) fn build(
        instance: &Instance,
        sheets: &[Sheet],
        unplaced: Vec<UnplacedInstance>,
    ) -> Self {
        let stats = sheets.iter().map(SheetStats::from_sheet).collect_vec();
        let total_used_area: f32 = stats.iter().map(|s| s.used_area).sum();
        let total_sheet_area: f32 = stats.iter().map(|s| s.area()).sum();
        let total_waste_area = total_sheet_area - total_used_area;
        let overall_efficiency = match total_sheet_area > 0.0 {
            true => total_used_area / total_sheet_area,
            false => 0.0,
        };

        let placed: usize = stats.iter().map(|s| s.placements.len()).sum();
        let success = unplaced.is_empty();
        let message = match success {
            true => format!(
                "placed all {placed} of {} instances on {} sheets",
                instance.total_part_qty(),
                stats.len()
            ),
            false => format!(
                "partial placement: {} of {} instances could not be placed",
                unplaced.len(),
                instance.total_part_qty()
            ),
        };

        Self {
            success,
            message,
            failure: None,
            sheets: stats,
            unplaced,
            total_sheets_used: sheets.len(),
            total_used_area,
            total_waste_area,
            overall_efficiency,
        }
    }

    pub(crate) fn insufficient_inventory(
        material: String,
        thickness: f32,
        shortfall: f32,
    ) -> Self {
        let message = format!(
            "insufficient inventory for material '{material}' (thickness {thickness}): \
             short {shortfall:.1} area units"
        );
        Self {
            success: false,
            message,
            failure: Some(FailureKind::InsufficientInventory {
                material,
                thickness,
                shortfall,
            }),
            sheets: vec![],
            unplaced: vec![],
            total_sheets_used: 0,
            total_used_area: 0.0,
            total_waste_area: 0.0,
            overall_efficiency: 0.0,
        }
    }

    /// All placements across all sheets.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.sheets.iter().flat_map(|s| s.placements.iter())
    }
}
