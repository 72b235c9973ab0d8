use crate::entities::{InstanceId, Placement, Stock};
use crate::freespace::FreeSpace;
use crate::geometry::Rect;
use crate::grain::GrainDirection;

/// One opened sheet instance, cut from a [`Stock`] type.
///
/// Owns its placements and its free-rectangle set exclusively; no free-space
/// state is ever shared between sheets. Created when the orchestrator opens a
/// stock instance and finalized when the orchestrator moves past it.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub id: usize,
    pub stock_id: usize,
    pub length: f32,
    pub width: f32,
    pub grain: Option<GrainDirection>,
    pub placements: Vec<Placement>,
    pub free: FreeSpace,
}

impl Sheet {
    /// Opens a fresh sheet of the given stock type, with a single free
    /// rectangle spanning the whole sheet.
    pub fn open(id: usize, stock: &Stock) -> Self {
        Self {
            id,
            stock_id: stock.id,
            length: stock.length,
            width: stock.width,
            grain: stock.grain,
            placements: Vec::new(),
            free: FreeSpace::full_sheet(stock.length, stock.width),
        }
    }

    /// Records an accepted placement. The caller is responsible for having
    /// validated the rectangle through the collision detector and for
    /// consuming the corresponding free rectangle.
    pub fn record(&mut self, instance_id: InstanceId, rect: Rect, rotated: bool) -> Placement {
        let placement = Placement {
            instance_id,
            sheet_id: self.id,
            rect,
            rotated,
        };
        self.placements.push(placement);
        placement
    }

    pub fn area(&self) -> f32 {
        self.length * self.width
    }

    pub fn used_area(&self) -> f32 {
        self.placements.iter().map(|p| p.area()).sum()
    }

    pub fn waste_area(&self) -> f32 {
        self.area() - self.used_area()
    }

    /// Used area as a fraction of the sheet area, in `[0, 1]`.
    pub fn efficiency(&self) -> f32 {
        self.used_area() / self.area()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
