//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks and by integration tests

use std::collections::HashSet;

use itertools::Itertools;

use crate::collision;
use crate::entities::{Instance, Placement, Sheet};
use crate::geometry::Rect;
use crate::grain;
use crate::util::FPA;

/// No two placements on the sheet overlap once kerf clearance is accounted for.
pub fn no_overlaps(sheet: &Sheet, kerf: f32, eps: f32) -> bool {
    sheet
        .placements
        .iter()
        .tuple_combinations()
        .all(|(a, b)| !collision::kerf_expanded_overlap(&a.rect, &b.rect, kerf, eps))
}

/// Every placement lies within the sheet, kerf clearance included.
pub fn all_within_bounds(sheet: &Sheet, kerf: f32) -> bool {
    sheet
        .placements
        .iter()
        .all(|p| collision::within_bounds(&p.rect, sheet.length, sheet.width, kerf))
}

/// Free rectangles on the sheet are pairwise disjoint.
pub fn free_rects_disjoint(sheet: &Sheet) -> bool {
    sheet
        .free
        .rects()
        .iter()
        .tuple_combinations()
        .all(|(a, b)| Rect::intersection(*a, *b).is_none())
}

/// No free rectangle overlaps a committed placement.
pub fn free_rects_clear_of_placements(sheet: &Sheet) -> bool {
    sheet.free.rects().iter().all(|f| {
        sheet
            .placements
            .iter()
            .all(|p| Rect::intersection(*f, p.rect).is_none())
    })
}

/// Each instance id appears in at most one placement.
pub fn instance_ids_unique<'a>(placements: impl Iterator<Item = &'a Placement>) -> bool {
    let mut seen = HashSet::new();
    placements.into_iter().all(|p| seen.insert(p.instance_id))
}

/// Every placement's rotation state is consistent with the grain constraint
/// of its part/sheet pair.
pub fn grain_respected(instance: &Instance, sheets: &[Sheet]) -> bool {
    sheets.iter().all(|sheet| {
        sheet.placements.iter().all(|p| {
            let part = instance.part(p.instance_id.part_id);
            grain::rotation_allowed(part.grain, sheet.grain, p.rotated)
        })
    })
}

/// Used and waste area sum back to the sheet area, and efficiency is a valid
/// fraction.
pub fn areas_conserved(sheet: &Sheet) -> bool {
    FPA(sheet.used_area() + sheet.waste_area()) == FPA(sheet.area())
        && (0.0..=1.0).contains(&sheet.efficiency())
}

/// Combined per-sheet validity check.
pub fn sheet_is_valid(sheet: &Sheet, kerf: f32, eps: f32) -> bool {
    no_overlaps(sheet, kerf, eps)
        && all_within_bounds(sheet, kerf)
        && free_rects_disjoint(sheet)
        && free_rects_clear_of_placements(sheet)
        && areas_conserved(sheet)
}
