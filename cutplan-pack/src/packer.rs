//! Sheet/inventory allocation orchestrator.
//!
//! Top-level control loop: groups parts and stock by material and thickness,
//! pre-checks capacity, expands requirements into instances, drives the
//! placement strategies and owns the sheet lifecycle
//! (`Empty -> Opened -> Placing* -> Closed`; no sheet is reopened once closed).

use std::cmp::Reverse;
use std::time::Instant;

use itertools::Itertools;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;

use cutplan::collision;
use cutplan::entities::{Instance, InstanceId, PartInstance, PartType, Sheet};
use cutplan::grain;
use cutplan::util::FPA;
use cutplan::util::assertions;

use crate::config::{PackConfig, Strategy, StrategyMode};
use crate::solution::{Solution, UnplacedInstance, UnplacedReason};
use crate::strategy::{self, Candidate};

/// Donor sheets above this efficiency are never considered for rebalancing.
const REBALANCE_MAX_DONOR_EFFICIENCY: f32 = 0.3;

/// Parts and stock sharing a material and thickness. Packing never crosses
/// group boundaries, and groups never share free-space state.
struct MaterialGroup {
    material: String,
    thickness: f32,
    part_ids: Vec<usize>,
    /// Sorted by sheet area, descending: fewer, larger sheets first
    stock_ids: Vec<usize>,
}

impl MaterialGroup {
    fn demand_area(&self, instance: &Instance) -> f32 {
        self.part_ids
            .iter()
            .map(|&id| {
                let p = instance.part(id);
                p.area() * p.qty as f32
            })
            .sum()
    }

    fn supply_area(&self, instance: &Instance) -> f32 {
        self.stock_ids
            .iter()
            .map(|&id| {
                let s = instance.stock(id);
                s.area() * s.qty as f32
            })
            .sum()
    }
}

/// Deterministic, single-threaded packer over a validated [`Instance`].
pub struct SheetPacker {
    pub instance: Instance,
    pub config: PackConfig,
}

impl SheetPacker {
    pub fn new(instance: Instance, config: PackConfig) -> Self {
        assert!(config.max_attempts_per_sheet > 0);
        assert!(config.eps >= 0.0 && config.min_fragment >= 0.0);
        Self { instance, config }
    }

    pub fn solve(&mut self) -> Solution {
        let start = Instant::now();
        let groups = self.material_groups();
        let mut unplaced: Vec<UnplacedInstance> = Vec::new();

        // requirements with no eligible stock surface as unplaced instances,
        // they do not abort the run
        for group in groups.iter().filter(|g| g.stock_ids.is_empty()) {
            for &part_id in &group.part_ids {
                let part = self.instance.part(part_id);
                warn!(
                    "no compatible stock for part '{}' (material '{}', thickness {})",
                    part.name, part.material, part.thickness
                );
                unplaced.extend((0..part.qty).map(|ordinal| UnplacedInstance {
                    id: InstanceId { part_id, ordinal },
                    reason: UnplacedReason::NoCompatibleStock,
                }));
            }
        }

        // capacity pre-check: fatal, detected before any placement work
        for group in groups.iter().filter(|g| !g.stock_ids.is_empty()) {
            let demand = group.demand_area(&self.instance);
            let supply = group.supply_area(&self.instance);
            if demand > supply {
                let shortfall = demand - supply;
                info!(
                    "capacity pre-check failed for '{}': demand {demand:.1} > supply {supply:.1}",
                    group.material
                );
                return Solution::insufficient_inventory(
                    group.material.clone(),
                    group.thickness,
                    shortfall,
                );
            }
        }

        let mut sheets: Vec<Sheet> = Vec::new();
        for group in groups.iter().filter(|g| !g.stock_ids.is_empty()) {
            self.pack_group(group, &mut sheets, &mut unplaced);
        }

        debug_assert!(assertions::grain_respected(&self.instance, &sheets));
        debug_assert!(assertions::instance_ids_unique(
            sheets.iter().flat_map(|s| s.placements.iter())
        ));
        debug_assert_eq!(
            sheets.iter().map(|s| s.placements.len()).sum::<usize>() + unplaced.len(),
            self.instance.total_part_qty()
        );

        let solution = Solution::build(&self.instance, &sheets, unplaced);
        info!(
            "packing finished in {:.3}ms: {} sheets, {:.1}% efficiency, {} unplaced",
            start.elapsed().as_secs_f64() * 1000.0,
            solution.total_sheets_used,
            solution.overall_efficiency * 100.0,
            solution.unplaced.len()
        );
        solution
    }

    /// Groups parts and stock by material and thickness (compared through
    /// [`FPA`]), in first-appearance order for determinism.
    fn material_groups(&self) -> Vec<MaterialGroup> {
        let mut groups: Vec<MaterialGroup> = Vec::new();
        let index_of = |groups: &mut Vec<MaterialGroup>, material: &str, thickness: f32| {
            groups
                .iter()
                .position(|g| g.material == material && FPA(g.thickness) == FPA(thickness))
                .unwrap_or_else(|| {
                    groups.push(MaterialGroup {
                        material: material.to_string(),
                        thickness,
                        part_ids: Vec::new(),
                        stock_ids: Vec::new(),
                    });
                    groups.len() - 1
                })
        };

        for part in &self.instance.parts {
            let i = index_of(&mut groups, &part.material, part.thickness);
            groups[i].part_ids.push(part.id);
        }
        for stock in &self.instance.stock {
            let i = index_of(&mut groups, &stock.material, stock.thickness);
            groups[i].stock_ids.push(stock.id);
        }
        for group in &mut groups {
            group.stock_ids.sort_by_key(|&id| {
                (Reverse(OrderedFloat(self.instance.stock(id).area())), id)
            });
        }
        groups
    }

    fn resolve_strategy(&self, group: &MaterialGroup) -> Strategy {
        match self.config.strategy {
            StrategyMode::Fixed(strategy) => strategy,
            StrategyMode::Auto => {
                let areas = group
                    .part_ids
                    .iter()
                    .map(|&id| self.instance.part(id).area());
                let max = areas.clone().fold(0.0_f32, f32::max);
                let min = areas.fold(f32::INFINITY, f32::min);
                match min.is_finite() && max / min > self.config.mixed_size_ratio {
                    true => Strategy::MixedSize,
                    false => Strategy::BestFit,
                }
            }
        }
    }

    fn pack_group(
        &self,
        group: &MaterialGroup,
        sheets: &mut Vec<Sheet>,
        unplaced: &mut Vec<UnplacedInstance>,
    ) {
        if group.part_ids.is_empty() {
            return;
        }
        let strategy = self.resolve_strategy(group);
        debug!(
            "packing group '{}' (thickness {}) with {strategy:?}",
            group.material, group.thickness
        );

        let max_part_area = group
            .part_ids
            .iter()
            .map(|&id| self.instance.part(id).area())
            .fold(0.0_f32, f32::max);

        // expansion: each requirement of quantity N becomes N instances
        let mut queue = group
            .part_ids
            .iter()
            .flat_map(|&part_id| {
                (0..self.instance.part(part_id).qty).map(move |ord| PartInstance::new(part_id, ord))
            })
            .collect_vec();
        // large parts first, establishing structure before small parts fill gaps
        queue.sort_by_key(|inst| {
            let part = self.instance.part(inst.id.part_id);
            (
                Reverse(OrderedFloat(part.area())),
                Reverse(part.priority),
                inst.id,
            )
        });

        let mut inventory = group
            .stock_ids
            .iter()
            .map(|&id| (id, self.instance.stock(id).qty))
            .collect_vec();

        let group_start = sheets.len();
        let mut current: Option<usize> = None;
        let mut attempts = 0usize;

        let mut i = 0;
        while i < queue.len() {
            let inst = queue[i];
            let part = self.instance.part(inst.id.part_id);
            let small = strategy == Strategy::MixedSize
                && part.area() * self.config.mixed_size_ratio <= max_part_area;
            // contiguous identical instances eligible for a single strip run
            let run_len = match small {
                true => queue[i..]
                    .iter()
                    .take_while(|q| q.id.part_id == inst.id.part_id)
                    .count(),
                false => 1,
            };

            let placed = loop {
                if let Some(ci) = current {
                    if attempts < self.config.max_attempts_per_sheet {
                        let n = match small {
                            true => self.try_strip_run(
                                &mut sheets[ci],
                                part,
                                &queue[i..i + run_len],
                                &mut attempts,
                            ),
                            false => {
                                self.try_place(&mut sheets[ci], part, inst, strategy, &mut attempts)
                            }
                        };
                        if n > 0 {
                            break n;
                        }
                    } else {
                        debug!("sheet {} reached the attempt cap", sheets[ci].id);
                    }
                }
                // current sheet exhausted: open the next stock instance the part fits on
                match self.open_next_sheet(part, &mut inventory, sheets.len()) {
                    Some(sheet) => {
                        if let Some(ci) = current {
                            info!(
                                "closing sheet {} at {:.1}% efficiency",
                                sheets[ci].id,
                                sheets[ci].efficiency() * 100.0
                            );
                        }
                        sheets.push(sheet);
                        current = Some(sheets.len() - 1);
                        attempts = 0;
                    }
                    None => break 0,
                }
            };

            match placed {
                0 => {
                    debug!("no space left for instance {}", inst.id);
                    unplaced.push(UnplacedInstance {
                        id: inst.id,
                        reason: UnplacedReason::NoSpaceLeft,
                    });
                    i += 1;
                }
                n => i += n,
            }
        }

        if self.config.rebalance {
            self.rebalance_group(sheets, group_start);
        }
    }

    /// Takes one unit from the largest remaining stock type the part can
    /// physically fit on (in some grain-legal orientation) and opens it.
    fn open_next_sheet(
        &self,
        part: &PartType,
        inventory: &mut [(usize, usize)],
        sheet_id: usize,
    ) -> Option<Sheet> {
        let kerf = self.instance.kerf;
        let slot = inventory.iter_mut().find(|(stock_id, qty)| {
            *qty > 0 && {
                let stock = self.instance.stock(*stock_id);
                grain::allowed_rotations(part.grain, stock.grain)
                    .iter()
                    .any(|&rotated| {
                        let (l, w) = part.dims(rotated);
                        l + kerf <= stock.length && w + kerf <= stock.width
                    })
            }
        })?;
        slot.1 -= 1;
        let stock = self.instance.stock(slot.0);
        info!(
            "opening sheet {sheet_id} from stock {} ({} x {})",
            stock.id, stock.length, stock.width
        );
        Some(Sheet::open(sheet_id, stock))
    }

    /// Attempts one placement. Returns the number of instances placed (0 or 1).
    fn try_place(
        &self,
        sheet: &mut Sheet,
        part: &PartType,
        inst: PartInstance,
        strategy: Strategy,
        attempts: &mut usize,
    ) -> usize {
        *attempts += 1;
        let Some(cand) = strategy::find_best(part, sheet, self.instance.kerf, self.config.eps, strategy)
        else {
            return 0;
        };
        // the collision detector is the final authority on acceptance
        if !collision::validate(&cand.rect, sheet, self.instance.kerf, self.config.eps) {
            return 0;
        }
        self.commit(sheet, inst.id, &cand);
        1
    }

    /// Attempts a strip-cut run for up to `instances.len()` identical parts.
    /// Returns the number of instances placed.
    fn try_strip_run(
        &self,
        sheet: &mut Sheet,
        part: &PartType,
        instances: &[PartInstance],
        attempts: &mut usize,
    ) -> usize {
        let kerf = self.instance.kerf;
        let eps = self.config.eps;
        *attempts += 1;
        let Some(run) = strategy::find_strip_run(part, instances.len(), sheet, kerf, eps) else {
            return 0;
        };

        let mut committed: Vec<cutplan::geometry::Rect> = Vec::new();
        for (inst, rect) in instances.iter().zip(&run.rects) {
            // re-validated against the live sheet state as the run grows
            if !collision::validate(rect, sheet, kerf, eps) {
                break;
            }
            sheet.record(inst.id, *rect, run.rotated);
            committed.push(*rect);
        }
        let n = committed.len();
        if n == 0 {
            return 0;
        }

        // consume the run as one block: a single guillotine split around it
        let block = cutplan::geometry::Rect {
            x_min: committed[0].x_min,
            y_min: committed[0].y_min,
            x_max: committed[n - 1].x_max,
            y_max: committed[0].y_max,
        };
        sheet
            .free
            .consume(run.free_idx, &block, kerf, self.config.min_fragment);
        sheet.free.merge_adjacent();
        debug!(
            "strip-cut {} x '{}' on sheet {} at ({:.1}, {:.1})",
            n, part.name, sheet.id, block.x_min, block.y_min
        );
        debug_assert!(assertions::sheet_is_valid(sheet, kerf, eps));
        n
    }

    fn commit(&self, sheet: &mut Sheet, id: InstanceId, cand: &Candidate) {
        let kerf = self.instance.kerf;
        sheet.record(id, cand.rect, cand.rotated);
        sheet
            .free
            .consume(cand.free_idx, &cand.rect, kerf, self.config.min_fragment);
        sheet.free.merge_adjacent();
        debug!(
            "placed {id} at ({:.1}, {:.1}){} on sheet {}",
            cand.rect.x_min,
            cand.rect.y_min,
            if cand.rotated { " rotated" } else { "" },
            sheet.id
        );
        debug_assert!(assertions::sheet_is_valid(sheet, kerf, self.config.eps));
    }

    /// Attempts to empty the last-opened sheet of the group by relocating each
    /// of its placements onto the other sheets. Every move is validated against
    /// the destination's live state as moves accumulate, never against a stale
    /// pre-move snapshot; the whole pass is committed only if the donor empties.
    fn rebalance_group(&self, sheets: &mut Vec<Sheet>, group_start: usize) {
        if sheets.len() - group_start < 2 {
            return;
        }
        let kerf = self.instance.kerf;
        let eps = self.config.eps;
        let donor_idx = sheets.len() - 1;
        let donor_eff = sheets[donor_idx].efficiency();
        if donor_eff >= REBALANCE_MAX_DONOR_EFFICIENCY {
            return;
        }
        let Some(best_other) = sheets[group_start..donor_idx]
            .iter()
            .map(|s| OrderedFloat(s.efficiency()))
            .max()
        else {
            return;
        };
        if best_other.0 <= donor_eff {
            return;
        }

        let mut recipients = sheets[group_start..donor_idx].to_vec();
        let mut moved = 0;
        for p in &sheets[donor_idx].placements {
            let part = self.instance.part(p.instance_id.part_id);
            let best = recipients
                .iter()
                .enumerate()
                .filter_map(|(ri, r)| {
                    strategy::find_best(part, r, kerf, eps, Strategy::BestFit).map(|c| (ri, c))
                })
                .min_by_key(|(_, c)| c.score);
            let Some((ri, cand)) = best else {
                break;
            };
            let recipient = &mut recipients[ri];
            if !collision::validate(&cand.rect, recipient, kerf, eps) {
                break;
            }
            recipient.record(p.instance_id, cand.rect, cand.rotated);
            recipient
                .free
                .consume(cand.free_idx, &cand.rect, kerf, self.config.min_fragment);
            recipient.free.merge_adjacent();
            debug_assert!(assertions::sheet_is_valid(recipient, kerf, eps));
            moved += 1;
        }

        if moved == sheets[donor_idx].placements.len() {
            info!(
                "rebalancing: emptied sheet {} ({moved} placements moved)",
                sheets[donor_idx].id
            );
            sheets.pop();
            for (offset, recipient) in recipients.into_iter().enumerate() {
                sheets[group_start + offset] = recipient;
            }
        } else {
            debug!(
                "rebalancing abandoned: only {moved} of {} donor placements relocatable",
                sheets[donor_idx].placements.len()
            );
        }
    }
}
