use test_case::test_case;

use cutplan::entities::{Instance, PartType, Sheet, Stock};
use cutplan::grain::GrainDirection;
use cutplan::util::assertions;
use cutplan_pack::config::{PackConfig, Strategy, StrategyMode};
use cutplan_pack::packer::SheetPacker;
use cutplan_pack::solution::{FailureKind, SheetStats, Solution, UnplacedReason};

fn stock(id: usize, l: f32, w: f32, qty: usize) -> Stock {
    Stock::new(id, l, w, 18.0, "mdf", None, qty).unwrap()
}

fn part(id: usize, l: f32, w: f32, qty: usize) -> PartType {
    PartType::new(id, format!("part{id}"), l, w, 18.0, "mdf", None, qty, 0).unwrap()
}

fn solve(instance: Instance, config: PackConfig) -> Solution {
    SheetPacker::new(instance, config).solve()
}

/// Rebuilds a checkable [`Sheet`] from the reported per-sheet stats, so the
/// validity checkers in [`assertions`] run against integration results too.
fn as_sheet(stats: &SheetStats) -> Sheet {
    let dummy = Stock::new(stats.stock_id, stats.length, stats.width, 1.0, "any", None, 1).unwrap();
    let mut sheet = Sheet::open(stats.sheet_id, &dummy);
    sheet.placements = stats.placements.clone();
    sheet
}

/// The testable layout invariants: pairwise kerf-expanded disjointness, bounds
/// with trailing kerf clearance, instance id uniqueness and area accounting.
fn assert_layout_valid(solution: &Solution, kerf: f32) {
    for stats in &solution.sheets {
        let sheet = as_sheet(stats);
        assert!(
            assertions::no_overlaps(&sheet, kerf, 0.01),
            "overlapping placements on sheet {}",
            stats.sheet_id
        );
        assert!(
            assertions::all_within_bounds(&sheet, kerf),
            "placement out of bounds on sheet {}",
            stats.sheet_id
        );
        assert!(assertions::areas_conserved(&sheet));
        let area = stats.length * stats.width;
        assert!((stats.used_area + stats.waste_area - area).abs() < 1.0);
        assert!((0.0..=1.0).contains(&stats.efficiency));
    }
    assert!(
        assertions::instance_ids_unique(solution.placements()),
        "an instance id appears in more than one placement"
    );
    assert!((0.0..=1.0).contains(&solution.overall_efficiency));
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn nine_parts_form_three_by_three_grid() {
    let instance = Instance::new(
        vec![stock(0, 2440.0, 1220.0, 1)],
        vec![part(0, 800.0, 400.0, 9)],
        2.4,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.total_sheets_used, 1);
    assert_eq!(solution.placements().count(), 9);
    assert_layout_valid(&solution, 2.4);

    // 800 + 2.4 kerf pitch along x, 400 + 2.4 along y
    let cols = [0.0, 802.4, 1604.8];
    let rows = [0.0, 402.4, 804.8];
    let mut cells = vec![];
    for p in solution.placements() {
        let col = cols.iter().position(|&c| (p.x() - c).abs() < 0.01);
        let row = rows.iter().position(|&r| (p.y() - r).abs() < 0.01);
        let (col, row) = (col.unwrap(), row.unwrap());
        assert!(!p.rotated);
        cells.push((col, row));
    }
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 9, "grid cells not all distinct");
}

#[test]
fn insufficient_inventory_detected_before_packing() {
    let instance = Instance::new(
        vec![stock(0, 500.0, 500.0, 1)],
        vec![part(0, 800.0, 400.0, 10)],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(!solution.success);
    assert!(solution.sheets.is_empty());
    assert!(solution.message.contains("insufficient inventory"));
    match solution.failure {
        Some(FailureKind::InsufficientInventory { shortfall, .. }) => {
            // 800*400*10 - 500*500
            assert_close(shortfall, 2_950_000.0);
        }
        ref other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn mixed_sizes_pack_onto_one_sheet() {
    let instance = Instance::new(
        vec![stock(0, 2440.0, 1220.0, 3)],
        vec![part(0, 800.0, 400.0, 6), part(1, 200.0, 200.0, 4)],
        3.2,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.placements().count(), 10);
    assert_eq!(solution.total_sheets_used, 1);
    assert_layout_valid(&solution, 3.2);

    // the small parts go down as one kerf-spaced strip run
    let mut small: Vec<f32> = solution
        .placements()
        .filter(|p| p.instance_id.part_id == 1)
        .map(|p| p.x())
        .collect();
    small.sort_by(f32::total_cmp);
    for pair in small.windows(2) {
        assert_close(pair[1] - pair[0], 203.2);
    }
}

#[test_case(GrainDirection::Vertical, false; "matching grain lies flat")]
#[test_case(GrainDirection::Horizontal, true; "crossed grain forces rotation")]
fn grain_constraint_fixes_orientation(stock_grain: GrainDirection, expect_rotated: bool) {
    let instance = Instance::new(
        vec![
            Stock::new(0, 2440.0, 1220.0, 18.0, "oak", Some(stock_grain), 1).unwrap(),
        ],
        vec![
            PartType::new(
                0,
                "door",
                600.0,
                300.0,
                18.0,
                "oak",
                Some(GrainDirection::Vertical),
                3,
                0,
            )
            .unwrap(),
        ],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.placements().count(), 3);
    for p in solution.placements() {
        assert_eq!(p.rotated, expect_rotated);
    }
    assert_layout_valid(&solution, 0.0);
}

#[test]
fn identical_inputs_yield_identical_placements() {
    let build = || {
        Instance::new(
            vec![stock(0, 2440.0, 1220.0, 5), stock(1, 1220.0, 610.0, 5)],
            vec![
                part(0, 700.0, 350.0, 7),
                part(1, 150.0, 150.0, 11),
                part(2, 400.0, 420.0, 3),
            ],
            3.0,
        )
        .unwrap()
    };
    let a = solve(build(), PackConfig::default());
    let b = solve(build(), PackConfig::default());

    let placements_a: Vec<_> = a.placements().copied().collect();
    let placements_b: Vec<_> = b.placements().copied().collect();
    assert_eq!(placements_a, placements_b);
    assert_eq!(a.message, b.message);
    assert_eq!(a.total_sheets_used, b.total_sheets_used);
    assert_layout_valid(&a, 3.0);
}

#[test]
fn incompatible_material_reported_per_instance() {
    let instance = Instance::new(
        vec![stock(0, 2440.0, 1220.0, 1)],
        vec![
            PartType::new(0, "shelf", 600.0, 300.0, 18.0, "oak", None, 2, 0).unwrap(),
        ],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(!solution.success);
    assert!(solution.failure.is_none());
    assert!(solution.sheets.is_empty());
    assert_eq!(solution.unplaced.len(), 2);
    for u in &solution.unplaced {
        assert_eq!(u.reason, UnplacedReason::NoCompatibleStock);
    }
}

#[test]
fn exhausted_stock_reported_as_no_space_left() {
    // enough area in aggregate, but only one 260x260 part fits per 500x500 sheet
    let instance = Instance::new(
        vec![stock(0, 500.0, 500.0, 1)],
        vec![part(0, 260.0, 260.0, 3)],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(!solution.success);
    assert_eq!(solution.placements().count(), 1);
    assert_eq!(solution.unplaced.len(), 2);
    for u in &solution.unplaced {
        assert_eq!(u.reason, UnplacedReason::NoSpaceLeft);
    }
    assert_layout_valid(&solution, 0.0);
}

#[test_case(0.0, 1; "no kerf fits one sheet")]
#[test_case(5.0, 2; "kerf clearance forces a second sheet")]
fn kerf_reduces_usable_capacity(kerf: f32, expected_sheets: usize) {
    let instance = Instance::new(
        vec![stock(0, 100.0, 100.0, 2)],
        vec![part(0, 50.0, 90.0, 2)],
        kerf,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.total_sheets_used, expected_sheets);
    assert_layout_valid(&solution, kerf);
}

#[test_case(true, 1; "rebalancing empties the trailing sheet")]
#[test_case(false, 2; "without rebalancing the premature split stays")]
fn rebalancing_recovers_prematurely_closed_sheet(rebalance: bool, expected_sheets: usize) {
    // a tight attempt cap closes the first sheet while it still has room
    let config = PackConfig {
        strategy: StrategyMode::Fixed(Strategy::BestFit),
        max_attempts_per_sheet: 3,
        rebalance,
        ..PackConfig::default()
    };
    let instance = Instance::new(
        vec![stock(0, 1000.0, 1000.0, 2)],
        vec![part(0, 100.0, 100.0, 5)],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, config);

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.placements().count(), 5);
    assert_eq!(solution.total_sheets_used, expected_sheets);
    assert_layout_valid(&solution, 0.0);
}

#[test]
fn empty_cutting_list_succeeds_with_no_sheets() {
    let instance = Instance::new(vec![stock(0, 2440.0, 1220.0, 3)], vec![], 3.0).unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success);
    assert_eq!(solution.total_sheets_used, 0);
    assert_eq!(solution.placements().count(), 0);
}

#[test]
fn materials_never_mix_on_a_sheet() {
    let instance = Instance::new(
        vec![
            Stock::new(0, 1000.0, 1000.0, 18.0, "mdf", None, 1).unwrap(),
            Stock::new(1, 1000.0, 1000.0, 18.0, "oak", None, 1).unwrap(),
        ],
        vec![
            PartType::new(0, "a", 400.0, 400.0, 18.0, "mdf", None, 2, 0).unwrap(),
            PartType::new(1, "b", 400.0, 400.0, 18.0, "oak", None, 2, 0).unwrap(),
        ],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.total_sheets_used, 2);
    for sheet in &solution.sheets {
        let part_ids: Vec<_> = sheet.placements.iter().map(|p| p.instance_id.part_id).collect();
        assert!(
            part_ids.iter().all(|&id| id == part_ids[0]),
            "sheet {} mixes materials",
            sheet.sheet_id
        );
    }
}

#[test]
fn thickness_separates_otherwise_identical_materials() {
    let instance = Instance::new(
        vec![
            Stock::new(0, 1000.0, 1000.0, 18.0, "mdf", None, 1).unwrap(),
            Stock::new(1, 1000.0, 1000.0, 12.0, "mdf", None, 1).unwrap(),
        ],
        vec![
            PartType::new(0, "thick", 400.0, 400.0, 18.0, "mdf", None, 1, 0).unwrap(),
            PartType::new(1, "thin", 400.0, 400.0, 12.0, "mdf", None, 1, 0).unwrap(),
        ],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    assert!(solution.success, "{}", solution.message);
    assert_eq!(solution.total_sheets_used, 2);
    for sheet in &solution.sheets {
        assert_eq!(sheet.placements.len(), 1);
        assert_eq!(sheet.placements[0].instance_id.part_id, sheet.stock_id);
    }
}

#[test]
fn larger_parts_placed_before_smaller() {
    let instance = Instance::new(
        vec![stock(0, 1000.0, 500.0, 2)],
        vec![part(0, 100.0, 100.0, 2), part(1, 900.0, 450.0, 1)],
        0.0,
    )
    .unwrap();
    let solution = solve(
        instance,
        PackConfig {
            strategy: StrategyMode::Fixed(Strategy::BestFit),
            ..PackConfig::default()
        },
    );

    assert!(solution.success, "{}", solution.message);
    // the big part claims the first sheet's origin; had the small parts gone
    // first they would have fragmented it
    let big = solution
        .placements()
        .find(|p| p.instance_id.part_id == 1)
        .unwrap();
    assert_eq!((big.x(), big.y()), (0.0, 0.0));
    assert_eq!(big.sheet_id, 0);
    assert_layout_valid(&solution, 0.0);
}

#[test]
fn part_too_large_for_any_stock_is_unplaced() {
    let instance = Instance::new(
        vec![stock(0, 500.0, 500.0, 10)],
        vec![part(0, 600.0, 100.0, 1), part(1, 300.0, 300.0, 1)],
        0.0,
    )
    .unwrap();
    let solution = solve(instance, PackConfig::default());

    // the oversized part must not burn through the inventory trying
    assert!(!solution.success);
    assert_eq!(solution.unplaced.len(), 1);
    assert_eq!(solution.unplaced[0].reason, UnplacedReason::NoSpaceLeft);
    assert_eq!(solution.unplaced[0].id.part_id, 0);
    assert_eq!(solution.total_sheets_used, 1);
    assert_layout_valid(&solution, 0.0);
}
