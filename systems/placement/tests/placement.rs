use chrono::NaiveDate;
use garden_planner_core::{
    Bed, BedId, CellCoord, FillStrategy, GridBounds, Occupant, PlacementId, PlanningMethod,
    PlantId, PlantProfile, ValidationError,
};
use garden_planner_system_placement::{preview_placement, PlacementRequest};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
}

fn bed(width: u32, length: u32) -> Bed {
    Bed {
        id: BedId::new(1),
        name: "raised".to_owned(),
        bounds: GridBounds::new(width, length),
        cell_size_inches: 12,
        method: PlanningMethod::SquareFoot,
    }
}

fn one_per_cell() -> PlantProfile {
    PlantProfile::with_spacing(PlantId::new(1), "pepper", 12.0, 60)
}

fn occupant(id: u32, column: u32, row: u32, planted: NaiveDate, days: u32) -> Occupant {
    Occupant {
        placement: PlacementId::new(id),
        cell: CellCoord::new(column, row),
        plant: PlantId::new(2),
        planted,
        days_to_maturity: days,
        footprint_radius: 0,
    }
}

fn coords(cells: &[CellCoord]) -> Vec<(u32, u32)> {
    cells.iter().map(|cell| (cell.column(), cell.row())).collect()
}

#[test]
fn row_major_scans_left_to_right_then_down() {
    let bed = bed(3, 3);
    let plant = one_per_cell();
    let request = PlacementRequest::new(&bed, &plant, CellCoord::new(1, 0), 4);

    let preview = preview_placement(&request, &[], date(4, 1)).expect("preview");

    assert_eq!(coords(&preview.cells), vec![(1, 0), (2, 0), (0, 1), (1, 1)]);
    assert_eq!(preview.found_count(), 4);
    assert!(preview.is_complete());
}

#[test]
fn column_major_scans_top_to_bottom_then_across() {
    let bed = bed(3, 3);
    let plant = one_per_cell();
    let request = PlacementRequest {
        fill: FillStrategy::ColumnMajor,
        ..PlacementRequest::new(&bed, &plant, CellCoord::new(0, 1), 4)
    };

    let preview = preview_placement(&request, &[], date(4, 1)).expect("preview");

    assert_eq!(coords(&preview.cells), vec![(0, 1), (0, 2), (1, 0), (1, 1)]);
}

#[test]
fn active_occupants_are_skipped_and_expired_ones_reused() {
    let bed = bed(3, 1);
    let plant = one_per_cell();
    let occupants = [
        occupant(1, 0, 0, date(3, 1), 60),
        occupant(2, 1, 0, date(1, 1), 30),
    ];
    let request = PlacementRequest::new(&bed, &plant, CellCoord::new(0, 0), 3);

    let preview = preview_placement(&request, &occupants, date(4, 1)).expect("preview");

    assert_eq!(coords(&preview.cells), vec![(1, 0), (2, 0)]);
    assert_eq!(preview.shortfall(), 1);
    assert!(!preview.is_complete());
}

#[test]
fn row_limit_bounds_scan_even_when_short() {
    let bed = bed(2, 4);
    let plant = one_per_cell();
    let request = PlacementRequest {
        row_limit: Some(1),
        ..PlacementRequest::new(&bed, &plant, CellCoord::new(0, 1), 5)
    };

    let preview = preview_placement(&request, &[], date(4, 1)).expect("preview");

    assert_eq!(coords(&preview.cells), vec![(0, 1), (1, 1)]);
    assert_eq!(preview.shortfall(), 3);
    assert!(preview.capacity_warning.is_some());
}

#[test]
fn row_limit_applies_to_column_major_band() {
    let bed = bed(3, 4);
    let plant = one_per_cell();
    let request = PlacementRequest {
        fill: FillStrategy::ColumnMajor,
        row_limit: Some(2),
        ..PlacementRequest::new(&bed, &plant, CellCoord::new(1, 1), 10)
    };

    let preview = preview_placement(&request, &[], date(4, 1)).expect("preview");

    assert_eq!(
        coords(&preview.cells),
        vec![(1, 1), (1, 2), (2, 1), (2, 2)]
    );
}

#[test]
fn dense_plants_share_cells() {
    let bed = bed(4, 4);
    let carrot = PlantProfile::with_spacing(PlantId::new(3), "carrot", 3.0, 70);
    let request = PlacementRequest::new(&bed, &carrot, CellCoord::new(0, 0), 20);

    let preview = preview_placement(&request, &[], date(4, 1)).expect("preview");

    assert_eq!(preview.requested_cells, 2);
    let quantities: Vec<u32> = preview.assignments.iter().map(|a| a.quantity).collect();
    assert_eq!(quantities, vec![16, 4]);
    assert_eq!(preview.placed_plants(), 20);
    assert!(preview.capacity_warning.is_none());
}

#[test]
fn preview_is_deterministic() {
    let bed = bed(6, 6);
    let plant = one_per_cell();
    let occupants = [
        occupant(1, 2, 0, date(3, 20), 40),
        occupant(2, 4, 1, date(3, 25), 40),
        occupant(3, 0, 2, date(3, 28), 40),
    ];
    let request = PlacementRequest::new(&bed, &plant, CellCoord::new(1, 0), 12);

    let first = preview_placement(&request, &occupants, date(4, 1)).expect("preview");
    for _ in 0..8 {
        let again = preview_placement(&request, &occupants, date(4, 1)).expect("preview");
        assert_eq!(first, again);
    }
}

#[test]
fn preview_never_returns_out_of_bounds_or_occupied_cells() {
    let bed = bed(5, 4);
    let plant = one_per_cell();
    let occupants: Vec<Occupant> = (0..5)
        .map(|index| occupant(index, index, index % 4, date(3, 1), 90))
        .collect();

    for fill in [FillStrategy::RowMajor, FillStrategy::ColumnMajor] {
        for row in 0..4 {
            for column in 0..5 {
                let request = PlacementRequest {
                    fill,
                    ..PlacementRequest::new(&bed, &plant, CellCoord::new(column, row), 30)
                };
                let preview = preview_placement(&request, &occupants, date(4, 1)).expect("preview");
                for cell in &preview.cells {
                    assert!(bed.bounds.contains(*cell), "{cell} out of bounds");
                    assert!(
                        occupants.iter().all(|occupant| occupant.cell != *cell),
                        "{cell} is occupied"
                    );
                }
            }
        }
    }
}

#[test]
fn start_outside_bed_is_rejected() {
    let bed = bed(2, 2);
    let plant = one_per_cell();
    let request = PlacementRequest::new(&bed, &plant, CellCoord::new(2, 0), 1);

    let error = preview_placement(&request, &[], date(4, 1)).expect_err("out of bounds");

    assert_eq!(
        error,
        ValidationError::CellOutOfBounds {
            cell: CellCoord::new(2, 0),
            bounds: GridBounds::new(2, 2),
        }
    );
}

#[test]
fn preview_converts_into_commit_on_reference_date() {
    let bed = bed(2, 2);
    let plant = one_per_cell();
    let request = PlacementRequest::new(&bed, &plant, CellCoord::new(0, 0), 2);

    let preview = preview_placement(&request, &[], date(5, 3)).expect("preview");
    let commit = preview.into_commit("California Wonder", None, false);

    assert_eq!(commit.planted, date(5, 3));
    assert_eq!(commit.cells.len(), 2);
    assert_eq!(commit.variety, "California Wonder");
}
