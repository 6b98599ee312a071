use chrono::{Days, NaiveDate};
use garden_planner_core::{CellCoord, DateWindow, Occupant, PlacementId, PlantId};
use garden_planner_system_conflicts::{detect_conflicts, Candidate, ConflictDetector};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .expect("valid date")
        .checked_add_days(Days::new(offset))
        .expect("in range")
}

fn occupant(id: u32, cell: CellCoord, radius: u32) -> Occupant {
    Occupant {
        placement: PlacementId::new(id),
        cell,
        plant: PlantId::new(1),
        planted: day(0),
        days_to_maturity: 60,
        footprint_radius: radius,
    }
}

fn candidate(cells: &[CellCoord], start: u64, radius: u32) -> Candidate<'_> {
    Candidate {
        cells,
        planted: day(start),
        days_to_maturity: 30,
        footprint_radius: radius,
    }
}

#[test]
fn overlapping_windows_on_same_cell_conflict() {
    let cell = CellCoord::new(2, 2);
    let occupants = [occupant(1, cell, 0)];
    let cells = [cell];
    let candidate = Candidate {
        cells: &cells,
        planted: day(30),
        days_to_maturity: 60,
        footprint_radius: 0,
    };

    let conflicts = detect_conflicts(&candidate, &occupants);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].placement, PlacementId::new(1));
    assert_eq!(conflicts[0].overlap, DateWindow::new(day(30), day(60)));
}

#[test]
fn back_to_back_windows_do_not_conflict() {
    let cell = CellCoord::new(2, 2);
    let occupants = [occupant(1, cell, 0)];
    let cells = [cell];
    let candidate = Candidate {
        cells: &cells,
        planted: day(61),
        days_to_maturity: 29,
        footprint_radius: 0,
    };

    assert!(detect_conflicts(&candidate, &occupants).is_empty());
}

#[test]
fn single_cell_plants_only_conflict_on_exact_cell() {
    let occupants = [occupant(1, CellCoord::new(2, 2), 0)];
    let neighbour = [CellCoord::new(3, 3)];

    assert!(detect_conflicts(&candidate(&neighbour, 10, 0), &occupants).is_empty());
}

#[test]
fn footprint_buffer_uses_chebyshev_distance() {
    let occupants = [occupant(1, CellCoord::new(2, 2), 1)];

    let diagonal = [CellCoord::new(3, 3)];
    let conflicts = detect_conflicts(&candidate(&diagonal, 10, 0), &occupants);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].distance, 1);

    let two_away = [CellCoord::new(4, 3)];
    assert!(detect_conflicts(&candidate(&two_away, 10, 0), &occupants).is_empty());

    let widened = detect_conflicts(&candidate(&two_away, 10, 1), &occupants);
    assert_eq!(widened.len(), 1);
    assert_eq!(widened[0].candidate_cell, CellCoord::new(4, 3));
}

#[test]
fn each_occupant_is_reported_once_in_placement_order() {
    let occupants = [
        occupant(7, CellCoord::new(1, 0), 0),
        occupant(3, CellCoord::new(0, 0), 0),
    ];
    let cells = [CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)];

    let mut detector = ConflictDetector::new();
    let mut out = vec![];
    detector.detect(&candidate(&cells, 5, 1), &occupants, &mut out);

    let ids: Vec<u32> = out.iter().map(|conflict| conflict.placement.get()).collect();
    assert_eq!(ids, vec![3, 7]);
    assert_eq!(out[0].candidate_cell, CellCoord::new(0, 0));
    assert_eq!(out[0].distance, 0);
}

#[test]
fn detector_clears_previous_results() {
    let occupants = [occupant(1, CellCoord::new(0, 0), 0)];
    let cells = [CellCoord::new(0, 0)];
    let mut detector = ConflictDetector::new();
    let mut out = Vec::new();

    detector.detect(&candidate(&cells, 5, 0), &occupants, &mut out);
    assert_eq!(out.len(), 1);

    detector.detect(&candidate(&cells, 5, 0), &[], &mut out);
    assert!(out.is_empty());
}
