#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement search that previews where a planting would go.
//!
//! The search walks the bed in the fill strategy's total order from a start
//! cell and collects free cells until enough are found or the scan runs out.
//! It never writes state: committing a preview is a separate ledger command.

use chrono::NaiveDate;
use garden_planner_core::{
    Bed, BedId, CellAssignment, CellCoord, FillStrategy, GridBounds, OccupancyIndex, Occupant,
    PlacementCommit, PlanningMethod, PlantId, PlantProfile, ValidationError, WaveLink,
};
use garden_planner_system_density::{
    capacity_of, cells_needed, check_quantity, Capacity, CapacityWarning,
};

/// Parameters describing a placement the user wants to preview.
#[derive(Clone, Copy, Debug)]
pub struct PlacementRequest<'a> {
    /// Bed to search.
    pub bed: &'a Bed,
    /// Plant being placed.
    pub plant: &'a PlantProfile,
    /// Planning method used for capacity; usually the bed's own method.
    pub method: PlanningMethod,
    /// Cell the scan starts from.
    pub start: CellCoord,
    /// Number of plants to place.
    pub desired_plants: u32,
    /// Scan order.
    pub fill: FillStrategy,
    /// Restricts the scan to this many rows starting at the start row.
    pub row_limit: Option<u32>,
}

impl<'a> PlacementRequest<'a> {
    /// Creates a request using the bed's method, row-major fill and no row limit.
    #[must_use]
    pub fn new(
        bed: &'a Bed,
        plant: &'a PlantProfile,
        start: CellCoord,
        desired_plants: u32,
    ) -> Self {
        Self {
            bed,
            plant,
            method: bed.method,
            start,
            desired_plants,
            fill: FillStrategy::RowMajor,
            row_limit: None,
        }
    }
}

/// Result of a placement search, ready to be shown before committing.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Bed that was searched.
    pub bed: BedId,
    /// Plant being placed.
    pub plant: PlantId,
    /// Date the occupancy snapshot was taken for.
    pub reference_date: NaiveDate,
    /// Capacity used to convert plants into cells.
    pub capacity: Capacity,
    /// Plants the caller asked to place.
    pub requested_plants: u32,
    /// Cells required to host every requested plant.
    pub requested_cells: u32,
    /// Free cells found, in scan order.
    pub cells: Vec<CellCoord>,
    /// Plants assigned to each found cell.
    pub assignments: Vec<CellAssignment>,
    /// Set when the found cells cannot hold every requested plant.
    pub capacity_warning: Option<CapacityWarning>,
}

impl PlacementPreview {
    /// Number of cells the search found.
    #[must_use]
    pub fn found_count(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    /// Cells requested but not found; zero when the preview is complete.
    #[must_use]
    pub fn shortfall(&self) -> u32 {
        self.requested_cells.saturating_sub(self.found_count())
    }

    /// Reports whether every requested cell was found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }

    /// Plants the found cells actually receive.
    #[must_use]
    pub fn placed_plants(&self) -> u32 {
        self.assignments.iter().map(|entry| entry.quantity).sum()
    }

    /// Converts the preview into a commit batch planted on the reference date.
    #[must_use]
    pub fn into_commit(
        self,
        variety: impl Into<String>,
        link: Option<WaveLink>,
        override_conflicts: bool,
    ) -> PlacementCommit {
        PlacementCommit {
            bed: self.bed,
            plant: self.plant,
            variety: variety.into(),
            planted: self.reference_date,
            cells: self.assignments,
            link,
            override_conflicts,
        }
    }
}

/// Previews a placement against the occupants active on `reference_date`.
pub fn preview_placement(
    request: &PlacementRequest<'_>,
    occupants: &[Occupant],
    reference_date: NaiveDate,
) -> Result<PlacementPreview, ValidationError> {
    let occupancy = OccupancyIndex::build(request.bed.bounds, occupants, reference_date);
    preview_with_index(request, &occupancy)
}

/// Previews a placement against a prebuilt occupancy snapshot.
pub fn preview_with_index(
    request: &PlacementRequest<'_>,
    occupancy: &OccupancyIndex,
) -> Result<PlacementPreview, ValidationError> {
    let bed = request.bed;
    bed.validate()?;
    validate_scan(bed.bounds, request.start, request.row_limit)?;

    let capacity = capacity_of(request.plant, request.method, bed.cell_size_inches)?;
    let requested_cells = cells_needed(capacity, request.desired_plants);

    let mut cells = Vec::new();
    scan_free_cells(
        bed.bounds,
        occupancy,
        request.start,
        requested_cells,
        request.fill,
        request.row_limit,
        &mut cells,
    );

    let assignments = assign_plants(capacity, request.desired_plants, &cells);
    let found = u32::try_from(cells.len()).unwrap_or(u32::MAX);
    let capacity_warning = check_quantity(capacity, found, request.desired_plants);

    if found < requested_cells {
        tracing::warn!(
            bed = %bed.id,
            requested = requested_cells,
            found,
            "placement search found fewer cells than requested"
        );
    } else {
        tracing::debug!(bed = %bed.id, found, "placement search satisfied request");
    }

    Ok(PlacementPreview {
        bed: bed.id,
        plant: request.plant.id,
        reference_date: occupancy.reference_date(),
        capacity,
        requested_plants: request.desired_plants,
        requested_cells,
        cells,
        assignments,
        capacity_warning,
    })
}

/// Collects up to `count` free cells in fill order starting at `start`.
///
/// The output buffer is cleared first. With a row limit the scan covers rows
/// `[start.row, start.row + limit)` only, whether or not they hold enough free
/// cells. Columns after the first restart at the top of the band (row zero
/// when unbounded).
pub fn scan_free_cells(
    bounds: GridBounds,
    occupancy: &OccupancyIndex,
    start: CellCoord,
    count: u32,
    fill: FillStrategy,
    row_limit: Option<u32>,
    out: &mut Vec<CellCoord>,
) {
    out.clear();
    if count == 0 || !bounds.contains(start) {
        return;
    }

    let wanted = count as usize;
    let (band_top, band_end) = match row_limit {
        Some(limit) => (
            start.row(),
            start.row().saturating_add(limit).min(bounds.length()),
        ),
        None => (0, bounds.length()),
    };

    let visit = |cell: CellCoord, out: &mut Vec<CellCoord>| -> bool {
        if bounds.contains(cell) && !occupancy.is_active(cell) {
            out.push(cell);
        }
        out.len() >= wanted
    };

    match fill {
        FillStrategy::RowMajor => {
            for row in start.row()..band_end {
                let first = if row == start.row() { start.column() } else { 0 };
                for column in first..bounds.width() {
                    if visit(CellCoord::new(column, row), out) {
                        return;
                    }
                }
            }
        }
        FillStrategy::ColumnMajor => {
            for column in start.column()..bounds.width() {
                let first = if column == start.column() {
                    start.row()
                } else {
                    band_top
                };
                for row in first..band_end {
                    if visit(CellCoord::new(column, row), out) {
                        return;
                    }
                }
            }
        }
    }
}

fn validate_scan(
    bounds: GridBounds,
    start: CellCoord,
    row_limit: Option<u32>,
) -> Result<(), ValidationError> {
    if !bounds.contains(start) {
        return Err(ValidationError::CellOutOfBounds {
            cell: start,
            bounds,
        });
    }
    if row_limit == Some(0) {
        return Err(ValidationError::ZeroRowConstraint);
    }
    Ok(())
}

/// Spreads `plants` over the found cells.
///
/// Cells hold up to the per-cell capacity. Plants wider than a cell take a
/// group of `cells_per_plant` cells: the first cell carries the plant and the
/// rest carry zero. A trailing partial group holds no plant.
fn assign_plants(capacity: Capacity, plants: u32, cells: &[CellCoord]) -> Vec<CellAssignment> {
    let mut assignments = Vec::with_capacity(cells.len());
    let mut remaining = plants;

    if capacity.needs_multiple_cells() {
        let group = capacity.cells_per_plant() as usize;
        for chunk in cells.chunks(group) {
            let hosts = chunk.len() == group && remaining > 0;
            if hosts {
                remaining -= 1;
            }
            for (offset, cell) in chunk.iter().enumerate() {
                let quantity = u32::from(hosts && offset == 0);
                assignments.push(CellAssignment {
                    cell: *cell,
                    quantity,
                });
            }
        }
    } else {
        let per_cell = capacity.plants_per_cell().max(1);
        for cell in cells {
            let quantity = per_cell.min(remaining);
            remaining -= quantity;
            assignments.push(CellAssignment {
                cell: *cell,
                quantity,
            });
        }
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(u32, u32)]) -> Vec<CellCoord> {
        coords
            .iter()
            .map(|(column, row)| CellCoord::new(*column, *row))
            .collect()
    }

    fn quantities(assignments: &[CellAssignment]) -> Vec<u32> {
        assignments.iter().map(|entry| entry.quantity).collect()
    }

    #[test]
    fn assignments_fill_cells_up_to_capacity() {
        let found = cells(&[(0, 0), (1, 0), (2, 0)]);
        let assigned = assign_plants(Capacity::ONE, 2, &found);
        assert_eq!(quantities(&assigned), vec![1, 1, 0]);
    }

    #[test]
    fn wide_plants_anchor_on_first_cell_of_group() {
        let found = cells(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let squash = garden_planner_system_density::capacity_of(
            &PlantProfile::with_spacing(PlantId::new(1), "squash", 17.0, 50),
            PlanningMethod::SquareFoot,
            12,
        )
        .expect("capacity");
        assert_eq!(squash.cells_per_plant(), 3);

        let assigned = assign_plants(squash, 2, &found);
        assert_eq!(quantities(&assigned), vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        assert_eq!(
            validate_scan(GridBounds::new(2, 2), CellCoord::new(0, 0), Some(0)),
            Err(ValidationError::ZeroRowConstraint)
        );
    }
}
