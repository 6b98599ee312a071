//! Date-scoped view of which bed cells are currently growing something.

use chrono::NaiveDate;

use crate::{CellCoord, GridBounds, Occupant};

/// Point-in-time snapshot of the active occupants of one bed.
///
/// The index is derived from the full occupant list and an explicit reference
/// date; it never consults the clock. Occupants outside the grid are ignored.
#[derive(Clone, Debug)]
pub struct OccupancyIndex {
    bounds: GridBounds,
    reference: NaiveDate,
    cells: Vec<bool>,
    active: Vec<Occupant>,
}

impl OccupancyIndex {
    /// Builds the index for the provided reference date.
    #[must_use]
    pub fn build<'a, I>(bounds: GridBounds, occupants: I, reference: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Occupant>,
    {
        let mut cells = vec![false; bounds.cell_count()];
        let mut active: Vec<Occupant> = Vec::new();

        for occupant in occupants {
            if !occupant.is_active_on(reference) {
                continue;
            }
            let Some(index) = bounds.index_of(occupant.cell) else {
                continue;
            };
            cells[index] = true;
            active.push(*occupant);
        }

        active.sort_by_key(|occupant| (occupant.placement, occupant.cell));
        Self {
            bounds,
            reference,
            cells,
            active,
        }
    }

    /// Date the index was derived for.
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference
    }

    /// Reports whether an active occupant holds the cell.
    ///
    /// Cells outside the grid are never active.
    #[must_use]
    pub fn is_active(&self, cell: CellCoord) -> bool {
        self.bounds
            .index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Active occupants ordered by placement identifier.
    #[must_use]
    pub fn active_occupants(&self) -> &[Occupant] {
        &self.active
    }

    /// Number of distinct cells held by active occupants.
    #[must_use]
    pub fn active_cell_count(&self) -> usize {
        self.cells.iter().filter(|held| **held).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlacementId, PlantId};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    fn occupant(id: u32, cell: CellCoord, planted: NaiveDate, days: u32) -> Occupant {
        Occupant {
            placement: PlacementId::new(id),
            cell,
            plant: PlantId::new(1),
            planted,
            days_to_maturity: days,
            footprint_radius: 0,
        }
    }

    #[test]
    fn occupant_is_active_through_maturity_day() {
        let occupants = [occupant(1, CellCoord::new(0, 0), date(5, 1), 30)];
        let bounds = GridBounds::new(2, 2);

        let on_last_day = OccupancyIndex::build(bounds, &occupants, date(5, 31));
        assert!(on_last_day.is_active(CellCoord::new(0, 0)));

        let after = OccupancyIndex::build(bounds, &occupants, date(6, 1));
        assert!(!after.is_active(CellCoord::new(0, 0)));

        let before = OccupancyIndex::build(bounds, &occupants, date(4, 30));
        assert!(!before.is_active(CellCoord::new(0, 0)));
    }

    #[test]
    fn out_of_bounds_occupants_are_ignored() {
        let occupants = [
            occupant(2, CellCoord::new(5, 5), date(5, 1), 30),
            occupant(1, CellCoord::new(1, 1), date(5, 1), 30),
        ];
        let index = OccupancyIndex::build(GridBounds::new(2, 2), &occupants, date(5, 10));
        assert_eq!(index.active_cell_count(), 1);
        assert_eq!(index.active_occupants().len(), 1);
        assert!(!index.is_active(CellCoord::new(5, 5)));
    }

    #[test]
    fn active_occupants_are_ordered_by_placement() {
        let occupants = [
            occupant(9, CellCoord::new(0, 0), date(5, 1), 30),
            occupant(3, CellCoord::new(1, 0), date(5, 1), 30),
        ];
        let index = OccupancyIndex::build(GridBounds::new(2, 1), &occupants, date(5, 2));
        let ids: Vec<u32> = index
            .active_occupants()
            .iter()
            .map(|occupant| occupant.placement.get())
            .collect();
        assert_eq!(ids, vec![3, 9]);
    }
}
