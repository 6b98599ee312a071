#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure density calculator converting plant spacing into per-cell capacity.
//!
//! Capacity is expressed in plants per cell and may be fractional: a value
//! below one means a single plant spreads across several cells. The packing
//! formula is selected by the bed's [`PlanningMethod`].

use garden_planner_core::{Packing, PlanningMethod, PlantProfile, ValidationError};

/// Row pitch of hexagonal packing relative to the on-center spacing (`sqrt(3) / 2`).
pub const HEX_ROW_FACTOR: f64 = 0.866;

/// Slack applied before truncating capacities so `15.999...` counts as 16.
const ROUNDING_SLACK: f64 = 1e-9;

/// Plants-per-cell capacity derived from spacing or seed density.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Capacity(f64);

impl Capacity {
    /// Capacity of a plant with unknown spacing: one plant per cell.
    pub const ONE: Capacity = Capacity(1.0);

    /// Raw, possibly fractional, plants-per-cell value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Reports whether one plant needs more than a single cell.
    #[must_use]
    pub fn needs_multiple_cells(&self) -> bool {
        self.0 + ROUNDING_SLACK < 1.0
    }

    /// Whole plants that fit in a single cell; zero when a plant spans cells.
    #[must_use]
    pub fn plants_per_cell(&self) -> u32 {
        if self.needs_multiple_cells() {
            return 0;
        }
        clamp_to_u32((self.0 + ROUNDING_SLACK).floor())
    }

    /// Most plants one committed cell may hold.
    ///
    /// A plant spanning several cells is anchored in a single cell, so the
    /// limit never drops below one.
    #[must_use]
    pub fn cell_limit(&self) -> u32 {
        self.plants_per_cell().max(1)
    }

    /// Cells a single plant occupies: `ceil(1 / capacity)`, at least one.
    #[must_use]
    pub fn cells_per_plant(&self) -> u32 {
        if !self.needs_multiple_cells() {
            return 1;
        }
        clamp_to_u32((1.0 / self.0 - ROUNDING_SLACK).ceil()).max(1)
    }
}

/// Non-fatal notice that an entered quantity exceeds what the cells can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityWarning {
    /// Quantity the user entered.
    pub requested: u32,
    /// Quantity the cells hold at the plant's spacing.
    pub capacity: u32,
    /// Cells the quantity was checked against.
    pub cells: u32,
}

/// Computes plants-per-cell capacity for a plant under a planning method.
///
/// Missing or zero spacing (or seed density) yields a capacity of one.
pub fn capacity_of(
    plant: &PlantProfile,
    method: PlanningMethod,
    cell_size_inches: u32,
) -> Result<Capacity, ValidationError> {
    if cell_size_inches == 0 {
        return Err(ValidationError::InvalidCellSize(cell_size_inches));
    }
    let cell = f64::from(cell_size_inches);

    let on_center = measurement("spacing_inches", plant.spacing_inches)?;
    let row = measurement("row_spacing_inches", plant.row_spacing_inches)?;
    let in_row = measurement("plant_spacing_inches", plant.plant_spacing_inches)?;

    let value = match method.packing() {
        Packing::Equidistant => match on_center.or(in_row) {
            Some(spacing) => (cell / spacing).powi(2),
            None => 1.0,
        },
        Packing::RowBased => {
            let row_spacing = row.or(on_center).or(in_row);
            let plant_spacing = in_row.or(on_center).or(row);
            match (row_spacing, plant_spacing) {
                (Some(row_spacing), Some(plant_spacing)) => {
                    (cell / row_spacing) * (cell / plant_spacing)
                }
                _ => 1.0,
            }
        }
        Packing::Hexagonal => match on_center.or(in_row) {
            Some(spacing) => (cell / (spacing * HEX_ROW_FACTOR)) * (cell / spacing),
            None => 1.0,
        },
        Packing::Broadcast => {
            match measurement("seeds_per_square_inch", plant.seeds_per_square_inch)? {
                Some(seeds) => expected_survivors(seeds * cell * cell, plant)?,
                None => 1.0,
            }
        }
        Packing::RowSown => {
            match measurement("seeds_per_linear_inch", plant.seeds_per_linear_inch)? {
                Some(seeds) => {
                    let rows = match row.or(on_center) {
                        Some(row_spacing) => (cell / row_spacing).floor().max(1.0),
                        None => 1.0,
                    };
                    expected_survivors(seeds * cell * rows, plant)?
                }
                None => 1.0,
            }
        }
    };

    tracing::debug!(
        plant = %plant.name,
        ?method,
        cell_size_inches,
        capacity = value,
        "computed cell capacity"
    );
    Ok(Capacity(value))
}

/// Cells required to host `plants` at the provided capacity.
#[must_use]
pub fn cells_needed(capacity: Capacity, plants: u32) -> u32 {
    if plants == 0 {
        return 0;
    }
    if capacity.needs_multiple_cells() {
        return plants.saturating_mul(capacity.cells_per_plant());
    }
    let per_cell = capacity.plants_per_cell().max(1);
    plants.div_ceil(per_cell)
}

/// Default plant count for a block of cells at the provided capacity.
#[must_use]
pub fn default_quantity(capacity: Capacity, cells: u32) -> u32 {
    if capacity.needs_multiple_cells() {
        cells / capacity.cells_per_plant()
    } else {
        cells.saturating_mul(capacity.plants_per_cell())
    }
}

/// Checks an entered quantity against the spacing-derived capacity.
///
/// Returns a warning rather than an error; placement remains permitted.
#[must_use]
pub fn check_quantity(capacity: Capacity, cells: u32, quantity: u32) -> Option<CapacityWarning> {
    let limit = default_quantity(capacity, cells);
    if quantity <= limit {
        return None;
    }
    tracing::warn!(
        requested = quantity,
        capacity = limit,
        cells,
        "quantity exceeds spacing capacity"
    );
    Some(CapacityWarning {
        requested: quantity,
        capacity: limit,
        cells,
    })
}

fn measurement(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(value) if !value.is_finite() || value < 0.0 => {
            Err(ValidationError::InvalidSpacing { field, value })
        }
        Some(value) if value == 0.0 => Ok(None),
        Some(value) => Ok(Some(value)),
    }
}

fn rate(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    match value {
        None => Ok(1.0),
        Some(value) if value.is_finite() && value > 0.0 && value <= 1.0 => Ok(value),
        Some(value) => Err(ValidationError::InvalidRate { field, value }),
    }
}

/// Seeds sown scaled by germination and survival, rounded to whole plants.
///
/// A result that would round to zero keeps its fractional value so the
/// capacity stays positive.
fn expected_survivors(seeds: f64, plant: &PlantProfile) -> Result<f64, ValidationError> {
    let germination = rate("germination_rate", plant.germination_rate)?;
    let survival = rate("survival_rate", plant.survival_rate)?;
    let expected = seeds * germination * survival;
    let rounded = expected.round();
    Ok(if rounded >= 1.0 { rounded } else { expected })
}

fn clamp_to_u32(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.min(f64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_planner_core::PlantId;

    fn spaced(spacing: f64) -> PlantProfile {
        PlantProfile::with_spacing(PlantId::new(1), "test", spacing, 60)
    }

    #[test]
    fn capacity_truncation_tolerates_float_noise() {
        assert_eq!(Capacity(15.999_999_999_9).plants_per_cell(), 16);
        assert_eq!(Capacity(0.25).cells_per_plant(), 4);
        assert_eq!(Capacity(0.3).cells_per_plant(), 4);
        assert_eq!(Capacity(1.0).cells_per_plant(), 1);
    }

    #[test]
    fn spanning_plants_may_anchor_one_plant_per_cell() {
        assert_eq!(Capacity(0.25).cell_limit(), 1);
        assert_eq!(Capacity(1.0).cell_limit(), 1);
        assert_eq!(Capacity(16.0).cell_limit(), 16);
    }

    #[test]
    fn negative_spacing_is_rejected() {
        let error = capacity_of(&spaced(-3.0), PlanningMethod::SquareFoot, 12)
            .expect_err("negative spacing");
        assert_eq!(
            error,
            ValidationError::InvalidSpacing {
                field: "spacing_inches",
                value: -3.0,
            }
        );
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        assert_eq!(
            capacity_of(&spaced(3.0), PlanningMethod::SquareFoot, 0),
            Err(ValidationError::InvalidCellSize(0))
        );
    }

    #[test]
    fn rounding_to_zero_keeps_fractional_capacity() {
        let mut plant = spaced(0.0);
        plant.seeds_per_square_inch = Some(0.001);
        let capacity = capacity_of(&plant, PlanningMethod::Broadcast, 12).expect("capacity");
        assert!(capacity.get() > 0.0);
        assert!(capacity.get() < 1.0);
    }
}
