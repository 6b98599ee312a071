#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the garden planner.
//!
//! This crate defines the record types and message surface that connect
//! adapters, the authoritative garden ledger, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the ledger executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values.
//! Systems (density, placement search, succession, reconciliation, conflicts)
//! never mutate state: they consume immutable snapshots such as
//! [`OccupancyIndex`] and answer with plain values.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod occupancy;

pub use occupancy::OccupancyIndex;

/// Number of days either side of a wave date within which unlinked records still match.
pub const DEFAULT_MATCH_TOLERANCE_DAYS: u32 = 7;

/// Largest number of succession waves a plan item may declare; one per day of a year.
pub const MAX_SUCCESSION_WAVES: u32 = 366;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier assigned to a garden bed.
    BedId
);
numeric_id!(
    /// Unique identifier of a plant in the reference catalog.
    PlantId
);
numeric_id!(
    /// Unique identifier assigned to a declared plan item.
    PlanItemId
);
numeric_id!(
    /// Unique identifier assigned to a committed placement.
    PlacementId
);
numeric_id!(
    /// Unique identifier assigned to an exported calendar event.
    EventId
);

/// Location of a single bed cell expressed as column (x) and row (y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Dimensions of a bed grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    width: u32,
    length: u32,
}

impl GridBounds {
    /// Creates a new bounds descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, length: u32) -> Self {
        Self { width, length }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Reports whether the cell lies within `[0, width) x [0, length)`.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.length
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.length as usize
    }

    /// Reports whether the grid holds no cells at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.length == 0
    }

    /// Dense row-major index of the cell, if it lies within the bounds.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.length)
    }
}

/// Packing formula used to derive plants-per-cell capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Packing {
    /// Square grid packing at a single on-center spacing.
    Equidistant,
    /// Rows at a row spacing with plants at an in-row spacing.
    RowBased,
    /// Offset rows where row pitch is `sqrt(3)/2` of the on-center spacing.
    Hexagonal,
    /// Seeds sown along rows, counted per linear inch.
    RowSown,
    /// Seeds scattered across the whole cell, counted per square inch.
    Broadcast,
}

impl Packing {
    /// Reports whether capacity comes from seed counts instead of spacing.
    #[must_use]
    pub const fn is_seed_density(self) -> bool {
        matches!(self, Self::RowSown | Self::Broadcast)
    }
}

/// Agronomic spacing convention that determines cell size and packing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanningMethod {
    /// Square-foot gardening: equidistant packing in 12" cells.
    SquareFoot,
    /// Traditional rows: row-based packing in 12" cells.
    Row,
    /// Intensive beds: hexagonal packing in 6" cells.
    Intensive,
    /// High-density row sowing in 3" cells.
    HighDensity,
    /// Broadcast seeding in 12" cells.
    Broadcast,
}

impl PlanningMethod {
    /// Every method in declaration order.
    pub const ALL: [PlanningMethod; 5] = [
        Self::SquareFoot,
        Self::Row,
        Self::Intensive,
        Self::HighDensity,
        Self::Broadcast,
    ];

    /// Packing formula applied by the method.
    #[must_use]
    pub const fn packing(self) -> Packing {
        match self {
            Self::SquareFoot => Packing::Equidistant,
            Self::Row => Packing::RowBased,
            Self::Intensive => Packing::Hexagonal,
            Self::HighDensity => Packing::RowSown,
            Self::Broadcast => Packing::Broadcast,
        }
    }

    /// Cell edge length in inches used when a bed does not override it.
    #[must_use]
    pub const fn default_cell_size_inches(self) -> u32 {
        match self {
            Self::SquareFoot | Self::Row | Self::Broadcast => 12,
            Self::Intensive => 6,
            Self::HighDensity => 3,
        }
    }
}

/// Fill order used when scanning a bed for free cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStrategy {
    /// Left-to-right across a row, then down to the next row.
    #[default]
    RowMajor,
    /// Top-to-bottom down a column, then across to the next column.
    ColumnMajor,
}

/// Plant attributes supplied by the reference catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantProfile {
    /// Catalog identifier of the plant.
    pub id: PlantId,
    /// Human-readable plant name.
    pub name: String,
    /// On-center spacing between plants in inches.
    pub spacing_inches: Option<f64>,
    /// Spacing between rows in inches.
    pub row_spacing_inches: Option<f64>,
    /// Spacing between plants within a row in inches.
    pub plant_spacing_inches: Option<f64>,
    /// Days from planting until the plant is harvested and frees its cell.
    pub days_to_maturity: u32,
    /// Diameter the mature plant spreads across, in inches.
    pub mature_spread_inches: Option<f64>,
    /// Seeds sown per square inch when broadcast.
    pub seeds_per_square_inch: Option<f64>,
    /// Seeds sown per linear inch of row.
    pub seeds_per_linear_inch: Option<f64>,
    /// Fraction of sown seeds expected to germinate.
    pub germination_rate: Option<f64>,
    /// Fraction of germinated seedlings expected to survive to harvest.
    pub survival_rate: Option<f64>,
}

impl PlantProfile {
    /// Creates a profile with only an on-center spacing and maturity window.
    #[must_use]
    pub fn with_spacing(
        id: PlantId,
        name: impl Into<String>,
        spacing_inches: f64,
        days_to_maturity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            spacing_inches: Some(spacing_inches),
            row_spacing_inches: None,
            plant_spacing_inches: None,
            days_to_maturity,
            mature_spread_inches: None,
            seeds_per_square_inch: None,
            seeds_per_linear_inch: None,
            germination_rate: None,
            survival_rate: None,
        }
    }

    /// Number of cells either side of a placement that the mature plant reaches.
    ///
    /// Unknown spread keeps the plant inside its own cell.
    #[must_use]
    pub fn footprint_radius(&self, cell_size_inches: u32) -> u32 {
        match self.mature_spread_inches {
            Some(spread) if spread.is_finite() && spread > 0.0 && cell_size_inches > 0 => {
                let cells = (spread / f64::from(cell_size_inches)).ceil();
                (cells.min(f64::from(u32::MAX)) as u32) / 2
            }
            _ => 0,
        }
    }

    /// Validates the numeric attributes of the profile.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("spacing_inches", self.spacing_inches),
            ("row_spacing_inches", self.row_spacing_inches),
            ("plant_spacing_inches", self.plant_spacing_inches),
            ("mature_spread_inches", self.mature_spread_inches),
            ("seeds_per_square_inch", self.seeds_per_square_inch),
            ("seeds_per_linear_inch", self.seeds_per_linear_inch),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValidationError::InvalidSpacing { field, value });
                }
            }
        }
        for (field, value) in [
            ("germination_rate", self.germination_rate),
            ("survival_rate", self.survival_rate),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 || value > 1.0 {
                    return Err(ValidationError::InvalidRate { field, value });
                }
            }
        }
        Ok(())
    }
}

/// Garden bed discretized into a grid of square cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    /// Identifier allocated to the bed.
    pub id: BedId,
    /// Human-readable bed name.
    pub name: String,
    /// Grid dimensions in cells.
    pub bounds: GridBounds,
    /// Edge length of a single cell in inches.
    pub cell_size_inches: u32,
    /// Planning method applied to the bed.
    pub method: PlanningMethod,
}

impl Bed {
    /// Derives a bed grid from physical dimensions measured in inches.
    ///
    /// Partial cells along an edge are dropped. A `cell_size_inches` of `None`
    /// uses the method's default cell size.
    pub fn from_dimensions(
        id: BedId,
        name: impl Into<String>,
        width_inches: u32,
        length_inches: u32,
        method: PlanningMethod,
        cell_size_inches: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let cell = cell_size_inches.unwrap_or_else(|| method.default_cell_size_inches());
        if cell == 0 {
            return Err(ValidationError::InvalidCellSize(cell));
        }
        let bounds = GridBounds::new(width_inches / cell, length_inches / cell);
        let bed = Self {
            id,
            name: name.into(),
            bounds,
            cell_size_inches: cell,
            method,
        };
        bed.validate()?;
        Ok(bed)
    }

    /// Validates grid dimensions and cell size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cell_size_inches == 0 {
            return Err(ValidationError::InvalidCellSize(self.cell_size_inches));
        }
        if self.bounds.is_empty() {
            return Err(ValidationError::EmptyBed(self.bounds));
        }
        Ok(())
    }
}

/// Composite key linking a record to one succession wave of a plan item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveLink {
    /// Plan item the record realizes.
    pub plan_item: PlanItemId,
    /// Zero-based succession wave index.
    pub wave: u32,
}

impl WaveLink {
    /// Creates a new link key.
    #[must_use]
    pub const fn new(plan_item: PlanItemId, wave: u32) -> Self {
        Self { plan_item, wave }
    }
}

/// Share of a plan item's quantity assigned to a specific bed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedAssignment {
    /// Bed receiving the plants.
    pub bed: BedId,
    /// Number of plants destined for the bed.
    pub quantity: u32,
}

/// Succession cadence of a plan item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Succession {
    /// Number of staggered waves; at least one.
    pub waves: u32,
    /// Days between consecutive waves.
    pub interval_days: u32,
}

impl Succession {
    /// A single planting with no staggering.
    pub const SINGLE: Succession = Succession {
        waves: 1,
        interval_days: 0,
    };
}

/// Declared planting intention, the source of truth for what should be grown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Identifier allocated to the plan item.
    pub id: PlanItemId,
    /// Plant to grow.
    pub plant: PlantId,
    /// Variety name; empty when unspecified.
    pub variety: String,
    /// Total declared quantity across every wave.
    pub quantity: u32,
    /// Succession cadence.
    pub succession: Succession,
    /// Date of the first wave.
    pub first_date: NaiveDate,
    /// Bed assignments with their per-bed quantities.
    pub beds: Vec<BedAssignment>,
}

impl PlanItem {
    /// Validates the intrinsic invariants of the plan item.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.succession.waves == 0 {
            return Err(ValidationError::ZeroWaves);
        }
        if self.succession.waves > MAX_SUCCESSION_WAVES {
            return Err(ValidationError::TooManyWaves(self.succession.waves));
        }
        let last_offset =
            u64::from(self.succession.waves - 1) * u64::from(self.succession.interval_days);
        if self.first_date.checked_add_days(Days::new(last_offset)).is_none() {
            return Err(ValidationError::DateOutOfRange);
        }
        let assigned: u64 = self.beds.iter().map(|entry| u64::from(entry.quantity)).sum();
        if assigned > u64::from(self.quantity) {
            return Err(ValidationError::AssignmentsExceedTotal {
                assigned,
                total: self.quantity,
            });
        }
        Ok(())
    }
}

/// A plant (or group of plants) physically placed in one bed cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedInstance {
    /// Identifier allocated by the ledger.
    pub id: PlacementId,
    /// Bed containing the cell.
    pub bed: BedId,
    /// Cell occupied by the placement.
    pub cell: CellCoord,
    /// Plant growing in the cell.
    pub plant: PlantId,
    /// Variety name; empty when unspecified.
    pub variety: String,
    /// Number of plants sharing the cell.
    pub quantity: u32,
    /// Date the plants went into the ground.
    pub planted: NaiveDate,
    /// Originating plan item and wave, when placed from a plan.
    pub link: Option<WaveLink>,
}

/// Bed cell recorded on an exported event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Bed containing the cell.
    pub bed: BedId,
    /// Cell within the bed.
    pub cell: CellCoord,
}

/// Calendar record produced by exporting a plan item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Identifier allocated by the ledger.
    pub id: EventId,
    /// Stable calendar uid; identical for identical link keys.
    pub uid: String,
    /// Plant to sow.
    pub plant: PlantId,
    /// Variety name; empty when unspecified.
    pub variety: String,
    /// Sowing date.
    pub start: NaiveDate,
    /// Expected harvest date.
    pub end: NaiveDate,
    /// Number of plants in the event.
    pub quantity: u32,
    /// Grid position, when the event was exported with one.
    pub position: Option<GridPosition>,
    /// Composite link key, when exported from a plan item.
    pub link: Option<WaveLink>,
}

/// Inclusive date range `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Growing window `[planted, planted + days]`; `None` past the calendar's end.
    #[must_use]
    pub fn growing(planted: NaiveDate, days: u32) -> Option<Self> {
        let end = planted.checked_add_days(Days::new(u64::from(days)))?;
        Some(Self {
            start: planted,
            end,
        })
    }

    /// First day of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Reports whether the date lies within the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the shared days of two windows, if any.
    #[must_use]
    pub fn intersection(&self, other: &DateWindow) -> Option<DateWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateWindow { start, end })
    }
}

/// Immutable view of a committed placement used for occupancy and conflicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    /// Placement backing the occupant.
    pub placement: PlacementId,
    /// Cell holding the placement.
    pub cell: CellCoord,
    /// Plant growing in the cell.
    pub plant: PlantId,
    /// Date the plants went into the ground.
    pub planted: NaiveDate,
    /// Days until the cell frees up.
    pub days_to_maturity: u32,
    /// Cells either side of `cell` the mature plant reaches.
    pub footprint_radius: u32,
}

impl Occupant {
    /// Window during which the occupant holds its cell.
    ///
    /// Windows running past the calendar's end are clamped to its last day.
    #[must_use]
    pub fn window(&self) -> DateWindow {
        DateWindow::growing(self.planted, self.days_to_maturity)
            .unwrap_or_else(|| DateWindow::new(self.planted, NaiveDate::MAX))
    }

    /// Reports whether the occupant is growing on the reference date.
    #[must_use]
    pub fn is_active_on(&self, reference: NaiveDate) -> bool {
        self.window().contains(reference)
    }
}

/// Plant count assigned to one cell of a placement batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAssignment {
    /// Target cell.
    pub cell: CellCoord,
    /// Plants placed in the cell; zero marks a cell covered by a larger plant.
    pub quantity: u32,
}

/// A confirmed placement batch submitted for persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCommit {
    /// Bed receiving the placement.
    pub bed: BedId,
    /// Plant being placed.
    pub plant: PlantId,
    /// Variety name; empty when unspecified.
    pub variety: String,
    /// Planting date shared by every cell in the batch.
    pub planted: NaiveDate,
    /// Cells and per-cell quantities, usually copied from a preview.
    pub cells: Vec<CellAssignment>,
    /// Originating plan item and wave, when placing from a plan.
    pub link: Option<WaveLink>,
    /// Persist even when the conflict detector reports overlaps.
    pub override_conflicts: bool,
}

/// Overlap between a candidate placement and an existing occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict {
    /// Existing placement that overlaps the candidate.
    pub placement: PlacementId,
    /// Cell of the existing placement.
    pub occupied_cell: CellCoord,
    /// Candidate cell closest to the existing placement.
    pub candidate_cell: CellCoord,
    /// Chebyshev distance between the two cells.
    pub distance: u32,
    /// Days during which both plantings are in the ground.
    pub overlap: DateWindow,
}

/// Commands that express all permissible ledger mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adds or replaces a bed definition.
    RegisterBed {
        /// Bed to store.
        bed: Bed,
    },
    /// Adds or replaces a plant catalog entry.
    RegisterPlant {
        /// Catalog entry to store.
        plant: PlantProfile,
    },
    /// Creates or replaces a plan item.
    UpsertPlanItem {
        /// Plan item to store.
        item: PlanItem,
    },
    /// Persists a confirmed placement batch.
    CommitPlacement {
        /// Batch to persist.
        commit: PlacementCommit,
    },
    /// Removes a committed placement.
    RemovePlacement {
        /// Placement to remove.
        placement: PlacementId,
    },
    /// Exports a plan item's waves as scheduled events.
    ExportPlanItem {
        /// Plan item to export.
        plan_item: PlanItemId,
    },
}

/// Events broadcast by the ledger after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a bed was stored.
    BedRegistered {
        /// Identifier of the stored bed.
        bed: BedId,
    },
    /// Reports that a bed definition was rejected.
    BedRejected {
        /// Identifier of the rejected bed.
        bed: BedId,
        /// Specific reason the bed was rejected.
        reason: ValidationError,
    },
    /// Confirms that a plant catalog entry was stored.
    PlantRegistered {
        /// Identifier of the stored plant.
        plant: PlantId,
    },
    /// Reports that a plant catalog entry was rejected.
    PlantRejected {
        /// Identifier of the rejected plant.
        plant: PlantId,
        /// Specific reason the entry was rejected.
        reason: ValidationError,
    },
    /// Confirms that a plan item was stored.
    PlanItemSaved {
        /// Identifier of the stored plan item.
        plan_item: PlanItemId,
    },
    /// Reports that a plan item was rejected.
    PlanItemRejected {
        /// Identifier of the rejected plan item.
        plan_item: PlanItemId,
        /// Specific reason the plan item was rejected.
        reason: ValidationError,
    },
    /// Confirms that every cell of a placement batch was persisted.
    PlacementCommitted {
        /// Bed that received the batch.
        bed: BedId,
        /// Identifiers allocated to the new placements, in batch order.
        placements: Vec<PlacementId>,
        /// Cells whose quantity exceeds the plant's spacing capacity.
        over_capacity: Vec<CellCoord>,
    },
    /// Reports overlaps that must be overridden before the batch persists.
    PlacementConflictsPending {
        /// Bed targeted by the batch.
        bed: BedId,
        /// Overlapping occupants in placement order.
        conflicts: Vec<Conflict>,
    },
    /// Reports that a placement batch was rejected without writing anything.
    PlacementRejected {
        /// Bed targeted by the batch.
        bed: BedId,
        /// Specific reason the batch failed.
        reason: CommitError,
    },
    /// Confirms that a placement was removed.
    PlacementRemoved {
        /// Identifier of the removed placement.
        placement: PlacementId,
    },
    /// Reports that a removal targeted an unknown placement.
    PlacementRemovalRejected {
        /// Identifier that matched no placement.
        placement: PlacementId,
    },
    /// Confirms an export; `events_created` is zero when already exported.
    ScheduleExported {
        /// Plan item that was exported.
        plan_item: PlanItemId,
        /// Number of new scheduled events.
        events_created: u32,
    },
    /// Reports that an export failed.
    ExportRejected {
        /// Plan item targeted by the export.
        plan_item: PlanItemId,
        /// Specific reason the export failed.
        reason: ExportError,
    },
}

/// Malformed input rejected before any search or write executes.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    /// A spacing or density attribute was negative, NaN or infinite.
    #[error("{field} must be a finite, non-negative number of inches (got {value})")]
    InvalidSpacing {
        /// Attribute that failed validation.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A germination or survival rate fell outside `(0, 1]`.
    #[error("{field} must lie in (0, 1] (got {value})")]
    InvalidRate {
        /// Attribute that failed validation.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The cell size was zero.
    #[error("cell size must be positive (got {0} inches)")]
    InvalidCellSize(u32),
    /// The bed grid holds no cells.
    #[error("bed grid {0} contains no cells")]
    EmptyBed(GridBounds),
    /// A coordinate fell outside the bed grid.
    #[error("cell {cell} lies outside the {bounds} grid")]
    CellOutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Bounds of the bed.
        bounds: GridBounds,
    },
    /// A row constraint asked for zero rows.
    #[error("row constraint must span at least one row")]
    ZeroRowConstraint,
    /// A succession asked for zero waves.
    #[error("succession wave count must be at least 1")]
    ZeroWaves,
    /// A succession asked for more waves than a plan item may hold.
    #[error("succession wave count {0} exceeds the limit of {max}", max = MAX_SUCCESSION_WAVES)]
    TooManyWaves(u32),
    /// A computed date fell outside the supported calendar.
    #[error("succession dates exceed the supported calendar range")]
    DateOutOfRange,
    /// A record referenced a bed the ledger does not know.
    #[error("bed {0} does not exist")]
    UnknownBed(BedId),
    /// A record referenced a plant missing from the catalog.
    #[error("plant {0} does not exist in the catalog")]
    UnknownPlant(PlantId),
    /// Per-bed quantities add up to more than the declared total.
    #[error("bed assignments total {assigned} plants but only {total} are declared")]
    AssignmentsExceedTotal {
        /// Sum of per-bed quantities.
        assigned: u64,
        /// Declared plan item quantity.
        total: u32,
    },
}

/// Reasons a placement batch is rejected as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The batch named a bed the ledger does not know.
    #[error("bed {0} does not exist")]
    UnknownBed(BedId),
    /// The batch named a plant missing from the catalog.
    #[error("plant {0} does not exist in the catalog")]
    UnknownPlant(PlantId),
    /// The batch linked to a plan item the ledger does not know.
    #[error("plan item {0} does not exist")]
    UnknownPlanItem(PlanItemId),
    /// The batch linked to a wave beyond the plan item's succession.
    #[error("plan item {plan_item} has no wave {wave}")]
    UnknownWave {
        /// Linked plan item.
        plan_item: PlanItemId,
        /// Wave index that does not exist.
        wave: u32,
    },
    /// The batch contained no cells.
    #[error("placement batch contains no cells")]
    EmptyBatch,
    /// A cell fell outside the bed grid.
    #[error("cell {cell} lies outside the {bounds} grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Bounds of the bed.
        bounds: GridBounds,
    },
    /// The same cell appeared twice in one batch.
    #[error("cell {0} appears more than once in the batch")]
    DuplicateCell(CellCoord),
    /// Another placement already holds the cell for the same planting date.
    #[error("cell {cell} already holds placement {existing} planted on {planted}")]
    CellTaken {
        /// Contested cell.
        cell: CellCoord,
        /// Placement that won the cell.
        existing: PlacementId,
        /// Planting date shared by both writes.
        planted: NaiveDate,
    },
}

/// Reasons an export cannot run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExportError {
    /// The plan item does not exist.
    #[error("plan item {0} does not exist")]
    UnknownPlanItem(PlanItemId),
    /// The plan item's plant is missing from the catalog.
    #[error("plant {0} does not exist in the catalog")]
    UnknownPlant(PlantId),
    /// The plan item failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
