#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative garden ledger holding the plan, placement and schedule stores.
//!
//! All mutations flow through [`apply`], which validates a [`Command`] before
//! touching any store and reports the outcome as [`Event`] values. Batches are
//! all-or-nothing: a placement commit either persists every requested cell or
//! none of them. Read access goes through the [`query`] module.

use std::collections::{BTreeMap, BTreeSet};

use garden_planner_core::{
    Bed, BedId, CellCoord, Command, CommitError, Conflict, Event, EventId, ExportError,
    PlacedInstance, PlacementCommit, PlacementId, PlanItem, PlanItemId, PlantId, PlantProfile,
    ScheduledEvent, ValidationError,
};
use garden_planner_system_conflicts::{Candidate, ConflictDetector};
use garden_planner_system_density::capacity_of;

mod export;
pub mod snapshot;

pub use export::{event_uid, ExportSummary};
pub use snapshot::{GardenSnapshot, RestoreError};

/// Represents the authoritative garden state.
#[derive(Debug, Default)]
pub struct Garden {
    beds: BTreeMap<BedId, Bed>,
    plants: BTreeMap<PlantId, PlantProfile>,
    plan_items: BTreeMap<PlanItemId, PlanItem>,
    placements: BTreeMap<PlacementId, PlacedInstance>,
    events: BTreeMap<EventId, ScheduledEvent>,
    next_placement_id: u32,
    next_event_id: u32,
    detector: ConflictDetector,
}

/// Outcome of a placement commit that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every cell was persisted.
    Committed {
        /// Identifiers allocated to the new placements, in batch order.
        placements: Vec<PlacementId>,
        /// Cells whose quantity exceeds the plant's spacing capacity.
        over_capacity: Vec<CellCoord>,
    },
    /// Nothing was written; the overlaps must be overridden first.
    ConflictsPending {
        /// Overlapping occupants in placement order.
        conflicts: Vec<Conflict>,
    },
}

impl Garden {
    /// Creates an empty garden ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_placement_id(&mut self) -> PlacementId {
        let id = PlacementId::new(self.next_placement_id);
        self.next_placement_id = self.next_placement_id.saturating_add(1);
        id
    }

    fn allocate_event_id(&mut self) -> EventId {
        let id = EventId::new(self.next_event_id);
        self.next_event_id = self.next_event_id.saturating_add(1);
        id
    }

    fn register_bed(&mut self, bed: Bed) -> Result<(), ValidationError> {
        bed.validate()?;
        if let Some(stray) = self
            .placements
            .values()
            .find(|placement| placement.bed == bed.id && !bed.bounds.contains(placement.cell))
        {
            return Err(ValidationError::CellOutOfBounds {
                cell: stray.cell,
                bounds: bed.bounds,
            });
        }
        let _ = self.beds.insert(bed.id, bed);
        Ok(())
    }

    fn register_plant(&mut self, plant: PlantProfile) -> Result<(), ValidationError> {
        plant.validate()?;
        let _ = self.plants.insert(plant.id, plant);
        Ok(())
    }

    fn upsert_plan_item(&mut self, item: PlanItem) -> Result<(), ValidationError> {
        item.validate()?;
        if !self.plants.contains_key(&item.plant) {
            return Err(ValidationError::UnknownPlant(item.plant));
        }
        if let Some(missing) = item
            .beds
            .iter()
            .find(|assignment| !self.beds.contains_key(&assignment.bed))
        {
            return Err(ValidationError::UnknownBed(missing.bed));
        }
        let _ = self.plan_items.insert(item.id, item);
        Ok(())
    }

    /// Validates and persists a placement batch.
    ///
    /// Nothing is written unless every cell passes validation and any
    /// conflicts were explicitly overridden.
    pub fn commit_placement(
        &mut self,
        commit: PlacementCommit,
    ) -> Result<CommitOutcome, CommitError> {
        let bed = self
            .beds
            .get(&commit.bed)
            .ok_or(CommitError::UnknownBed(commit.bed))?;
        let plant = self
            .plants
            .get(&commit.plant)
            .ok_or(CommitError::UnknownPlant(commit.plant))?;

        if let Some(link) = commit.link {
            let item = self
                .plan_items
                .get(&link.plan_item)
                .ok_or(CommitError::UnknownPlanItem(link.plan_item))?;
            if link.wave >= item.succession.waves {
                return Err(CommitError::UnknownWave {
                    plan_item: link.plan_item,
                    wave: link.wave,
                });
            }
        }

        if commit.cells.is_empty() {
            return Err(CommitError::EmptyBatch);
        }

        let mut seen = BTreeSet::new();
        for assignment in &commit.cells {
            if !bed.bounds.contains(assignment.cell) {
                return Err(CommitError::OutOfBounds {
                    cell: assignment.cell,
                    bounds: bed.bounds,
                });
            }
            if !seen.insert(assignment.cell) {
                return Err(CommitError::DuplicateCell(assignment.cell));
            }
        }

        if let Some(existing) = self.placements.values().find(|placement| {
            placement.bed == commit.bed
                && placement.planted == commit.planted
                && seen.contains(&placement.cell)
        }) {
            return Err(CommitError::CellTaken {
                cell: existing.cell,
                existing: existing.id,
                planted: existing.planted,
            });
        }

        let cells: Vec<CellCoord> = commit.cells.iter().map(|assignment| assignment.cell).collect();
        let candidate = Candidate {
            cells: &cells,
            planted: commit.planted,
            days_to_maturity: plant.days_to_maturity,
            footprint_radius: plant.footprint_radius(bed.cell_size_inches),
        };
        let occupants = query::occupants(self, commit.bed);
        let mut conflicts = Vec::new();
        self.detector.detect(&candidate, &occupants, &mut conflicts);

        if !conflicts.is_empty() {
            if !commit.override_conflicts {
                tracing::warn!(
                    bed = %commit.bed,
                    conflicts = conflicts.len(),
                    "placement held back pending conflict override"
                );
                return Ok(CommitOutcome::ConflictsPending { conflicts });
            }
            tracing::warn!(
                bed = %commit.bed,
                conflicts = conflicts.len(),
                "placement committed over acknowledged conflicts"
            );
        }

        let over_capacity: Vec<CellCoord> =
            match capacity_of(plant, bed.method, bed.cell_size_inches) {
                Ok(capacity) => commit
                    .cells
                    .iter()
                    .filter(|assignment| assignment.quantity > capacity.cell_limit())
                    .map(|assignment| assignment.cell)
                    .collect(),
                Err(_) => Vec::new(),
            };
        if !over_capacity.is_empty() {
            tracing::warn!(
                bed = %commit.bed,
                cells = over_capacity.len(),
                "cells hold more plants than their spacing allows"
            );
        }

        let mut placements = Vec::with_capacity(commit.cells.len());
        for assignment in &commit.cells {
            let id = self.allocate_placement_id();
            let _ = self.placements.insert(
                id,
                PlacedInstance {
                    id,
                    bed: commit.bed,
                    cell: assignment.cell,
                    plant: commit.plant,
                    variety: commit.variety.clone(),
                    quantity: assignment.quantity,
                    planted: commit.planted,
                    link: commit.link,
                },
            );
            placements.push(id);
        }

        tracing::info!(
            bed = %commit.bed,
            cells = placements.len(),
            planted = %commit.planted,
            "placement committed"
        );
        Ok(CommitOutcome::Committed {
            placements,
            over_capacity,
        })
    }

    /// Exports a plan item's waves, creating only events that do not exist yet.
    pub fn export_plan_item(
        &mut self,
        plan_item: PlanItemId,
    ) -> Result<ExportSummary, ExportError> {
        export::export_plan_item(self, plan_item)
    }
}

/// Exports a plan item to the schedule; repeated calls create no new events.
pub fn export_to_schedule(
    garden: &mut Garden,
    plan_item: PlanItemId,
) -> Result<ExportSummary, ExportError> {
    garden.export_plan_item(plan_item)
}

/// Applies the provided command to the garden, reporting the outcome as events.
pub fn apply(garden: &mut Garden, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterBed { bed } => {
            let id = bed.id;
            match garden.register_bed(bed) {
                Ok(()) => out_events.push(Event::BedRegistered { bed: id }),
                Err(reason) => out_events.push(Event::BedRejected { bed: id, reason }),
            }
        }
        Command::RegisterPlant { plant } => {
            let id = plant.id;
            match garden.register_plant(plant) {
                Ok(()) => out_events.push(Event::PlantRegistered { plant: id }),
                Err(reason) => out_events.push(Event::PlantRejected { plant: id, reason }),
            }
        }
        Command::UpsertPlanItem { item } => {
            let id = item.id;
            match garden.upsert_plan_item(item) {
                Ok(()) => out_events.push(Event::PlanItemSaved { plan_item: id }),
                Err(reason) => out_events.push(Event::PlanItemRejected {
                    plan_item: id,
                    reason,
                }),
            }
        }
        Command::CommitPlacement { commit } => {
            let bed = commit.bed;
            match garden.commit_placement(commit) {
                Ok(CommitOutcome::Committed {
                    placements,
                    over_capacity,
                }) => out_events.push(Event::PlacementCommitted {
                    bed,
                    placements,
                    over_capacity,
                }),
                Ok(CommitOutcome::ConflictsPending { conflicts }) => {
                    out_events.push(Event::PlacementConflictsPending { bed, conflicts })
                }
                Err(reason) => {
                    tracing::warn!(bed = %bed, %reason, "placement rejected");
                    out_events.push(Event::PlacementRejected { bed, reason });
                }
            }
        }
        Command::RemovePlacement { placement } => {
            if garden.placements.remove(&placement).is_some() {
                out_events.push(Event::PlacementRemoved { placement });
            } else {
                out_events.push(Event::PlacementRemovalRejected { placement });
            }
        }
        Command::ExportPlanItem { plan_item } => match garden.export_plan_item(plan_item) {
            Ok(summary) => out_events.push(Event::ScheduleExported {
                plan_item,
                events_created: summary.events_created,
            }),
            Err(reason) => out_events.push(Event::ExportRejected { plan_item, reason }),
        },
    }
}

/// Query functions that provide read-only access to the garden state.
pub mod query {
    use garden_planner_core::{
        Bed, BedId, Occupant, PlacedInstance, PlanItem, PlanItemId, PlantId, PlantProfile,
        ScheduledEvent,
    };

    use super::{Garden, GardenSnapshot};

    /// Looks up a bed by identifier.
    #[must_use]
    pub fn bed(garden: &Garden, id: BedId) -> Option<&Bed> {
        garden.beds.get(&id)
    }

    /// Iterates every bed in identifier order.
    pub fn beds(garden: &Garden) -> impl Iterator<Item = &Bed> {
        garden.beds.values()
    }

    /// Looks up a plant catalog entry by identifier.
    #[must_use]
    pub fn plant(garden: &Garden, id: PlantId) -> Option<&PlantProfile> {
        garden.plants.get(&id)
    }

    /// Looks up a plan item by identifier.
    #[must_use]
    pub fn plan_item(garden: &Garden, id: PlanItemId) -> Option<&PlanItem> {
        garden.plan_items.get(&id)
    }

    /// Iterates every plan item in identifier order.
    pub fn plan_items(garden: &Garden) -> impl Iterator<Item = &PlanItem> {
        garden.plan_items.values()
    }

    /// Every placement in identifier order.
    #[must_use]
    pub fn placements(garden: &Garden) -> Vec<PlacedInstance> {
        garden.placements.values().cloned().collect()
    }

    /// Placements inside one bed, in identifier order.
    #[must_use]
    pub fn placements_in_bed(garden: &Garden, bed: BedId) -> Vec<PlacedInstance> {
        garden
            .placements
            .values()
            .filter(|placement| placement.bed == bed)
            .cloned()
            .collect()
    }

    /// Every scheduled event in identifier order.
    #[must_use]
    pub fn scheduled_events(garden: &Garden) -> Vec<ScheduledEvent> {
        garden.events.values().cloned().collect()
    }

    /// Scheduled events carrying a link key for the plan item.
    #[must_use]
    pub fn events_for_plan_item(garden: &Garden, plan_item: PlanItemId) -> Vec<ScheduledEvent> {
        garden
            .events
            .values()
            .filter(|event| event.link.is_some_and(|link| link.plan_item == plan_item))
            .cloned()
            .collect()
    }

    /// Occupants of a bed for occupancy and conflict checks.
    ///
    /// Placements whose plant left the catalog hold their cell for the
    /// planting day only.
    #[must_use]
    pub fn occupants(garden: &Garden, bed: BedId) -> Vec<Occupant> {
        let cell_size = garden
            .beds
            .get(&bed)
            .map_or(0, |bed| bed.cell_size_inches);
        garden
            .placements
            .values()
            .filter(|placement| placement.bed == bed)
            .map(|placement| {
                let plant = garden.plants.get(&placement.plant);
                Occupant {
                    placement: placement.id,
                    cell: placement.cell,
                    plant: placement.plant,
                    planted: placement.planted,
                    days_to_maturity: plant.map_or(0, |plant| plant.days_to_maturity),
                    footprint_radius: plant.map_or(0, |plant| plant.footprint_radius(cell_size)),
                }
            })
            .collect()
    }

    /// Captures a serializable copy of every store.
    #[must_use]
    pub fn snapshot(garden: &Garden) -> GardenSnapshot {
        GardenSnapshot {
            beds: garden.beds.values().cloned().collect(),
            plants: garden.plants.values().cloned().collect(),
            plan_items: garden.plan_items.values().cloned().collect(),
            placements: garden.placements.values().cloned().collect(),
            events: garden.events.values().cloned().collect(),
        }
    }
}
