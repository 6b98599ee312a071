//! Serializable copy of the ledger used to persist and reload a garden.

use std::collections::{BTreeMap, BTreeSet};

use garden_planner_core::{
    Bed, BedId, EventId, PlacedInstance, PlacementId, PlanItem, PlanItemId, PlantId,
    PlantProfile, ScheduledEvent, ValidationError, WaveLink,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Garden;

/// Every store of a garden in identifier order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    /// Registered beds.
    #[serde(default)]
    pub beds: Vec<Bed>,
    /// Plant catalog.
    #[serde(default)]
    pub plants: Vec<PlantProfile>,
    /// Declared plan items.
    #[serde(default)]
    pub plan_items: Vec<PlanItem>,
    /// Committed placements.
    #[serde(default)]
    pub placements: Vec<PlacedInstance>,
    /// Exported scheduled events.
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
}

/// Reasons a snapshot cannot be loaded into a garden.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Two beds share an identifier.
    #[error("bed {0} appears more than once")]
    DuplicateBed(BedId),
    /// Two plants share an identifier.
    #[error("plant {0} appears more than once")]
    DuplicatePlant(PlantId),
    /// Two plan items share an identifier.
    #[error("plan item {0} appears more than once")]
    DuplicatePlanItem(PlanItemId),
    /// Two placements share an identifier.
    #[error("placement {0} appears more than once")]
    DuplicatePlacement(PlacementId),
    /// Two scheduled events share an identifier.
    #[error("scheduled event {0} appears more than once")]
    DuplicateEvent(EventId),
    /// Two scheduled events carry the same link key.
    #[error("plan item {} wave {} was exported twice", .0.plan_item, .0.wave)]
    DuplicateExport(WaveLink),
    /// Two placements hold the same cell for the same planting date.
    #[error("placements {first} and {second} share a cell and planting date")]
    CellCollision {
        /// Lower placement identifier.
        first: PlacementId,
        /// Higher placement identifier.
        second: PlacementId,
    },
    /// A placement references a bed missing from the snapshot.
    #[error("placement {placement} references missing bed {bed}")]
    MissingBed {
        /// Offending placement.
        placement: PlacementId,
        /// Bed that does not exist.
        bed: BedId,
    },
    /// A placement links to a plan item or wave that does not exist.
    #[error(
        "placement {placement} links to missing plan item {} wave {}",
        .link.plan_item,
        .link.wave
    )]
    UnknownLink {
        /// Offending placement.
        placement: PlacementId,
        /// Link key with no matching plan item wave.
        link: WaveLink,
    },
    /// A record failed validation.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}

impl Garden {
    /// Rebuilds a garden from a snapshot, re-validating every record.
    ///
    /// Identifier allocation resumes after the highest stored identifier.
    pub fn restore(snapshot: GardenSnapshot) -> Result<Garden, RestoreError> {
        let mut garden = Garden::new();

        for bed in snapshot.beds {
            bed.validate()?;
            let id = bed.id;
            if garden.beds.insert(id, bed).is_some() {
                return Err(RestoreError::DuplicateBed(id));
            }
        }

        for plant in snapshot.plants {
            plant.validate()?;
            let id = plant.id;
            if garden.plants.insert(id, plant).is_some() {
                return Err(RestoreError::DuplicatePlant(id));
            }
        }

        for item in snapshot.plan_items {
            let id = item.id;
            if garden.plan_items.contains_key(&id) {
                return Err(RestoreError::DuplicatePlanItem(id));
            }
            garden.upsert_plan_item(item)?;
        }

        let mut owners = BTreeMap::new();
        for placement in snapshot.placements {
            if garden.placements.contains_key(&placement.id) {
                return Err(RestoreError::DuplicatePlacement(placement.id));
            }
            let bed = garden
                .beds
                .get(&placement.bed)
                .ok_or(RestoreError::MissingBed {
                    placement: placement.id,
                    bed: placement.bed,
                })?;
            if let Some(link) = placement.link {
                let known = garden
                    .plan_items
                    .get(&link.plan_item)
                    .is_some_and(|item| link.wave < item.succession.waves);
                if !known {
                    return Err(RestoreError::UnknownLink {
                        placement: placement.id,
                        link,
                    });
                }
            }
            if !bed.bounds.contains(placement.cell) {
                return Err(ValidationError::CellOutOfBounds {
                    cell: placement.cell,
                    bounds: bed.bounds,
                }
                .into());
            }
            let key = (placement.bed, placement.cell, placement.planted);
            if let Some(first) = owners.insert(key, placement.id) {
                return Err(RestoreError::CellCollision {
                    first: first.min(placement.id),
                    second: first.max(placement.id),
                });
            }
            let _ = garden.placements.insert(placement.id, placement);
        }

        let mut exported = BTreeSet::new();
        for event in snapshot.events {
            if let Some(link) = event.link {
                if !exported.insert(link) {
                    return Err(RestoreError::DuplicateExport(link));
                }
            }
            let id = event.id;
            if garden.events.insert(id, event).is_some() {
                return Err(RestoreError::DuplicateEvent(id));
            }
        }

        garden.next_placement_id = garden
            .placements
            .keys()
            .next_back()
            .map_or(0, |id| id.get().saturating_add(1));
        garden.next_event_id = garden
            .events
            .keys()
            .next_back()
            .map_or(0, |id| id.get().saturating_add(1));

        tracing::debug!(
            beds = garden.beds.len(),
            plan_items = garden.plan_items.len(),
            placements = garden.placements.len(),
            events = garden.events.len(),
            "garden restored"
        );
        Ok(garden)
    }
}
