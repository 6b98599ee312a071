use chrono::{Days, NaiveDate};
use garden_planner_core::{
    ExportError, GridPosition, PlanItemId, ScheduledEvent, ValidationError, WaveLink,
};
use garden_planner_system_succession::succession_breakdown;
use sha2::{Digest, Sha256};

use crate::Garden;

const UID_DOMAIN: &[u8] = b"garden-planner:scheduled-event:v1";

/// Result of exporting one plan item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    /// Plan item that was exported.
    pub plan_item: PlanItemId,
    /// Events created by this call; zero when every wave was already exported.
    pub events_created: u32,
}

/// Stable calendar uid for a link key.
///
/// Exporting the same wave twice always yields the same uid, so external
/// calendars can deduplicate on it.
#[must_use]
pub fn event_uid(link: WaveLink) -> String {
    let mut hasher = Sha256::new();
    hasher.update(UID_DOMAIN);
    hasher.update(link.plan_item.get().to_le_bytes());
    hasher.update(link.wave.to_le_bytes());
    hex::encode(hasher.finalize())
}

struct PendingEvent {
    link: WaveLink,
    start: NaiveDate,
    end: NaiveDate,
    quantity: u32,
    position: Option<GridPosition>,
}

pub(crate) fn export_plan_item(
    garden: &mut Garden,
    plan_item: PlanItemId,
) -> Result<ExportSummary, ExportError> {
    let item = garden
        .plan_items
        .get(&plan_item)
        .ok_or(ExportError::UnknownPlanItem(plan_item))?;
    let plant = garden
        .plants
        .get(&item.plant)
        .ok_or(ExportError::UnknownPlant(item.plant))?;
    let waves = succession_breakdown(item)?;

    let mut pending = Vec::new();
    for wave in waves.into_iter().filter(|wave| wave.quantity > 0) {
        let link = WaveLink::new(plan_item, wave.index);
        let exported = garden.events.values().any(|event| event.link == Some(link));
        if exported {
            continue;
        }
        let end = wave
            .date
            .checked_add_days(Days::new(u64::from(plant.days_to_maturity)))
            .ok_or(ValidationError::DateOutOfRange)?;
        let position = garden
            .placements
            .values()
            .find(|placement| placement.link == Some(link))
            .map(|placement| GridPosition {
                bed: placement.bed,
                cell: placement.cell,
            });
        pending.push(PendingEvent {
            link,
            start: wave.date,
            end,
            quantity: wave.quantity,
            position,
        });
    }

    let plant_id = item.plant;
    let variety = item.variety.clone();
    let mut events_created = 0;
    for event in pending {
        let id = garden.allocate_event_id();
        let _ = garden.events.insert(
            id,
            ScheduledEvent {
                id,
                uid: event_uid(event.link),
                plant: plant_id,
                variety: variety.clone(),
                start: event.start,
                end: event.end,
                quantity: event.quantity,
                position: event.position,
                link: Some(event.link),
            },
        );
        events_created += 1;
    }

    if events_created == 0 {
        tracing::debug!(plan_item = %plan_item, "plan item already exported");
    } else {
        tracing::info!(plan_item = %plan_item, events_created, "plan item exported");
    }
    Ok(ExportSummary {
        plan_item,
        events_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_is_stable_and_distinct_per_wave() {
        let first = WaveLink::new(PlanItemId::new(4), 0);
        let second = WaveLink::new(PlanItemId::new(4), 1);
        assert_eq!(event_uid(first), event_uid(first));
        assert_ne!(event_uid(first), event_uid(second));
        assert_eq!(event_uid(first).len(), 64);
    }
}
