#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure reconciliation of a plan item against placements and scheduled events.
//!
//! The three stores (declared plan, physical placements, exported schedule)
//! are linked loosely: records may carry an explicit `(plan item, wave)` key,
//! or only the plant, variety and a date. Each store is matched through an
//! ordered chain of [`Matcher`] strategies and the first strategy that yields
//! any match wins for that store. The per-wave counts then collapse into one
//! [`WaveStatus`] by precedence.

use chrono::NaiveDate;
use garden_planner_core::{
    PlacedInstance, PlanItem, PlantId, ScheduledEvent, ValidationError, WaveLink,
    DEFAULT_MATCH_TOLERANCE_DAYS,
};
use garden_planner_system_succession::{succession_breakdown, Wave};

/// Strategy used to attribute records to succession waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Matcher {
    /// Records carrying the plan item's composite link key.
    ExplicitLink,
    /// Unlinked records with the same plant and variety dated within `days`
    /// of a wave date.
    AttributeTolerance {
        /// Days either side of the wave date that still match.
        days: u32,
    },
    /// Unlinked same-plant records poured into waves in ascending order,
    /// capped at each wave's declared quantity. Attribution may pick the wrong
    /// wave when records carry no usable date.
    UndatedBulk,
}

/// Ordered matcher chain applied to every store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Matchers tried in order until one yields matches.
    pub matchers: Vec<Matcher>,
}

impl ReconcileOptions {
    /// Default chain with a custom date tolerance.
    #[must_use]
    pub fn with_tolerance(days: u32) -> Self {
        Self {
            matchers: vec![
                Matcher::ExplicitLink,
                Matcher::AttributeTolerance { days },
                Matcher::UndatedBulk,
            ],
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::with_tolerance(DEFAULT_MATCH_TOLERANCE_DAYS)
    }
}

/// Realization state of one wave, in ascending precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WaveStatus {
    /// Only declared in the plan.
    Planned,
    /// Exported to the calendar without a grid position.
    Scheduled,
    /// Exported to the calendar with a grid position.
    Positioned,
    /// Physically placed in a bed.
    Placed,
}

impl WaveStatus {
    /// Lower-case label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Scheduled => "scheduled",
            Self::Positioned => "positioned",
            Self::Placed => "placed",
        }
    }
}

/// Record store reconciled independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Store {
    /// Physical placements.
    Placements,
    /// Scheduled events exported with a grid position.
    PositionedEvents,
    /// Scheduled events exported without a grid position.
    UnpositionedEvents,
}

/// Reconciled state of a single succession wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveReconciliation {
    /// Zero-based wave index.
    pub wave_index: u32,
    /// Sowing date of the wave.
    pub date: NaiveDate,
    /// Quantity declared for the wave.
    pub declared: u32,
    /// Status chosen by precedence.
    pub status: WaveStatus,
    /// Plants matched from placements.
    pub placed_count: u32,
    /// Plants matched from events exported with a position.
    pub positioned_count: u32,
    /// Plants matched from events exported without a position.
    pub scheduled_count: u32,
    /// Count backing `status`, capped at `declared`.
    pub realized: u32,
}

/// Totals across every wave of a reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    /// Declared plan item quantity.
    pub declared: u32,
    /// Sum of realized quantities.
    pub realized: u32,
    /// Waves whose status is [`WaveStatus::Placed`].
    pub placed_waves: u32,
    /// Waves whose status is [`WaveStatus::Positioned`].
    pub positioned_waves: u32,
    /// Waves whose status is [`WaveStatus::Scheduled`].
    pub scheduled_waves: u32,
    /// Waves whose status is [`WaveStatus::Planned`].
    pub planned_waves: u32,
}

/// Per-wave reconciliation plus the matcher each store resolved with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    waves: Vec<WaveReconciliation>,
    matched_by: [(Store, Option<Matcher>); 3],
}

impl Reconciliation {
    /// Reconciled waves in ascending wave order.
    #[must_use]
    pub fn waves(&self) -> &[WaveReconciliation] {
        &self.waves
    }

    /// Matcher that produced the store's matches, if any matched.
    #[must_use]
    pub fn matched_by(&self, store: Store) -> Option<Matcher> {
        self.matched_by
            .iter()
            .find(|(candidate, _)| *candidate == store)
            .and_then(|(_, matcher)| *matcher)
    }

    /// Reports whether any store fell back to undated bulk attribution.
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.matched_by
            .iter()
            .any(|(_, matcher)| *matcher == Some(Matcher::UndatedBulk))
    }

    /// Totals across every wave.
    #[must_use]
    pub fn summary(&self) -> ReconciliationSummary {
        let mut summary = ReconciliationSummary::default();
        for wave in &self.waves {
            summary.declared = summary.declared.saturating_add(wave.declared);
            summary.realized = summary.realized.saturating_add(wave.realized);
            let bucket = match wave.status {
                WaveStatus::Placed => &mut summary.placed_waves,
                WaveStatus::Positioned => &mut summary.positioned_waves,
                WaveStatus::Scheduled => &mut summary.scheduled_waves,
                WaveStatus::Planned => &mut summary.planned_waves,
            };
            *bucket += 1;
        }
        summary
    }
}

/// Evidence distilled from a placement or event for matching.
#[derive(Clone, Debug)]
struct Evidence<'a> {
    link: Option<WaveLink>,
    plant: PlantId,
    variety: &'a str,
    date: NaiveDate,
    quantity: u32,
}

/// Reconciler that reuses evidence buffers between calls.
#[derive(Debug, Default)]
pub struct Reconciler<'a> {
    placed: Vec<Evidence<'a>>,
    positioned: Vec<Evidence<'a>>,
    unpositioned: Vec<Evidence<'a>>,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles a plan item against the provided stores.
    pub fn reconcile(
        &mut self,
        item: &PlanItem,
        placements: &'a [PlacedInstance],
        events: &'a [ScheduledEvent],
        options: &ReconcileOptions,
    ) -> Result<Reconciliation, ValidationError> {
        let waves = succession_breakdown(item)?;

        self.placed.clear();
        self.placed
            .extend(placements.iter().map(|placement| Evidence {
                link: placement.link,
                plant: placement.plant,
                variety: &placement.variety,
                date: placement.planted,
                quantity: placement.quantity,
            }));

        self.positioned.clear();
        self.unpositioned.clear();
        for event in events {
            let evidence = Evidence {
                link: event.link,
                plant: event.plant,
                variety: &event.variety,
                date: event.start,
                quantity: event.quantity,
            };
            if event.position.is_some() {
                self.positioned.push(evidence);
            } else {
                self.unpositioned.push(evidence);
            }
        }

        let (placed, placed_by) = match_store(item, &waves, &self.placed, options);
        let (positioned, positioned_by) = match_store(item, &waves, &self.positioned, options);
        let (scheduled, scheduled_by) = match_store(item, &waves, &self.unpositioned, options);

        for (store, matcher) in [
            (Store::Placements, placed_by),
            (Store::PositionedEvents, positioned_by),
            (Store::UnpositionedEvents, scheduled_by),
        ] {
            match matcher {
                Some(Matcher::UndatedBulk) => tracing::info!(
                    plan_item = %item.id,
                    ?store,
                    "attributed undated records to waves in ascending order"
                ),
                Some(matcher) => {
                    tracing::debug!(plan_item = %item.id, ?store, ?matcher, "store matched")
                }
                None => {}
            }
        }

        let reconciled = waves
            .iter()
            .enumerate()
            .map(|(slot, wave)| {
                wave_result(wave, placed[slot], positioned[slot], scheduled[slot])
            })
            .collect();

        Ok(Reconciliation {
            waves: reconciled,
            matched_by: [
                (Store::Placements, placed_by),
                (Store::PositionedEvents, positioned_by),
                (Store::UnpositionedEvents, scheduled_by),
            ],
        })
    }
}

/// Reconciles with the default matcher chain and a seven-day tolerance.
pub fn reconcile(
    item: &PlanItem,
    placements: &[PlacedInstance],
    events: &[ScheduledEvent],
) -> Result<Reconciliation, ValidationError> {
    reconcile_with(item, placements, events, &ReconcileOptions::default())
}

/// Reconciles with a caller-provided matcher chain.
pub fn reconcile_with(
    item: &PlanItem,
    placements: &[PlacedInstance],
    events: &[ScheduledEvent],
    options: &ReconcileOptions,
) -> Result<Reconciliation, ValidationError> {
    Reconciler::new().reconcile(item, placements, events, options)
}

fn wave_result(wave: &Wave, placed: u32, positioned: u32, scheduled: u32) -> WaveReconciliation {
    let (status, backing) = if placed > 0 {
        (WaveStatus::Placed, placed)
    } else if positioned > 0 {
        (WaveStatus::Positioned, positioned)
    } else if scheduled > 0 {
        (WaveStatus::Scheduled, scheduled)
    } else {
        (WaveStatus::Planned, 0)
    };

    WaveReconciliation {
        wave_index: wave.index,
        date: wave.date,
        declared: wave.quantity,
        status,
        placed_count: placed,
        positioned_count: positioned,
        scheduled_count: scheduled,
        realized: backing.min(wave.quantity),
    }
}

/// Runs the matcher chain over one store, returning per-wave counts.
fn match_store(
    item: &PlanItem,
    waves: &[Wave],
    records: &[Evidence<'_>],
    options: &ReconcileOptions,
) -> (Vec<u32>, Option<Matcher>) {
    let mut counts = vec![0u32; waves.len()];
    for matcher in &options.matchers {
        if apply_matcher(*matcher, item, waves, records, &mut counts) {
            return (counts, Some(*matcher));
        }
        counts.iter_mut().for_each(|count| *count = 0);
    }
    (counts, None)
}

/// Applies one matcher; returns whether it matched any record.
fn apply_matcher(
    matcher: Matcher,
    item: &PlanItem,
    waves: &[Wave],
    records: &[Evidence<'_>],
    counts: &mut [u32],
) -> bool {
    match matcher {
        Matcher::ExplicitLink => {
            let mut matched = false;
            for record in records {
                let Some(link) = record.link else {
                    continue;
                };
                if link.plan_item != item.id {
                    continue;
                }
                let Some(slot) = counts.get_mut(link.wave as usize) else {
                    continue;
                };
                *slot = slot.saturating_add(record.quantity);
                matched = true;
            }
            matched
        }
        Matcher::AttributeTolerance { days } => {
            let mut matched = false;
            for record in records.iter().filter(|record| is_unlinked_match(item, record)) {
                if let Some(slot) = nearest_wave(waves, record.date, days) {
                    counts[slot] = counts[slot].saturating_add(record.quantity);
                    matched = true;
                }
            }
            matched
        }
        Matcher::UndatedBulk => {
            let total: u64 = records
                .iter()
                .filter(|record| is_unlinked_match(item, record))
                .map(|record| u64::from(record.quantity))
                .sum();
            if total == 0 {
                return false;
            }
            let mut remaining = total;
            for (slot, wave) in waves.iter().enumerate() {
                let take = remaining.min(u64::from(wave.quantity));
                counts[slot] = take as u32;
                remaining -= take;
                if remaining == 0 {
                    break;
                }
            }
            true
        }
    }
}

fn is_unlinked_match(item: &PlanItem, record: &Evidence<'_>) -> bool {
    record.link.is_none()
        && record.plant == item.plant
        && record.variety.trim().eq_ignore_ascii_case(item.variety.trim())
}

/// Closest wave within `days` of `date`; ties go to the earlier wave.
fn nearest_wave(waves: &[Wave], date: NaiveDate, days: u32) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (slot, wave) in waves.iter().enumerate() {
        let distance = date.signed_duration_since(wave.date).num_days().abs();
        if distance > i64::from(days) {
            continue;
        }
        match best {
            Some((_, current)) if current <= distance => {}
            _ => best = Some((slot, distance)),
        }
    }
    best.map(|(slot, _)| slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }

    fn wave(index: u32, date: NaiveDate, quantity: u32) -> Wave {
        Wave {
            index,
            date,
            quantity,
        }
    }

    #[test]
    fn nearest_wave_breaks_ties_toward_earlier_wave() {
        let waves = [wave(0, date(4, 1), 5), wave(1, date(4, 11), 5)];
        assert_eq!(nearest_wave(&waves, date(4, 6), 7), Some(0));
        assert_eq!(nearest_wave(&waves, date(4, 7), 7), Some(1));
        assert_eq!(nearest_wave(&waves, date(5, 1), 7), None);
    }

    #[test]
    fn status_precedence_prefers_placed() {
        let result = wave_result(&wave(0, date(4, 1), 5), 2, 3, 4);
        assert_eq!(result.status, WaveStatus::Placed);
        assert_eq!(result.realized, 2);

        let scheduled = wave_result(&wave(0, date(4, 1), 5), 0, 0, 9);
        assert_eq!(scheduled.status, WaveStatus::Scheduled);
        assert_eq!(scheduled.realized, 5);

        let planned = wave_result(&wave(0, date(4, 1), 5), 0, 0, 0);
        assert_eq!(planned.status, WaveStatus::Planned);
        assert_eq!(planned.realized, 0);
    }

    #[test]
    fn status_labels_are_lowercase() {
        assert_eq!(WaveStatus::Positioned.label(), "positioned");
        assert!(WaveStatus::Placed > WaveStatus::Scheduled);
    }
}
