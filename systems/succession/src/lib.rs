#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic succession distributor splitting a plan item into waves.
//!
//! Wave `i` is sown `i * interval` days after the first date and receives
//! `floor(Q / W)` plants, plus one more while `i < Q mod W`. The same split
//! backs previews, export and reconciliation, so counts never disagree.

use chrono::{Days, NaiveDate};
use garden_planner_core::{PlanItem, ValidationError, MAX_SUCCESSION_WAVES};

/// One staggered planting of a succession.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wave {
    /// Zero-based wave index.
    pub index: u32,
    /// Sowing date of the wave.
    pub date: NaiveDate,
    /// Plants sown in the wave.
    pub quantity: u32,
}

/// Breaks a plan item's declared quantity into its succession waves.
pub fn succession_breakdown(item: &PlanItem) -> Result<Vec<Wave>, ValidationError> {
    distribute(
        item.quantity,
        item.succession.waves,
        item.succession.interval_days,
        item.first_date,
    )
}

/// Splits `total` plants into `waves` waves spaced `interval_days` apart.
///
/// The remainder of the integer division goes to the earliest waves, so the
/// quantities always sum to `total`.
pub fn distribute(
    total: u32,
    waves: u32,
    interval_days: u32,
    first_date: NaiveDate,
) -> Result<Vec<Wave>, ValidationError> {
    if waves == 0 {
        return Err(ValidationError::ZeroWaves);
    }
    if waves > MAX_SUCCESSION_WAVES {
        return Err(ValidationError::TooManyWaves(waves));
    }

    let mut breakdown = Vec::with_capacity(waves as usize);
    for index in 0..waves {
        let date = wave_date(first_date, interval_days, index)
            .ok_or(ValidationError::DateOutOfRange)?;
        breakdown.push(Wave {
            index,
            date,
            quantity: wave_quantity(total, waves, index),
        });
    }
    Ok(breakdown)
}

/// Quantity of wave `index` when `total` plants are split over `waves` waves.
///
/// Returns zero for a zero wave count or an index past the last wave.
#[must_use]
pub fn wave_quantity(total: u32, waves: u32, index: u32) -> u32 {
    if waves == 0 || index >= waves {
        return 0;
    }
    let base = total / waves;
    let leftover = total % waves;
    base + u32::from(index < leftover)
}

/// Sowing date of wave `index`; `None` past the end of the calendar.
#[must_use]
pub fn wave_date(first_date: NaiveDate, interval_days: u32, index: u32) -> Option<NaiveDate> {
    let offset = u64::from(index) * u64::from(interval_days);
    first_date.checked_add_days(Days::new(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_past_last_wave_are_zero() {
        assert_eq!(wave_quantity(10, 3, 3), 0);
        assert_eq!(wave_quantity(10, 0, 0), 0);
    }

    #[test]
    fn dates_past_calendar_end_are_rejected() {
        let late = NaiveDate::MAX;
        assert_eq!(
            distribute(4, 2, 1, late),
            Err(ValidationError::DateOutOfRange)
        );
    }
}
