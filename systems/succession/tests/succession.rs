use chrono::NaiveDate;
use garden_planner_core::{PlanItem, PlanItemId, PlantId, Succession, ValidationError};
use garden_planner_system_succession::{distribute, succession_breakdown, wave_quantity, Wave};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
}

fn quantities(waves: &[Wave]) -> Vec<u32> {
    waves.iter().map(|wave| wave.quantity).collect()
}

#[test]
fn remainder_goes_to_earliest_waves() {
    let waves = distribute(10, 3, 14, date(3, 1)).expect("breakdown");
    assert_eq!(quantities(&waves), vec![4, 3, 3]);
}

#[test]
fn even_split_spaces_dates_by_interval() {
    let waves = distribute(64, 4, 14, date(3, 1)).expect("breakdown");

    assert_eq!(quantities(&waves), vec![16, 16, 16, 16]);
    let dates: Vec<NaiveDate> = waves.iter().map(|wave| wave.date).collect();
    assert_eq!(
        dates,
        vec![date(3, 1), date(3, 15), date(3, 29), date(4, 12)]
    );
    let indices: Vec<u32> = waves.iter().map(|wave| wave.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn wave_quantities_always_sum_to_total() {
    for total in 0..=120 {
        for waves in 1..=13 {
            let breakdown = distribute(total, waves, 7, date(1, 1)).expect("breakdown");
            assert_eq!(breakdown.len(), waves as usize);
            let sum: u32 = breakdown.iter().map(|wave| wave.quantity).sum();
            assert_eq!(sum, total, "Q={total} W={waves}");

            let max = breakdown.iter().map(|wave| wave.quantity).max().unwrap_or(0);
            let min = breakdown.iter().map(|wave| wave.quantity).min().unwrap_or(0);
            assert!(max - min <= 1, "Q={total} W={waves} uneven split");
        }
    }
}

#[test]
fn fewer_plants_than_waves_leaves_late_waves_empty() {
    let waves = distribute(2, 4, 7, date(5, 1)).expect("breakdown");
    assert_eq!(quantities(&waves), vec![1, 1, 0, 0]);
}

#[test]
fn zero_waves_is_a_validation_error() {
    assert_eq!(
        distribute(10, 0, 7, date(5, 1)),
        Err(ValidationError::ZeroWaves)
    );
}

#[test]
fn breakdown_reads_plan_item_cadence() {
    let item = PlanItem {
        id: PlanItemId::new(1),
        plant: PlantId::new(1),
        variety: "Buttercrunch".to_owned(),
        quantity: 10,
        succession: Succession {
            waves: 3,
            interval_days: 10,
        },
        first_date: date(4, 1),
        beds: Vec::new(),
    };

    let waves = succession_breakdown(&item).expect("breakdown");

    assert_eq!(
        waves,
        vec![
            Wave {
                index: 0,
                date: date(4, 1),
                quantity: 4,
            },
            Wave {
                index: 1,
                date: date(4, 11),
                quantity: 3,
            },
            Wave {
                index: 2,
                date: date(4, 21),
                quantity: 3,
            },
        ]
    );
    assert_eq!(wave_quantity(item.quantity, 3, 0), 4);
}

#[test]
fn oversized_wave_count_is_rejected_before_allocating() {
    assert_eq!(
        distribute(10, u32::MAX, 0, date(4, 1)),
        Err(ValidationError::TooManyWaves(u32::MAX))
    );
}
