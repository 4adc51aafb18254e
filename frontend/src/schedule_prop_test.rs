//! Property tests for the upcoming-applications ranking over arbitrary
//! programme lists.

#![cfg(test)]

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use crate::models::{Category, ProgrammeStatus, SprayProgrammeEntry};
use crate::scheduling::FrequencySpec;
use crate::upcoming::{schedule_all, upcoming_applications};

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn day_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..730).prop_map(|offset| base_day() + Days::new(offset))
}

fn frequency_strategy() -> impl Strategy<Value = Option<FrequencySpec>> {
    prop_oneof![
        Just(None),
        (-3i64..60).prop_map(|n| Some(FrequencySpec::Numeric(n))),
        (1i64..60).prop_map(|n| Some(FrequencySpec::Textual(format!("Every {} days", n)))),
        "[a-z ]{0,12}".prop_map(|text| Some(FrequencySpec::Textual(text))),
    ]
}

fn entry_strategy() -> impl Strategy<Value = SprayProgrammeEntry> {
    (
        1u32..10_000,
        frequency_strategy(),
        proptest::option::of(day_strategy()),
        proptest::option::of(day_strategy()),
        any::<bool>(),
    )
        .prop_map(|(id, frequency, start_date, last_application, inactive)| SprayProgrammeEntry {
            id,
            category: Category::Insecticide,
            product_name: format!("Product {}", id),
            active_ingredient: None,
            target: None,
            application_rate: None,
            frequency,
            start_date,
            end_date: None,
            last_application,
            status: if inactive {
                ProgrammeStatus::Inactive
            } else {
                ProgrammeStatus::Active
            },
            notes: None,
        })
}

proptest! {
    #[test]
    fn ranking_is_ascending_and_capped(
        entries in proptest::collection::vec(entry_strategy(), 0..24),
        today in day_strategy(),
        limit in 0usize..10,
    ) {
        let upcoming = upcoming_applications(&entries, today, limit);
        prop_assert!(upcoming.len() <= limit);
        for pair in upcoming.windows(2) {
            prop_assert!(pair[0].next_due <= pair[1].next_due);
        }

        let all = schedule_all(&entries, today);
        prop_assert_eq!(upcoming.len(), all.len().min(limit));
        for item in &all {
            prop_assert_eq!(item.entry.status, ProgrammeStatus::Active);
            prop_assert_eq!(item.days_until, (item.next_due - today).num_days());
        }
    }

    #[test]
    fn ranking_is_idempotent(
        entries in proptest::collection::vec(entry_strategy(), 0..24),
        today in day_strategy(),
    ) {
        let first: Vec<_> = schedule_all(&entries, today).iter().map(|u| (u.entry.id, u.next_due)).collect();
        let second: Vec<_> = schedule_all(&entries, today).iter().map(|u| (u.entry.id, u.next_due)).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn frequency_parse_never_panics(text in "\\PC{0,40}") {
        let days = FrequencySpec::Textual(text).days();
        prop_assert!(days >= 0);
    }
}
