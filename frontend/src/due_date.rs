//! Next-application date for a single programme entry.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::SprayProgrammeEntry;
use crate::scheduling::FrequencyDays;

/// Compute when the next application falls due.
///
/// Precedence:
/// 1. last recorded application + frequency (may land in the past: overdue);
/// 2. a start date still in the future is itself the first due date;
/// 3. otherwise start date (or today) + frequency.
///
/// `None` means there is nothing to schedule from: no usable frequency and
/// no future start date to anchor on.  `end_date` is intentionally not
/// consulted.
pub fn next_application_date(
    last_application: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    frequency: Option<FrequencyDays>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(last) = last_application {
        return advance(last, frequency?);
    }

    match start_date {
        Some(start) if start > today => Some(start),
        Some(start) => advance(start, frequency?),
        None => advance(today, frequency?),
    }
}

fn advance(base: NaiveDate, frequency: FrequencyDays) -> Option<NaiveDate> {
    // FrequencyDays is always >= 1 so the cast cannot wrap.
    base.checked_add_days(Days::new(frequency.get() as u64))
}

/// Next due date for one entry, with the frequency it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextApplication {
    pub next_due: NaiveDate,
    pub frequency: Option<FrequencyDays>,
}

impl NextApplication {
    /// `None` when nothing anchors a schedule: no frequency, no start date
    /// and no recorded application.  The 7-day default only fills in for a
    /// missing frequency when one of the dates is present.
    pub fn for_entry(entry: &SprayProgrammeEntry, today: NaiveDate) -> Option<Self> {
        if entry.frequency.is_none() && entry.start_date.is_none() && entry.last_application.is_none() {
            return None;
        }
        let frequency = FrequencyDays::from_spec(entry.frequency.as_ref());
        let next_due = next_application_date(
            entry.last_application,
            entry.start_date,
            frequency,
            today,
        )?;
        Some(Self { next_due, frequency })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::FrequencySpec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week() -> Option<FrequencyDays> {
        FrequencyDays::new(7)
    }

    #[test]
    fn advances_from_last_application() {
        let next = next_application_date(Some(date(2025, 1, 1)), None, week(), date(2025, 1, 5));
        assert_eq!(next, Some(date(2025, 1, 8)));
    }

    #[test]
    fn last_application_path_can_land_in_the_past() {
        let next = next_application_date(Some(date(2025, 1, 1)), None, week(), date(2025, 1, 20));
        assert_eq!(next, Some(date(2025, 1, 8)));
    }

    #[test]
    fn last_application_beats_future_start_date() {
        let next = next_application_date(
            Some(date(2025, 4, 20)),
            Some(date(2025, 6, 1)),
            week(),
            date(2025, 5, 1),
        );
        assert_eq!(next, Some(date(2025, 4, 27)));
    }

    #[test]
    fn future_start_date_is_the_first_due_date() {
        let next = next_application_date(None, Some(date(2025, 6, 1)), week(), date(2025, 5, 1));
        assert_eq!(next, Some(date(2025, 6, 1)));
    }

    #[test]
    fn past_or_today_start_date_adds_frequency() {
        let next = next_application_date(None, Some(date(2025, 4, 1)), week(), date(2025, 5, 1));
        assert_eq!(next, Some(date(2025, 4, 8)));
        let next = next_application_date(None, Some(date(2025, 5, 1)), week(), date(2025, 5, 1));
        assert_eq!(next, Some(date(2025, 5, 8)));
    }

    #[test]
    fn no_dates_counts_from_today() {
        let next = next_application_date(None, None, week(), date(2025, 5, 1));
        assert_eq!(next, Some(date(2025, 5, 8)));
    }

    #[test]
    fn no_usable_frequency_means_no_schedule() {
        assert_eq!(next_application_date(None, None, None, date(2025, 5, 1)), None);
        assert_eq!(
            next_application_date(Some(date(2025, 4, 1)), None, None, date(2025, 5, 1)),
            None
        );
        // A future start date still anchors the first application.
        assert_eq!(
            next_application_date(None, Some(date(2025, 6, 1)), None, date(2025, 5, 1)),
            Some(date(2025, 6, 1))
        );
    }

    fn bare_entry() -> SprayProgrammeEntry {
        SprayProgrammeEntry {
            id: 1,
            category: crate::models::Category::FoliarFeed,
            product_name: "Seaweed".to_string(),
            active_ingredient: None,
            target: None,
            application_rate: None,
            frequency: None,
            start_date: None,
            end_date: None,
            last_application: None,
            status: crate::models::ProgrammeStatus::Active,
            notes: None,
        }
    }

    #[test]
    fn entry_without_anchor_is_unscheduled() {
        let mut entry = bare_entry();
        entry.end_date = Some(date(2025, 12, 31));
        assert_eq!(NextApplication::for_entry(&entry, date(2025, 5, 1)), None);
    }

    #[test]
    fn missing_frequency_defaults_when_a_date_anchors() {
        let mut entry = bare_entry();
        entry.last_application = Some(date(2025, 4, 28));
        let next = NextApplication::for_entry(&entry, date(2025, 5, 1)).unwrap();
        assert_eq!(next.next_due, date(2025, 5, 5));

        let mut entry = bare_entry();
        entry.frequency = Some(FrequencySpec::from("weekly"));
        let next = NextApplication::for_entry(&entry, date(2025, 5, 1)).unwrap();
        assert_eq!(next.next_due, date(2025, 5, 8));
    }

    #[test]
    fn overflow_yields_no_schedule() {
        let next = next_application_date(Some(NaiveDate::MAX), None, week(), date(2025, 5, 1));
        assert_eq!(next, None);
    }
}
