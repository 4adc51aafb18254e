//! "Upcoming applications" ranking across every product of a system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::ScheduleClock;
use crate::constants::{BADGE_UNSCHEDULED, DEFAULT_UPCOMING_LIMIT};
use crate::due_date::NextApplication;
use crate::models::SprayProgrammeEntry;
use crate::programme_state::{partition, ProgrammeState};
use crate::urgency::{days_until, Urgency};

/// Display policy for the upcoming list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub upcoming_limit: usize,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingApplication<'a> {
    pub entry: &'a SprayProgrammeEntry,
    pub next_due: NaiveDate,
    pub days_until: i64,
    pub urgency: Urgency,
    pub badge: String,
    pub badge_class: &'static str,
}

/// Every in-programme entry with a computable due date, most urgent first.
/// Ties keep input order.
pub fn schedule_all(entries: &[SprayProgrammeEntry], today: NaiveDate) -> Vec<UpcomingApplication<'_>> {
    let mut ranked: Vec<UpcomingApplication<'_>> = entries
        .iter()
        .filter(|e| ProgrammeState::of(e) == ProgrammeState::InProgramme)
        .filter_map(|entry| {
            let Some(next) = NextApplication::for_entry(entry, today) else {
                tracing::debug!(programme_id = entry.id, "no computable due date, skipping");
                return None;
            };
            let days = days_until(next.next_due, today);
            let urgency = Urgency::classify(days);
            Some(UpcomingApplication {
                entry,
                next_due: next.next_due,
                days_until: days,
                urgency,
                badge: urgency.badge_label(),
                badge_class: urgency.css_class(),
            })
        })
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|u| u.next_due);
    ranked
}

/// The first `limit` entries of [`schedule_all`].
pub fn upcoming_applications(
    entries: &[SprayProgrammeEntry],
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingApplication<'_>> {
    let mut ranked = schedule_all(entries, today);
    ranked.truncate(limit);
    ranked
}

// ---------------------------------------------------------------------------
// Category listings
// ---------------------------------------------------------------------------

/// A scheduled product as shown in the "Active Spray Programmes" section:
/// its next due date, or the unscheduled marker when none can be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgrammeListing<'a> {
    pub entry: &'a SprayProgrammeEntry,
    pub next_due: Option<NaiveDate>,
    pub badge: String,
    pub badge_class: &'static str,
}

impl<'a> ProgrammeListing<'a> {
    pub fn for_entry(entry: &'a SprayProgrammeEntry, today: NaiveDate) -> Self {
        match NextApplication::for_entry(entry, today) {
            Some(next) => {
                let urgency = Urgency::for_date(next.next_due, today);
                Self {
                    entry,
                    next_due: Some(next.next_due),
                    badge: urgency.badge_label(),
                    badge_class: urgency.css_class(),
                }
            }
            None => Self {
                entry,
                next_due: None,
                badge: BADGE_UNSCHEDULED.to_string(),
                badge_class: "unscheduled",
            },
        }
    }
}

/// Both product sections, input order preserved.  Active rows carry their
/// schedule badge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgrammeOverview<'a> {
    pub active: Vec<ProgrammeListing<'a>>,
    pub available: Vec<&'a SprayProgrammeEntry>,
}

pub fn overview(entries: &[SprayProgrammeEntry], today: NaiveDate) -> ProgrammeOverview<'_> {
    let split = partition(entries);
    ProgrammeOverview {
        active: split
            .active
            .into_iter()
            .map(|entry| ProgrammeListing::for_entry(entry, today))
            .collect(),
        available: split.available,
    }
}

/// Clock + settings bundle so callers only hand over entries.
#[derive(Debug, Clone)]
pub struct ScheduleAggregator<C: ScheduleClock> {
    clock: C,
    settings: ScheduleSettings,
}

impl<C: ScheduleClock> ScheduleAggregator<C> {
    pub fn new(clock: C, settings: ScheduleSettings) -> Self {
        Self { clock, settings }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    pub fn upcoming<'a>(&self, entries: &'a [SprayProgrammeEntry]) -> Vec<UpcomingApplication<'a>> {
        upcoming_applications(entries, self.clock.today(), self.settings.upcoming_limit)
    }

    pub fn full_schedule<'a>(&self, entries: &'a [SprayProgrammeEntry]) -> Vec<UpcomingApplication<'a>> {
        schedule_all(entries, self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Category, ProgrammeStatus};
    use crate::scheduling::FrequencySpec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: u32, last: Option<NaiveDate>, frequency: Option<FrequencySpec>) -> SprayProgrammeEntry {
        SprayProgrammeEntry {
            id,
            category: Category::Insecticide,
            product_name: format!("Product {}", id),
            active_ingredient: None,
            target: None,
            application_rate: None,
            frequency,
            start_date: None,
            end_date: None,
            last_application: last,
            status: ProgrammeStatus::Active,
            notes: None,
        }
    }

    #[test]
    fn inactive_and_catalogue_entries_are_excluded() {
        let today = date(2025, 1, 5);
        let mut inactive = entry(1, Some(date(2025, 1, 1)), Some(FrequencySpec::Numeric(7)));
        inactive.status = ProgrammeStatus::Inactive;
        let catalogue = entry(2, Some(date(2025, 1, 1)), None);
        let active = entry(3, Some(date(2025, 1, 1)), Some(FrequencySpec::Numeric(7)));

        let entries = vec![inactive, catalogue, active];
        let ranked = schedule_all(&entries, today);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entry.id, 3);
        assert_eq!(ranked[0].next_due, date(2025, 1, 8));
        assert_eq!(ranked[0].days_until, 3);
        assert_eq!(ranked[0].urgency, Urgency::DueIn(3));
        assert_eq!(ranked[0].badge, "3 days");
    }

    #[test]
    fn zero_frequency_entry_is_skipped() {
        let today = date(2025, 1, 5);
        let entries = vec![
            entry(1, Some(date(2025, 1, 1)), Some(FrequencySpec::Numeric(0))),
            entry(2, Some(date(2025, 1, 2)), Some(FrequencySpec::Numeric(7))),
        ];
        let ranked = schedule_all(&entries, today);
        assert_eq!(ranked.iter().map(|u| u.entry.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn end_date_only_entry_is_left_out() {
        let today = date(2025, 5, 1);
        let mut end_only = entry(1, None, None);
        end_only.end_date = Some(date(2025, 12, 31));
        let entries = vec![end_only, entry(2, Some(date(2025, 4, 30)), Some(FrequencySpec::Numeric(7)))];

        let ranked = schedule_all(&entries, today);
        assert_eq!(ranked.iter().map(|u| u.entry.id).collect::<Vec<_>>(), vec![2]);
        assert!(upcoming_applications(&entries[..1], today, 5).is_empty());
    }

    #[test]
    fn overview_marks_unscheduled_active_rows() {
        let today = date(2025, 5, 1);
        let mut end_only = entry(1, None, None);
        end_only.end_date = Some(date(2025, 12, 31));
        let catalogue = entry(2, None, None);
        let weekly = entry(3, Some(date(2025, 4, 30)), Some(FrequencySpec::Numeric(7)));
        let entries = vec![end_only, catalogue, weekly];

        let view = overview(&entries, today);
        assert_eq!(view.available.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(view.active.len(), 2);
        assert_eq!(view.active[0].entry.id, 1);
        assert_eq!(view.active[0].next_due, None);
        assert_eq!(view.active[0].badge, "Unscheduled");
        assert_eq!(view.active[0].badge_class, "unscheduled");
        assert_eq!(view.active[1].next_due, Some(date(2025, 5, 7)));
        assert_eq!(view.active[1].badge, "6 days");
    }

    #[test]
    fn ties_keep_input_order() {
        let today = date(2025, 1, 5);
        let entries = vec![
            entry(10, Some(date(2025, 1, 1)), Some(FrequencySpec::Numeric(7))),
            entry(11, Some(date(2025, 1, 1)), Some("Every 7 days".into())),
            entry(12, Some(date(2024, 12, 25)), Some(FrequencySpec::Numeric(7))),
        ];
        let ids: Vec<u32> = schedule_all(&entries, today).iter().map(|u| u.entry.id).collect();
        assert_eq!(ids, vec![12, 10, 11]);
    }

    #[test]
    fn aggregator_applies_configured_limit() {
        let today = date(2025, 3, 1);
        let entries: Vec<_> = (0..4)
            .map(|i| entry(i, Some(date(2025, 2, 20 + i)), Some(FrequencySpec::Numeric(7))))
            .collect();
        let aggregator = ScheduleAggregator::new(
            FixedClock::on(today),
            ScheduleSettings { upcoming_limit: 2 },
        );
        assert_eq!(aggregator.upcoming(&entries).len(), 2);
        assert_eq!(aggregator.full_schedule(&entries).len(), 4);
        assert_eq!(aggregator.settings().upcoming_limit, 2);
    }

    #[test]
    fn settings_default_when_fields_missing() {
        let settings: ScheduleSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.upcoming_limit, 5);
    }
}
