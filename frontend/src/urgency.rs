//! Urgency buckets for the application badges.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::{BADGE_OVERDUE, BADGE_TODAY, BADGE_TOMORROW};

/// Whole calendar days from `today` until `next_due`; negative when overdue.
pub fn days_until(next_due: NaiveDate, today: NaiveDate) -> i64 {
    (next_due - today).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueToday,
    DueTomorrow,
    DueIn(i64),
}

impl Urgency {
    pub fn classify(days_until: i64) -> Self {
        match days_until {
            d if d < 0 => Urgency::Overdue,
            0 => Urgency::DueToday,
            1 => Urgency::DueTomorrow,
            d => Urgency::DueIn(d),
        }
    }

    pub fn for_date(next_due: NaiveDate, today: NaiveDate) -> Self {
        Self::classify(days_until(next_due, today))
    }

    /// Badge text: "Overdue", "Today", "Tomorrow" or "N days".
    pub fn badge_label(&self) -> String {
        match self {
            Urgency::Overdue => BADGE_OVERDUE.to_string(),
            Urgency::DueToday => BADGE_TODAY.to_string(),
            Urgency::DueTomorrow => BADGE_TOMORROW.to_string(),
            Urgency::DueIn(n) => format!("{} days", n),
        }
    }

    /// Style hook for the badge element.
    pub fn css_class(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueToday => "due-today",
            Urgency::DueTomorrow => "due-soon",
            Urgency::DueIn(_) => "scheduled",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.badge_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classify_buckets() {
        assert_eq!(Urgency::classify(-12), Urgency::Overdue);
        assert_eq!(Urgency::classify(-1), Urgency::Overdue);
        assert_eq!(Urgency::classify(0), Urgency::DueToday);
        assert_eq!(Urgency::classify(1), Urgency::DueTomorrow);
        assert_eq!(Urgency::classify(3), Urgency::DueIn(3));
    }

    #[test]
    fn days_until_uses_calendar_days() {
        assert_eq!(days_until(date(2025, 1, 8), date(2025, 1, 5)), 3);
        assert_eq!(days_until(date(2025, 1, 8), date(2025, 1, 20)), -12);
        assert_eq!(Urgency::for_date(date(2025, 1, 8), date(2025, 1, 5)), Urgency::DueIn(3));
    }

    #[test]
    fn badge_labels() {
        assert_eq!(Urgency::Overdue.badge_label(), "Overdue");
        assert_eq!(Urgency::DueToday.badge_label(), "Today");
        assert_eq!(Urgency::DueTomorrow.to_string(), "Tomorrow");
        assert_eq!(Urgency::DueIn(5).badge_label(), "5 days");
        assert_eq!(Urgency::DueIn(5).css_class(), "scheduled");
    }

    #[test]
    fn serialises_as_tagged_object() {
        let json = serde_json::to_value(Urgency::DueIn(4)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "due_in", "days": 4 }));
        let json = serde_json::to_value(Urgency::Overdue).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "overdue" }));
    }
}
