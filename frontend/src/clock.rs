//! Reference time for due-date math.
//!
//! Nothing in the scheduling core reads the wall clock directly; it is handed
//! a [`ScheduleClock`] (or a plain date) so tests can pin "now".

use chrono::{DateTime, NaiveDate, Utc};

pub trait ScheduleClock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of [`ScheduleClock::now`]; all schedule math runs on days.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.  Under `wasmbind` chrono reads `Date.now()` in the browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ScheduleClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Midnight UTC of the given day.
    pub fn on(day: NaiveDate) -> Self {
        Self(day.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl ScheduleClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_truncates_to_calendar_day() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 1, 5, 23, 59, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn fixed_clock_on_day() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(FixedClock::on(day).today(), day);
    }
}
