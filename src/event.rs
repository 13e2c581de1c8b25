//! Calendar events (iCal `VEVENT` item)

use chrono::{Duration, NaiveDate};

use crate::datetime::CalDateTime;
use crate::incidence::IncidenceBase;

/// Whether an event blocks time on a free/busy schedule (`TRANSP`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transparency {
    Opaque,
    Transparent,
}

impl Default for Transparency {
    fn default() -> Self {
        Transparency::Opaque
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    pub base: IncidenceBase,
    /// The end of the event. For all-day events this is the day after the last day, as in RFC5545
    pub dt_end: Option<CalDateTime>,
    pub transparency: Transparency,
}

impl Event {
    /// Create a brand new event, with a random UID
    pub fn new(summary: &str) -> Self {
        Self {
            base: IncidenceBase::new(summary),
            ..Default::default()
        }
    }

    pub fn new_with_times(summary: &str, start: CalDateTime, end: Option<CalDateTime>) -> Self {
        let mut event = Self::new(summary);
        event.base.dt_start = Some(start);
        event.dt_end = end;
        event
    }

    pub fn base(&self) -> &IncidenceBase                 { &self.base }
    pub fn base_mut(&mut self) -> &mut IncidenceBase     { &mut self.base }
    pub fn date_end(&self) -> Option<&CalDateTime>      { self.dt_end.as_ref() }

    pub fn all_day(&self) -> bool {
        self.base.dt_start.as_ref().map(|s| s.is_all_day()).unwrap_or(false)
    }

    /// The time between the start and the end, if both are known
    pub fn duration(&self) -> Option<Duration> {
        let start = self.base.dt_start.as_ref()?;
        let end = self.dt_end.as_ref()?;
        Some(start.duration_until(end))
    }

    /// The last day this event covers (inclusive)
    pub fn last_day(&self) -> Option<NaiveDate> {
        let start = self.base.dt_start.as_ref()?.date();
        let last = match &self.dt_end {
            None => start,
            Some(CalDateTime::Date(end)) => end.pred_opt().unwrap_or(*end),
            Some(end) => end.date(),
        };
        Some(last.max(start))
    }

    pub fn is_multi_day(&self) -> bool {
        match (self.base.dt_start.as_ref(), self.last_day()) {
            (Some(start), Some(last)) => last > start.date(),
            _ => false,
        }
    }

    /// Whether this event takes place (at least partly) on this day
    pub fn covers(&self, day: NaiveDate) -> bool {
        match (self.base.dt_start.as_ref(), self.last_day()) {
            (Some(start), Some(last)) => start.date() <= day && day <= last,
            _ => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_day_span() {
        let event = Event::new_with_times(
            "Holidays",
            CalDateTime::Date(date(2024, 8, 1)),
            Some(CalDateTime::Date(date(2024, 8, 4))),
        );
        assert!(event.all_day());
        assert_eq!(event.last_day(), Some(date(2024, 8, 3)));
        assert!(event.is_multi_day());
        assert!(event.covers(date(2024, 8, 3)));
        assert!(event.covers(date(2024, 8, 4)) == false);
        assert_eq!(event.duration(), Some(Duration::days(3)));
    }

    #[test]
    fn test_timed_event() {
        let start = date(2024, 8, 1).and_hms_opt(10, 0, 0).unwrap();
        let event = Event::new_with_times(
            "Lunch",
            CalDateTime::Floating(start),
            Some(CalDateTime::Floating(start + Duration::minutes(90))),
        );
        assert!(event.all_day() == false);
        assert!(event.is_multi_day() == false);
        assert_eq!(event.duration(), Some(Duration::minutes(90)));
    }
}
