//! Free/busy information (iCal `VFREEBUSY` item)

use std::error::Error;

use chrono::{DateTime, Utc};

use crate::datetime::{parse_duration, parse_utc, CalDateTime};
use crate::incidence::IncidenceBase;

/// `FBTYPE` parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreeBusyType {
    Free,
    Busy,
    BusyUnavailable,
    BusyTentative,
}

impl FreeBusyType {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "FREE" => FreeBusyType::Free,
            "BUSY-UNAVAILABLE" => FreeBusyType::BusyUnavailable,
            "BUSY-TENTATIVE" => FreeBusyType::BusyTentative,
            _ => FreeBusyType::Busy,
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            FreeBusyType::Free => "FREE",
            FreeBusyType::Busy => "BUSY",
            FreeBusyType::BusyUnavailable => "BUSY-UNAVAILABLE",
            FreeBusyType::BusyTentative => "BUSY-TENTATIVE",
        }
    }
}

impl Default for FreeBusyType {
    fn default() -> Self {
        FreeBusyType::Busy
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FreeBusyPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub fb_type: FreeBusyType,
}

impl FreeBusyPeriod {
    /// Parse a `PERIOD` value, either `start/end` or `start/duration`
    pub fn parse(value: &str, fb_type: FreeBusyType) -> Result<Self, Box<dyn Error>> {
        let mut parts = value.splitn(2, '/');
        let start = parse_utc(parts.next().unwrap_or(""))?;
        let second = parts.next().ok_or_else(|| format!("Invalid period {:?}", value))?;
        let end = if second.starts_with('P') || second.starts_with('-') || second.starts_with('+') {
            start.checked_add_signed(parse_duration(second)?)
                .ok_or_else(|| format!("Period {:?} goes out of range", value))?
        } else {
            parse_utc(second)?
        };
        Ok(Self { start, end, fb_type })
    }

    pub fn to_ical(&self) -> String {
        format!("{}/{}", crate::datetime::format_utc(&self.start), crate::datetime::format_utc(&self.end))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreeBusy {
    pub base: IncidenceBase,
    pub dt_end: Option<CalDateTime>,
    pub periods: Vec<FreeBusyPeriod>,
}

impl FreeBusy {
    pub fn new() -> Self {
        Self { base: IncidenceBase::new(""), ..Default::default() }
    }

    pub fn base(&self) -> &IncidenceBase              { &self.base }
    pub fn base_mut(&mut self) -> &mut IncidenceBase  { &mut self.base }
    pub fn date_end(&self) -> Option<&CalDateTime>   { self.dt_end.as_ref() }

    pub fn all_day(&self) -> bool {
        false
    }

    /// The periods that are not free, sorted by start
    pub fn busy_periods(&self) -> Vec<&FreeBusyPeriod> {
        let mut periods: Vec<_> = self.periods.iter()
            .filter(|p| p.fb_type != FreeBusyType::Free)
            .collect();
        periods.sort_by_key(|p| p.start);
        periods
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_periods() {
        let p = FreeBusyPeriod::parse("20240315T090000Z/PT1H30M", FreeBusyType::Busy).unwrap();
        assert_eq!(p.end - p.start, Duration::minutes(90));
        assert_eq!(p.to_ical(), "20240315T090000Z/20240315T103000Z");

        let p = FreeBusyPeriod::parse("20240315T090000Z/20240315T100000Z", FreeBusyType::Free).unwrap();
        assert_eq!(p.end, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
        assert!(FreeBusyPeriod::parse("20240315T090000Z", FreeBusyType::Busy).is_err());
    }

    #[test]
    fn test_busy_periods() {
        let mut fb = FreeBusy::new();
        fb.periods.push(FreeBusyPeriod::parse("20240315T140000Z/PT1H", FreeBusyType::BusyTentative).unwrap());
        fb.periods.push(FreeBusyPeriod::parse("20240315T090000Z/PT1H", FreeBusyType::Busy).unwrap());
        fb.periods.push(FreeBusyPeriod::parse("20240315T120000Z/PT1H", FreeBusyType::Free).unwrap());
        let busy = fb.busy_periods();
        assert_eq!(busy.len(), 2);
        assert!(busy[0].start < busy[1].start);
    }
}
