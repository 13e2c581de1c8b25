//! Date and time values as they appear in iCalendar properties (`DATE`, `DATE-TIME` and `DURATION`)

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// A point in time, with the same flavours as RFC5545 allows
#[derive(Clone, Debug, PartialEq)]
pub enum CalDateTime {
    /// A whole day (`VALUE=DATE`), used by all-day incidences
    Date(NaiveDate),
    /// A local time that is the same in every time zone
    Floating(NaiveDateTime),
    /// A time with the `Z` suffix
    Utc(DateTime<Utc>),
    /// A local time in a named zone (`TZID=...`)
    Zoned { datetime: NaiveDateTime, tzid: String },
}

impl CalDateTime {
    /// Parse an iCalendar value, given the parameters of its property
    pub fn parse(value: &str, params: &[(String, Vec<String>)]) -> Result<Self, Box<dyn Error>> {
        let value = value.trim();
        let tzid = param_value(params, "TZID");
        let is_date = param_value(params, "VALUE")
            .map(|v| v.eq_ignore_ascii_case("DATE"))
            .unwrap_or(false);

        if is_date || (value.len() == 8 && value.contains('T') == false) {
            let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map_err(|err| format!("Invalid date {:?}: {}", value, err))?;
            return Ok(CalDateTime::Date(date));
        }

        if let Some(stripped) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
            let naive = NaiveDateTime::parse_from_str(stripped, DATE_TIME_FORMAT)
                .map_err(|err| format!("Invalid UTC date-time {:?}: {}", value, err))?;
            return Ok(CalDateTime::Utc(Utc.from_utc_datetime(&naive)));
        }

        let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .map_err(|err| format!("Invalid date-time {:?}: {}", value, err))?;
        match tzid {
            Some(tzid) => Ok(CalDateTime::Zoned { datetime: naive, tzid: tzid.to_string() }),
            None => Ok(CalDateTime::Floating(naive)),
        }
    }

    /// The iCalendar value, and the parameters that must accompany it
    pub fn to_ics(&self) -> (String, Vec<(&'static str, String)>) {
        match self {
            CalDateTime::Date(d) => (d.format(DATE_FORMAT).to_string(), vec![("VALUE", "DATE".to_string())]),
            CalDateTime::Floating(dt) => (dt.format(DATE_TIME_FORMAT).to_string(), Vec::new()),
            CalDateTime::Utc(dt) => (format_utc(dt), Vec::new()),
            CalDateTime::Zoned { datetime, tzid } => (datetime.format(DATE_TIME_FORMAT).to_string(), vec![("TZID", tzid.clone())]),
        }
    }

    pub fn is_all_day(&self) -> bool {
        match self {
            CalDateTime::Date(_) => true,
            _ => false,
        }
    }

    /// The calendar date, as written (no zone conversion)
    pub fn date(&self) -> NaiveDate {
        match self {
            CalDateTime::Date(d) => *d,
            CalDateTime::Floating(dt) => dt.date(),
            CalDateTime::Utc(dt) => dt.date_naive(),
            CalDateTime::Zoned { datetime, .. } => datetime.date(),
        }
    }

    /// The wall-clock time, as written. `None` for dates
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            CalDateTime::Date(_) => None,
            CalDateTime::Floating(dt) => Some(dt.time()),
            CalDateTime::Utc(dt) => Some(dt.time()),
            CalDateTime::Zoned { datetime, .. } => Some(datetime.time()),
        }
    }

    /// Convert to UTC.
    /// Dates are taken at midnight, floating times are read as UTC, and unknown zones fall back to UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            CalDateTime::Date(d) => Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)),
            CalDateTime::Floating(dt) => Utc.from_utc_datetime(dt),
            CalDateTime::Utc(dt) => *dt,
            CalDateTime::Zoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => match tz.from_local_datetime(datetime).earliest() {
                    Some(local) => local.with_timezone(&Utc),
                    None => {
                        log::debug!("{} does not exist in {}, reading it as UTC", datetime, tzid);
                        Utc.from_utc_datetime(datetime)
                    }
                },
                Err(_) => {
                    log::warn!("Unknown time zone {:?}, reading {} as UTC", tzid, datetime);
                    Utc.from_utc_datetime(datetime)
                }
            },
        }
    }

    /// The local date and time to show to a user.
    ///
    /// Dates and floating times are shown as written. When `display_zone` is set, UTC and zoned times are converted into it;
    /// otherwise they are shown in their own zone.
    pub fn to_display(&self, display_zone: Option<Tz>) -> NaiveDateTime {
        match (self, display_zone) {
            (CalDateTime::Date(d), _) => d.and_time(NaiveTime::MIN),
            (CalDateTime::Floating(dt), _) => *dt,
            (CalDateTime::Utc(dt), None) => dt.naive_utc(),
            (CalDateTime::Zoned { datetime, .. }, None) => *datetime,
            (_, Some(tz)) => self.to_utc().with_timezone(&tz).naive_local(),
        }
    }

    /// Replace the date, keeping the time of day and the zone
    pub fn with_date(&self, date: NaiveDate) -> Self {
        match self {
            CalDateTime::Date(_) => CalDateTime::Date(date),
            CalDateTime::Floating(dt) => CalDateTime::Floating(date.and_time(dt.time())),
            CalDateTime::Utc(dt) => CalDateTime::Utc(Utc.from_utc_datetime(&date.and_time(dt.time()))),
            CalDateTime::Zoned { datetime, tzid } => CalDateTime::Zoned {
                datetime: date.and_time(datetime.time()),
                tzid: tzid.clone(),
            },
        }
    }

    /// Shift by a duration. Dates only move by whole days.
    ///
    /// Zoned times move by elapsed time, so their wall-clock time changes across a DST transition.
    /// Values that would leave chrono's range are kept unchanged.
    pub fn add_duration(&self, duration: Duration) -> Self {
        match self.checked_add_duration(duration) {
            Some(shifted) => shifted,
            None => {
                log::warn!("{} cannot be shifted by {}, keeping it as it is", self, duration);
                self.clone()
            }
        }
    }

    /// Same as [`Self::add_duration`], but `None` when the result is out of range
    pub fn checked_add_duration(&self, duration: Duration) -> Option<Self> {
        match self {
            CalDateTime::Date(d) => d.checked_add_signed(Duration::try_days(duration.num_days())?).map(CalDateTime::Date),
            CalDateTime::Floating(dt) => dt.checked_add_signed(duration).map(CalDateTime::Floating),
            CalDateTime::Utc(dt) => dt.checked_add_signed(duration).map(CalDateTime::Utc),
            CalDateTime::Zoned { datetime, tzid } => {
                let shifted = match tzid.parse::<Tz>() {
                    Ok(tz) => self.to_utc().checked_add_signed(duration)?.with_timezone(&tz).naive_local(),
                    Err(_) => datetime.checked_add_signed(duration)?,
                };
                Some(CalDateTime::Zoned { datetime: shifted, tzid: tzid.clone() })
            },
        }
    }

    /// The elapsed time between `self` and `other` (positive if `other` is later)
    pub fn duration_until(&self, other: &CalDateTime) -> Duration {
        match (self, other) {
            (CalDateTime::Date(a), CalDateTime::Date(b)) => *b - *a,
            _ => other.to_utc() - self.to_utc(),
        }
    }
}

impl Display for CalDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (value, params) = self.to_ics();
        for (key, param) in params {
            write!(f, "{}={};", key, param)?;
        }
        write!(f, "{}", value)
    }
}

/// Format a UTC timestamp the way iCalendar wants it (`20240315T101500Z`)
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse a UTC timestamp, as used by `CREATED`, `LAST-MODIFIED`, `DTSTAMP` and `COMPLETED`.
/// Timestamps without a `Z` suffix are read as UTC.
pub fn parse_utc(value: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    match CalDateTime::parse(value, &[])? {
        CalDateTime::Date(d) => Ok(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))),
        other => Ok(other.to_utc()),
    }
}

/// Look up the first value of a parameter, ignoring the case of its name
pub fn param_value<'a>(params: &'a [(String, Vec<String>)], name: &str) -> Option<&'a str> {
    params.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|v| v.as_str())
}


/// Parse an RFC5545 `DURATION` value (`P1W`, `-PT15M`, `P1DT2H30M`)
pub fn parse_duration(value: &str) -> Result<Duration, Box<dyn Error>> {
    let value = value.trim();
    let (negative, rest) = match value.chars().next() {
        Some('-') => (true, &value[1..]),
        Some('+') => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P')
        .or_else(|| rest.strip_prefix('p'))
        .ok_or_else(|| format!("Invalid duration {:?}", value))?;

    let mut total = Duration::zero();
    let mut number = String::new();
    let mut in_time = false;
    let mut has_component = false;
    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            '0'..='9' => number.push(c),
            'T' => in_time = true,
            unit => {
                let n: i64 = number.parse()
                    .map_err(|_| format!("Invalid duration {:?}", value))?;
                number.clear();
                has_component = true;
                let part = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n),
                    ('D', false) => Duration::try_days(n),
                    ('H', true) => Duration::try_hours(n),
                    ('M', true) => Duration::try_minutes(n),
                    ('S', true) => Duration::try_seconds(n),
                    _ => return Err(format!("Invalid duration {:?}", value).into()),
                };
                total = part.and_then(|part| total.checked_add(&part))
                    .ok_or_else(|| format!("Duration {:?} is out of range", value))?;
            }
        }
    }
    if number.is_empty() == false || has_component == false {
        return Err(format!("Invalid duration {:?}", value).into());
    }

    Ok(if negative { -total } else { total })
}

/// Format a duration as an RFC5545 `DURATION` value
pub fn format_duration(duration: &Duration) -> String {
    let mut secs = duration.num_seconds();
    let mut out = String::new();
    if secs < 0 {
        out.push('-');
        secs = -secs;
    }
    out.push('P');
    if secs == 0 {
        out.push_str("T0S");
        return out;
    }
    if secs % (7 * 86400) == 0 {
        out.push_str(&format!("{}W", secs / (7 * 86400)));
        return out;
    }

    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        out.push_str(&format!("{}D", days));
    }
    if hours > 0 || minutes > 0 || seconds > 0 {
        out.push('T');
        if hours > 0 { out.push_str(&format!("{}H", hours)); }
        if minutes > 0 { out.push_str(&format!("{}M", minutes)); }
        if seconds > 0 { out.push_str(&format!("{}S", seconds)); }
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    fn params(key: &str, value: &str) -> Vec<(String, Vec<String>)> {
        vec![(key.to_string(), vec![value.to_string()])]
    }

    #[test]
    fn test_parse_flavours() {
        assert_eq!(
            CalDateTime::parse("20240315", &params("VALUE", "DATE")).unwrap(),
            CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(CalDateTime::parse("20240315T101500Z", &[]).unwrap().to_utc() == Utc.with_ymd_and_hms(2024, 3, 15, 10, 15, 0).unwrap());
        assert_eq!(
            CalDateTime::parse("20240315T101500", &[]).unwrap(),
            CalDateTime::Floating(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(10, 15, 0).unwrap())
        );

        let zoned = CalDateTime::parse("20240315T101500", &params("TZID", "Europe/Paris")).unwrap();
        assert_eq!(zoned.to_utc(), Utc.with_ymd_and_hms(2024, 3, 15, 9, 15, 0).unwrap());
        assert_eq!(zoned.to_ics().1, vec![("TZID", "Europe/Paris".to_string())]);

        assert!(CalDateTime::parse("2024-03-15", &[]).is_err());
    }

    #[test]
    fn test_display_zone() {
        let utc = CalDateTime::Utc(Utc.with_ymd_and_hms(2024, 7, 1, 22, 30, 0).unwrap());
        let shown = utc.to_display(Some(chrono_tz::Asia::Tokyo));
        assert_eq!(shown, NaiveDate::from_ymd_opt(2024, 7, 2).unwrap().and_hms_opt(7, 30, 0).unwrap());
        assert_eq!(utc.to_display(None).date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_with_date_keeps_time() {
        let start = CalDateTime::Zoned {
            datetime: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            tzid: "Europe/Berlin".to_string(),
        };
        let moved = start.with_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(moved.date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(moved.time(), start.time());
    }

    #[test]
    fn test_durations() {
        assert_eq!(parse_duration("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(parse_duration("-P1DT2H").unwrap(), -(Duration::days(1) + Duration::hours(2)));
        assert_eq!(parse_duration("P2W").unwrap(), Duration::weeks(2));
        assert!(parse_duration("P").is_err());
        assert!(parse_duration("PT5").is_err());
        assert!(parse_duration("15M").is_err());

        assert_eq!(format_duration(&Duration::minutes(-15)), "-PT15M");
        assert_eq!(format_duration(&Duration::weeks(1)), "P1W");
        assert_eq!(format_duration(&(Duration::days(1) + Duration::minutes(30))), "P1DT30M");
        assert_eq!(format_duration(&Duration::zero()), "PT0S");
    }

    #[test]
    fn test_out_of_range_durations() {
        assert!(parse_duration("P99999999999999W").is_err());
        assert!(parse_duration("PT9223372036854775807S").is_err());
        assert!(parse_duration("P99999999999999999999D").is_err());
        assert!(parse_duration("P10000000000W50000000000D").is_err());

        // Representable, but far outside the range of dates
        let huge = parse_duration("P99999999W").unwrap();
        let start = CalDateTime::Floating(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(10, 0, 0).unwrap());
        assert_eq!(start.checked_add_duration(huge), None);
        assert_eq!(start.add_duration(huge), start);
    }

    #[test]
    fn test_zoned_shift_across_dst() {
        // Paris switches to summer time on 2024-03-31
        let start = CalDateTime::Zoned {
            datetime: NaiveDate::from_ymd_opt(2024, 3, 30).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            tzid: "Europe/Paris".to_string(),
        };
        let shifted = start.add_duration(Duration::days(3));
        assert_eq!(shifted.time(), NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(start.duration_until(&shifted), Duration::days(3));

        let unknown_zone = CalDateTime::Zoned {
            datetime: NaiveDate::from_ymd_opt(2024, 3, 30).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            tzid: "Mars/Olympus".to_string(),
        };
        assert_eq!(unknown_zone.add_duration(Duration::days(3)).time(), NaiveTime::from_hms_opt(10, 0, 0));
    }
}
