//! Human-readable names of calendar enumerations, and date/time rendering

use chrono::{DateTime, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::attendee::{PartStat, Role};
use crate::config::{format_with, Locale};
use crate::datetime::CalDateTime;
use crate::incidence::{IncidenceType, Secrecy, Status};
use crate::Todo;

pub fn incidence_type(incidence_type: IncidenceType) -> &'static str {
    match incidence_type {
        IncidenceType::Event => "event",
        IncidenceType::Todo => "to-do",
        IncidenceType::Journal => "journal",
        IncidenceType::FreeBusy => "free/busy",
    }
}

pub fn incidence_secrecy(secrecy: Secrecy) -> &'static str {
    match secrecy {
        Secrecy::Public => "Public",
        Secrecy::Private => "Private",
        Secrecy::Confidential => "Confidential",
    }
}

/// Every secrecy name, in the order of [`Secrecy`]
pub fn secrecy_list() -> Vec<&'static str> {
    [Secrecy::Public, Secrecy::Private, Secrecy::Confidential]
        .iter()
        .map(|s| incidence_secrecy(*s))
        .collect()
}

/// An empty string when there is no status. Non-standard statuses are shown as they are
pub fn incidence_status(status: &Status) -> String {
    match status {
        Status::None => String::new(),
        Status::Tentative => "Tentative".to_string(),
        Status::Confirmed => "Confirmed".to_string(),
        Status::Completed => "Completed".to_string(),
        Status::NeedsAction => "Needs-Action".to_string(),
        Status::Canceled => "Canceled".to_string(),
        Status::InProcess => "In-Process".to_string(),
        Status::Draft => "Draft".to_string(),
        Status::Final => "Final".to_string(),
        Status::X(custom) => custom.clone(),
    }
}

pub fn attendee_role(role: Role) -> &'static str {
    match role {
        Role::Chair => "Chair",
        Role::ReqParticipant => "Participant",
        Role::OptParticipant => "Optional Participant",
        Role::NonParticipant => "Observer",
    }
}

pub fn attendee_status(status: PartStat) -> &'static str {
    match status {
        PartStat::NeedsAction => "Needs Action",
        PartStat::Accepted => "Accepted",
        PartStat::Declined => "Declined",
        PartStat::Tentative => "Tentative",
        PartStat::Delegated => "Delegated",
        PartStat::Completed => "Completed",
        PartStat::InProcess => "In Process",
        PartStat::None => "Unknown",
    }
}

/// Every participation status name, in the order of [`PartStat`]
pub fn attendee_status_list() -> Vec<&'static str> {
    [
        PartStat::NeedsAction,
        PartStat::Accepted,
        PartStat::Declined,
        PartStat::Tentative,
        PartStat::Delegated,
        PartStat::Completed,
        PartStat::InProcess,
        PartStat::None,
    ]
    .iter()
    .map(|s| attendee_status(*s))
    .collect()
}


pub fn format_time(time: NaiveTime, locale: &Locale) -> String {
    format_with(time.format(&locale.time_format), &time.format("%H:%M").to_string())
}

pub fn format_date(date: NaiveDate, short: bool, locale: &Locale) -> String {
    format_with(date.format(locale.date_format(short)), &date.format("%Y-%m-%d").to_string())
}

/// A date, followed by a time unless `all_day` is set or the value is a date.
/// UTC and zoned values are shown in the locale's time zone.
pub fn format_date_time(value: &CalDateTime, all_day: bool, short: bool, locale: &Locale) -> String {
    let shown = value.to_display(locale.display_zone());
    if all_day || value.is_all_day() {
        format_date(shown.date(), short, locale)
    } else {
        format!("{} {}", format_date(shown.date(), short, locale), format_time(shown.time(), locale))
    }
}

/// A timestamp (creation, modification, completion...) in the locale's time zone
pub fn format_timestamp(value: &DateTime<Utc>, short: bool, locale: &Locale) -> String {
    format_date_time(&CalDateTime::Utc(*value), false, short, locale)
}

/// When a to-do was completed, or an empty string
pub fn todo_completed_date_time(todo: &Todo, short: bool, locale: &Locale) -> String {
    match todo.completion_date() {
        Some(date) => format_timestamp(date, short, locale),
        None => String::new(),
    }
}

/// `+05:30`, `-08:00`...
pub fn tz_utc_offset_str(offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let minutes = offset_seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// The UTC offset of the locale's time zone at a given instant (`+00:00` without a zone)
pub fn locale_utc_offset_str(locale: &Locale, at: &DateTime<Utc>) -> String {
    match locale.display_zone() {
        Some(tz) => tz_utc_offset_str(tz.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc()),
        None => tz_utc_offset_str(0),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(incidence_type(IncidenceType::Todo), "to-do");
        assert_eq!(incidence_type(IncidenceType::FreeBusy), "free/busy");
        assert_eq!(secrecy_list(), vec!["Public", "Private", "Confidential"]);
        assert_eq!(attendee_role(Role::NonParticipant), "Observer");
        assert_eq!(attendee_status_list().len(), 8);
        assert_eq!(incidence_status(&Status::X("X-MOVED".to_string())), "X-MOVED");
        assert_eq!(incidence_status(&Status::None), "");
    }

    #[test]
    fn test_date_time_formatting() {
        let locale = Locale::default();
        let dt = CalDateTime::Utc(Utc.with_ymd_and_hms(2024, 3, 15, 9, 5, 0).unwrap());
        assert_eq!(format_date_time(&dt, false, true, &locale), "2024-03-15 09:05");
        assert_eq!(format_date_time(&dt, true, true, &locale), "2024-03-15");
        assert_eq!(format_date_time(&dt, false, false, &locale), "Friday, March 15, 2024 09:05");

        let mut paris = Locale::default();
        paris.time_zone = Some("Europe/Paris".to_string());
        assert_eq!(format_date_time(&dt, false, true, &paris), "2024-03-15 10:05");
        assert_eq!(locale_utc_offset_str(&paris, &Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()), "+02:00");
    }

    #[test]
    fn test_bad_pattern_does_not_panic() {
        let mut locale = Locale::default();
        locale.time_format = "%Q".to_string();
        assert_eq!(format_time(NaiveTime::from_hms_opt(7, 30, 0).unwrap(), &locale), "07:30");
    }

    #[test]
    fn test_offsets() {
        assert_eq!(tz_utc_offset_str(19800), "+05:30");
        assert_eq!(tz_utc_offset_str(-28800), "-08:00");
        assert_eq!(tz_utc_offset_str(0), "+00:00");
    }
}
