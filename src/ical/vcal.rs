//! vCalendar 1.0 support
//!
//! Parsing goes through the iCalendar parser (the syntax is close enough), with a few fixups.
//! Building writes the subset of properties vCalendar readers understand.

use std::error::Error;

use chrono::{Duration, NaiveTime};
use ics::components::{Component, Parameter, Property};
use ics::ICalendar;

use crate::alarm::{AlarmAction, AlarmTrigger};
use crate::attendee::Role;
use crate::datetime::{format_utc, CalDateTime};
use crate::incidence::{Incidence, IncidenceBase, Status};
use crate::{Event, Todo};

use super::builder::{custom_property, param_text};

/// Non-standard properties that flag all-day events in vCalendar
const ALL_DAY_PROPERTIES: [&str; 2] = ["X-FUNAMBOL-ALLDAY", "X-MICROSOFT-CDO-ALLDAYEVENT"];
const VCAL_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Create a vCalendar 1.0 payload. Only events and to-dos can be written, other incidences are skipped.
pub fn build_vcalendar<'a, I>(incidences: I) -> Result<String, Box<dyn Error>>
where
    I: IntoIterator<Item = &'a Incidence>,
{
    let mut vcal = ICalendar::new("1.0", crate::config::prod_id());
    for incidence in incidences {
        match incidence {
            Incidence::Event(event) => {
                let mut component = Component::new("VEVENT");
                base_properties(&mut component, &event.base, event.all_day());
                if let Some(end) = &event.dt_end {
                    let end_value = if event.all_day() {
                        let last_day = event.last_day().unwrap_or_else(|| end.date());
                        last_day.and_hms_opt(23, 59, 59).map(|dt| dt.format(VCAL_LOCAL_FORMAT).to_string())
                    } else {
                        Some(format_utc(&end.to_utc()))
                    };
                    if let Some(end_value) = end_value {
                        component.add_property(Property::new("DTEND", end_value));
                    }
                }
                if let Some(status) = event_status(&event.base.status) {
                    component.add_property(Property::new("STATUS", status));
                }
                add_alarms(&mut component, &event.base, event.dt_end.as_ref());
                vcal.add_component(component);
            },
            Incidence::Todo(todo) => {
                let mut component = Component::new("VTODO");
                base_properties(&mut component, &todo.base, todo.all_day());
                if let Some(due) = &todo.due {
                    component.add_property(Property::new("DUE", vcal_date_time(due)));
                }
                if let Some(completed) = todo.completion_date() {
                    component.add_property(Property::new("COMPLETED", format_utc(completed)));
                }
                let status = if todo.completed() { "COMPLETED" } else { "NEEDS ACTION" };
                component.add_property(Property::new("STATUS", status));
                add_alarms(&mut component, &todo.base, todo.due.as_ref());
                vcal.add_component(component);
            },
            other => log::debug!("vCalendar cannot hold a {:?}, skipping {}", other.incidence_type(), other.uid()),
        }
    }
    Ok(vcal.to_string())
}

fn event_status(status: &Status) -> Option<&'static str> {
    match status {
        Status::Tentative => Some("TENTATIVE"),
        Status::Confirmed => Some("CONFIRMED"),
        Status::Canceled => Some("DECLINED"),
        _ => None,
    }
}

/// vCalendar has no floating dates: dates are written as local midnight, everything else in UTC
fn vcal_date_time(value: &CalDateTime) -> String {
    match value {
        CalDateTime::Date(d) => d.and_time(NaiveTime::MIN).format(VCAL_LOCAL_FORMAT).to_string(),
        CalDateTime::Floating(dt) => dt.format(VCAL_LOCAL_FORMAT).to_string(),
        other => format_utc(&other.to_utc()),
    }
}

fn text_property(name: &'static str, value: &str) -> Property<'static> {
    let needs_encoding = value.contains('\n') || value.is_ascii() == false;
    if needs_encoding {
        let mut prop = Property::new(name, encode_quoted_printable(value));
        prop.add(Parameter::new("ENCODING", "QUOTED-PRINTABLE"));
        prop.add(Parameter::new("CHARSET", "UTF-8"));
        prop
    } else {
        Property::new(name, value.to_string())
    }
}

fn base_properties(component: &mut Component<'static>, base: &IncidenceBase, all_day: bool) {
    component.add_property(Property::new("UID", base.uid.clone()));
    if let Some(created) = &base.created {
        component.add_property(Property::new("DCREATED", format_utc(created)));
    }
    if let Some(last_modified) = &base.last_modified {
        component.add_property(Property::new("LAST-MODIFIED", format_utc(last_modified)));
    }
    if let Some(start) = &base.dt_start {
        component.add_property(Property::new("DTSTART", vcal_date_time(start)));
    }
    if all_day {
        component.add_property(Property::new(ALL_DAY_PROPERTIES[0], "1"));
    }
    if base.summary.is_empty() == false {
        component.add_property(text_property("SUMMARY", &base.summary));
    }
    if base.description.is_empty() == false {
        component.add_property(text_property("DESCRIPTION", &base.description));
    }
    if base.location.is_empty() == false {
        component.add_property(text_property("LOCATION", &base.location));
    }
    if base.categories.is_empty() == false {
        component.add_property(text_property("CATEGORIES", &base.categories.join(";")));
    }
    if base.sequence > 0 {
        component.add_property(Property::new("SEQUENCE", base.sequence.to_string()));
    }
    component.add_property(Property::new("CLASS", base.secrecy.as_ical()));
    if base.priority > 0 {
        component.add_property(Property::new("PRIORITY", base.priority.to_string()));
    }

    if let Some(organizer) = &base.organizer {
        if base.attendees.iter().any(|a| a.email().eq_ignore_ascii_case(&organizer.email)) == false {
            let mut prop = Property::new("ATTENDEE", organizer.email.clone());
            prop.add(Parameter::new("ROLE", "ORGANIZER"));
            if organizer.name.is_empty() == false {
                prop.add(Parameter::new("CN", param_text(&organizer.name)));
            }
            component.add_property(prop);
        }
    }
    for attendee in &base.attendees {
        let mut prop = Property::new("ATTENDEE", attendee.email().to_string());
        let role = if attendee.role == Role::Chair { "OWNER" } else { "ATTENDEE" };
        prop.add(Parameter::new("ROLE", role));
        prop.add(Parameter::new("STATUS", attendee.status.as_vcal()));
        if attendee.rsvp {
            prop.add(Parameter::new("RSVP", "YES"));
        }
        if attendee.name().is_empty() == false {
            prop.add(Parameter::new("CN", param_text(attendee.name())));
        }
        component.add_property(prop);
    }

    for rule in &base.recurrence.rrules {
        match rule.to_vcal() {
            Some(text) => component.add_property(Property::new("RRULE", text)),
            None => log::debug!("Recurrence rule {} cannot be written in vCalendar syntax", rule),
        }
    }
    if base.recurrence.exdates.is_empty() == false {
        let dates: Vec<String> = base.recurrence.exdates.iter().map(vcal_date_time).collect();
        component.add_property(Property::new("EXDATE", dates.join(";")));
    }

    for prop in &base.custom_properties {
        if ALL_DAY_PROPERTIES.iter().any(|name| prop.name.eq_ignore_ascii_case(name)) == false {
            component.add_property(custom_property(prop));
        }
    }
}

/// vCalendar alarms are absolute: relative triggers are resolved against the incidence times
fn add_alarms(component: &mut Component<'static>, base: &IncidenceBase, end: Option<&CalDateTime>) {
    for alarm in &base.alarms {
        let at = match &alarm.trigger {
            AlarmTrigger::Absolute(at) => Some(*at),
            AlarmTrigger::StartOffset(offset) => base.dt_start.as_ref().and_then(|s| s.to_utc().checked_add_signed(*offset)),
            AlarmTrigger::EndOffset(offset) => end.and_then(|e| e.to_utc().checked_add_signed(*offset)),
        };
        let at = match at {
            Some(at) => at,
            None => {
                log::debug!("Alarm of {} has nothing to be relative to (or lands out of range), skipping it", base.uid);
                continue;
            }
        };
        let name = match alarm.action {
            AlarmAction::Audio => "AALARM",
            AlarmAction::Display => "DALARM",
            AlarmAction::Email => "MALARM",
            AlarmAction::Procedure => "PALARM",
        };
        let snooze = alarm.snooze.as_ref().map(crate::datetime::format_duration).unwrap_or_default();
        let value = format!("{};{};{};{}", format_utc(&at), snooze, alarm.repeat, alarm.description.replace(';', ","));
        component.add_property(Property::new(name, value));
    }
}

/// Remove the vendor all-day properties, and tell whether one of them was set
fn take_all_day_flag(base: &mut IncidenceBase) -> bool {
    let is_all_day = base.custom_properties.iter().any(|p| {
        ALL_DAY_PROPERTIES.iter().any(|name| p.name.eq_ignore_ascii_case(name))
            && p.value.as_deref().map(|v| v == "1" || v.eq_ignore_ascii_case("TRUE")).unwrap_or(false)
    });
    base.custom_properties.retain(|p| ALL_DAY_PROPERTIES.iter().any(|name| p.name.eq_ignore_ascii_case(name)) == false);
    is_all_day
}

/// Turn an event flagged as all-day by a vendor property into a real all-day event
pub(super) fn fix_all_day_event(event: &mut Event) {
    if take_all_day_flag(&mut event.base) == false {
        return;
    }

    let start = match &event.base.dt_start {
        Some(start) => start.date(),
        None => return,
    };
    event.base.dt_start = Some(CalDateTime::Date(start));
    if let Some(end) = &event.dt_end {
        // The end was written as the last second of the last day
        let exclusive_end = match end.time() {
            Some(time) if time == NaiveTime::MIN => end.date(),
            _ => end.date() + Duration::days(1),
        };
        event.dt_end = Some(CalDateTime::Date(exclusive_end.max(start + Duration::days(1))));
    }
}

/// Same for to-dos, whose due date is inclusive
pub(super) fn fix_all_day_todo(todo: &mut Todo) {
    if take_all_day_flag(&mut todo.base) == false {
        return;
    }
    todo.base.dt_start = todo.base.dt_start.as_ref().map(|s| CalDateTime::Date(s.date()));
    todo.due = todo.due.as_ref().map(|d| CalDateTime::Date(d.date()));
}

/// Decode a quoted-printable value (`=C3=A9` sequences and soft line breaks)
pub(super) fn decode_quoted_printable(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            let hex = value.get(i + 1..i + 3).and_then(|h| u8::from_str_radix(h, 16).ok());
            match hex {
                Some(byte) => {
                    decoded.push(byte);
                    i += 3;
                    continue;
                },
                // soft line break, or a trailing `=`
                None if i + 1 >= bytes.len() => break,
                None => decoded.push(b'='),
            }
        } else {
            decoded.push(bytes[i]);
        }
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn encode_quoted_printable(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.replace("\r\n", "\n").bytes() {
        match byte {
            b'\n' => encoded.push_str("=0D=0A"),
            b'=' => encoded.push_str("=3D"),
            b' '..=b'~' => encoded.push(byte as char),
            other => encoded.push_str(&format!("={:02X}", other)),
        }
    }
    encoded
}
