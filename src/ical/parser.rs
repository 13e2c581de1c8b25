//! A module to parse ICal files

use std::error::Error;

use ical::parser::ical::component::{IcalAlarm, IcalCalendar, IcalEvent, IcalFreeBusy, IcalJournal, IcalTodo};
use ical::property::Property;
use url::Url;
use uuid::Uuid;

use crate::alarm::{Alarm, AlarmAction};
use crate::attendee::{Attendee, Person};
use crate::calendar::Calendar;
use crate::datetime::{param_value, parse_duration, parse_utc, CalDateTime};
use crate::event::Transparency;
use crate::freebusy::{FreeBusyPeriod, FreeBusyType};
use crate::incidence::{Attachment, Incidence, IncidenceBase, Secrecy, Status};
use crate::recurrence::RecurrenceRule;
use crate::todo::CompletionStatus;
use crate::{Event, FreeBusy, Journal, Todo};

use super::vcal;
use super::{split_text_list, unescape_text};

/// What kind of payload is being read
struct Context {
    /// vCalendar 1.0 rather than iCalendar 2.0
    is_vcal: bool,
}

/// Parse the first `VCALENDAR` of an iCalendar (or vCalendar 1.0) text
pub fn parse_calendar(content: &str) -> Result<Calendar, Box<dyn Error>> {
    let mut reader = ical::IcalParser::new(content.as_bytes());
    let parsed = match reader.next() {
        None => return Err("No calendar data to parse".into()),
        Some(Err(err)) => return Err(format!("Unable to parse calendar data: {}", err).into()),
        Some(Ok(calendar)) => calendar,
    };

    if reader.next().is_some() {
        log::debug!("Only the first VCALENDAR of the data is read");
    }

    Ok(calendar_from_ical(&parsed))
}

/// Parse a payload that must contain exactly one incidence
pub fn parse_incidence(content: &str) -> Result<Incidence, Box<dyn Error>> {
    let mut incidences = parse_calendar(content)?.into_incidences();
    match incidences.len() {
        0 => Err("No incidence in calendar data".into()),
        1 => Ok(incidences.remove(0)),
        n => Err(format!("Only a single incidence is supported, got {}", n).into()),
    }
}

fn calendar_from_ical(parsed: &IcalCalendar) -> Calendar {
    let version = parsed.properties.iter()
        .find(|p| p.name.eq_ignore_ascii_case("VERSION"))
        .and_then(|p| p.value.as_deref())
        .unwrap_or("2.0");
    let ctx = Context { is_vcal: version.trim() == "1.0" };

    let mut calendar = Calendar::new("");
    for prop in &parsed.properties {
        let value = match prop.value.as_deref() {
            Some(value) => value,
            None => continue,
        };
        match prop.name.to_ascii_uppercase().as_str() {
            "X-WR-CALNAME" | "NAME" => calendar.set_name(&unescape_text(value)),
            "METHOD" => calendar.set_method(Some(value.trim())),
            "PRODID" => calendar.set_prod_id(Some(value.trim())),
            "COLOR" | "X-APPLE-CALENDAR-COLOR" => {
                if let Err(err) = calendar.set_color(value.trim()) {
                    log::warn!("{}", err);
                }
            },
            _ => {},
        }
    }

    for event in &parsed.events {
        calendar.add_incidence(Incidence::Event(parse_event(event, &ctx)));
    }
    for todo in &parsed.todos {
        calendar.add_incidence(Incidence::Todo(parse_todo(todo, &ctx)));
    }
    for journal in &parsed.journals {
        calendar.add_incidence(Incidence::Journal(parse_journal(journal, &ctx)));
    }
    for free_busy in &parsed.free_busys {
        calendar.add_incidence(Incidence::FreeBusy(parse_free_busy(free_busy, &ctx)));
    }

    calendar
}


fn params_of(prop: &Property) -> &[(String, Vec<String>)] {
    prop.params.as_deref().unwrap_or(&[])
}

/// The value of a property, decoded from quoted-printable when vCalendar asks for it
fn raw_value(prop: &Property) -> String {
    let value = prop.value.as_deref().unwrap_or("");
    let is_quoted_printable = param_value(params_of(prop), "ENCODING")
        .map(|e| e.eq_ignore_ascii_case("QUOTED-PRINTABLE"))
        .unwrap_or(false);
    if is_quoted_printable {
        vcal::decode_quoted_printable(value)
    } else {
        value.to_string()
    }
}

fn parse_date_time(prop: &Property) -> Result<CalDateTime, Box<dyn Error>> {
    CalDateTime::parse(&raw_value(prop), params_of(prop))
}

/// `EXDATE` and `RDATE` lists. Periods only keep their start
fn parse_date_list(prop: &Property, ctx: &Context) -> Result<Vec<CalDateTime>, Box<dyn Error>> {
    let value = raw_value(prop);
    let separator = if ctx.is_vcal { ';' } else { ',' };
    value.split(separator)
        .map(str::trim)
        .filter(|v| v.is_empty() == false)
        .map(|v| {
            let start = v.split('/').next().unwrap_or(v);
            CalDateTime::parse(start, params_of(prop))
        })
        .collect()
}

fn parse_list(value: &str, ctx: &Context) -> Vec<String> {
    if ctx.is_vcal {
        value.split(';').map(|s| s.trim().to_string()).filter(|s| s.is_empty() == false).collect()
    } else {
        split_text_list(value)
    }
}

fn parse_attachment(value: &str, params: &[(String, Vec<String>)]) -> Attachment {
    let inline = param_value(params, "VALUE").map(|v| v.eq_ignore_ascii_case("BINARY")).unwrap_or(false)
        || param_value(params, "ENCODING").map(|v| v.eq_ignore_ascii_case("BASE64")).unwrap_or(false);
    Attachment {
        data: value.trim().to_string(),
        inline,
        mime_type: param_value(params, "FMTTYPE").map(|s| s.to_string()),
        label: param_value(params, "X-LABEL").or_else(|| param_value(params, "LABEL")).map(|s| s.to_string()),
    }
}

/// Fill the field matching a property shared by every incidence.
/// Returns `false` if this property is not one of them.
fn parse_base_property(base: &mut IncidenceBase, prop: &Property, ctx: &Context) -> Result<bool, Box<dyn Error>> {
    let params = params_of(prop);
    let value = raw_value(prop);

    match prop.name.to_ascii_uppercase().as_str() {
        "UID" => base.uid = value.trim().to_string(),
        "SUMMARY" => base.summary = unescape_text(&value),
        "DESCRIPTION" => base.description = unescape_text(&value),
        "LOCATION" => base.location = unescape_text(&value),
        "CATEGORIES" => base.categories.extend(parse_list(&value, ctx)),
        "RESOURCES" => base.resources.extend(parse_list(&value, ctx)),
        "CONTACT" => base.contacts.push(unescape_text(&value)),
        "COMMENT" => base.comments.push(unescape_text(&value)),
        "ORGANIZER" => base.organizer = Some(Person::from_cal_address(&value, params)),
        "ATTENDEE" if ctx.is_vcal && param_value(params, "ROLE").map(|r| r.eq_ignore_ascii_case("ORGANIZER")).unwrap_or(false) => {
            base.organizer = Some(Person::from_cal_address(&value, params));
        },
        "ATTENDEE" => base.attendees.push(Attendee::from_ical(&value, params)),
        "DTSTART" => base.dt_start = Some(parse_date_time(prop)?),
        "RECURRENCE-ID" => base.recurrence_id = Some(parse_date_time(prop)?),
        "CREATED" | "DCREATED" => base.created = Some(parse_utc(&value)?),
        "LAST-MODIFIED" => base.last_modified = Some(parse_utc(&value)?),
        "DTSTAMP" => base.dtstamp = Some(parse_utc(&value)?),
        "SEQUENCE" => base.sequence = value.trim().parse()?,
        "STATUS" => base.status = Status::from_ical(value.trim()),
        "CLASS" => base.secrecy = Secrecy::from_ical(value.trim()),
        "PRIORITY" => base.priority = value.trim().parse::<u8>()?.min(9),
        "RRULE" => {
            let rule = if ctx.is_vcal {
                RecurrenceRule::from_vcal(&value)?
            } else {
                value.parse::<RecurrenceRule>()?
            };
            base.recurrence.rrules.push(rule);
        },
        "EXDATE" => base.recurrence.exdates.extend(parse_date_list(prop, ctx)?),
        "RDATE" => base.recurrence.rdates.extend(parse_date_list(prop, ctx)?),
        "ATTACH" => base.attachments.push(parse_attachment(&value, params)),
        "URL" => base.url = Some(Url::parse(value.trim())?),
        "RELATED-TO" => {
            let is_parent = param_value(params, "RELTYPE").map(|r| r.eq_ignore_ascii_case("PARENT")).unwrap_or(true);
            if is_parent == false {
                return Ok(false);
            }
            base.related_to = Some(value.trim().to_string());
        },
        "AALARM" if ctx.is_vcal => base.alarms.push(Alarm::from_vcal(&value, AlarmAction::Audio)?),
        "DALARM" if ctx.is_vcal => base.alarms.push(Alarm::from_vcal(&value, AlarmAction::Display)?),
        "MALARM" if ctx.is_vcal => base.alarms.push(Alarm::from_vcal(&value, AlarmAction::Email)?),
        "PALARM" if ctx.is_vcal => base.alarms.push(Alarm::from_vcal(&value, AlarmAction::Procedure)?),
        _ => return Ok(false),
    }
    Ok(true)
}

/// Parse a property shared by every incidence, or keep it verbatim
fn parse_base_or_custom(base: &mut IncidenceBase, prop: &Property, ctx: &Context) -> Result<(), Box<dyn Error>> {
    if parse_base_property(base, prop, ctx)? == false {
        base.custom_properties.push(prop.clone());
    }
    Ok(())
}

fn warn_on_error(result: Result<(), Box<dyn Error>>, prop: &Property) {
    if let Err(err) = result {
        log::warn!("Ignoring invalid {} property: {}", prop.name, err);
    }
}

fn ensure_uid(base: &mut IncidenceBase) {
    if base.uid.is_empty() {
        base.uid = Uuid::new_v4().to_hyphenated().to_string();
        log::debug!("Incidence {:?} has no UID, using {}", base.summary, base.uid);
    }
}

fn parse_alarm(ical_alarm: &IcalAlarm) -> Option<Alarm> {
    let mut action = AlarmAction::Display;
    let mut trigger = None;
    let mut repeat = 0;
    let mut snooze = None;
    let mut description = String::new();

    for prop in &ical_alarm.properties {
        let value = raw_value(prop);
        let result: Result<(), Box<dyn Error>> = match prop.name.to_ascii_uppercase().as_str() {
            "ACTION" => { action = AlarmAction::from_ical(value.trim()); Ok(()) },
            "TRIGGER" => Alarm::parse_trigger(&value, params_of(prop)).map(|t| trigger = Some(t)),
            "REPEAT" => value.trim().parse::<u32>().map(|r| repeat = r).map_err(|err| err.into()),
            "DURATION" => parse_duration(&value).map(|d| snooze = Some(d)),
            "DESCRIPTION" => { description = unescape_text(&value); Ok(()) },
            _ => Ok(()),
        };
        warn_on_error(result, prop);
    }

    match trigger {
        None => {
            log::warn!("Ignoring an alarm without a trigger");
            None
        },
        Some(trigger) => {
            let mut alarm = Alarm::new(action, trigger);
            alarm.repeat = repeat;
            alarm.snooze = snooze;
            alarm.description = description;
            Some(alarm)
        },
    }
}

fn parse_event(ical_event: &IcalEvent, ctx: &Context) -> Event {
    let mut event = Event::default();
    let mut duration = None;

    for prop in &ical_event.properties {
        let result = match prop.name.to_ascii_uppercase().as_str() {
            "DTEND" => parse_date_time(prop).map(|end| event.dt_end = Some(end)),
            "DURATION" => parse_duration(&raw_value(prop)).map(|d| duration = Some(d)),
            "TRANSP" => {
                let value = raw_value(prop);
                event.transparency = match value.trim().to_ascii_uppercase().as_str() {
                    "TRANSPARENT" => Transparency::Transparent,
                    "OPAQUE" | "0" => Transparency::Opaque,
                    // vCalendar uses numbers, anything above 0 is transparent
                    other if ctx.is_vcal && other.parse::<u32>().is_ok() => Transparency::Transparent,
                    _ => Transparency::Opaque,
                };
                Ok(())
            },
            _ => parse_base_or_custom(&mut event.base, prop, ctx),
        };
        warn_on_error(result, prop);
    }

    if event.dt_end.is_none() {
        if let (Some(duration), Some(start)) = (duration, &event.base.dt_start) {
            event.dt_end = start.checked_add_duration(duration);
            if event.dt_end.is_none() {
                log::warn!("DURATION {} of {} goes out of range, ignoring it", duration, event.base.uid);
            }
        }
    }
    event.base.alarms.extend(ical_event.alarms.iter().filter_map(parse_alarm));
    if ctx.is_vcal {
        vcal::fix_all_day_event(&mut event);
    }
    ensure_uid(&mut event.base);
    event
}

fn parse_todo(ical_todo: &IcalTodo, ctx: &Context) -> Todo {
    let mut todo = Todo::default();
    let mut duration = None;

    for prop in &ical_todo.properties {
        let result: Result<(), Box<dyn Error>> = match prop.name.to_ascii_uppercase().as_str() {
            "DUE" => parse_date_time(prop).map(|due| todo.due = Some(due)),
            "DURATION" => parse_duration(&raw_value(prop)).map(|d| duration = Some(d)),
            "COMPLETED" => parse_utc(&raw_value(prop)).map(|date| todo.completion_status = CompletionStatus::Completed(Some(date))),
            "PERCENT-COMPLETE" => raw_value(prop).trim().parse::<u8>()
                .map(|p| todo.percent_complete = p.min(100))
                .map_err(|err| err.into()),
            _ => parse_base_or_custom(&mut todo.base, prop, ctx),
        };
        warn_on_error(result, prop);
    }

    if todo.due.is_none() {
        if let (Some(duration), Some(start)) = (duration, &todo.base.dt_start) {
            todo.due = start.checked_add_duration(duration);
            if todo.due.is_none() {
                log::warn!("DURATION {} of {} goes out of range, ignoring it", duration, todo.base.uid);
            }
        }
    }
    if todo.base.status == Status::Completed && todo.completed() == false {
        todo.completion_status = CompletionStatus::Completed(None);
    }
    if todo.completed() && todo.base.status == Status::None {
        todo.base.status = Status::Completed;
    }
    todo.base.alarms.extend(ical_todo.alarms.iter().filter_map(parse_alarm));
    if ctx.is_vcal {
        vcal::fix_all_day_todo(&mut todo);
    }
    ensure_uid(&mut todo.base);
    todo
}

fn parse_journal(ical_journal: &IcalJournal, ctx: &Context) -> Journal {
    let mut journal = Journal::default();
    for prop in &ical_journal.properties {
        warn_on_error(parse_base_or_custom(&mut journal.base, prop, ctx), prop);
    }
    ensure_uid(&mut journal.base);
    journal
}

fn parse_free_busy(ical_free_busy: &IcalFreeBusy, ctx: &Context) -> FreeBusy {
    let mut free_busy = FreeBusy::default();
    for prop in &ical_free_busy.properties {
        let result = match prop.name.to_ascii_uppercase().as_str() {
            "DTEND" => parse_date_time(prop).map(|end| free_busy.dt_end = Some(end)),
            "FREEBUSY" => {
                let fb_type = param_value(params_of(prop), "FBTYPE")
                    .map(FreeBusyType::from_ical)
                    .unwrap_or_default();
                raw_value(prop).split(',')
                    .filter(|p| p.trim().is_empty() == false)
                    .map(|p| FreeBusyPeriod::parse(p.trim(), fb_type))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|periods| free_busy.periods.extend(periods))
            },
            _ => parse_base_or_custom(&mut free_busy.base, prop, ctx),
        };
        warn_on_error(result, prop);
    }
    ensure_uid(&mut free_busy.base);
    free_busy
}
