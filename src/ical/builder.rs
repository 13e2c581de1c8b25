//! A module to build ICal files

use std::error::Error;

use chrono::Utc;
use ics::components::{Parameter, Property};
use ics::properties::{Action, Trigger};
use ics::{escape_text, ICalendar};

use crate::alarm::{Alarm, AlarmTrigger};
use crate::attendee::{Attendee, CuType, Person};
use crate::calendar::Calendar;
use crate::datetime::{format_duration, format_utc, CalDateTime};
use crate::event::Transparency;
use crate::incidence::{Attachment, Incidence, IncidenceBase};

/// Create an iCalendar 2.0 payload holding every incidence of a calendar
pub fn build_calendar(calendar: &Calendar, method: Option<&str>) -> Result<String, Box<dyn Error>> {
    let mut ical = ICalendar::new("2.0", crate::config::prod_id());
    if let Some(method) = method {
        ical.push(Property::new("METHOD", method.to_ascii_uppercase()));
    }
    if calendar.name().is_empty() == false {
        ical.push(Property::new("X-WR-CALNAME", escape_text(calendar.name().to_string())));
    }
    for incidence in calendar.incidences() {
        add_incidence(&mut ical, incidence);
    }
    Ok(ical.to_string())
}

/// Create an iCalendar 2.0 payload holding the given incidences
pub fn build_incidences<'a, I>(incidences: I, method: Option<&str>) -> Result<String, Box<dyn Error>>
where
    I: IntoIterator<Item = &'a Incidence>,
{
    let mut ical = ICalendar::new("2.0", crate::config::prod_id());
    if let Some(method) = method {
        ical.push(Property::new("METHOD", method.to_ascii_uppercase()));
    }
    for incidence in incidences {
        add_incidence(&mut ical, incidence);
    }
    Ok(ical.to_string())
}

fn add_incidence(ical: &mut ICalendar<'static>, incidence: &Incidence) {
    let base = incidence.base();
    let dtstamp = format_utc(&base.dtstamp.or(base.last_modified).unwrap_or_else(Utc::now));
    let properties = base_properties(base);

    match incidence {
        Incidence::Event(event) => {
            let mut component = ics::Event::new(base.uid.clone(), dtstamp);
            properties.into_iter().for_each(|p| component.push(p));
            if let Some(end) = &event.dt_end {
                component.push(date_time_property("DTEND", end));
            }
            if event.transparency == Transparency::Transparent {
                component.push(Property::new("TRANSP", "TRANSPARENT"));
            }
            base.alarms.iter().for_each(|a| component.add_alarm(build_alarm(a)));
            ical.add_event(component);
        },
        Incidence::Todo(todo) => {
            let mut component = ics::ToDo::new(base.uid.clone(), dtstamp);
            properties.into_iter().for_each(|p| component.push(p));
            if let Some(due) = &todo.due {
                component.push(date_time_property("DUE", due));
            }
            if let Some(completed) = todo.completion_date() {
                component.push(Property::new("COMPLETED", format_utc(completed)));
            }
            if todo.percent_complete > 0 {
                component.push(Property::new("PERCENT-COMPLETE", todo.percent_complete.to_string()));
            }
            base.alarms.iter().for_each(|a| component.add_alarm(build_alarm(a)));
            ical.add_todo(component);
        },
        Incidence::Journal(_) => {
            let mut component = ics::Journal::new(base.uid.clone(), dtstamp);
            properties.into_iter().for_each(|p| component.push(p));
            ical.add_journal(component);
        },
        Incidence::FreeBusy(free_busy) => {
            let mut component = ics::FreeBusy::new(base.uid.clone(), dtstamp);
            properties.into_iter().for_each(|p| component.push(p));
            if let Some(end) = &free_busy.dt_end {
                component.push(date_time_property("DTEND", end));
            }
            for period in &free_busy.periods {
                let mut prop = Property::new("FREEBUSY", period.to_ical());
                prop.add(Parameter::new("FBTYPE", period.fb_type.as_ical()));
                component.push(prop);
            }
            ical.add_freebusy(component);
        },
    }
}

/// Parameter values that contain separators must be quoted
pub(super) fn param_text(value: &str) -> String {
    if value.contains(|c| c == ':' || c == ';' || c == ',') {
        format!("\"{}\"", value.replace('"', "'"))
    } else {
        value.to_string()
    }
}

fn text_property(name: &'static str, value: &str) -> Property<'static> {
    Property::new(name, escape_text(value.to_string()))
}

fn list_property(name: &'static str, values: &[String]) -> Property<'static> {
    let joined = values.iter()
        .map(|v| escape_text(v.clone()).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    Property::new(name, joined)
}

pub(super) fn date_time_property(name: &'static str, value: &CalDateTime) -> Property<'static> {
    let (text, params) = value.to_ics();
    let mut prop = Property::new(name, text);
    for (key, param) in params {
        prop.add(Parameter::new(key, param));
    }
    prop
}

fn person_property(name: &'static str, person: &Person) -> Property<'static> {
    let mut prop = Property::new(name, person.cal_address());
    if person.name.is_empty() == false {
        prop.add(Parameter::new("CN", param_text(&person.name)));
    }
    prop
}

fn attendee_property(attendee: &Attendee) -> Property<'static> {
    let mut prop = person_property("ATTENDEE", &attendee.person);
    prop.add(Parameter::new("ROLE", attendee.role.as_ical()));
    prop.add(Parameter::new("PARTSTAT", attendee.status.as_ical()));
    if attendee.rsvp {
        prop.add(Parameter::new("RSVP", "TRUE"));
    }
    if attendee.cu_type != CuType::Individual {
        prop.add(Parameter::new("CUTYPE", attendee.cu_type.as_ical()));
    }
    if attendee.delegate.is_empty() == false {
        prop.add(Parameter::new("DELEGATED-TO", format!("\"mailto:{}\"", attendee.delegate)));
    }
    if attendee.delegator.is_empty() == false {
        prop.add(Parameter::new("DELEGATED-FROM", format!("\"mailto:{}\"", attendee.delegator)));
    }
    prop
}

fn attachment_property(attachment: &Attachment) -> Property<'static> {
    let mut prop = Property::new("ATTACH", attachment.data.clone());
    if attachment.inline {
        prop.add(Parameter::new("VALUE", "BINARY"));
        prop.add(Parameter::new("ENCODING", "BASE64"));
    }
    if let Some(mime_type) = &attachment.mime_type {
        prop.add(Parameter::new("FMTTYPE", mime_type.clone()));
    }
    if let Some(label) = &attachment.label {
        prop.add(Parameter::new("X-LABEL", param_text(label)));
    }
    prop
}

/// Re-emit a property that was kept verbatim
pub(super) fn custom_property(prop: &ical::property::Property) -> Property<'static> {
    let mut out = Property::new(prop.name.clone(), prop.value.clone().unwrap_or_default());
    for (key, values) in prop.params.iter().flatten() {
        let joined = values.iter().map(|v| param_text(v)).collect::<Vec<_>>().join(",");
        out.add(Parameter::new(key.clone(), joined));
    }
    out
}

fn build_alarm(alarm: &Alarm) -> ics::Alarm<'static> {
    let trigger = match &alarm.trigger {
        AlarmTrigger::StartOffset(offset) => Trigger::new(format_duration(offset)),
        AlarmTrigger::EndOffset(offset) => {
            let mut trigger = Trigger::new(format_duration(offset));
            trigger.add(Parameter::new("RELATED", "END"));
            trigger
        },
        AlarmTrigger::Absolute(at) => {
            let mut trigger = Trigger::new(format_utc(at));
            trigger.add(Parameter::new("VALUE", "DATE-TIME"));
            trigger
        },
    };

    let mut component = ics::Alarm::new(Action::new(alarm.action.as_ical()), trigger);
    if alarm.description.is_empty() == false {
        component.push(text_property("DESCRIPTION", &alarm.description));
    }
    if alarm.repeat > 0 {
        component.push(Property::new("REPEAT", alarm.repeat.to_string()));
    }
    if let Some(snooze) = &alarm.snooze {
        component.push(Property::new("DURATION", format_duration(snooze)));
    }
    component
}

/// The properties shared by every kind of incidence (except `UID` and `DTSTAMP`)
fn base_properties(base: &IncidenceBase) -> Vec<Property<'static>> {
    let mut props = Vec::new();

    if let Some(created) = &base.created {
        props.push(Property::new("CREATED", format_utc(created)));
    }
    if let Some(last_modified) = &base.last_modified {
        props.push(Property::new("LAST-MODIFIED", format_utc(last_modified)));
    }
    if let Some(start) = &base.dt_start {
        props.push(date_time_property("DTSTART", start));
    }
    if let Some(recurrence_id) = &base.recurrence_id {
        props.push(date_time_property("RECURRENCE-ID", recurrence_id));
    }
    if base.summary.is_empty() == false {
        props.push(text_property("SUMMARY", &base.summary));
    }
    if base.description.is_empty() == false {
        props.push(text_property("DESCRIPTION", &base.description));
    }
    if base.location.is_empty() == false {
        props.push(text_property("LOCATION", &base.location));
    }
    if base.categories.is_empty() == false {
        props.push(list_property("CATEGORIES", &base.categories));
    }
    if base.resources.is_empty() == false {
        props.push(list_property("RESOURCES", &base.resources));
    }
    for contact in &base.contacts {
        props.push(text_property("CONTACT", contact));
    }
    for comment in &base.comments {
        props.push(text_property("COMMENT", comment));
    }
    if let Some(organizer) = &base.organizer {
        props.push(person_property("ORGANIZER", organizer));
    }
    props.extend(base.attendees.iter().map(attendee_property));
    if base.sequence > 0 {
        props.push(Property::new("SEQUENCE", base.sequence.to_string()));
    }
    if let Some(status) = base.status.as_ical() {
        props.push(Property::new("STATUS", status.to_string()));
    }
    if base.secrecy != crate::incidence::Secrecy::Public {
        props.push(Property::new("CLASS", base.secrecy.as_ical()));
    }
    if base.priority > 0 {
        props.push(Property::new("PRIORITY", base.priority.to_string()));
    }
    for rule in &base.recurrence.rrules {
        props.push(Property::new("RRULE", rule.to_string()));
    }
    for exdate in &base.recurrence.exdates {
        props.push(date_time_property("EXDATE", exdate));
    }
    for rdate in &base.recurrence.rdates {
        props.push(date_time_property("RDATE", rdate));
    }
    props.extend(base.attachments.iter().map(attachment_property));
    if let Some(url) = &base.url {
        props.push(Property::new("URL", url.to_string()));
    }
    if let Some(parent) = &base.related_to {
        props.push(Property::new("RELATED-TO", parent.clone()));
    }
    props.extend(base.custom_properties.iter().map(custom_property));

    props
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use crate::attendee::{PartStat, Role};
    use crate::config::{ORG_NAME, PRODUCT_NAME};
    use crate::{Event, Todo};

    #[test]
    fn test_ical_from_todo() {
        let now = Utc.with_ymd_and_hms(2021, 3, 21, 0, 16, 0).unwrap();
        let s_now = format_utc(&now);

        let mut todo = Todo::new("This is a task with ÜTF-8 characters");
        todo.set_completion_status(crate::todo::CompletionStatus::Completed(Some(now)));
        todo.base.created = None;
        todo.base.last_modified = Some(now);
        todo.base.dtstamp = Some(now);
        let uid = todo.base.uid.clone();

        let expected_ical = format!("BEGIN:VCALENDAR\r\n\
            VERSION:2.0\r\n\
            PRODID:-//{}//{}//EN\r\n\
            BEGIN:VTODO\r\n\
            UID:{}\r\n\
            DTSTAMP:{}\r\n\
            LAST-MODIFIED:{}\r\n\
            SUMMARY:This is a task with ÜTF-8 characters\r\n\
            STATUS:COMPLETED\r\n\
            COMPLETED:{}\r\n\
            PERCENT-COMPLETE:100\r\n\
            END:VTODO\r\n\
            END:VCALENDAR\r\n",
            ORG_NAME.lock().unwrap(), PRODUCT_NAME.lock().unwrap(), uid, s_now, s_now, s_now);

        let ical = build_incidences(&[Incidence::Todo(todo)], None);
        assert_eq!(ical.unwrap(), expected_ical);
    }

    #[test]
    fn test_event_round_trip() {
        let start = CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let end = CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        let mut event = Event::new_with_times("Lake; weekend, 2 days", start, Some(end));
        event.base.categories = vec!["Trips".to_string(), "A, B".to_string()];
        event.base.attendees.push(Attendee::new("Doe, John", "john@example.com", Role::Chair, PartStat::Accepted));
        event.base.recurrence.rrules.push("FREQ=YEARLY".parse().unwrap());

        let mut calendar = Calendar::new("Holidays");
        calendar.add_incidence(Incidence::Event(event.clone()));
        let text = build_calendar(&calendar, Some("publish")).unwrap();
        assert!(text.contains("METHOD:PUBLISH\r\n"));
        assert!(text.contains("DTSTART;VALUE=DATE:20240601\r\n"));

        let parsed = crate::ical::parse_calendar(&text).unwrap();
        assert_eq!(parsed.name(), "Holidays");
        let parsed_event = parsed.events()[0];
        assert_eq!(parsed_event.base.summary, event.base.summary);
        assert_eq!(parsed_event.base.categories, event.base.categories);
        assert_eq!(parsed_event.dt_end, event.dt_end);
        assert_eq!(parsed_event.base.attendees[0].name(), "Doe, John");
        assert_eq!(parsed_event.base.recurrence, event.base.recurrence);
    }
}
