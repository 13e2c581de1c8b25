//! The full HTML view of an incidence

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::calendar::Calendar;
use crate::config::Locale;
use crate::datetime::CalDateTime;
use crate::incidence::{Incidence, Secrecy, Status};
use crate::stringify;

use super::duration::{date_time_to_string, duration_string, reminder_string_list};
use super::recurrence::recurrence_string;
use super::tooltip::attendees_by_role;
use super::{dates_on, escape, plain_to_html, resource_string, templates};

fn row(label: &str, value: String) -> Value {
    json!({ "label": label, "value": value })
}

fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

/// The last day of an all-day range, whose end is exclusive
fn inclusive_end(end: &CalDateTime) -> CalDateTime {
    match end {
        CalDateTime::Date(d) => CalDateTime::Date(d.pred_opt().unwrap_or(*d)),
        other => other.clone(),
    }
}

fn date_rows(incidence: &Incidence, date: Option<NaiveDate>, locale: &Locale) -> Vec<Value> {
    let all_day = incidence.all_day();
    let (start, end) = dates_on(incidence, date);
    let long = |value: &CalDateTime| escape(&date_time_to_string(value, all_day, false, locale));
    let mut rows = Vec::new();

    match incidence {
        Incidence::Event(_) => {
            if let Some(start) = &start {
                rows.push(row("Start", long(start)));
            }
            if let Some(end) = &end {
                let shown = if all_day { inclusive_end(end) } else { end.clone() };
                rows.push(row("End", long(&shown)));
            }
            let duration = duration_string(incidence);
            if duration.is_empty() == false {
                rows.push(row("Duration", escape(&duration)));
            }
        },
        Incidence::Todo(todo) => {
            if let Some(start) = &start {
                rows.push(row("Start", long(start)));
            }
            if let Some(due) = &end {
                rows.push(row("Due", long(due)));
            }
            if todo.completed() {
                rows.push(row("Completed", escape(&stringify::todo_completed_date_time(todo, false, locale))));
            } else {
                rows.push(row("Percent complete", format!("{}%", todo.percent_complete)));
            }
        },
        Incidence::Journal(_) => {
            if let Some(start) = &start {
                rows.push(row("Date", long(start)));
            }
        },
        Incidence::FreeBusy(free_busy) => {
            if let Some(start) = &start {
                rows.push(row("Start", long(start)));
            }
            if let Some(end) = &end {
                rows.push(row("End", long(end)));
            }
            for period in free_busy.busy_periods() {
                rows.push(row(
                    "Busy",
                    escape(&format!(
                        "{} - {}",
                        stringify::format_timestamp(&period.start, false, locale),
                        stringify::format_timestamp(&period.end, false, locale),
                    )),
                ));
            }
        },
    }
    rows
}

/// Every populated field of an incidence, as an HTML fragment.
///
/// `calendar` is where the incidence is stored, if known. `date` is the occurrence to show for recurring incidences.
/// Returns an empty string when there is no incidence.
pub fn extensive_display_str(calendar: Option<&Calendar>, incidence: Option<&Incidence>, date: Option<NaiveDate>, locale: &Locale) -> String {
    let incidence = match incidence {
        None => return String::new(),
        Some(i) => i,
    };
    let base = incidence.base();

    let mut rows = Vec::new();
    if let Some(calendar) = calendar {
        let name = resource_string(calendar, incidence);
        if name.is_empty() == false {
            rows.push(row("Calendar", escape(&name)));
        }
    }
    rows.extend(date_rows(incidence, date, locale));

    if incidence.recurs() {
        rows.push(row("Recurrence", escape(&recurrence_string(incidence, locale))));
    }
    if base.location.is_empty() == false {
        rows.push(row("Location", escape(&base.location)));
    }
    if base.description.is_empty() == false {
        rows.push(row("Description", plain_to_html(&base.description)));
    }
    if let Some(organizer) = &base.organizer {
        let value = if organizer.email.is_empty() {
            escape(organizer.display_name())
        } else {
            link(&organizer.cal_address(), organizer.display_name())
        };
        rows.push(row("Organizer", value));
    }
    if base.status != Status::None {
        rows.push(row("Status", escape(&stringify::incidence_status(&base.status))));
    }
    if base.secrecy != Secrecy::Public {
        rows.push(row("Access", escape(stringify::incidence_secrecy(base.secrecy))));
    }
    if base.priority > 0 {
        rows.push(row("Priority", base.priority.to_string()));
    }
    if base.categories.is_empty() == false {
        rows.push(row("Categories", escape(&base.categories.join(", "))));
    }
    if base.resources.is_empty() == false {
        rows.push(row("Resources", escape(&base.resources.join(", "))));
    }
    for contact in &base.contacts {
        rows.push(row("Contact", escape(contact)));
    }
    for comment in &base.comments {
        rows.push(row("Comment", plain_to_html(comment)));
    }
    if let Some(url) = &base.url {
        rows.push(row("URL", link(url.as_str(), url.as_str())));
    }
    let reminders = reminder_string_list(incidence, locale, false);
    if reminders.is_empty() == false {
        let reminders: Vec<String> = reminders.iter().map(|r| escape(r)).collect();
        rows.push(row("Reminders", reminders.join("<br>")));
    }

    let attendees: Vec<Value> = attendees_by_role(base).into_iter()
        .flat_map(|(_, attendees)| attendees)
        .map(|attendee| {
            let name = if attendee.email().is_empty() {
                escape(attendee.person.display_name())
            } else {
                link(&attendee.person.cal_address(), attendee.person.display_name())
            };
            json!({
                "name": name,
                "role": stringify::attendee_role(attendee.role),
                "status": stringify::attendee_status(attendee.status),
            })
        })
        .collect();

    let attachments: Vec<String> = base.attachments.iter()
        .map(|attachment| if attachment.inline {
            escape(attachment.display_name())
        } else {
            link(&attachment.data, attachment.display_name())
        })
        .collect();

    let mut footer = Vec::new();
    if let Some(created) = &base.created {
        footer.push(format!("Creation date: {}.", stringify::format_timestamp(created, true, locale)));
    }
    if let Some(modified) = &base.last_modified {
        footer.push(format!("Last modified: {}.", stringify::format_timestamp(modified, true, locale)));
    }

    let title = if base.summary.is_empty() {
        format!("({})", stringify::incidence_type(incidence.incidence_type()))
    } else {
        escape(&base.summary)
    };
    let data = json!({
        "title": title,
        "rows": rows,
        "attendees_title": "Attendees",
        "attendees": attendees,
        "attachments": attachments,
        "footer": footer.join(" "),
    });
    templates::render(templates::DISPLAY, &data)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::attendee::{Attendee, PartStat, Person, Role};
    use crate::incidence::Attachment;
    use crate::{Event, Todo};

    #[test]
    fn test_no_incidence() {
        assert_eq!(extensive_display_str(None, None, None, &Locale::default()), "");
    }

    #[test]
    fn test_event_display() {
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let mut event = Event::new_with_times("Summer party", CalDateTime::Date(day), Some(CalDateTime::Date(day.succ_opt().unwrap())));
        event.base.description = "Bring food\n& drinks".to_string();
        event.base.organizer = Some(Person::new("Alice", "alice@example.com"));
        event.base.attendees = vec![
            Attendee::new("Carol", "carol@example.com", Role::OptParticipant, PartStat::Tentative),
            Attendee::new("Bob", "bob@example.com", Role::ReqParticipant, PartStat::Accepted),
        ];
        event.base.attachments.push(Attachment::from_uri("https://example.com/map.png"));
        event.base.status = Status::Confirmed;
        event.base.created = Some(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
        let incidence: Incidence = event.into();

        let mut calendar = Calendar::new("Friends");
        calendar.add_incidence(incidence.clone());

        let html = extensive_display_str(Some(&calendar), Some(&incidence), None, &Locale::default());
        assert!(html.contains("<h2>Summer party</h2>"));
        assert!(html.contains("<th class=\"label\">Calendar:</th><td>Friends</td>"));
        assert!(html.contains("<th class=\"label\">Start:</th><td>Monday, July 1, 2024</td>"));
        assert!(html.contains("<th class=\"label\">End:</th><td>Monday, July 1, 2024</td>"));
        assert!(html.contains("<th class=\"label\">Duration:</th><td>1 day</td>"));
        assert!(html.contains("Bring food<br>&amp; drinks"));
        assert!(html.contains("<a href=\"mailto:alice@example.com\">Alice</a>"));
        assert!(html.contains("<th class=\"label\">Status:</th><td>Confirmed</td>"));
        // Required participants come before optional ones
        let bob = html.find("Bob").unwrap();
        let carol = html.find("Carol").unwrap();
        assert!(bob < carol);
        assert!(html.contains("<td>Optional Participant</td><td>Tentative</td>"));
        assert!(html.contains("<li><a href=\"https://example.com/map.png\">"));
        assert!(html.contains("Creation date: 2024-06-01 08:00."));
    }

    #[test]
    fn test_todo_display() {
        let mut todo = Todo::new("Paint the fence");
        todo.base.priority = 2;
        todo.percent_complete = 50;
        let html = extensive_display_str(None, Some(&todo.into()), None, &Locale::default());
        assert!(html.contains("<td>50%</td>"));
        assert!(html.contains("<th class=\"label\">Priority:</th><td>2</td>"));
        assert!(html.contains("attendees") == false);
    }
}
