//! Plain-text summaries for mail bodies

use crate::config::Locale;
use crate::datetime::CalDateTime;
use crate::incidence::Incidence;

use super::duration::{date_to_string, time_to_string};
use super::recurrence::recurrence_string;

fn push_line(body: &mut String, label: &str, value: &str) {
    if value.is_empty() == false {
        body.push_str(label);
        body.push(' ');
        body.push_str(value);
        body.push('\n');
    }
}

/// `Start Date:` and `Start Time:` lines (the time only for timed values)
fn push_date_time(body: &mut String, prefix: &str, value: &CalDateTime, all_day: bool, locale: &Locale) {
    let shown = value.to_display(locale.display_zone());
    push_line(body, &format!("{} Date:", prefix), &date_to_string(shown.date(), true, locale));
    if all_day == false && value.is_all_day() == false {
        push_line(body, &format!("{} Time:", prefix), &time_to_string(shown.time(), locale));
    }
}

/// A plain-text description of an incidence, as put in the body of a mail about it
pub fn mail_body_str(incidence: &Incidence, locale: &Locale) -> String {
    let base = incidence.base();
    let all_day = incidence.all_day();
    let mut body = String::new();

    push_line(&mut body, "Summary:", &base.summary);
    if let Some(organizer) = &base.organizer {
        push_line(&mut body, "Organizer:", &organizer.full_name());
    }
    push_line(&mut body, "Location:", &base.location);

    match incidence {
        Incidence::Event(event) => {
            if let Some(start) = &event.base.dt_start {
                push_date_time(&mut body, "Start", start, all_day, locale);
            }
            if let Some(end) = &event.dt_end {
                let shown_end = match end {
                    CalDateTime::Date(d) => CalDateTime::Date(d.pred_opt().unwrap_or(*d)),
                    other => other.clone(),
                };
                push_date_time(&mut body, "End", &shown_end, all_day, locale);
            }
        },
        Incidence::Todo(todo) => {
            if let Some(start) = &todo.base.dt_start {
                push_date_time(&mut body, "Start", start, all_day, locale);
            }
            if let Some(due) = &todo.due {
                push_date_time(&mut body, "Due", due, all_day, locale);
            }
        },
        Incidence::Journal(_) | Incidence::FreeBusy(_) => {
            if let Some(start) = &base.dt_start {
                push_date_time(&mut body, "Start", start, all_day, locale);
            }
        },
    }

    if incidence.recurs() {
        push_line(&mut body, "Recurs:", &recurrence_string(incidence, locale));
    }
    if base.description.is_empty() == false {
        body.push_str("Details:\n");
        body.push_str(&base.description);
        body.push('\n');
    }
    body
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::attendee::Person;
    use crate::{Event, Todo};

    #[test]
    fn test_event_body() {
        let start = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let end = start + chrono::Duration::minutes(90);
        let mut event = Event::new_with_times("Kick-off", CalDateTime::Floating(start), Some(CalDateTime::Floating(end)));
        event.base.organizer = Some(Person::new("Dana", "dana@example.com"));
        event.base.location = "Room 4".to_string();
        event.base.description = "Agenda:\n1. Goals".to_string();
        event.base.recurrence.rrules.push("FREQ=WEEKLY;COUNT=4".parse().unwrap());

        assert_eq!(
            mail_body_str(&event.into(), &Locale::default()),
            "Summary: Kick-off\n\
             Organizer: Dana <dana@example.com>\n\
             Location: Room 4\n\
             Start Date: 2024-09-02\n\
             Start Time: 09:30\n\
             End Date: 2024-09-02\n\
             End Time: 11:00\n\
             Recurs: Recurs weekly on Mon (4 occurrences)\n\
             Details:\n\
             Agenda:\n1. Goals\n"
        );
    }

    #[test]
    fn test_all_day_todo_body() {
        let mut todo = Todo::new("Renew passport");
        todo.due = Some(CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()));
        assert_eq!(
            mail_body_str(&todo.into(), &Locale::default()),
            "Summary: Renew passport\nDue Date: 2024-11-30\n"
        );
    }
}
