//! Tooltips: a short HTML summary of an incidence

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::attendee::{Attendee, Role};
use crate::config::Locale;
use crate::incidence::{Incidence, IncidenceBase};
use crate::stringify;

use super::duration::{date_time_to_string, duration_string, format_start_end, reminder_string_list};
use super::recurrence::recurrence_string;
use super::{dates_on, escape, plain_to_html, sanitize_html, templates, truncate};

const DESCRIPTION_MAX_CHARS: usize = 120;
const ROLES: [Role; 4] = [Role::Chair, Role::ReqParticipant, Role::OptParticipant, Role::NonParticipant];

/// Attendees grouped by role, in decreasing order of importance. Empty groups are left out
pub(crate) fn attendees_by_role(base: &IncidenceBase) -> Vec<(Role, Vec<&Attendee>)> {
    ROLES.iter()
        .map(|role| (*role, base.attendees.iter().filter(|a| a.role == *role).collect::<Vec<_>>()))
        .filter(|(_, attendees)| attendees.is_empty() == false)
        .collect()
}

fn role_heading(role: Role) -> &'static str {
    match role {
        Role::Chair => "Chair",
        Role::ReqParticipant => "Participants",
        Role::OptParticipant => "Optional participants",
        Role::NonParticipant => "Observers",
    }
}

fn row(label: &str, value: String) -> Value {
    json!({ "label": label, "value": value })
}

fn date_rows(incidence: &Incidence, date: Option<NaiveDate>, locale: &Locale) -> Vec<Value> {
    let all_day = incidence.all_day();
    let (start, end) = dates_on(incidence, date);
    let mut rows = Vec::new();

    match incidence {
        Incidence::Event(_) => {
            if let Some(start) = &start {
                rows.push(row("When", escape(&format_start_end(start, end.as_ref(), all_day, locale))));
                let duration = duration_string(incidence);
                if duration.is_empty() == false && all_day == false {
                    rows.push(row("Duration", escape(&duration)));
                }
            }
        },
        Incidence::Todo(todo) => {
            if let Some(start) = &start {
                rows.push(row("Start", escape(&date_time_to_string(start, all_day, true, locale))));
            }
            if let Some(due) = &end {
                rows.push(row("Due", escape(&date_time_to_string(due, all_day, true, locale))));
            }
            if todo.completed() {
                let when = stringify::todo_completed_date_time(todo, true, locale);
                rows.push(row("Completed", escape(&when)));
            } else if todo.percent_complete > 0 {
                rows.push(row("Percent complete", format!("{}%", todo.percent_complete)));
            }
        },
        Incidence::Journal(_) => {
            if let Some(start) = &start {
                rows.push(row("Date", escape(&date_time_to_string(start, all_day, true, locale))));
            }
        },
        Incidence::FreeBusy(free_busy) => {
            if let Some(start) = &start {
                rows.push(row("Period", escape(&format_start_end(start, end.as_ref(), false, locale))));
            }
            let periods: Vec<String> = free_busy.busy_periods().iter()
                .map(|p| escape(&format!(
                    "{} - {}",
                    stringify::format_timestamp(&p.start, true, locale),
                    stringify::format_timestamp(&p.end, true, locale),
                )))
                .collect();
            if periods.is_empty() == false {
                rows.push(row("Busy", periods.join("<br>")));
            }
        },
    }
    rows
}

/// A short HTML description of an incidence, to be shown when hovering it.
///
/// `source_name` is the name of the calendar it comes from. `date` is the day of the occurrence that is hovered,
/// which matters for recurring incidences. With `rich_text`, the description is already HTML: it is inserted after [`sanitize_html`].
///
/// Returns an empty string when there is no incidence.
pub fn tool_tip_str(source_name: &str, incidence: Option<&Incidence>, date: Option<NaiveDate>, rich_text: bool, locale: &Locale) -> String {
    let incidence = match incidence {
        None => return String::new(),
        Some(i) => i,
    };
    let base = incidence.base();

    let mut rows = Vec::new();
    if source_name.is_empty() == false {
        rows.push(row("Calendar", escape(source_name)));
    }
    rows.extend(date_rows(incidence, date, locale));

    if incidence.recurs() {
        rows.push(row("Recurrence", escape(&recurrence_string(incidence, locale))));
    }
    if base.location.is_empty() == false {
        rows.push(row("Location", escape(&base.location)));
    }
    if base.description.is_empty() == false {
        let description = if rich_text {
            sanitize_html(&base.description)
        } else {
            plain_to_html(&truncate(&base.description, DESCRIPTION_MAX_CHARS))
        };
        rows.push(row("Description", description));
    }
    if let Some(organizer) = &base.organizer {
        rows.push(row("Organizer", escape(&organizer.full_name())));
    }
    for (role, attendees) in attendees_by_role(base) {
        let names: Vec<String> = attendees.iter().map(|a| escape(a.person.display_name())).collect();
        rows.push(row(role_heading(role), names.join("<br>")));
    }
    if base.categories.is_empty() == false {
        rows.push(row("Categories", escape(&base.categories.join(", "))));
    }
    let reminders = reminder_string_list(incidence, locale, true);
    if reminders.is_empty() == false {
        let reminders: Vec<String> = reminders.iter().map(|r| escape(r)).collect();
        rows.push(row("Reminders", reminders.join("<br>")));
    }

    let title = if base.summary.is_empty() {
        format!("({})", stringify::incidence_type(incidence.incidence_type()))
    } else {
        escape(&base.summary)
    };
    templates::render(templates::TOOLTIP, &json!({ "title": title, "rows": rows }))
}
