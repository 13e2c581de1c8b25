//! Durations, reminders and date/time helpers

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::alarm::AlarmTrigger;
use crate::config::Locale;
use crate::datetime::CalDateTime;
use crate::incidence::Incidence;
use crate::stringify;

pub fn time_to_string(time: NaiveTime, locale: &Locale) -> String {
    stringify::format_time(time, locale)
}

pub fn date_to_string(date: NaiveDate, short: bool, locale: &Locale) -> String {
    stringify::format_date(date, short, locale)
}

pub fn date_time_to_string(value: &CalDateTime, all_day: bool, short: bool, locale: &Locale) -> String {
    stringify::format_date_time(value, all_day, short, locale)
}

/// A start/end pair: `2024-03-15, 09:00 - 10:30` on a single day,
/// `2024-03-15 22:00 - 2024-03-16 02:00` otherwise.
/// All-day values only show dates, and the end is omitted when it falls on the start day.
pub fn format_start_end(start: &CalDateTime, end: Option<&CalDateTime>, all_day: bool, locale: &Locale) -> String {
    let zone = locale.display_zone();
    let shown_start = start.to_display(zone);
    let end = match end {
        None => return date_time_to_string(start, all_day, true, locale),
        Some(end) => end,
    };
    let shown_end = end.to_display(zone);

    if all_day {
        // All-day ends are exclusive
        let last = match end {
            CalDateTime::Date(d) => d.pred_opt().unwrap_or(*d).max(shown_start.date()),
            _ => shown_end.date(),
        };
        if last == shown_start.date() {
            date_to_string(shown_start.date(), true, locale)
        } else {
            format!("{} - {}", date_to_string(shown_start.date(), true, locale), date_to_string(last, true, locale))
        }
    } else if shown_start.date() == shown_end.date() {
        format!(
            "{}, {} - {}",
            date_to_string(shown_start.date(), true, locale),
            time_to_string(shown_start.time(), locale),
            time_to_string(shown_end.time(), locale)
        )
    } else {
        format!("{} - {}", date_time_to_string(start, false, true, locale), date_time_to_string(end, false, true, locale))
    }
}

fn plural(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// `1 day 2 hours 30 minutes`. Zero parts are left out
pub(crate) fn span_string(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().abs();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day", "days"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour", "hours"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute", "minutes"));
    }
    if parts.is_empty() {
        return plural(0, "minute", "minutes");
    }
    parts.join(" ")
}

fn start_end_duration(start: &CalDateTime, end: &CalDateTime, all_day: bool) -> String {
    if all_day {
        let days = (end.date() - start.date()).num_days();
        // Date ends are exclusive, but an event that ends on its start day still lasts one day
        let days = match end {
            CalDateTime::Date(_) => days.max(1),
            _ => days + 1,
        };
        plural(days, "day", "days")
    } else {
        span_string(start.duration_until(end))
    }
}

/// How long an event (or a to-do between its start and due dates) lasts
pub fn duration_string(incidence: &Incidence) -> String {
    match incidence {
        Incidence::Event(event) => match (event.base.dt_start.as_ref(), event.dt_end.as_ref()) {
            (Some(start), Some(end)) => start_end_duration(start, end, event.all_day()),
            (Some(_), None) => "forever".to_string(),
            (None, _) => String::new(),
        },
        Incidence::Todo(todo) => match (todo.base.dt_start.as_ref(), todo.due.as_ref()) {
            (Some(start), Some(due)) => start_end_duration(start, due, todo.all_day()),
            _ => String::new(),
        },
        Incidence::Journal(_) | Incidence::FreeBusy(_) => String::new(),
    }
}

/// One line per alarm: `15 minutes before the start`, `1 hour after the end`, or the time it rings at
pub fn reminder_string_list(incidence: &Incidence, locale: &Locale, short: bool) -> Vec<String> {
    let all_day = incidence.all_day();
    incidence.base().alarms.iter()
        .map(|alarm| {
            let (offset, from_end) = match &alarm.trigger {
                AlarmTrigger::Absolute(at) => return stringify::format_timestamp(at, short, locale),
                AlarmTrigger::StartOffset(offset) => (*offset, false),
                AlarmTrigger::EndOffset(offset) => (*offset, true),
            };

            if offset.num_minutes() == 0 {
                let anchor = if from_end { incidence.date_end() } else { incidence.dt_start() };
                if let Some(anchor) = anchor {
                    return date_time_to_string(anchor, all_day, short, locale);
                }
            }

            let direction = if offset < Duration::zero() { "before" } else { "after" };
            let reference = if from_end { "end" } else { "start" };
            format!("{} {} the {}", span_string(offset), direction, reference)
        })
        .collect()
}
