//! Human-readable renderings of incidences: recurrence and duration strings, tooltips,
//! full HTML views, mail bodies and iTIP invitations.
//!
//! Every function here is a plain function of the incidence, the [`Locale`] and (sometimes) a date.
//! Nothing fails: a missing incidence or an unrenderable template yields an empty string.

mod templates;
mod recurrence;
mod duration;
mod tooltip;
mod display;
mod mail;
mod sanitize;
pub mod invitation;

pub use recurrence::recurrence_string;
pub use duration::{duration_string, reminder_string_list};
pub use duration::{time_to_string, date_to_string, date_time_to_string, format_start_end};
pub use tooltip::tool_tip_str;
pub use display::extensive_display_str;
pub use mail::mail_body_str;
pub use sanitize::sanitize_html;
pub use invitation::{format_ical_invitation, format_ical_invitation_no_html};

use chrono::{NaiveDate, Weekday};

use crate::calendar::Calendar;
use crate::config::Locale;
use crate::datetime::CalDateTime;
use crate::incidence::Incidence;

/// `1st`, `2nd`, `3rd`, `11th`, `22nd`...
pub fn ordinal(n: i32) -> String {
    let n = n.abs();
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// `Mon` or `Monday`
pub fn weekday_name(day: Weekday, short: bool) -> String {
    // 2024-01-01 is a Monday
    let reference = NaiveDate::from_ymd_opt(2024, 1, 1 + day.num_days_from_monday())
        .unwrap_or(NaiveDate::MIN);
    reference.format(if short { "%a" } else { "%A" }).to_string()
}

/// `January`...`December`. Out-of-range months yield an empty string
pub fn month_name(month: u32) -> String {
    match NaiveDate::from_ymd_opt(2024, month, 1) {
        Some(first) => first.format("%B").to_string(),
        None => String::new(),
    }
}

/// The days of the week, starting at the locale's first day
pub fn week_days(locale: &Locale) -> Vec<Weekday> {
    let mut day = locale.week_start;
    let mut days = Vec::with_capacity(7);
    for _ in 0..7 {
        days.push(day);
        day = day.succ();
    }
    days
}

/// HTML-escape
pub fn escape(text: &str) -> String {
    handlebars::html_escape(text)
}

/// HTML-escape a plain text, keeping its line breaks
pub fn plain_to_html(text: &str) -> String {
    escape(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// The name of the calendar, if this incidence belongs to it
pub fn resource_string(calendar: &Calendar, incidence: &Incidence) -> String {
    if calendar.contains(incidence.uid()) {
        calendar.name().to_string()
    } else {
        String::new()
    }
}

/// The start and end (or due) of an incidence.
/// For recurring incidences, `date` moves the start to that day and the end along with it.
pub(crate) fn dates_on(incidence: &Incidence, date: Option<NaiveDate>) -> (Option<CalDateTime>, Option<CalDateTime>) {
    let start = incidence.dt_start().cloned();
    let end = incidence.date_end().cloned();
    match (start, date) {
        (Some(start), Some(date)) if incidence.recurs() && start.date() != date => {
            let moved = start.with_date(date);
            let shift = start.duration_until(&moved);
            (Some(moved), end.map(|e| e.add_duration(shift)))
        },
        (start, _) => (start, end),
    }
}

/// Shorten a text to `max_chars` characters, ending it with an ellipsis when it is cut
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((index, _)) => format!("{}...", &text[..index]),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use crate::Event;

    #[test]
    fn test_ordinals() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111].iter().map(|n| ordinal(*n)).collect();
        assert_eq!(rendered, vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st", "111th"]);
        assert_eq!(ordinal(-2), "2nd");
    }

    #[test]
    fn test_names() {
        assert_eq!(weekday_name(Weekday::Wed, true), "Wed");
        assert_eq!(weekday_name(Weekday::Sun, false), "Sunday");
        assert_eq!(month_name(3), "March");
        assert_eq!(month_name(13), "");

        let mut locale = Locale::default();
        locale.week_start = Weekday::Sun;
        assert_eq!(week_days(&locale)[..2], [Weekday::Sun, Weekday::Mon]);
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(plain_to_html("a < b\nc & d"), "a &lt; b<br>c &amp; d");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("été", 2), "ét...");
    }

    #[test]
    fn test_resource_string() {
        let mut cal = Calendar::new("Work");
        let event = Incidence::Event(Event::new("Review"));
        assert_eq!(resource_string(&cal, &event), "");
        cal.add_incidence(event.clone());
        assert_eq!(resource_string(&cal, &event), "Work");
    }

    #[test]
    fn test_dates_of_an_occurrence_after_dst() {
        let paris = |d: u32, h: u32| CalDateTime::Zoned {
            datetime: NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(h, 0, 0).unwrap(),
            tzid: "Europe/Paris".to_string(),
        };
        let mut event = Event::new_with_times("Standup", paris(29, 9), Some(paris(29, 10)));
        event.base.recurrence.rrules.push("FREQ=DAILY".parse().unwrap());
        let event = Incidence::Event(event);

        let (start, end) = dates_on(&event, NaiveDate::from_ymd_opt(2024, 4, 2));
        assert_eq!(start.as_ref().map(|s| s.date()), NaiveDate::from_ymd_opt(2024, 4, 2));
        assert_eq!(start.and_then(|s| s.time()), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(end.and_then(|e| e.time()), NaiveTime::from_hms_opt(10, 0, 0));
    }
}
