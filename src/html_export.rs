//! Export a calendar into a standalone HTML page
//!
//! The page may contain a month view, a list of events, a to-do list (sub-tasks listed under their parent),
//! journal entries and busy periods. Recurring incidences are shown at the dates of their stored instances only.

use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::config::Locale;
use crate::datetime::CalDateTime;
use crate::formatter::{escape, month_name, plain_to_html, week_days, weekday_name};
use crate::incidence::{IncidenceBase, Secrecy};
use crate::stringify;
use crate::{Event, Todo};

const STYLESHEET: &str = "body { font-family: sans-serif; }\n\
table { border-collapse: collapse; margin-bottom: 1em; }\n\
th, td { border: 1px solid #aaaaaa; padding: 3px 6px; vertical-align: top; }\n\
th { background-color: #dddddd; }\n\
table.monthview td { width: 8em; height: 5em; }\n\
table.monthview td.empty { background-color: #f4f4f4; }\n\
table.monthview td.week { width: 2em; text-align: center; background-color: #eeeeee; }\n\
span.daynumber { font-weight: bold; }\n\
span.holiday { color: #b00000; font-style: italic; }\n\
td.datehead { background-color: #e8eef8; }\n\
td.done { text-decoration: line-through; }\n\
td.subitem { padding-left: 2em; }\n\
p.footer { font-size: small; color: #666666; }\n";

/// What an HTML export contains
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlExportSettings {
    pub title: String,
    pub todo_list_title: String,
    pub journal_title: String,
    pub free_busy_title: String,

    pub author_name: String,
    pub author_email: String,
    pub credit_name: String,
    pub credit_url: String,

    /// First day of the exported range. Defaults to the first day of the earliest event
    pub date_start: Option<NaiveDate>,
    /// Last day of the exported range (inclusive). Defaults to the last day of the latest event
    pub date_end: Option<NaiveDate>,

    pub month_view: bool,
    pub event_view: bool,
    pub todo_view: bool,
    pub journal_view: bool,
    pub free_busy_view: bool,
    /// Show ISO week numbers in the month view
    pub week_numbers: bool,

    pub exclude_private: bool,
    pub exclude_confidential: bool,

    pub event_location: bool,
    pub event_categories: bool,
    pub event_attendees: bool,
    pub todo_location: bool,
    pub todo_categories: bool,
    pub todo_attendees: bool,
    pub todo_due_date: bool,

    pub output_file: Option<PathBuf>,
}

impl Default for HtmlExportSettings {
    fn default() -> Self {
        Self {
            title: "Calendar".to_string(),
            todo_list_title: "To-do List".to_string(),
            journal_title: "Journal".to_string(),
            free_busy_title: "Busy Periods".to_string(),
            author_name: String::new(),
            author_email: String::new(),
            credit_name: "calutils".to_string(),
            credit_url: String::new(),
            date_start: None,
            date_end: None,
            month_view: false,
            event_view: true,
            todo_view: true,
            journal_view: false,
            free_busy_view: false,
            week_numbers: false,
            exclude_private: true,
            exclude_confidential: true,
            event_location: true,
            event_categories: true,
            event_attendees: false,
            todo_location: true,
            todo_categories: false,
            todo_attendees: false,
            todo_due_date: true,
            output_file: None,
        }
    }
}

impl HtmlExportSettings {
    /// Load settings from a JSON file. Missing keys take their default value.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        match std::fs::File::open(path) {
            Err(err) => Err(format!("Unable to open file {:?}: {}", path, err).into()),
            Ok(file) => Ok(serde_json::from_reader(file)?),
        }
    }
}


/// Renders a calendar into an HTML page
pub struct HtmlExport<'a> {
    calendar: &'a Calendar,
    settings: HtmlExportSettings,
    locale: Locale,
    holidays: BTreeMap<NaiveDate, Vec<String>>,
}

impl<'a> HtmlExport<'a> {
    pub fn new(calendar: &'a Calendar, settings: HtmlExportSettings, locale: Locale) -> Self {
        Self { calendar, settings, locale, holidays: BTreeMap::new() }
    }

    pub fn settings(&self) -> &HtmlExportSettings { &self.settings }

    /// Mark a day as a holiday in the month view and the event list
    pub fn add_holiday(&mut self, date: NaiveDate, name: &str) {
        self.holidays.entry(date).or_insert_with(Vec::new).push(name.to_string());
    }

    /// The file name the page is saved to when no output file is set: the title, made safe for file systems
    pub fn default_file_name(&self) -> String {
        sanitize_filename::sanitize(format!("{}.html", self.settings.title))
    }

    /// Write the page to `path`, or to the configured output file, or to [`Self::default_file_name`].
    /// Returns whether the file could be written.
    pub fn save(&self, path: Option<&Path>) -> bool {
        let path = match (path, &self.settings.output_file) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(configured)) => configured.clone(),
            (None, None) => PathBuf::from(self.default_file_name()),
        };
        match std::fs::write(&path, self.to_html()) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                false
            },
        }
    }

    /// The whole HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail
        let _ = self.write_document(&mut html);
        html
    }

    fn write_document(&self, out: &mut String) -> std::fmt::Result {
        let title = escape(&self.settings.title);
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>\n<head>\n<meta charset=\"UTF-8\">")?;
        writeln!(out, "<title>{}</title>", title)?;
        writeln!(out, "<style type=\"text/css\">\n{}</style>", STYLESHEET)?;
        writeln!(out, "</head>\n<body>")?;
        writeln!(out, "<h1>{}</h1>", title)?;

        let range = self.date_range();
        if let Some((start, end)) = range {
            if self.settings.month_view {
                self.write_month_view(out, start, end)?;
            }
            if self.settings.event_view {
                self.write_event_list(out, start, end)?;
            }
        }
        if self.settings.todo_view {
            self.write_todo_list(out)?;
        }
        if self.settings.journal_view {
            self.write_journals(out)?;
        }
        if self.settings.free_busy_view {
            self.write_free_busy(out)?;
        }

        self.write_footer(out)?;
        writeln!(out, "</body>\n</html>")
    }

    fn is_visible(&self, base: &IncidenceBase) -> bool {
        match base.secrecy {
            Secrecy::Public => true,
            Secrecy::Private => self.settings.exclude_private == false,
            Secrecy::Confidential => self.settings.exclude_confidential == false,
        }
    }

    /// The configured range, or the days covered by the events
    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let events = self.calendar.events();
        let first = events.iter().filter_map(|e| e.base.dt_start.as_ref().map(|s| s.date())).min();
        let last = events.iter().filter_map(|e| e.last_day()).max();
        let start = self.settings.date_start.or(first)?;
        let end = self.settings.date_end.or(last)?;
        if end < start {
            log::warn!("The end of the exported range ({}) is before its start ({})", end, start);
            return None;
        }
        Some((start, end))
    }

    fn visible_events(&self, date: NaiveDate) -> Vec<&Event> {
        self.calendar.events_for_date(date).into_iter()
            .filter(|e| self.is_visible(&e.base))
            .collect()
    }

    fn time_string(&self, value: &CalDateTime) -> String {
        let shown = value.to_display(self.locale.display_zone());
        stringify::format_time(shown.time(), &self.locale)
    }

    fn write_holidays(&self, out: &mut String, date: NaiveDate) -> std::fmt::Result {
        if let Some(names) = self.holidays.get(&date) {
            for name in names {
                write!(out, "<br><span class=\"holiday\">{}</span>", escape(name))?;
            }
        }
        Ok(())
    }

    fn write_month_view(&self, out: &mut String, start: NaiveDate, end: NaiveDate) -> std::fmt::Result {
        let days = week_days(&self.locale);
        let mut month_start = start.with_day(1).unwrap_or(start);

        while month_start <= end {
            writeln!(out, "<h2>{} {}</h2>", month_name(month_start.month()), month_start.year())?;
            writeln!(out, "<table class=\"monthview\">")?;
            write!(out, "<tr>")?;
            if self.settings.week_numbers {
                write!(out, "<th>Week</th>")?;
            }
            for day in &days {
                write!(out, "<th>{}</th>", weekday_name(*day, false))?;
            }
            writeln!(out, "</tr>")?;

            let offset = (7 + month_start.weekday().num_days_from_monday() - self.locale.week_start.num_days_from_monday()) % 7;
            let mut row_start = month_start - Duration::days(offset as i64);
            while row_start.year() < month_start.year()
                || (row_start.year() == month_start.year() && row_start.month() <= month_start.month())
            {
                write!(out, "<tr>")?;
                if self.settings.week_numbers {
                    let week = (row_start + Duration::days(3)).iso_week().week();
                    write!(out, "<td class=\"week\">{}</td>", week)?;
                }
                for i in 0..7 {
                    let date = row_start + Duration::days(i);
                    if date.month() != month_start.month() {
                        write!(out, "<td class=\"empty\"></td>")?;
                        continue;
                    }
                    write!(out, "<td><span class=\"daynumber\">{}</span>", date.day())?;
                    self.write_holidays(out, date)?;
                    let events = self.visible_events(date);
                    if events.is_empty() == false {
                        write!(out, "<ul>")?;
                        for event in events {
                            match (&event.base.dt_start, event.all_day()) {
                                (Some(start), false) if start.date() == date => write!(
                                    out,
                                    "<li>{} {}</li>",
                                    self.time_string(start),
                                    escape(&event.base.summary)
                                )?,
                                _ => write!(out, "<li>{}</li>", escape(&event.base.summary))?,
                            }
                        }
                        write!(out, "</ul>")?;
                    }
                    write!(out, "</td>")?;
                }
                writeln!(out, "</tr>")?;
                row_start = row_start + Duration::days(7);
            }
            writeln!(out, "</table>")?;

            month_start = match next_month(month_start) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(())
    }

    fn write_event_list(&self, out: &mut String, start: NaiveDate, end: NaiveDate) -> std::fmt::Result {
        let settings = &self.settings;
        let columns = 3 + settings.event_location as usize + settings.event_categories as usize + settings.event_attendees as usize;

        writeln!(out, "<table class=\"eventlist\">")?;
        write!(out, "<tr><th>Start Time</th><th>End Time</th><th>Event</th>")?;
        if settings.event_location {
            write!(out, "<th>Location</th>")?;
        }
        if settings.event_categories {
            write!(out, "<th>Categories</th>")?;
        }
        if settings.event_attendees {
            write!(out, "<th>Attendees</th>")?;
        }
        writeln!(out, "</tr>")?;

        let mut date = start;
        while date <= end {
            let events = self.visible_events(date);
            if events.is_empty() == false || self.holidays.contains_key(&date) {
                write!(
                    out,
                    "<tr><td colspan=\"{}\" class=\"datehead\"><b>{}</b>",
                    columns,
                    escape(&stringify::format_date(date, false, &self.locale))
                )?;
                self.write_holidays(out, date)?;
                writeln!(out, "</td></tr>")?;
            }
            for event in events {
                self.write_event_row(out, event, date)?;
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        writeln!(out, "</table>")
    }

    fn write_event_row(&self, out: &mut String, event: &Event, date: NaiveDate) -> std::fmt::Result {
        let settings = &self.settings;
        let base = &event.base;
        let (start_time, end_time) = if event.all_day() {
            ("&nbsp;".to_string(), "&nbsp;".to_string())
        } else {
            let start_time = match &base.dt_start {
                Some(start) if start.date() == date => self.time_string(start),
                _ => "&nbsp;".to_string(),
            };
            let end_time = match &event.dt_end {
                Some(end) if end.date() == date => self.time_string(end),
                _ => "&nbsp;".to_string(),
            };
            (start_time, end_time)
        };

        write!(out, "<tr><td>{}</td><td>{}</td><td><b>{}</b>", start_time, end_time, escape(&base.summary))?;
        if base.description.is_empty() == false {
            write!(out, "<p>{}</p>", plain_to_html(&base.description))?;
        }
        write!(out, "</td>")?;
        if settings.event_location {
            write!(out, "<td>{}</td>", escape(&base.location))?;
        }
        if settings.event_categories {
            write!(out, "<td>{}</td>", escape(&base.categories.join(", ")))?;
        }
        if settings.event_attendees {
            write!(out, "<td>{}</td>", attendee_list(base))?;
        }
        writeln!(out, "</tr>")
    }

    fn write_todo_list(&self, out: &mut String) -> std::fmt::Result {
        let settings = &self.settings;
        let todos: Vec<&Todo> = self.calendar.todos().into_iter()
            .filter(|t| self.is_visible(&t.base))
            .collect();
        if todos.is_empty() {
            return Ok(());
        }

        writeln!(out, "<h1>{}</h1>", escape(&settings.todo_list_title))?;
        writeln!(out, "<table class=\"todolist\">")?;
        write!(out, "<tr><th>Task</th><th>Priority</th><th>Completed</th>")?;
        if settings.todo_due_date {
            write!(out, "<th>Due Date</th>")?;
        }
        if settings.todo_location {
            write!(out, "<th>Location</th>")?;
        }
        if settings.todo_categories {
            write!(out, "<th>Categories</th>")?;
        }
        if settings.todo_attendees {
            write!(out, "<th>Attendees</th>")?;
        }
        writeln!(out, "</tr>")?;

        let uids: HashSet<&str> = todos.iter().map(|t| t.base.uid.as_str()).collect();
        let roots: Vec<&Todo> = todos.iter()
            .filter(|t| match &t.base.related_to {
                Some(parent) => uids.contains(parent.as_str()) == false,
                None => true,
            })
            .cloned()
            .collect();

        let mut written = HashSet::new();
        for todo in sorted_by_priority(roots) {
            self.write_todo_tree(out, todo, &todos, 0, &mut written)?;
        }
        // Sub-tasks caught in a parent cycle have no root
        for todo in sorted_by_priority(todos.clone()) {
            if written.contains(todo.base.uid.as_str()) == false {
                self.write_todo_tree(out, todo, &todos, 0, &mut written)?;
            }
        }
        writeln!(out, "</table>")
    }

    fn write_todo_tree<'t>(&self, out: &mut String, todo: &'t Todo, all: &[&'t Todo], depth: usize, written: &mut HashSet<&'t str>) -> std::fmt::Result {
        if written.insert(todo.base.uid.as_str()) == false {
            return Ok(());
        }
        self.write_todo_row(out, todo, depth)?;

        let children: Vec<&Todo> = all.iter()
            .filter(|t| t.base.related_to.as_deref() == Some(todo.base.uid.as_str()))
            .cloned()
            .collect();
        for child in sorted_by_priority(children) {
            self.write_todo_tree(out, child, all, depth + 1, written)?;
        }
        Ok(())
    }

    fn write_todo_row(&self, out: &mut String, todo: &Todo, depth: usize) -> std::fmt::Result {
        let settings = &self.settings;
        let base = &todo.base;

        let mut classes = Vec::new();
        if depth > 0 {
            classes.push("subitem");
        }
        if todo.completed() {
            classes.push("done");
        }
        if classes.is_empty() {
            write!(out, "<tr><td>")?;
        } else {
            write!(out, "<tr><td class=\"{}\">", classes.join(" "))?;
        }
        write!(out, "{}", escape(&base.summary))?;
        if base.description.is_empty() == false {
            write!(out, "<p>{}</p>", plain_to_html(&base.description))?;
        }
        write!(out, "</td>")?;

        if base.priority > 0 {
            write!(out, "<td>{}</td>", base.priority)?;
        } else {
            write!(out, "<td>&nbsp;</td>")?;
        }

        if todo.completed() {
            let when = stringify::todo_completed_date_time(todo, true, &self.locale);
            if when.is_empty() {
                write!(out, "<td>100%</td>")?;
            } else {
                write!(out, "<td>{}</td>", escape(&when))?;
            }
        } else {
            write!(out, "<td>{}%</td>", todo.percent_complete)?;
        }

        if settings.todo_due_date {
            match &todo.due {
                Some(due) => write!(out, "<td>{}</td>", escape(&stringify::format_date_time(due, todo.all_day(), true, &self.locale)))?,
                None => write!(out, "<td>&nbsp;</td>")?,
            }
        }
        if settings.todo_location {
            write!(out, "<td>{}</td>", escape(&base.location))?;
        }
        if settings.todo_categories {
            write!(out, "<td>{}</td>", escape(&base.categories.join(", ")))?;
        }
        if settings.todo_attendees {
            write!(out, "<td>{}</td>", attendee_list(base))?;
        }
        writeln!(out, "</tr>")
    }

    fn write_journals(&self, out: &mut String) -> std::fmt::Result {
        let mut journals: Vec<_> = self.calendar.journals().into_iter()
            .filter(|j| self.is_visible(&j.base))
            .collect();
        if journals.is_empty() {
            return Ok(());
        }
        journals.sort_by_key(|j| j.base.dt_start.as_ref().map(|s| s.to_utc()));

        writeln!(out, "<h1>{}</h1>", escape(&self.settings.journal_title))?;
        for journal in journals {
            if let Some(start) = &journal.base.dt_start {
                writeln!(out, "<h2>{}</h2>", escape(&stringify::format_date_time(start, journal.all_day(), false, &self.locale)))?;
            }
            if journal.base.summary.is_empty() == false {
                writeln!(out, "<h3>{}</h3>", escape(&journal.base.summary))?;
            }
            if journal.base.description.is_empty() == false {
                writeln!(out, "<p>{}</p>", plain_to_html(&journal.base.description))?;
            }
        }
        Ok(())
    }

    fn write_free_busy(&self, out: &mut String) -> std::fmt::Result {
        let free_busys = self.calendar.free_busys();
        let periods: Vec<_> = free_busys.iter().flat_map(|f| f.busy_periods()).collect();
        if periods.is_empty() {
            return Ok(());
        }

        writeln!(out, "<h1>{}</h1>", escape(&self.settings.free_busy_title))?;
        writeln!(out, "<table class=\"freebusy\">")?;
        writeln!(out, "<tr><th>Start</th><th>End</th><th>Type</th></tr>")?;
        for period in periods {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&stringify::format_timestamp(&period.start, true, &self.locale)),
                escape(&stringify::format_timestamp(&period.end, true, &self.locale)),
                period.fb_type.as_ical(),
            )?;
        }
        writeln!(out, "</table>")
    }

    fn write_footer(&self, out: &mut String) -> std::fmt::Result {
        let settings = &self.settings;
        if settings.author_name.is_empty() && settings.credit_name.is_empty() {
            return Ok(());
        }

        write!(out, "<p class=\"footer\">This page was created")?;
        if settings.author_name.is_empty() == false {
            if settings.author_email.is_empty() {
                write!(out, " by {}", escape(&settings.author_name))?;
            } else {
                write!(
                    out,
                    " by <a href=\"mailto:{}\">{}</a>",
                    escape(&settings.author_email),
                    escape(&settings.author_name)
                )?;
            }
        }
        if settings.credit_name.is_empty() == false {
            if settings.credit_url.is_empty() {
                write!(out, " with {}", escape(&settings.credit_name))?;
            } else {
                write!(
                    out,
                    " with <a href=\"{}\">{}</a>",
                    escape(&settings.credit_url),
                    escape(&settings.credit_name)
                )?;
            }
        }
        writeln!(out, "</p>")
    }
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

/// Priority 1 first, 9 last, and "undefined" (0) after them. Then by summary
fn sorted_by_priority(mut todos: Vec<&Todo>) -> Vec<&Todo> {
    todos.sort_by(|a, b| {
        let key = |t: &Todo| if t.base.priority == 0 { 10 } else { t.base.priority };
        key(*a).cmp(&key(*b)).then_with(|| a.base.summary.cmp(&b.base.summary))
    });
    todos
}

fn attendee_list(base: &IncidenceBase) -> String {
    base.attendees.iter()
        .map(|a| escape(a.person.display_name()))
        .collect::<Vec<_>>()
        .join("<br>")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidence::Incidence;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> Calendar {
        let mut cal = Calendar::new("Club");
        let start = date(2024, 2, 14).and_hms_opt(19, 0, 0).unwrap();
        let mut dinner = Event::new_with_times("Dinner & dance", CalDateTime::Floating(start), Some(CalDateTime::Floating(start + Duration::hours(3))));
        dinner.base.location = "Town hall".to_string();
        cal.add_incidence(dinner.into());

        let mut secret = Event::new_with_times("Surprise", CalDateTime::Date(date(2024, 2, 20)), Some(CalDateTime::Date(date(2024, 2, 21))));
        secret.base.secrecy = Secrecy::Private;
        cal.add_incidence(secret.into());
        cal
    }

    #[test]
    fn test_event_list() {
        let cal = calendar();
        let export = HtmlExport::new(&cal, HtmlExportSettings::default(), Locale::default());
        let html = export.to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Calendar</title>"));
        assert!(html.contains("<b>Wednesday, February 14, 2024</b>"));
        assert!(html.contains("<tr><td>19:00</td><td>22:00</td><td><b>Dinner &amp; dance</b></td><td>Town hall</td><td></td></tr>"));
        assert!(html.contains("Surprise") == false);
        assert!(html.contains("This page was created with calutils"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_private_included_on_demand() {
        let cal = calendar();
        let mut settings = HtmlExportSettings::default();
        settings.exclude_private = false;
        let html = HtmlExport::new(&cal, settings, Locale::default()).to_html();
        assert!(html.contains("<b>Surprise</b>"));
    }

    #[test]
    fn test_month_view() {
        let cal = calendar();
        let mut settings = HtmlExportSettings::default();
        settings.month_view = true;
        settings.event_view = false;
        settings.week_numbers = true;
        settings.date_start = Some(date(2024, 2, 1));
        settings.date_end = Some(date(2024, 3, 31));
        let mut export = HtmlExport::new(&cal, settings, Locale::default());
        export.add_holiday(date(2024, 2, 14), "Valentine's Day");
        let html = export.to_html();

        assert!(html.contains("<h2>February 2024</h2>"));
        assert!(html.contains("<h2>March 2024</h2>"));
        assert!(html.contains("<h2>April 2024</h2>") == false);
        assert!(html.contains("<th>Week</th><th>Monday</th>"));
        // February 2024 starts on a Thursday, in ISO week 5
        assert!(html.contains("<tr><td class=\"week\">5</td><td class=\"empty\"></td><td class=\"empty\"></td><td class=\"empty\"></td><td><span class=\"daynumber\">1</span></td>"));
        assert!(html.contains("<span class=\"daynumber\">14</span><br><span class=\"holiday\">Valentine&#x27;s Day</span><ul><li>19:00 Dinner &amp; dance</li></ul>"));
    }

    #[test]
    fn test_todo_tree() {
        let mut cal = Calendar::new("Chores");
        let mut house = Todo::new("Clean the house");
        house.base.priority = 5;
        let mut kitchen = Todo::new("Kitchen");
        kitchen.base.related_to = Some(house.base.uid.clone());
        let mut urgent = Todo::new("Pay rent");
        urgent.base.priority = 1;
        let someday = Todo::new("Learn the banjo");
        for todo in vec![house, kitchen, urgent, someday] {
            cal.add_incidence(Incidence::Todo(todo));
        }

        let html = HtmlExport::new(&cal, HtmlExportSettings::default(), Locale::default()).to_html();
        let position = |text: &str| html.find(text).unwrap();
        assert!(position("Pay rent") < position("Clean the house"));
        assert!(position("Clean the house") < position("Kitchen"));
        assert!(position("Kitchen") < position("Learn the banjo"));
        assert!(html.contains("<td class=\"subitem\">Kitchen</td>"));
    }

    #[test]
    fn test_file_name() {
        let cal = Calendar::new("x");
        let mut settings = HtmlExportSettings::default();
        settings.title = "Team/Plans: 2024".to_string();
        let export = HtmlExport::new(&cal, settings, Locale::default());
        assert_eq!(export.default_file_name(), "TeamPlans 2024.html");
    }
}
