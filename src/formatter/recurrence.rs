//! Plain-language recurrence rules

use chrono::{Datelike, Weekday};

use crate::config::Locale;
use crate::incidence::Incidence;
use crate::recurrence::{RecurrenceRule, RecurrenceType};

use super::duration::{date_time_to_string, date_to_string};
use super::{month_name, ordinal, week_days, weekday_name};

/// `Recurs weekly until 2024-12-31 on Mon, Wed (10 occurrences)`...
///
/// Only the first rule is described. Rules that cannot be phrased simply yield "Incidence recurs".
pub fn recurrence_string(incidence: &Incidence, locale: &Locale) -> String {
    let base = incidence.base();
    if base.recurrence.recurs() == false {
        return "No recurrence".to_string();
    }

    let mut text = match base.recurrence.default_rule() {
        None => "Incidence recurs".to_string(),
        Some(rule) => rule_string(incidence, rule, locale),
    };

    if let Some(count) = base.recurrence.default_rule().and_then(|r| r.count) {
        if count == 1 {
            text.push_str(" (1 occurrence)");
        } else {
            text.push_str(&format!(" ({} occurrences)", count));
        }
    }

    if base.recurrence.exdates.is_empty() == false {
        let dates: Vec<String> = base.recurrence.exdates.iter()
            .map(|d| date_to_string(d.date(), true, locale))
            .collect();
        text.push_str(&format!(" (excluding {})", dates.join(", ")));
    }
    text
}

fn every(interval: u32, once: &str, unit: &str) -> String {
    if interval <= 1 {
        format!("Recurs {}", once)
    } else {
        format!("Recurs every {} {}", interval, unit)
    }
}

/// `the 2nd Tuesday`, `the last Friday`, `the 2nd last Friday`, `every Tuesday`
fn position_string(position: i16, day: Weekday) -> String {
    let name = weekday_name(day, false);
    match position {
        0 => format!("every {}", name),
        -1 => format!("the last {}", name),
        p if p < 0 => format!("the {} last {}", ordinal(p as i32), name),
        p => format!("the {} {}", ordinal(p as i32), name),
    }
}

/// `the 15th day`, `the last day`, `the 2nd last day`
fn month_day_string(day: i32) -> String {
    match day {
        -1 => "the last day".to_string(),
        d if d < 0 => format!("the {} last day", ordinal(d)),
        d => format!("the {} day", ordinal(d)),
    }
}

fn rule_string(incidence: &Incidence, rule: &RecurrenceRule, locale: &Locale) -> String {
    let start = incidence.dt_start().map(|s| s.date());
    let interval = rule.interval;
    let until = match &rule.until {
        Some(until) => format!(" until {}", date_time_to_string(until, incidence.all_day(), true, locale)),
        None => String::new(),
    };

    match rule.recurrence_type() {
        RecurrenceType::None | RecurrenceType::Other => "Incidence recurs".to_string(),
        RecurrenceType::Secondly => format!("{}{}", every(interval, "every second", "seconds"), until),
        RecurrenceType::Minutely => format!("{}{}", every(interval, "every minute", "minutes"), until),
        RecurrenceType::Hourly => format!("{}{}", every(interval, "hourly", "hours"), until),
        RecurrenceType::Daily => format!("{}{}", every(interval, "daily", "days"), until),

        RecurrenceType::Weekly => {
            let mut days: Vec<Weekday> = rule.by_day.iter().map(|d| d.weekday).collect();
            if days.is_empty() {
                days.extend(start.map(|s| s.weekday()));
            }
            let names: Vec<String> = week_days(locale).into_iter()
                .filter(|day| days.contains(day))
                .map(|day| weekday_name(day, true))
                .collect();
            let mut text = format!("{}{}", every(interval, "weekly", "weeks"), until);
            if names.is_empty() == false {
                text.push_str(" on ");
                text.push_str(&names.join(", "));
            }
            text
        },

        RecurrenceType::MonthlyPos => {
            let positions: Vec<String> = rule.month_positions().into_iter()
                .map(|(pos, day)| position_string(pos, day))
                .collect();
            format!("{} on {}{}", every(interval, "every month", "months"), positions.join(" and "), until)
        },

        RecurrenceType::MonthlyDay => {
            let mut days: Vec<i32> = rule.by_month_day.iter().map(|d| *d as i32).collect();
            if days.is_empty() {
                days.extend(start.map(|s| s.day() as i32));
            }
            let days: Vec<String> = days.into_iter().map(month_day_string).collect();
            format!("{} on {}{}", every(interval, "monthly", "months"), days.join(" and "), until)
        },

        RecurrenceType::YearlyMonth => {
            let mut months: Vec<u32> = rule.by_month.iter().map(|m| *m as u32).collect();
            if months.is_empty() {
                months.extend(start.map(|s| s.month()));
            }
            let day = rule.by_month_day.first().map(|d| *d as i32)
                .or_else(|| start.map(|s| s.day() as i32))
                .unwrap_or(1);
            let dates: Vec<String> = months.into_iter()
                .map(|month| if day > 0 {
                    format!("{} {}", month_name(month), day)
                } else {
                    format!("{} of {}", month_day_string(day), month_name(month))
                })
                .collect();
            format!("{} on {}{}", every(interval, "yearly", "years"), dates.join(" and "), until)
        },

        RecurrenceType::YearlyDay => {
            let days: Vec<String> = rule.by_year_day.iter().map(|d| d.to_string()).collect();
            let label = if days.len() > 1 { "days" } else { "day" };
            format!("{} on {} {}{}", every(interval, "yearly", "years"), label, days.join(", "), until)
        },

        RecurrenceType::YearlyPos => {
            let mut months: Vec<u32> = rule.by_month.iter().map(|m| *m as u32).collect();
            if months.is_empty() {
                months.extend(start.map(|s| s.month()));
            }
            let months: Vec<String> = months.into_iter().map(month_name).collect();
            let positions: Vec<String> = rule.month_positions().into_iter()
                .map(|(pos, day)| position_string(pos, day))
                .collect();
            let mut text = format!("{} on {}", every(interval, "every year", "years"), positions.join(" and "));
            if months.is_empty() == false {
                text.push_str(" of ");
                text.push_str(&months.join(" and "));
            }
            text.push_str(&until);
            text
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::datetime::CalDateTime;
    use crate::{Event, Todo};

    /// An event starting on Wednesday 2024-03-13 at 10:00, with the given rule
    fn recurring(rule: &str) -> Incidence {
        let start = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let mut event = Event::new_with_times("Meeting", CalDateTime::Floating(start), None);
        event.base.recurrence.rrules.push(rule.parse().unwrap());
        event.into()
    }

    fn phrase(rule: &str) -> String {
        recurrence_string(&recurring(rule), &Locale::default())
    }

    #[test]
    fn test_no_recurrence() {
        assert_eq!(recurrence_string(&Todo::new("Once").into(), &Locale::default()), "No recurrence");
    }

    #[test]
    fn test_simple_frequencies() {
        assert_eq!(phrase("FREQ=DAILY"), "Recurs daily");
        assert_eq!(phrase("FREQ=DAILY;INTERVAL=3"), "Recurs every 3 days");
        assert_eq!(phrase("FREQ=HOURLY;INTERVAL=2"), "Recurs every 2 hours");
        assert_eq!(phrase("FREQ=MINUTELY"), "Recurs every minute");
        assert_eq!(phrase("FREQ=SECONDLY;INTERVAL=30"), "Recurs every 30 seconds");
        assert_eq!(phrase("FREQ=DAILY;UNTIL=20240401T100000"), "Recurs daily until 2024-04-01 10:00");
        assert_eq!(phrase("FREQ=DAILY;COUNT=5"), "Recurs daily (5 occurrences)");
    }

    #[test]
    fn test_weekly() {
        assert_eq!(phrase("FREQ=WEEKLY"), "Recurs weekly on Wed");
        assert_eq!(phrase("FREQ=WEEKLY;BYDAY=WE,MO"), "Recurs weekly on Mon, Wed");
        assert_eq!(
            phrase("FREQ=WEEKLY;INTERVAL=2;BYDAY=FR;UNTIL=20240601T000000"),
            "Recurs every 2 weeks until 2024-06-01 00:00 on Fri"
        );

        let mut sunday_first = Locale::default();
        sunday_first.week_start = Weekday::Sun;
        assert_eq!(
            recurrence_string(&recurring("FREQ=WEEKLY;BYDAY=MO,SU"), &sunday_first),
            "Recurs weekly on Sun, Mon"
        );
    }

    #[test]
    fn test_monthly() {
        assert_eq!(phrase("FREQ=MONTHLY;BYDAY=2TU"), "Recurs every month on the 2nd Tuesday");
        assert_eq!(phrase("FREQ=MONTHLY;BYDAY=-1FR"), "Recurs every month on the last Friday");
        assert_eq!(phrase("FREQ=MONTHLY;BYDAY=-2FR"), "Recurs every month on the 2nd last Friday");
        assert_eq!(phrase("FREQ=MONTHLY;BYDAY=MO;BYSETPOS=1"), "Recurs every month on the 1st Monday");
        assert_eq!(phrase("FREQ=MONTHLY;INTERVAL=3;BYDAY=TU"), "Recurs every 3 months on every Tuesday");
        assert_eq!(phrase("FREQ=MONTHLY"), "Recurs monthly on the 13th day");
        assert_eq!(phrase("FREQ=MONTHLY;BYMONTHDAY=15"), "Recurs monthly on the 15th day");
        assert_eq!(phrase("FREQ=MONTHLY;BYMONTHDAY=-1"), "Recurs monthly on the last day");
        assert_eq!(phrase("FREQ=MONTHLY;BYMONTHDAY=-2"), "Recurs monthly on the 2nd last day");
    }

    #[test]
    fn test_yearly() {
        assert_eq!(phrase("FREQ=YEARLY"), "Recurs yearly on March 13");
        assert_eq!(phrase("FREQ=YEARLY;BYMONTH=6;BYMONTHDAY=21"), "Recurs yearly on June 21");
        assert_eq!(phrase("FREQ=YEARLY;INTERVAL=4;BYMONTH=2;BYMONTHDAY=29"), "Recurs every 4 years on February 29");
        assert_eq!(phrase("FREQ=YEARLY;BYYEARDAY=100"), "Recurs yearly on day 100");
        assert_eq!(phrase("FREQ=YEARLY;BYDAY=1MO;BYMONTH=5"), "Recurs every year on the 1st Monday of May");
    }

    #[test]
    fn test_unsupported_and_exceptions() {
        assert_eq!(phrase("FREQ=DAILY;BYHOUR=9,17"), "Incidence recurs");
        assert_eq!(phrase("FREQ=WEEKLY;BYWEEKNO=20"), "Incidence recurs");

        let mut incidence = recurring("FREQ=WEEKLY");
        incidence.base_mut().recurrence.exdates = vec![
            CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()),
            CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 3, 27).unwrap()),
        ];
        assert_eq!(
            recurrence_string(&incidence, &Locale::default()),
            "Recurs weekly on Wed (excluding 2024-03-20, 2024-03-27)"
        );
    }

    #[test]
    fn test_idempotent() {
        let locale = Locale::default();
        for rule in &["FREQ=WEEKLY;BYDAY=MO,WE,FR", "FREQ=MONTHLY;BYDAY=-1SU", "FREQ=YEARLY;COUNT=3"] {
            let incidence = recurring(rule);
            assert_eq!(recurrence_string(&incidence, &locale), recurrence_string(&incidence, &locale));
        }
    }
}
