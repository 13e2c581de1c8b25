//! Recurrence rules (`RRULE`, `EXDATE`, `RDATE`)
//!
//! This only models rules so that they can be described to a user and written back.
//! Computing the actual occurrences is out of the scope of this crate.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::Weekday;

use crate::datetime::CalDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Some(Frequency::Secondly),
            "MINUTELY" => Some(Frequency::Minutely),
            "HOURLY" => Some(Frequency::Hourly),
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Secondly => "SECONDLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// Parse a two-letter weekday (`MO`, `TU`...)
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// A `BYDAY` entry, such as `MO`, `2TU` or `-1FR`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    pub fn every(weekday: Weekday) -> Self {
        Self { ordinal: None, weekday }
    }

    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self { ordinal: Some(ordinal), weekday }
    }
}

impl FromStr for WeekdayNum {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 || s.is_char_boundary(s.len() - 2) == false {
            return Err(format!("Invalid weekday {:?}", s).into());
        }
        let (ordinal_str, day_str) = s.split_at(s.len() - 2);
        let weekday = parse_weekday(day_str).ok_or_else(|| format!("Invalid weekday {:?}", s))?;
        let ordinal = if ordinal_str.is_empty() {
            None
        } else {
            Some(ordinal_str.trim_start_matches('+').parse::<i8>()
                .map_err(|_| format!("Invalid weekday ordinal {:?}", s))?)
        };
        Ok(Self { ordinal, weekday })
    }
}

impl Display for WeekdayNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.ordinal {
            Some(n) => write!(f, "{}{}", n, weekday_code(self.weekday)),
            None => write!(f, "{}", weekday_code(self.weekday)),
        }
    }
}


/// The shapes of rules that can be phrased in plain language
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecurrenceType {
    None,
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    MonthlyPos,
    MonthlyDay,
    YearlyMonth,
    YearlyDay,
    YearlyPos,
    Other,
}


/// A single `RRULE`
#[derive(Clone, Debug, PartialEq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    /// Always at least 1
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<CalDateTime>,
    pub by_second: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_hour: Vec<u8>,
    pub by_day: Vec<WeekdayNum>,
    pub by_month_day: Vec<i8>,
    pub by_year_day: Vec<i16>,
    pub by_week_no: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_set_pos: Vec<i16>,
    pub week_start: Option<Weekday>,
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            count: None,
            until: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_set_pos: Vec::new(),
            week_start: None,
        }
    }

    /// Whether this rule goes on forever
    pub fn is_infinite(&self) -> bool {
        self.count.is_none() && self.until.is_none()
    }

    fn has_time_parts(&self) -> bool {
        self.by_second.is_empty() == false || self.by_minute.is_empty() == false || self.by_hour.is_empty() == false
    }

    fn has_date_parts(&self) -> bool {
        self.by_day.is_empty() == false
            || self.by_month_day.is_empty() == false
            || self.by_year_day.is_empty() == false
            || self.by_week_no.is_empty() == false
            || self.by_month.is_empty() == false
            || self.by_set_pos.is_empty() == false
    }

    /// Classify this rule
    pub fn recurrence_type(&self) -> RecurrenceType {
        if self.has_time_parts() || self.by_week_no.is_empty() == false {
            return RecurrenceType::Other;
        }

        match self.freq {
            Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily if self.has_date_parts() => RecurrenceType::Other,
            Frequency::Secondly => RecurrenceType::Secondly,
            Frequency::Minutely => RecurrenceType::Minutely,
            Frequency::Hourly => RecurrenceType::Hourly,
            Frequency::Daily => RecurrenceType::Daily,
            Frequency::Weekly => {
                let plain_days = self.by_day.iter().all(|d| d.ordinal.is_none());
                if plain_days
                    && self.by_month_day.is_empty()
                    && self.by_year_day.is_empty()
                    && self.by_month.is_empty()
                    && self.by_set_pos.is_empty()
                {
                    RecurrenceType::Weekly
                } else {
                    RecurrenceType::Other
                }
            },
            Frequency::Monthly => {
                if self.by_year_day.is_empty() == false || self.by_month.is_empty() == false {
                    RecurrenceType::Other
                } else if self.by_day.is_empty() == false && self.by_month_day.is_empty() {
                    RecurrenceType::MonthlyPos
                } else if self.by_day.is_empty() && self.by_set_pos.is_empty() {
                    RecurrenceType::MonthlyDay
                } else {
                    RecurrenceType::Other
                }
            },
            Frequency::Yearly => {
                if self.by_year_day.is_empty() == false {
                    if self.by_day.is_empty() && self.by_month_day.is_empty() && self.by_month.is_empty() {
                        RecurrenceType::YearlyDay
                    } else {
                        RecurrenceType::Other
                    }
                } else if self.by_day.is_empty() == false {
                    if self.by_month_day.is_empty() { RecurrenceType::YearlyPos } else { RecurrenceType::Other }
                } else if self.by_set_pos.is_empty() {
                    RecurrenceType::YearlyMonth
                } else {
                    RecurrenceType::Other
                }
            },
        }
    }

    /// The `(position, weekday)` pairs of a positional rule.
    /// Position 0 means "every such weekday"
    pub fn month_positions(&self) -> Vec<(i16, Weekday)> {
        self.by_day.iter()
            .map(|d| {
                let pos = match (d.ordinal, self.by_set_pos.first()) {
                    (Some(n), _) => n as i16,
                    (None, Some(set_pos)) => *set_pos,
                    (None, None) => 0,
                };
                (pos, d.weekday)
            })
            .collect()
    }

    /// Parse a vCalendar 1.0 rule, e.g. `W2 MO TU #10` or `MD1 15 20241231T000000Z`
    pub fn from_vcal(value: &str) -> Result<Self, Box<dyn Error>> {
        let mut tokens = value.split_whitespace();
        let head = tokens.next().ok_or("Empty vCalendar recurrence rule")?;

        let digits_at = head.find(|c: char| c.is_ascii_digit()).unwrap_or(head.len());
        let (kind, interval) = head.split_at(digits_at);
        let mut rule = match kind.to_ascii_uppercase().as_str() {
            "M" => RecurrenceRule::new(Frequency::Minutely),
            "D" => RecurrenceRule::new(Frequency::Daily),
            "W" => RecurrenceRule::new(Frequency::Weekly),
            "MP" | "MD" => RecurrenceRule::new(Frequency::Monthly),
            "YM" | "YD" => RecurrenceRule::new(Frequency::Yearly),
            _ => return Err(format!("Unsupported vCalendar recurrence rule {:?}", value).into()),
        };
        if interval.is_empty() == false {
            rule.interval = interval.parse::<u32>()
                .map_err(|_| format!("Invalid interval in vCalendar rule {:?}", value))?
                .max(1);
        }

        let kind = kind.to_ascii_uppercase();
        let mut position: Option<i8> = None;
        for token in tokens {
            if let Some(count) = token.strip_prefix('#') {
                let count: u32 = count.parse().map_err(|_| format!("Invalid count in vCalendar rule {:?}", value))?;
                rule.count = if count == 0 { None } else { Some(count) };
                continue;
            }
            if token.len() >= 8 && token.chars().take(8).all(|c| c.is_ascii_digit()) {
                rule.until = Some(CalDateTime::parse(token, &[])?);
                continue;
            }

            match kind.as_str() {
                "W" => {
                    let day = parse_weekday(token).ok_or_else(|| format!("Invalid weekday {:?} in vCalendar rule", token))?;
                    rule.by_day.push(WeekdayNum::every(day));
                },
                "MP" => {
                    if let Some(day) = parse_weekday(token) {
                        rule.by_day.push(WeekdayNum { ordinal: position, weekday: day });
                    } else {
                        position = Some(parse_vcal_bounded(token, 5, true)? as i8);
                    }
                },
                "MD" => {
                    if token.eq_ignore_ascii_case("LD") {
                        rule.by_month_day.push(-1);
                    } else {
                        rule.by_month_day.push(parse_vcal_bounded(token, 31, true)? as i8);
                    }
                },
                "YM" => rule.by_month.push(parse_vcal_bounded(token, 12, false)? as u8),
                "YD" => rule.by_year_day.push(parse_vcal_bounded(token, 366, true)? as i16),
                _ => log::debug!("Ignoring vCalendar recurrence token {:?}", token),
            }
        }

        Ok(rule)
    }

    /// Write this rule in vCalendar 1.0 syntax. Rules that vCalendar cannot express return `None`
    pub fn to_vcal(&self) -> Option<String> {
        let mut out = match self.recurrence_type() {
            RecurrenceType::Minutely => format!("M{}", self.interval),
            RecurrenceType::Daily => format!("D{}", self.interval),
            RecurrenceType::Weekly => {
                let mut s = format!("W{}", self.interval);
                for day in &self.by_day {
                    s.push(' ');
                    s.push_str(weekday_code(day.weekday));
                }
                s
            },
            RecurrenceType::MonthlyPos => {
                let mut s = format!("MP{}", self.interval);
                for (pos, day) in self.month_positions() {
                    s.push_str(&format!(" {} {}", format_vcal_number(pos as i32), weekday_code(day)));
                }
                s
            },
            RecurrenceType::MonthlyDay => {
                let mut s = format!("MD{}", self.interval);
                for day in &self.by_month_day {
                    s.push(' ');
                    s.push_str(&format_vcal_number(*day as i32));
                }
                s
            },
            RecurrenceType::YearlyMonth => {
                let mut s = format!("YM{}", self.interval);
                for month in &self.by_month {
                    s.push_str(&format!(" {}", month));
                }
                s
            },
            RecurrenceType::YearlyDay => {
                let mut s = format!("YD{}", self.interval);
                for day in &self.by_year_day {
                    s.push_str(&format!(" {}", day));
                }
                s
            },
            _ => return None,
        };

        match (&self.count, &self.until) {
            (Some(count), _) => out.push_str(&format!(" #{}", count)),
            (None, Some(until)) => out.push_str(&format!(" {}", crate::datetime::format_utc(&until.to_utc()))),
            (None, None) => out.push_str(" #0"),
        }
        Some(out)
    }
}

/// vCalendar writes negative numbers with a trailing sign (`1-`, `2+`)
fn parse_vcal_number(token: &str) -> Result<i32, Box<dyn Error>> {
    let (digits, negative) = if let Some(d) = token.strip_suffix('-') {
        (d, true)
    } else if let Some(d) = token.strip_suffix('+') {
        (d, false)
    } else {
        (token, false)
    };
    let n: i32 = digits.parse().map_err(|_| format!("Invalid number {:?} in vCalendar rule", token))?;
    Ok(if negative { -n } else { n })
}

/// A vCalendar number in `1..=max`, or also in `-max..=-1` when `signed`
fn parse_vcal_bounded(token: &str, max: i32, signed: bool) -> Result<i32, Box<dyn Error>> {
    let n = parse_vcal_number(token)?;
    let min = if signed { -max } else { 1 };
    if n == 0 || n < min || n > max {
        return Err(format!("Invalid number {:?} in vCalendar rule, it must be within {}..={}", token, min, max).into());
    }
    Ok(n)
}

fn format_vcal_number(n: i32) -> String {
    if n < 0 { format!("{}-", -n) } else { format!("{}+", n) }
}

impl FromStr for RecurrenceRule {
    type Err = Box<dyn Error>;

    /// Parse the value of an `RRULE` property. Unknown rule parts are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut freq = None;
        let mut rule = RecurrenceRule::new(Frequency::Daily);

        for part in s.trim().split(';').filter(|p| p.is_empty() == false) {
            let (key, value) = match part.find('=') {
                Some(pos) => (&part[..pos], &part[pos + 1..]),
                None => return Err(format!("Invalid recurrence rule part {:?}", part).into()),
            };
            match key.to_ascii_uppercase().as_str() {
                "FREQ" => freq = Some(Frequency::parse(value).ok_or_else(|| format!("Invalid frequency {:?}", value))?),
                "INTERVAL" => rule.interval = value.parse::<u32>().map_err(|_| format!("Invalid interval {:?}", value))?.max(1),
                "COUNT" => {
                    if rule.until.is_some() {
                        return Err("COUNT and UNTIL cannot both be set".into());
                    }
                    rule.count = Some(value.parse().map_err(|_| format!("Invalid count {:?}", value))?);
                },
                "UNTIL" => {
                    if rule.count.is_some() {
                        return Err("COUNT and UNTIL cannot both be set".into());
                    }
                    rule.until = Some(CalDateTime::parse(value, &[])?);
                },
                "WKST" => rule.week_start = Some(parse_weekday(value).ok_or_else(|| format!("Invalid week start {:?}", value))?),
                "BYSECOND" => rule.by_second = parse_list(value)?,
                "BYMINUTE" => rule.by_minute = parse_list(value)?,
                "BYHOUR" => rule.by_hour = parse_list(value)?,
                "BYDAY" => rule.by_day = parse_list(value)?,
                "BYMONTHDAY" => rule.by_month_day = parse_list(value)?,
                "BYYEARDAY" => rule.by_year_day = parse_list(value)?,
                "BYWEEKNO" => rule.by_week_no = parse_list(value)?,
                "BYMONTH" => rule.by_month = parse_list(value)?,
                "BYSETPOS" => rule.by_set_pos = parse_list(value)?,
                other => log::debug!("Ignoring unknown recurrence rule part {:?}", other),
            }
        }

        rule.freq = freq.ok_or("Recurrence rule without a FREQ")?;
        Ok(rule)
    }
}

fn parse_list<T>(value: &str) -> Result<Vec<T>, Box<dyn Error>>
where
    T: FromStr,
{
    value.split(',')
        .map(|v| v.trim().trim_start_matches('+').parse::<T>().map_err(|_| format!("Invalid recurrence rule value {:?}", v).into()))
        .collect()
}

fn join<T: Display>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FREQ={}", self.freq.as_str())?;
        if self.interval > 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={}", until.to_ics().0)?;
        }
        let lists: [(&str, String); 9] = [
            ("BYSECOND", join(&self.by_second)),
            ("BYMINUTE", join(&self.by_minute)),
            ("BYHOUR", join(&self.by_hour)),
            ("BYDAY", join(&self.by_day)),
            ("BYMONTHDAY", join(&self.by_month_day)),
            ("BYYEARDAY", join(&self.by_year_day)),
            ("BYWEEKNO", join(&self.by_week_no)),
            ("BYMONTH", join(&self.by_month)),
            ("BYSETPOS", join(&self.by_set_pos)),
        ];
        for (name, list) in lists.iter() {
            if list.is_empty() == false {
                write!(f, ";{}={}", name, list)?;
            }
        }
        if let Some(wkst) = self.week_start {
            write!(f, ";WKST={}", weekday_code(wkst))?;
        }
        Ok(())
    }
}


/// Every recurrence-related property of an incidence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recurrence {
    pub rrules: Vec<RecurrenceRule>,
    pub rdates: Vec<CalDateTime>,
    pub exdates: Vec<CalDateTime>,
}

impl Recurrence {
    pub fn recurs(&self) -> bool {
        self.rrules.is_empty() == false || self.rdates.is_empty() == false
    }

    pub fn default_rule(&self) -> Option<&RecurrenceRule> {
        self.rrules.first()
    }

    pub fn recurrence_type(&self) -> RecurrenceType {
        match self.default_rule() {
            Some(rule) => rule.recurrence_type(),
            None if self.rdates.is_empty() == false => RecurrenceType::Other,
            None => RecurrenceType::None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rrule() {
        let rule: RecurrenceRule = "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20241231T000000Z;X-FOO=1".parse().unwrap();
        assert_eq!(rule.freq, Frequency::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.by_day, vec![WeekdayNum::every(Weekday::Mon), WeekdayNum::every(Weekday::Wed)]);
        assert!(rule.until.is_some());
        assert_eq!(rule.recurrence_type(), RecurrenceType::Weekly);

        let rule: RecurrenceRule = "FREQ=MONTHLY;BYDAY=-1FR".parse().unwrap();
        assert_eq!(rule.recurrence_type(), RecurrenceType::MonthlyPos);
        assert_eq!(rule.month_positions(), vec![(-1, Weekday::Fri)]);

        let rule: RecurrenceRule = "FREQ=MONTHLY;BYDAY=TU;BYSETPOS=2".parse().unwrap();
        assert_eq!(rule.month_positions(), vec![(2, Weekday::Tue)]);
    }

    #[test]
    fn test_invalid_rrules() {
        assert!("INTERVAL=2".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=FORTNIGHTLY".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=DAILY;COUNT=3;UNTIL=20240101".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=WEEKLY;BYDAY=XX".parse::<RecurrenceRule>().is_err());
    }

    #[test]
    fn test_rrule_to_string() {
        let text = "FREQ=YEARLY;COUNT=5;BYDAY=1MO;BYMONTH=5";
        let rule: RecurrenceRule = text.parse().unwrap();
        assert_eq!(rule.to_string(), text);
        assert_eq!(rule.recurrence_type(), RecurrenceType::YearlyPos);
    }

    #[test]
    fn test_classification() {
        let kinds = [
            ("FREQ=DAILY", RecurrenceType::Daily),
            ("FREQ=DAILY;BYDAY=MO", RecurrenceType::Other),
            ("FREQ=HOURLY;INTERVAL=3", RecurrenceType::Hourly),
            ("FREQ=MONTHLY;BYMONTHDAY=15", RecurrenceType::MonthlyDay),
            ("FREQ=MONTHLY", RecurrenceType::MonthlyDay),
            ("FREQ=YEARLY;BYYEARDAY=100", RecurrenceType::YearlyDay),
            ("FREQ=YEARLY;BYMONTH=3;BYMONTHDAY=15", RecurrenceType::YearlyMonth),
            ("FREQ=SECONDLY", RecurrenceType::Secondly),
            ("FREQ=SECONDLY;BYMONTH=1", RecurrenceType::Other),
            ("FREQ=WEEKLY;BYHOUR=9", RecurrenceType::Other),
        ];
        for (text, expected) in kinds.iter() {
            let rule: RecurrenceRule = text.parse().unwrap();
            assert_eq!(rule.recurrence_type(), *expected, "for {}", text);
        }
    }

    #[test]
    fn test_vcal_rules() {
        let rule = RecurrenceRule::from_vcal("W2 MO TU #10").unwrap();
        assert_eq!(rule.freq, Frequency::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.count, Some(10));
        assert_eq!(rule.by_day.len(), 2);
        assert_eq!(rule.to_vcal().unwrap(), "W2 MO TU #10");

        let rule = RecurrenceRule::from_vcal("MP1 2- FR #0").unwrap();
        assert_eq!(rule.by_day, vec![WeekdayNum::nth(-2, Weekday::Fri)]);
        assert!(rule.is_infinite());
        assert_eq!(rule.to_vcal().unwrap(), "MP1 2- FR #0");

        let rule = RecurrenceRule::from_vcal("MD1 LD 20241231T000000Z").unwrap();
        assert_eq!(rule.by_month_day, vec![-1]);
        assert!(rule.until.is_some());

        assert!(RecurrenceRule::from_vcal("Q1").is_err());
        assert_eq!("FREQ=HOURLY".parse::<RecurrenceRule>().unwrap().to_vcal(), None);
    }

    #[test]
    fn test_vcal_rules_out_of_range() {
        assert!(RecurrenceRule::from_vcal("MD1 300").is_err());
        assert!(RecurrenceRule::from_vcal("MD1 32-").is_err());
        assert!(RecurrenceRule::from_vcal("YM1 260").is_err());
        assert!(RecurrenceRule::from_vcal("YM1 1-").is_err());
        assert!(RecurrenceRule::from_vcal("YD1 367").is_err());
        assert!(RecurrenceRule::from_vcal("MP1 6+ MO").is_err());
        assert!(RecurrenceRule::from_vcal("MD1 0").is_err());

        assert_eq!(RecurrenceRule::from_vcal("MD1 31- #2").unwrap().by_month_day, vec![-31]);
        assert_eq!(RecurrenceRule::from_vcal("YM1 12").unwrap().by_month, vec![12]);
        assert_eq!(RecurrenceRule::from_vcal("YD1 366-").unwrap().by_year_day, vec![-366]);
    }
}
