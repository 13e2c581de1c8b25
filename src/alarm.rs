//! Reminders (iCal `VALARM` component)

use std::error::Error;

use chrono::{DateTime, Duration, Utc};

use crate::datetime::{parse_duration, parse_utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmAction {
    Display,
    Audio,
    Email,
    Procedure,
}

impl AlarmAction {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "AUDIO" => AlarmAction::Audio,
            "EMAIL" => AlarmAction::Email,
            "PROCEDURE" => AlarmAction::Procedure,
            "DISPLAY" => AlarmAction::Display,
            other => {
                log::debug!("Unknown alarm action {:?}, using DISPLAY", other);
                AlarmAction::Display
            }
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            AlarmAction::Display => "DISPLAY",
            AlarmAction::Audio => "AUDIO",
            AlarmAction::Email => "EMAIL",
            AlarmAction::Procedure => "PROCEDURE",
        }
    }
}

/// When an alarm goes off
#[derive(Clone, Debug, PartialEq)]
pub enum AlarmTrigger {
    /// Relative to the start of the incidence (negative means before)
    StartOffset(Duration),
    /// Relative to the end of an event, or the due date of a to-do
    EndOffset(Duration),
    Absolute(DateTime<Utc>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alarm {
    pub action: AlarmAction,
    pub trigger: AlarmTrigger,
    /// How many more times the alarm goes off after the first time
    pub repeat: u32,
    /// The delay between repetitions
    pub snooze: Option<Duration>,
    pub description: String,
}

impl Alarm {
    pub fn new(action: AlarmAction, trigger: AlarmTrigger) -> Self {
        Self {
            action,
            trigger,
            repeat: 0,
            snooze: None,
            description: String::new(),
        }
    }

    /// Parse a `TRIGGER` value and its parameters (`RELATED`, `VALUE`)
    pub fn parse_trigger(value: &str, params: &[(String, Vec<String>)]) -> Result<AlarmTrigger, Box<dyn Error>> {
        let is_absolute = crate::datetime::param_value(params, "VALUE")
            .map(|v| v.eq_ignore_ascii_case("DATE-TIME"))
            .unwrap_or(false);
        if is_absolute {
            return Ok(AlarmTrigger::Absolute(parse_utc(value)?));
        }

        let offset = parse_duration(value)?;
        let related_to_end = crate::datetime::param_value(params, "RELATED")
            .map(|v| v.eq_ignore_ascii_case("END"))
            .unwrap_or(false);
        if related_to_end {
            Ok(AlarmTrigger::EndOffset(offset))
        } else {
            Ok(AlarmTrigger::StartOffset(offset))
        }
    }

    /// Parse a vCalendar 1.0 `AALARM` or `DALARM` value (`run time;snooze;repeat;extra`)
    pub fn from_vcal(value: &str, action: AlarmAction) -> Result<Self, Box<dyn Error>> {
        let mut fields = value.split(';');
        let run_time = fields.next().map(str::trim).unwrap_or("");
        if run_time.is_empty() {
            return Err("vCalendar alarm without a run time".into());
        }
        let mut alarm = Alarm::new(action, AlarmTrigger::Absolute(parse_utc(run_time)?));

        if let Some(snooze) = fields.next().map(str::trim).filter(|s| s.is_empty() == false) {
            alarm.snooze = Some(parse_duration(snooze)?);
        }
        if let Some(repeat) = fields.next().map(str::trim).filter(|s| s.is_empty() == false) {
            alarm.repeat = repeat.parse().map_err(|_| format!("Invalid alarm repeat count {:?}", repeat))?;
        }
        if let Some(text) = fields.next() {
            alarm.description = text.to_string();
        }
        Ok(alarm)
    }

    /// The offset of this alarm when it is relative, and whether it is relative to the end
    pub fn offset(&self) -> Option<(Duration, bool)> {
        match &self.trigger {
            AlarmTrigger::StartOffset(d) => Some((*d, false)),
            AlarmTrigger::EndOffset(d) => Some((*d, true)),
            AlarmTrigger::Absolute(_) => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, Vec<String>)> {
        pairs.iter().map(|(k, v)| (k.to_string(), vec![v.to_string()])).collect()
    }

    #[test]
    fn test_triggers() {
        assert_eq!(
            Alarm::parse_trigger("-PT15M", &[]).unwrap(),
            AlarmTrigger::StartOffset(Duration::minutes(-15))
        );
        assert_eq!(
            Alarm::parse_trigger("PT1H", &params(&[("RELATED", "END")])).unwrap(),
            AlarmTrigger::EndOffset(Duration::hours(1))
        );
        assert_eq!(
            Alarm::parse_trigger("20240315T090000Z", &params(&[("VALUE", "DATE-TIME")])).unwrap(),
            AlarmTrigger::Absolute(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
        );
        assert!(Alarm::parse_trigger("soon", &[]).is_err());
        assert!(Alarm::parse_trigger("-P99999999999999W", &[]).is_err());
        assert!(Alarm::parse_trigger("PT99999999999999999H", &params(&[("RELATED", "END")])).is_err());
    }

    #[test]
    fn test_vcal_alarm() {
        let alarm = Alarm::from_vcal("20240315T090000Z;PT5M;2;Wake up", AlarmAction::Display).unwrap();
        assert_eq!(alarm.repeat, 2);
        assert_eq!(alarm.snooze, Some(Duration::minutes(5)));
        assert_eq!(alarm.description, "Wake up");
        assert_eq!(alarm.offset(), None);

        assert!(Alarm::from_vcal("", AlarmAction::Audio).is_err());
    }
}
