//! Support for library configuration options

use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::format::{Item, StrftimeItems};
use chrono::Weekday;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("My organization".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("CalUtils".to_string())));

/// The PRODID written into every generated iCalendar or vCalendar payload
pub fn prod_id() -> String {
    format!("-//{}//{}//EN", read_setting(&ORG_NAME), read_setting(&PRODUCT_NAME))
}

fn read_setting(setting: &Mutex<String>) -> String {
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}


/// How dates and times are rendered in human-readable strings.
///
/// Format patterns use the `strftime` syntax of [`chrono::format::strftime`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    /// e.g. `2024-03-15`
    pub short_date_format: String,
    /// e.g. `Friday, March 15, 2024`
    pub long_date_format: String,
    pub time_format: String,
    /// The first day of the week, as used in month views and weekly recurrence strings
    #[serde(with = "weekday_serde")]
    pub week_start: Weekday,
    /// IANA name of the zone that UTC and zoned times are converted into before display.
    /// `None` displays UTC times as UTC, and zoned times in their own zone.
    pub time_zone: Option<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            short_date_format: "%Y-%m-%d".to_string(),
            long_date_format: "%A, %B %-d, %Y".to_string(),
            time_format: "%H:%M".to_string(),
            week_start: Weekday::Mon,
            time_zone: None,
        }
    }
}

impl Locale {
    /// Load a locale from a JSON file. Missing keys take their default value.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let locale: Locale = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };
        locale.validate()?;
        Ok(locale)
    }

    /// Check that every format pattern is understood by chrono and that the time zone exists
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        for pattern in &[&self.short_date_format, &self.long_date_format, &self.time_format] {
            if StrftimeItems::new(pattern).any(|item| item == Item::Error) {
                return Err(format!("Invalid date/time format pattern {:?}", pattern).into());
            }
        }
        if let Some(name) = &self.time_zone {
            name.parse::<Tz>().map_err(|err| format!("Unknown time zone {:?}: {}", name, err))?;
        }
        Ok(())
    }

    /// The zone to display times in, if any
    pub fn display_zone(&self) -> Option<Tz> {
        let name = self.time_zone.as_ref()?;
        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                log::warn!("Unknown display time zone {:?}. Ignoring it", name);
                None
            }
        }
    }

    pub fn date_format(&self, short: bool) -> &str {
        if short { &self.short_date_format } else { &self.long_date_format }
    }
}

/// Render a chrono value with a user-supplied pattern, without panicking on invalid patterns
pub(crate) fn format_with<D>(value: D, fallback: &str) -> String
where
    D: std::fmt::Display,
{
    let mut rendered = String::new();
    match write!(rendered, "{}", value) {
        Ok(()) => rendered,
        Err(_) => {
            log::warn!("Invalid format pattern, using {:?} instead", fallback);
            fallback.to_string()
        }
    }
}

mod weekday_serde {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&day.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Weekday>()
            .map_err(|_| serde::de::Error::custom(format!("invalid weekday {:?}", s)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prod_id() {
        assert!(prod_id().starts_with("-//"));
        assert!(prod_id().ends_with("//EN"));
    }

    #[test]
    fn test_locale_from_json() {
        let json = r#"{ "time_format": "%I:%M %p", "week_start": "Sun", "time_zone": "Europe/Paris" }"#;
        let locale: Locale = serde_json::from_str(json).unwrap();
        assert_eq!(locale.week_start, Weekday::Sun);
        assert_eq!(locale.time_format, "%I:%M %p");
        assert_eq!(locale.short_date_format, Locale::default().short_date_format);
        assert!(locale.validate().is_ok());
        assert_eq!(locale.display_zone(), Some(chrono_tz::Europe::Paris));
    }

    #[test]
    fn test_invalid_locale() {
        let mut locale = Locale::default();
        locale.time_format = "%Q".to_string();
        assert!(locale.validate().is_err());

        let mut locale = Locale::default();
        locale.time_zone = Some("Mars/Olympus_Mons".to_string());
        assert!(locale.validate().is_err());
        assert_eq!(locale.display_zone(), None);
    }
}
