//! Calendar incidences (events, to-dos, journals, free/busy records)

use chrono::{DateTime, Utc};
use ical::property::Property;
use url::Url;
use uuid::Uuid;

use crate::alarm::Alarm;
use crate::attendee::{Attendee, Person};
use crate::datetime::CalDateTime;
use crate::recurrence::Recurrence;
use crate::{Event, FreeBusy, Journal, Todo};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncidenceType {
    Event,
    Todo,
    Journal,
    FreeBusy,
}

impl IncidenceType {
    /// The name of the iCalendar component
    pub fn component_name(&self) -> &'static str {
        match self {
            IncidenceType::Event => "VEVENT",
            IncidenceType::Todo => "VTODO",
            IncidenceType::Journal => "VJOURNAL",
            IncidenceType::FreeBusy => "VFREEBUSY",
        }
    }
}


/// `STATUS` of an incidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    None,
    Tentative,
    Confirmed,
    Completed,
    NeedsAction,
    Canceled,
    InProcess,
    Draft,
    Final,
    /// A non-standard `X-` status, kept verbatim
    X(String),
}

impl Status {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "TENTATIVE" => Status::Tentative,
            "CONFIRMED" => Status::Confirmed,
            "COMPLETED" => Status::Completed,
            "NEEDS-ACTION" | "NEEDS ACTION" => Status::NeedsAction,
            "CANCELLED" | "CANCELED" | "DECLINED" => Status::Canceled,
            "IN-PROCESS" => Status::InProcess,
            "DRAFT" => Status::Draft,
            "FINAL" => Status::Final,
            "" => Status::None,
            _ => Status::X(value.to_string()),
        }
    }

    /// `None` for the absence of a status
    pub fn as_ical(&self) -> Option<&str> {
        match self {
            Status::None => None,
            Status::Tentative => Some("TENTATIVE"),
            Status::Confirmed => Some("CONFIRMED"),
            Status::Completed => Some("COMPLETED"),
            Status::NeedsAction => Some("NEEDS-ACTION"),
            Status::Canceled => Some("CANCELLED"),
            Status::InProcess => Some("IN-PROCESS"),
            Status::Draft => Some("DRAFT"),
            Status::Final => Some("FINAL"),
            Status::X(custom) => Some(custom),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::None
    }
}


/// Access classification (`CLASS`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Secrecy {
    Public,
    Private,
    Confidential,
}

impl Secrecy {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PRIVATE" => Secrecy::Private,
            "CONFIDENTIAL" => Secrecy::Confidential,
            _ => Secrecy::Public,
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            Secrecy::Public => "PUBLIC",
            Secrecy::Private => "PRIVATE",
            Secrecy::Confidential => "CONFIDENTIAL",
        }
    }
}

impl Default for Secrecy {
    fn default() -> Self {
        Secrecy::Public
    }
}


/// A file attached to an incidence, either referenced by its URI or inlined
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    /// The URI, or the base64 data of an inline attachment
    pub data: String,
    pub inline: bool,
    pub mime_type: Option<String>,
    /// A user-facing name (`X-LABEL`)
    pub label: Option<String>,
}

impl Attachment {
    pub fn from_uri(uri: &str) -> Self {
        Self { data: uri.to_string(), inline: false, mime_type: None, label: None }
    }

    /// What to show a user for this attachment
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(label) if label.is_empty() == false => label,
            _ if self.inline => "attachment",
            _ => &self.data,
        }
    }
}


/// The properties every kind of incidence has
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncidenceBase {
    /// Persistent, globally unique identifier
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub categories: Vec<String>,
    pub organizer: Option<Person>,
    pub attendees: Vec<Attendee>,
    pub dt_start: Option<CalDateTime>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub dtstamp: Option<DateTime<Utc>>,
    /// Revision number, bumped by the organizer on every significant change
    pub sequence: u32,
    pub status: Status,
    pub secrecy: Secrecy,
    /// 1 is the highest priority, 9 the lowest, 0 is undefined
    pub priority: u8,
    pub recurrence: Recurrence,
    pub recurrence_id: Option<CalDateTime>,
    pub alarms: Vec<Alarm>,
    pub attachments: Vec<Attachment>,
    pub url: Option<Url>,
    pub contacts: Vec<String>,
    pub comments: Vec<String>,
    pub resources: Vec<String>,
    /// UID of the parent incidence
    pub related_to: Option<String>,

    /// Properties that have not been parsed from the iCal file (because they're not supported (yet) by this crate).
    /// They are needed to serialize this item into an equivalent iCal file
    pub custom_properties: Vec<Property>,
}

impl IncidenceBase {
    /// An empty incidence with a fresh UID, created now
    pub fn new(summary: &str) -> Self {
        let now = Utc::now();
        Self {
            uid: Uuid::new_v4().to_hyphenated().to_string(),
            summary: summary.to_string(),
            created: Some(now),
            last_modified: Some(now),
            dtstamp: Some(now),
            ..Default::default()
        }
    }

    pub fn recurs(&self) -> bool {
        self.recurrence.recurs()
    }

    /// The attendee entry for one of the given e-mail addresses
    pub fn attendee_by_emails<S: AsRef<str>>(&self, emails: &[S]) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.person.matches_any(emails))
    }

    pub fn attendee_by_email(&self, email: &str) -> Option<&Attendee> {
        self.attendee_by_emails(&[email])
    }

    /// Whether one of the given e-mail addresses is the organizer's
    pub fn is_organizer<S: AsRef<str>>(&self, emails: &[S]) -> bool {
        self.organizer.as_ref().map(|o| o.matches_any(emails)).unwrap_or(false)
    }

    /// Look up a non-standard property that was kept verbatim
    pub fn custom_property(&self, name: &str) -> Option<&str> {
        self.custom_properties.iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.value.as_deref())
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum Incidence {
    Event(Event),
    Todo(Todo),
    Journal(Journal),
    FreeBusy(FreeBusy),
}

/// Returns `event.$property_name`, `todo.$property_name`..., depending on the variant of self
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                Incidence::Event(e) => e.$property_name(),
                Incidence::Todo(t) => t.$property_name(),
                Incidence::Journal(j) => j.$property_name(),
                Incidence::FreeBusy(f) => f.$property_name(),
            }
        }
    };
    (mut $property_name:ident, $return_type:ty) => {
        pub fn $property_name(&mut self) -> $return_type {
            match self {
                Incidence::Event(e) => e.$property_name(),
                Incidence::Todo(t) => t.$property_name(),
                Incidence::Journal(j) => j.$property_name(),
                Incidence::FreeBusy(f) => f.$property_name(),
            }
        }
    };
}

impl Incidence {
    synthetise_common_getter!(base, &IncidenceBase);
    synthetise_common_getter!(mut base_mut, &mut IncidenceBase);
    synthetise_common_getter!(date_end, Option<&CalDateTime>);
    synthetise_common_getter!(all_day, bool);

    pub fn incidence_type(&self) -> IncidenceType {
        match self {
            Incidence::Event(_) => IncidenceType::Event,
            Incidence::Todo(_) => IncidenceType::Todo,
            Incidence::Journal(_) => IncidenceType::Journal,
            Incidence::FreeBusy(_) => IncidenceType::FreeBusy,
        }
    }

    pub fn uid(&self) -> &str                      { &self.base().uid }
    pub fn summary(&self) -> &str                  { &self.base().summary }
    pub fn dt_start(&self) -> Option<&CalDateTime> { self.base().dt_start.as_ref() }
    pub fn recurs(&self) -> bool                   { self.base().recurs() }

    /// The URI used to reference this incidence in drag-and-drop payloads
    pub fn uri(&self) -> String {
        format!("urn:x-ical:{}", self.uid())
    }

    /// Turn this incidence into a brand new one: new UID, sequence 0, creation and modification dates set to now
    pub fn recreate(&mut self) {
        let now = Utc::now();
        let base = self.base_mut();
        base.uid = Uuid::new_v4().to_hyphenated().to_string();
        base.sequence = 0;
        base.created = Some(now);
        base.last_modified = Some(now);
        base.dtstamp = Some(now);
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Incidence::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_todo(&self) -> Option<&Todo> {
        match self {
            Incidence::Todo(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_journal(&self) -> Option<&Journal> {
        match self {
            Incidence::Journal(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_free_busy(&self) -> Option<&FreeBusy> {
        match self {
            Incidence::FreeBusy(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_event(&self) -> bool {
        self.as_event().is_some()
    }

    pub fn is_todo(&self) -> bool {
        self.as_todo().is_some()
    }
}

impl From<Event> for Incidence {
    fn from(event: Event) -> Self {
        Incidence::Event(event)
    }
}

impl From<Todo> for Incidence {
    fn from(todo: Todo) -> Self {
        Incidence::Todo(todo)
    }
}

impl From<Journal> for Incidence {
    fn from(journal: Journal) -> Self {
        Incidence::Journal(journal)
    }
}

impl From<FreeBusy> for Incidence {
    fn from(free_busy: FreeBusy) -> Self {
        Incidence::FreeBusy(free_busy)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_recreate() {
        let mut event = Event::new("Team meeting");
        event.base.sequence = 4;
        let mut incidence = Incidence::from(event);
        let old_uid = incidence.uid().to_string();

        incidence.recreate();
        assert_ne!(incidence.uid(), old_uid);
        assert_eq!(incidence.base().sequence, 0);
        assert_eq!(incidence.summary(), "Team meeting");
        assert_eq!(incidence.uri(), format!("urn:x-ical:{}", incidence.uid()));
    }

    #[test]
    fn test_common_getters() {
        let mut todo = Todo::new("File taxes");
        todo.due = Some(CalDateTime::Date(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()));
        let incidence = Incidence::Todo(todo);

        assert_eq!(incidence.incidence_type(), IncidenceType::Todo);
        assert!(incidence.all_day());
        assert!(incidence.date_end().is_some());
        assert!(incidence.as_event().is_none());
    }

    #[test]
    fn test_status() {
        assert_eq!(Status::from_ical("CANCELLED"), Status::Canceled);
        assert_eq!(Status::from_ical("X-POSTPONED"), Status::X("X-POSTPONED".to_string()));
        assert_eq!(Status::X("X-POSTPONED".to_string()).as_ical(), Some("X-POSTPONED"));
        assert_eq!(Status::None.as_ical(), None);
    }
}
