//! Organizers and attendees (`ORGANIZER` and `ATTENDEE` properties)

use crate::datetime::param_value;

/// Someone with a name and an e-mail address
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn new(name: &str, email: &str) -> Self {
        Self { name: name.to_string(), email: email.to_string() }
    }

    /// Build a person from a `CAL-ADDRESS` value (`mailto:john@example.com`) and its `CN` parameter
    pub fn from_cal_address(value: &str, params: &[(String, Vec<String>)]) -> Self {
        let name = param_value(params, "CN").unwrap_or("").trim_matches('"').to_string();
        Self { name, email: strip_mailto(value).to_string() }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    /// The name if there is one, the e-mail address otherwise
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.email } else { &self.name }
    }

    /// `John Doe <john@example.com>`, or whatever part is known
    pub fn full_name(&self) -> String {
        match (self.name.is_empty(), self.email.is_empty()) {
            (false, false) => format!("{} <{}>", self.name, self.email),
            (false, true) => self.name.clone(),
            (true, _) => self.email.clone(),
        }
    }

    /// The `mailto:` URI of this person
    pub fn cal_address(&self) -> String {
        format!("mailto:{}", self.email)
    }

    /// Whether this person has one of the given e-mail addresses (case-insensitive)
    pub fn matches_any<S: AsRef<str>>(&self, emails: &[S]) -> bool {
        emails.iter().any(|e| e.as_ref().eq_ignore_ascii_case(&self.email))
    }
}

pub(crate) fn strip_mailto(value: &str) -> &str {
    let value = value.trim();
    if value.get(..7).map(|prefix| prefix.eq_ignore_ascii_case("mailto:")).unwrap_or(false) {
        &value[7..]
    } else {
        value
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Chair,
    ReqParticipant,
    OptParticipant,
    NonParticipant,
}

impl Role {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "CHAIR" => Role::Chair,
            "OPT-PARTICIPANT" => Role::OptParticipant,
            "NON-PARTICIPANT" => Role::NonParticipant,
            // vCalendar 1.0 names
            "OWNER" | "ORGANIZER" => Role::Chair,
            "DELEGATE" | "ATTENDEE" | "REQ-PARTICIPANT" => Role::ReqParticipant,
            other => {
                log::debug!("Unknown attendee role {:?}, using REQ-PARTICIPANT", other);
                Role::ReqParticipant
            }
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            Role::Chair => "CHAIR",
            Role::ReqParticipant => "REQ-PARTICIPANT",
            Role::OptParticipant => "OPT-PARTICIPANT",
            Role::NonParticipant => "NON-PARTICIPANT",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::ReqParticipant
    }
}


/// Participation status (`PARTSTAT`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartStat {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
    Delegated,
    Completed,
    InProcess,
    None,
}

impl PartStat {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "NEEDS-ACTION" | "NEEDS ACTION" | "SENT" => PartStat::NeedsAction,
            "ACCEPTED" | "CONFIRMED" => PartStat::Accepted,
            "DECLINED" => PartStat::Declined,
            "TENTATIVE" => PartStat::Tentative,
            "DELEGATED" => PartStat::Delegated,
            "COMPLETED" => PartStat::Completed,
            "IN-PROCESS" => PartStat::InProcess,
            other => {
                log::debug!("Unknown participation status {:?}", other);
                PartStat::None
            }
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            PartStat::NeedsAction | PartStat::None => "NEEDS-ACTION",
            PartStat::Accepted => "ACCEPTED",
            PartStat::Declined => "DECLINED",
            PartStat::Tentative => "TENTATIVE",
            PartStat::Delegated => "DELEGATED",
            PartStat::Completed => "COMPLETED",
            PartStat::InProcess => "IN-PROCESS",
        }
    }

    /// The vCalendar 1.0 `STATUS` parameter value
    pub fn as_vcal(&self) -> &'static str {
        match self {
            PartStat::NeedsAction | PartStat::None => "NEEDS ACTION",
            PartStat::Accepted => "ACCEPTED",
            PartStat::Declined => "DECLINED",
            PartStat::Tentative => "TENTATIVE",
            PartStat::Delegated => "DELEGATED",
            PartStat::Completed => "COMPLETED",
            PartStat::InProcess => "CONFIRMED",
        }
    }
}

impl Default for PartStat {
    fn default() -> Self {
        PartStat::NeedsAction
    }
}


/// Calendar user type (`CUTYPE`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CuType {
    Individual,
    Group,
    Resource,
    Room,
    Unknown,
}

impl CuType {
    pub fn from_ical(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => CuType::Individual,
            "GROUP" => CuType::Group,
            "RESOURCE" => CuType::Resource,
            "ROOM" => CuType::Room,
            _ => CuType::Unknown,
        }
    }

    pub fn as_ical(&self) -> &'static str {
        match self {
            CuType::Individual => "INDIVIDUAL",
            CuType::Group => "GROUP",
            CuType::Resource => "RESOURCE",
            CuType::Room => "ROOM",
            CuType::Unknown => "UNKNOWN",
        }
    }
}

impl Default for CuType {
    fn default() -> Self {
        CuType::Individual
    }
}


/// A participant of an incidence
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attendee {
    pub person: Person,
    pub role: Role,
    pub status: PartStat,
    /// Whether the organizer expects a reply
    pub rsvp: bool,
    pub cu_type: CuType,
    pub delegate: String,
    pub delegator: String,
}

impl Attendee {
    pub fn new(name: &str, email: &str, role: Role, status: PartStat) -> Self {
        Self {
            person: Person::new(name, email),
            role,
            status,
            ..Default::default()
        }
    }

    /// Build an attendee from an `ATTENDEE` property value and its parameters.
    /// Both the iCalendar (`PARTSTAT`) and vCalendar (`STATUS`, `EXPECT`) parameter names are understood.
    pub fn from_ical(value: &str, params: &[(String, Vec<String>)]) -> Self {
        let status = param_value(params, "PARTSTAT")
            .or_else(|| param_value(params, "STATUS"))
            .map(PartStat::from_ical)
            .unwrap_or_default();
        let rsvp = param_value(params, "RSVP")
            .map(|v| v.eq_ignore_ascii_case("TRUE") || v.eq_ignore_ascii_case("YES"))
            .unwrap_or(false);

        Self {
            person: Person::from_cal_address(value, params),
            role: param_value(params, "ROLE").map(Role::from_ical).unwrap_or_default(),
            status,
            rsvp,
            cu_type: param_value(params, "CUTYPE").map(CuType::from_ical).unwrap_or_default(),
            delegate: param_value(params, "DELEGATED-TO").map(strip_mailto).unwrap_or("").to_string(),
            delegator: param_value(params, "DELEGATED-FROM").map(strip_mailto).unwrap_or("").to_string(),
        }
    }

    pub fn name(&self) -> &str  { &self.person.name }
    pub fn email(&self) -> &str { &self.person.email }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, Vec<String>)> {
        pairs.iter().map(|(k, v)| (k.to_string(), vec![v.to_string()])).collect()
    }

    #[test]
    fn test_attendee_from_ical() {
        let att = Attendee::from_ical(
            "mailto:jane@example.com",
            &params(&[("CN", "Jane Doe"), ("ROLE", "OPT-PARTICIPANT"), ("PARTSTAT", "TENTATIVE"), ("RSVP", "TRUE")]),
        );
        assert_eq!(att.name(), "Jane Doe");
        assert_eq!(att.email(), "jane@example.com");
        assert_eq!(att.role, Role::OptParticipant);
        assert_eq!(att.status, PartStat::Tentative);
        assert!(att.rsvp);
    }

    #[test]
    fn test_vcal_attendee() {
        let att = Attendee::from_ical("bob@example.com", &params(&[("ROLE", "OWNER"), ("STATUS", "CONFIRMED")]));
        assert_eq!(att.email(), "bob@example.com");
        assert_eq!(att.role, Role::Chair);
        assert_eq!(att.status, PartStat::Accepted);
    }

    #[test]
    fn test_person_names() {
        let p = Person::new("", "x@example.com");
        assert_eq!(p.display_name(), "x@example.com");
        assert_eq!(p.full_name(), "x@example.com");
        assert!(p.matches_any(&["X@Example.com"]));
        assert_eq!(Person::new("X", "x@example.com").full_name(), "X <x@example.com>");
    }
}
