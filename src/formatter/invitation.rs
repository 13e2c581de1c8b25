//! iTIP (RFC 5546) invitations, replies and cancellations rendered as HTML

use serde_json::{json, Value};

use crate::attendee::{Attendee, PartStat, strip_mailto};
use crate::calendar::Calendar;
use crate::config::Locale;
use crate::incidence::{Incidence, IncidenceType};
use crate::stringify;

use super::duration::{date_time_to_string, duration_string};
use super::recurrence::recurrence_string;
use super::{escape, plain_to_html, sanitize_html, templates};

/// The `METHOD` of a scheduling message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItipMethod {
    Publish,
    Request,
    Refresh,
    Cancel,
    Add,
    Reply,
    Counter,
    DeclineCounter,
    NoMethod,
}

impl ItipMethod {
    pub fn from_ical(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("PUBLISH") => ItipMethod::Publish,
            Some("REQUEST") => ItipMethod::Request,
            Some("REFRESH") => ItipMethod::Refresh,
            Some("CANCEL") => ItipMethod::Cancel,
            Some("ADD") => ItipMethod::Add,
            Some("REPLY") => ItipMethod::Reply,
            Some("COUNTER") => ItipMethod::Counter,
            Some("DECLINECOUNTER") => ItipMethod::DeclineCounter,
            Some(other) => {
                log::warn!("Unknown iTIP method {:?}", other);
                ItipMethod::NoMethod
            },
            None => ItipMethod::NoMethod,
        }
    }

    pub fn as_ical(&self) -> Option<&'static str> {
        match self {
            ItipMethod::Publish => Some("PUBLISH"),
            ItipMethod::Request => Some("REQUEST"),
            ItipMethod::Refresh => Some("REFRESH"),
            ItipMethod::Cancel => Some("CANCEL"),
            ItipMethod::Add => Some("ADD"),
            ItipMethod::Reply => Some("REPLY"),
            ItipMethod::Counter => Some("COUNTER"),
            ItipMethod::DeclineCounter => Some("DECLINECOUNTER"),
            ItipMethod::NoMethod => None,
        }
    }

    /// Answers to an incidence the recipient sent. They only carry the attendee who answers
    fn expects_existing(&self) -> bool {
        match self {
            ItipMethod::Reply | ItipMethod::Refresh | ItipMethod::Counter | ItipMethod::DeclineCounter => true,
            _ => false,
        }
    }

    /// Whether the message may carry new values for the incidence fields
    fn changes_fields(&self) -> bool {
        match self {
            ItipMethod::Reply | ItipMethod::Refresh | ItipMethod::DeclineCounter => false,
            _ => true,
        }
    }
}

/// How a scheduling message relates to what the recipient already has
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// Nothing with this UID is known yet
    New,
    /// A newer version of a published incidence
    Updated,
    /// Older than (or as old as) the known version
    Obsolete,
    /// A newer version of a requested incidence
    RequestUpdate,
    Unknown,
}

/// A received iTIP message
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleMessage {
    method: ItipMethod,
    incidence: Incidence,
    status: ScheduleStatus,
}

impl ScheduleMessage {
    /// Compare an incoming incidence with the recipient's copy (same UID), if any
    pub fn new(method: ItipMethod, incidence: Incidence, existing: Option<&Incidence>) -> Self {
        let status = match existing {
            None if method.expects_existing() => ScheduleStatus::Unknown,
            None => ScheduleStatus::New,
            Some(existing) if method.expects_existing() => {
                // Replies carry the organizer's sequence number
                if incidence.base().sequence >= existing.base().sequence {
                    ScheduleStatus::Updated
                } else {
                    ScheduleStatus::Obsolete
                }
            },
            Some(existing) => {
                let incoming = incidence.base();
                let known = existing.base();
                let newer = incoming.sequence > known.sequence
                    || (incoming.sequence == known.sequence && incoming.last_modified > known.last_modified);
                match (newer, method) {
                    (false, _) => ScheduleStatus::Obsolete,
                    (true, ItipMethod::Request) => ScheduleStatus::RequestUpdate,
                    (true, _) => ScheduleStatus::Updated,
                }
            },
        };
        Self { method, incidence, status }
    }

    pub fn method(&self) -> ItipMethod          { self.method }
    pub fn incidence(&self) -> &Incidence       { &self.incidence }
    pub fn status(&self) -> ScheduleStatus      { self.status }

    fn is_update(&self) -> bool {
        self.status == ScheduleStatus::Updated || self.status == ScheduleStatus::RequestUpdate
    }
}


/// What the host application provides to the invitation formatter
pub trait InvitationFormatterHelper {
    /// The URL a response link points to. `id` is an action such as `accept` or `decline`
    fn generate_link_url(&self, id: &str) -> String {
        format!("ATCMD:{}", id)
    }

    /// An HTML link for an action. An empty string when there is no URL for it
    fn make_link(&self, id: &str, text: &str) -> String {
        let url = self.generate_link_url(id);
        if url.is_empty() {
            return String::new();
        }
        format!("<a href=\"{}\">{}</a>", escape(&url), escape(text))
    }

    /// The recipient's calendar, if the helper has one
    fn calendar(&self) -> Option<&Calendar> {
        None
    }
}

/// A helper that produces no links
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHelper;

impl InvitationFormatterHelper for NullHelper {
    fn generate_link_url(&self, _id: &str) -> String {
        String::new()
    }
}

/// A helper that produces `ATCMD:` links, and knows the recipient's calendar
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandLinkHelper<'a> {
    pub calendar: Option<&'a Calendar>,
}

impl<'a> InvitationFormatterHelper for CommandLinkHelper<'a> {
    fn calendar(&self) -> Option<&Calendar> {
        self.calendar
    }
}


#[derive(Clone, Debug, PartialEq)]
pub struct InvitationOptions {
    /// Describe changes as a list of sentences rather than striking out old values in the table
    pub outlook_compatible: bool,
    /// Show the response links
    pub show_actions: bool,
}

impl Default for InvitationOptions {
    fn default() -> Self {
        Self { outlook_compatible: false, show_actions: true }
    }
}


/// Who the recipient is, with regard to an incidence
struct Recipient<'a> {
    is_organizer: bool,
    attendee: Option<&'a Attendee>,
}

impl<'a> Recipient<'a> {
    fn new(incidence: &'a Incidence, calendar: Option<&Calendar>) -> Self {
        let emails: &[String] = calendar.map(|c| c.owner_emails()).unwrap_or(&[]);
        let base = incidence.base();
        Self {
            is_organizer: base.is_organizer(emails),
            attendee: base.attendee_by_emails(emails),
        }
    }
}

fn noun(incidence_type: IncidenceType) -> &'static str {
    match incidence_type {
        IncidenceType::Event => "invitation",
        IncidenceType::Todo => "to-do",
        IncidenceType::Journal => "journal",
        IncidenceType::FreeBusy => "free/busy list",
    }
}

fn organizer_name(incidence: &Incidence) -> Option<String> {
    incidence.base().organizer.as_ref()
        .filter(|o| o.is_empty() == false)
        .map(|o| o.display_name().to_string())
}

fn reply_header(attendee: Option<&Attendee>, what: &str) -> String {
    let attendee = match attendee {
        None => return format!("Sender indicates this {} still needs some action", what),
        Some(a) => a,
    };
    let who = attendee.person.display_name();
    match attendee.status {
        PartStat::Accepted => format!("{} accepts this {}", who, what),
        PartStat::Tentative => format!("{} tentatively accepts this {}", who, what),
        PartStat::Declined => format!("{} declines this {}", who, what),
        PartStat::Delegated if attendee.delegate.is_empty() == false => {
            format!("{} has delegated this {} to {}", who, what, strip_mailto(&attendee.delegate))
        },
        PartStat::Delegated => format!("{} has delegated this {}", who, what),
        PartStat::Completed => format!("{} has completed this {}", who, what),
        PartStat::InProcess => format!("{} is working on this {}", who, what),
        PartStat::NeedsAction => format!("{} indicates this {} still needs some action", who, what),
        PartStat::None => format!("Unknown response to this {}", what),
    }
}

/// The first sentence of an invitation
fn header(message: &ScheduleMessage, recipient: &Recipient) -> String {
    let incidence = message.incidence();
    let incidence_type = incidence.incidence_type();
    let what = noun(incidence_type);
    let organizer = organizer_name(incidence);

    match message.method() {
        ItipMethod::Publish if message.is_update() => format!("This {} has been updated", what),
        ItipMethod::Publish => format!("This {} has been published", what),
        ItipMethod::Request => match incidence_type {
            IncidenceType::FreeBusy => "The free/busy list has been requested".to_string(),
            IncidenceType::Journal => "You have been assigned this journal".to_string(),
            _ if message.is_update() => match organizer {
                Some(name) => format!("This {} has been updated by {}", what, name),
                None => format!("This {} has been updated", what),
            },
            _ if recipient.is_organizer => format!("I created this {}", what),
            IncidenceType::Todo => match organizer {
                Some(name) => format!("You have been assigned this to-do by {}", name),
                None => "You have been assigned this to-do".to_string(),
            },
            _ => {
                let delegator = recipient.attendee.map(|a| a.delegator.as_str()).unwrap_or("");
                match (organizer, delegator.is_empty()) {
                    (Some(name), false) => format!("You received an invitation from {} as a representative of {}", name, strip_mailto(delegator)),
                    (Some(name), true) => format!("You received an invitation from {}", name),
                    (None, _) => "You received an invitation".to_string(),
                }
            },
        },
        ItipMethod::Refresh => format!("This {} was refreshed", what),
        ItipMethod::Cancel => format!("This {} has been canceled", what),
        ItipMethod::Add => format!("Addition to the {}", what),
        ItipMethod::Reply if incidence_type == IncidenceType::FreeBusy => "This is a free/busy reply".to_string(),
        ItipMethod::Reply => reply_header(incidence.base().attendees.first(), what),
        ItipMethod::Counter => {
            let who = incidence.base().attendees.first().map(|a| a.person.display_name()).unwrap_or("Sender");
            format!("{} makes this counter proposal", who)
        },
        ItipMethod::DeclineCounter => match organizer {
            Some(name) => format!("{} declines your counter proposal", name),
            None => "The organizer declines your counter proposal".to_string(),
        },
        ItipMethod::NoMethod => format!("Error: iTIP message with unknown method for this {}", stringify::incidence_type(incidence_type)),
    }
}

/// The recipient's participation, for requests
fn rsvp_string(message: &ScheduleMessage, recipient: &Recipient) -> String {
    if message.status() == ScheduleStatus::Obsolete {
        return "This invitation is out of date. Your calendar already has a newer version.".to_string();
    }
    match message.method() {
        ItipMethod::Request | ItipMethod::Add => {},
        _ => return String::new(),
    }
    if recipient.is_organizer {
        return "You are the organizer.".to_string();
    }
    match recipient.attendee {
        None => "You are not listed as an attendee.".to_string(),
        Some(attendee) => match attendee.status {
            PartStat::NeedsAction | PartStat::None if attendee.rsvp => "Your response has been requested.".to_string(),
            PartStat::NeedsAction | PartStat::None => "You have not responded yet.".to_string(),
            PartStat::Accepted => "You have accepted this invitation.".to_string(),
            PartStat::Tentative => "You have tentatively accepted this invitation.".to_string(),
            PartStat::Declined => "You have declined this invitation.".to_string(),
            PartStat::Delegated => "You have delegated this invitation.".to_string(),
            PartStat::Completed => "You have completed this to-do.".to_string(),
            PartStat::InProcess => "You are working on this to-do.".to_string(),
        },
    }
}

/// The response links offered for a message, as `(action id, label)`
fn actions(message: &ScheduleMessage, recipient: &Recipient, existing: bool) -> Vec<(&'static str, &'static str)> {
    if message.status() == ScheduleStatus::Obsolete {
        return Vec::new();
    }
    match message.method() {
        ItipMethod::Publish => vec![("accept", "Accept"), ("check_calendar", "Check my calendar")],
        ItipMethod::Request | ItipMethod::Add if recipient.is_organizer => Vec::new(),
        ItipMethod::Request | ItipMethod::Add => {
            let mut actions = vec![
                ("accept", "Accept"),
                ("accept_conditionally", "Tentative"),
                ("decline", "Decline"),
                ("delegate", "Delegate"),
                ("forward", "Forward"),
            ];
            if message.incidence().is_event() {
                actions.push(("counter", "Counter proposal"));
                actions.push(("check_calendar", "Check my calendar"));
            }
            actions
        },
        ItipMethod::Cancel if existing => vec![("cancel", "Remove from my calendar")],
        ItipMethod::Reply | ItipMethod::DeclineCounter => vec![("reply", "Record response")],
        ItipMethod::Counter => vec![
            ("accept_counter", "Accept counter proposal"),
            ("decline_counter", "Decline counter proposal"),
            ("check_calendar", "Check my calendar"),
        ],
        ItipMethod::Cancel | ItipMethod::Refresh | ItipMethod::NoMethod => Vec::new(),
    }
}

/// A field of the incidence table: label, subject of the change sentence, HTML value
struct Field {
    label: &'static str,
    subject: &'static str,
    value: String,
}

fn field(label: &'static str, subject: &'static str, value: String) -> Field {
    Field { label, subject, value }
}

fn fields(incidence: &Incidence, rich_description: bool, locale: &Locale) -> Vec<Field> {
    let base = incidence.base();
    let all_day = incidence.all_day();
    let when = |value: &crate::datetime::CalDateTime| escape(&date_time_to_string(value, all_day, false, locale));

    let mut fields = vec![
        field("What", "summary", escape(&base.summary)),
        field("Where", "location", escape(&base.location)),
    ];
    match incidence {
        Incidence::Event(event) => {
            if let Some(start) = &event.base.dt_start {
                fields.push(field("Start Time", "start date/time", when(start)));
            }
            if let Some(end) = &event.dt_end {
                fields.push(field("End Time", "end date/time", when(end)));
            }
            fields.push(field("Duration", "duration", escape(&duration_string(incidence))));
        },
        Incidence::Todo(todo) => {
            if let Some(start) = &todo.base.dt_start {
                fields.push(field("Start Date", "start date/time", when(start)));
            }
            if let Some(due) = &todo.due {
                fields.push(field("Due Date", "due date/time", when(due)));
            }
        },
        Incidence::Journal(_) | Incidence::FreeBusy(_) => {
            if let Some(start) = &base.dt_start {
                fields.push(field("Date", "date", when(start)));
            }
        },
    }
    if incidence.recurs() {
        fields.push(field("Recurrence", "recurrence", escape(&recurrence_string(incidence, locale))));
    }
    if let Some(organizer) = &base.organizer {
        fields.push(field("Organizer", "organizer", escape(&organizer.full_name())));
    }

    let description = match base.custom_property("X-ALT-DESC") {
        Some(html) if rich_description => sanitize_html(html),
        _ => plain_to_html(&base.description),
    };
    fields.push(field("Description", "description", description));
    fields
}

/// The incidence table rows, and the change sentences when the old version is known
fn rows_and_changes(message: &ScheduleMessage, existing: Option<&Incidence>, rich: bool, options: &InvitationOptions, locale: &Locale) -> (Vec<Value>, Vec<String>) {
    let method = message.method();
    let new_fields = fields(message.incidence(), rich, locale);
    let old_fields = match existing {
        Some(existing) if message.is_update() && method.changes_fields() => fields(existing, rich, locale),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut changes = Vec::new();
    for new in new_fields {
        let old = old_fields.iter().find(|f| f.label == new.label).map(|f| f.value.as_str());
        let changed = match old {
            Some(old) => old != new.value,
            None => old_fields.is_empty() == false && new.value.is_empty() == false,
        };

        let value = if changed && options.outlook_compatible == false {
            match old {
                Some(old) if old.is_empty() == false => format!("<del>{}</del><br>{}", old, new.value),
                _ => new.value.clone(),
            }
        } else {
            new.value.clone()
        };
        if changed && options.outlook_compatible {
            if new.value.is_empty() {
                changes.push(format!("The {} has been removed", new.subject));
            } else {
                changes.push(format!("The {} has been changed to: \"{}\"", new.subject, new.value));
            }
        }
        if value.is_empty() == false {
            rows.push(json!({ "label": new.label, "value": value }));
        }
    }

    if let (Some(existing), true) = (existing, message.is_update()) {
        changes.extend(attendee_changes(existing, message.incidence(), method.expects_existing() == false));
    }
    (rows, changes)
}

/// Added attendees and status changes. Removals are only reported when `new` lists every attendee
fn attendee_changes(old: &Incidence, new: &Incidence, complete_list: bool) -> Vec<String> {
    let old_attendees = &old.base().attendees;
    let new_attendees = &new.base().attendees;
    let mut changes = Vec::new();
    for attendee in new_attendees {
        let who = escape(attendee.person.display_name());
        match old_attendees.iter().find(|a| a.email().eq_ignore_ascii_case(attendee.email())) {
            None => changes.push(format!("Attendee {} has been added", who)),
            Some(previous) if previous.status != attendee.status => changes.push(format!(
                "The status of attendee {} has been changed to: {}",
                who,
                stringify::attendee_status(attendee.status)
            )),
            Some(_) => {},
        }
    }
    if complete_list == false {
        return changes;
    }
    for attendee in old_attendees {
        if new_attendees.iter().any(|a| a.email().eq_ignore_ascii_case(attendee.email())) == false {
            changes.push(format!("Attendee {} has been removed", escape(attendee.person.display_name())));
        }
    }
    changes
}

fn format_invitation(text: &str, calendar: Option<&Calendar>, helper: &dyn InvitationFormatterHelper, options: &InvitationOptions, rich: bool, locale: &Locale) -> Option<String> {
    let received = match crate::ical::parse_calendar(text) {
        Ok(calendar) => calendar,
        Err(err) => {
            log::debug!("Unable to parse an invitation: {}", err);
            return None;
        },
    };
    let method = ItipMethod::from_ical(received.method());
    let incidence = match received.into_incidences().into_iter().next() {
        Some(incidence) => incidence,
        None => {
            log::debug!("Invitation without any incidence");
            return None;
        },
    };

    let calendar = calendar.or_else(|| helper.calendar());
    let existing = calendar.and_then(|c| c.incidence(incidence.uid()));
    let message = ScheduleMessage::new(method, incidence, existing);
    let recipient = Recipient::new(message.incidence(), calendar);
    let base = message.incidence().base();

    let (rows, changes) = rows_and_changes(&message, existing, rich, options, locale);

    let note = if base.comments.is_empty() {
        String::new()
    } else {
        format!("<b>Note:</b> {}", plain_to_html(&base.comments.join("\n")))
    };

    let attendees: Vec<Value> = base.attendees.iter()
        .map(|attendee| json!({
            "name": escape(&attendee.person.full_name()),
            "role": stringify::attendee_role(attendee.role),
            "status": stringify::attendee_status(attendee.status),
        }))
        .collect();

    let links: Vec<String> = if options.show_actions {
        actions(&message, &recipient, existing.is_some()).into_iter()
            .map(|(id, label)| helper.make_link(id, label))
            .filter(|link| link.is_empty() == false)
            .collect()
    } else {
        Vec::new()
    };

    let data = json!({
        "header": header(&message, &recipient),
        "note": note,
        "rows": rows,
        "changes_title": "The following changes have been made:",
        "changes": changes,
        "rsvp": escape(&rsvp_string(&message, &recipient)),
        "attendees": attendees,
        "actions": links,
    });
    let html = templates::render(templates::INVITATION, &data);
    if html.is_empty() { None } else { Some(html) }
}

/// Render an iTIP payload (an iCalendar text with a `METHOD`) as HTML.
///
/// `calendar` is the recipient's calendar: it tells who the recipient is (its owner e-mail addresses),
/// and holds the previous version of updated incidences. When it is `None`, the helper's calendar is used.
///
/// Returns `None` when the payload cannot be parsed or contains no incidence.
pub fn format_ical_invitation(text: &str, calendar: Option<&Calendar>, helper: &dyn InvitationFormatterHelper, options: &InvitationOptions, locale: &Locale) -> Option<String> {
    format_invitation(text, calendar, helper, options, true, locale)
}

/// Same as [`format_ical_invitation`], but an HTML description (`X-ALT-DESC`) is ignored: the plain-text one is shown, escaped
pub fn format_ical_invitation_no_html(text: &str, calendar: Option<&Calendar>, helper: &dyn InvitationFormatterHelper, options: &InvitationOptions, locale: &Locale) -> Option<String> {
    format_invitation(text, calendar, helper, options, false, locale)
}
