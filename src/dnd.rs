//! Clipboard and drag-and-drop interchange of incidences
//!
//! Incidences travel as MIME data holding both an iCalendar (`text/calendar`) and a vCalendar (`text/x-vCalendar`) payload,
//! the `urn:x-ical:` URIs of the incidences, and (for a single incidence) its summary as plain text.

use std::collections::{BTreeMap, HashMap};

use bitflags::bitflags;
use url::Url;

use crate::calendar::Calendar;
use crate::datetime::CalDateTime;
use crate::incidence::Incidence;
use crate::{Event, Todo};

pub const ICAL_MIME_TYPE: &str = "text/calendar";
pub const VCAL_MIME_TYPE: &str = "text/x-vCalendar";

/// Data exchanged through a clipboard or a drag-and-drop operation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MimeData {
    formats: BTreeMap<String, Vec<u8>>,
    text: Option<String>,
    urls: Vec<Url>,
}

impl MimeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<&str>    { self.text.as_deref() }
    pub fn urls(&self) -> &[Url]          { &self.urls }

    pub fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    pub fn set_urls(&mut self, urls: Vec<Url>) {
        self.urls = urls;
    }

    pub fn set_data(&mut self, format: &str, data: Vec<u8>) {
        self.formats.insert(format.to_ascii_lowercase(), data);
    }

    /// MIME types are case-insensitive
    pub fn data(&self, format: &str) -> Option<&[u8]> {
        self.formats.get(&format.to_ascii_lowercase()).map(|d| d.as_slice())
    }

    pub fn has_format(&self, format: &str) -> bool {
        self.formats.contains_key(&format.to_ascii_lowercase())
    }

    pub fn formats(&self) -> Vec<&str> {
        self.formats.keys().map(|k| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty() && self.text.is_none() && self.urls.is_empty()
    }
}

fn decode_calendar(mime: &MimeData, format: &str) -> Option<Calendar> {
    let data = mime.data(format)?;
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("{} payload is not valid UTF-8: {}", format, err);
            return None;
        },
    };
    match crate::ical::parse_calendar(text) {
        Ok(calendar) => Some(calendar),
        Err(err) => {
            log::debug!("Unable to decode the {} payload: {}", format, err);
            None
        },
    }
}

/// The iCalendar flavour of calendar MIME data
pub struct ICalDrag;

impl ICalDrag {
    pub fn mime_type() -> &'static str {
        ICAL_MIME_TYPE
    }

    /// Put these incidences into the MIME data. Returns `false` if they cannot be serialized
    pub fn populate_mime_data<'a, I>(mime: &mut MimeData, incidences: I) -> bool
    where
        I: IntoIterator<Item = &'a Incidence>,
    {
        match crate::ical::build_incidences(incidences, None) {
            Ok(text) => {
                mime.set_data(ICAL_MIME_TYPE, text.into_bytes());
                true
            },
            Err(err) => {
                log::warn!("Unable to serialize incidences to iCalendar: {}", err);
                false
            },
        }
    }

    pub fn can_decode(mime: &MimeData) -> bool {
        mime.has_format(ICAL_MIME_TYPE)
    }

    pub fn from_mime_data(mime: &MimeData) -> Option<Calendar> {
        decode_calendar(mime, ICAL_MIME_TYPE)
    }
}

/// The vCalendar 1.0 flavour of calendar MIME data
pub struct VCalDrag;

impl VCalDrag {
    pub fn mime_type() -> &'static str {
        VCAL_MIME_TYPE
    }

    /// Put these incidences into the MIME data. Only events and to-dos exist in vCalendar
    pub fn populate_mime_data<'a, I>(mime: &mut MimeData, incidences: I) -> bool
    where
        I: IntoIterator<Item = &'a Incidence>,
    {
        match crate::ical::build_vcalendar(incidences) {
            Ok(text) => {
                mime.set_data(VCAL_MIME_TYPE, text.into_bytes());
                true
            },
            Err(err) => {
                log::warn!("Unable to serialize incidences to vCalendar: {}", err);
                false
            },
        }
    }

    pub fn can_decode(mime: &MimeData) -> bool {
        mime.has_format(VCAL_MIME_TYPE)
    }

    pub fn from_mime_data(mime: &MimeData) -> Option<Calendar> {
        decode_calendar(mime, VCAL_MIME_TYPE)
    }
}


/// Where copied incidences are kept until they are pasted
pub trait Clipboard {
    fn set_mime_data(&mut self, data: MimeData);
    fn mime_data(&self) -> Option<&MimeData>;
}

/// A clipboard that lives in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    data: Option<MimeData>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }
}

impl Clipboard for MemoryClipboard {
    fn set_mime_data(&mut self, data: MimeData) {
        self.data = Some(data);
    }

    fn mime_data(&self) -> Option<&MimeData> {
        self.data.as_ref()
    }
}


bitflags! {
    /// How pasted incidences are placed at the paste location
    pub struct PasteFlags: u8 {
        /// Keep the time of day, only change the date
        const PASTE_AT_ORIGINAL_TIME = 1;
        /// Move the start of to-dos, rather than their due date
        const TODOS_PASTE_AT_DTSTART = 2;
    }
}

/// The new value of a date being moved to `target`
fn moved(value: &CalDateTime, target: &CalDateTime, flags: PasteFlags) -> CalDateTime {
    if value.is_all_day() || target.is_all_day() || flags.contains(PasteFlags::PASTE_AT_ORIGINAL_TIME) {
        value.with_date(target.date())
    } else {
        target.clone()
    }
}

/// Move `anchor` to `target`, and `other` along with it
fn move_pair(anchor: &mut Option<CalDateTime>, other: &mut Option<CalDateTime>, target: &CalDateTime, flags: PasteFlags) {
    if let Some(old) = anchor.as_mut() {
        let new = moved(old, target, flags);
        let shift = old.duration_until(&new);
        if let Some(other) = other.as_mut() {
            *other = other.add_duration(shift);
        }
        *old = new;
    } else {
        *anchor = Some(target.clone());
    }
}

/// Place an incidence at a new date
fn place(incidence: &mut Incidence, target: &CalDateTime, flags: PasteFlags) {
    match incidence {
        Incidence::Event(event) => move_pair(&mut event.base.dt_start, &mut event.dt_end, target, flags),
        Incidence::Todo(todo) => {
            if flags.contains(PasteFlags::TODOS_PASTE_AT_DTSTART) && todo.base.dt_start.is_some() {
                move_pair(&mut todo.base.dt_start, &mut todo.due, target, flags);
            } else if todo.due.is_some() || todo.base.dt_start.is_none() {
                move_pair(&mut todo.due, &mut todo.base.dt_start, target, flags);
            } else {
                move_pair(&mut todo.base.dt_start, &mut todo.due, target, flags);
            }
        },
        Incidence::Journal(journal) => move_pair(&mut journal.base.dt_start, &mut None, target, flags),
        Incidence::FreeBusy(_) => log::debug!("Free/busy records are pasted as they are"),
    }
}


/// Creates and reads drag-and-drop and clipboard data for a calendar
pub struct DndFactory<'a> {
    calendar: &'a mut Calendar,
}

impl<'a> DndFactory<'a> {
    pub fn new(calendar: &'a mut Calendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &*self.calendar
    }

    /// MIME data for every incidence of the calendar
    pub fn create_mime_data(&self) -> Option<MimeData> {
        self.create_mime_data_for(self.calendar.incidences())
    }

    /// MIME data for these incidences. `None` if there are none, or if they cannot be serialized
    pub fn create_mime_data_for(&self, incidences: &[Incidence]) -> Option<MimeData> {
        if incidences.is_empty() {
            return None;
        }

        let mut mime = MimeData::new();
        if ICalDrag::populate_mime_data(&mut mime, incidences) == false {
            return None;
        }
        VCalDrag::populate_mime_data(&mut mime, incidences);

        let urls = incidences.iter()
            .filter_map(|i| match Url::parse(&i.uri()) {
                Ok(url) => Some(url),
                Err(err) => {
                    log::debug!("Incidence {} has no valid URI: {}", i.uid(), err);
                    None
                },
            })
            .collect();
        mime.set_urls(urls);

        if let [single] = incidences {
            mime.set_text(single.summary());
        }
        Some(mime)
    }

    /// Decode dropped (or pasted) data, preferring the iCalendar payload
    pub fn create_drop_calendar(&self, mime: &MimeData) -> Option<Calendar> {
        if ICalDrag::can_decode(mime) {
            if let Some(calendar) = ICalDrag::from_mime_data(mime) {
                return Some(calendar);
            }
        }
        if VCalDrag::can_decode(mime) {
            return VCalDrag::from_mime_data(mime);
        }
        None
    }

    /// The first event of the dropped data
    pub fn create_drop_event(&self, mime: &MimeData) -> Option<Event> {
        self.create_drop_calendar(mime)?
            .into_incidences()
            .into_iter()
            .find_map(|i| match i {
                Incidence::Event(e) => Some(e),
                _ => None,
            })
    }

    /// The first to-do of the dropped data
    pub fn create_drop_todo(&self, mime: &MimeData) -> Option<Todo> {
        self.create_drop_calendar(mime)?
            .into_incidences()
            .into_iter()
            .find_map(|i| match i {
                Incidence::Todo(t) => Some(t),
                _ => None,
            })
    }

    pub fn copy_incidences(&self, incidences: &[Incidence], clipboard: &mut dyn Clipboard) -> bool {
        match self.create_mime_data_for(incidences) {
            Some(mime) => {
                clipboard.set_mime_data(mime);
                true
            },
            None => false,
        }
    }

    pub fn copy_incidence(&self, incidence: &Incidence, clipboard: &mut dyn Clipboard) -> bool {
        self.copy_incidences(std::slice::from_ref(incidence), clipboard)
    }

    /// Copy these incidences, then delete them from the calendar
    pub fn cut_incidences(&mut self, incidences: &[Incidence], clipboard: &mut dyn Clipboard) -> bool {
        if self.copy_incidences(incidences, clipboard) == false {
            return false;
        }
        let mut all_deleted = true;
        for incidence in incidences {
            if let Err(err) = self.calendar.delete_incidence(incidence.uid()) {
                log::warn!("Unable to delete a cut incidence: {}", err);
                all_deleted = false;
            }
        }
        all_deleted
    }

    pub fn cut_incidence(&mut self, incidence: &Incidence, clipboard: &mut dyn Clipboard) -> bool {
        self.cut_incidences(std::slice::from_ref(incidence), clipboard)
    }

    /// Paste the clipboard content into the calendar.
    ///
    /// Every pasted incidence gets a new UID. A pasted sub-task stays attached to its parent when the parent is pasted along,
    /// and is detached otherwise. With a `new_date_time`, incidences are moved there (see [`Self::paste_incidence`]).
    pub fn paste_incidences(&mut self, clipboard: &dyn Clipboard, new_date_time: Option<&CalDateTime>, flags: PasteFlags) -> Vec<Incidence> {
        let mime = match clipboard.mime_data() {
            Some(mime) => mime,
            None => {
                log::debug!("Nothing to paste");
                return Vec::new();
            },
        };
        let mut incidences = match self.create_drop_calendar(mime) {
            Some(calendar) => calendar.into_incidences(),
            None => {
                log::debug!("The clipboard holds no calendar data");
                return Vec::new();
            },
        };

        let mut new_uids = HashMap::new();
        for incidence in incidences.iter_mut() {
            let old_uid = incidence.uid().to_string();
            incidence.recreate();
            new_uids.insert(old_uid, incidence.uid().to_string());
        }

        for incidence in incidences.iter_mut() {
            let parent = incidence.base().related_to.as_ref().and_then(|p| new_uids.get(p)).cloned();
            incidence.base_mut().related_to = parent;
            if let Some(target) = new_date_time {
                place(incidence, target, flags);
            }
        }

        for incidence in &incidences {
            self.calendar.add_incidence(incidence.clone());
        }
        incidences
    }

    /// Paste a copy of an incidence into the calendar, with a new UID.
    ///
    /// With a `new_date_time`, events move their start there and keep their duration, to-dos move their due date
    /// (or their start with [`PasteFlags::TODOS_PASTE_AT_DTSTART`]), journals move their date.
    /// With [`PasteFlags::PASTE_AT_ORIGINAL_TIME`], or when `new_date_time` is a date, only the date changes.
    pub fn paste_incidence(&mut self, incidence: &Incidence, new_date_time: Option<&CalDateTime>, flags: PasteFlags) -> Incidence {
        let mut pasted = incidence.clone();
        pasted.recreate();
        let keeps_parent = match &pasted.base().related_to {
            Some(parent) => self.calendar.contains(parent),
            None => false,
        };
        if keeps_parent == false {
            pasted.base_mut().related_to = None;
        }
        if let Some(target) = new_date_time {
            place(&mut pasted, target, flags);
        }
        self.calendar.add_incidence(pasted.clone());
        pasted
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use crate::Journal;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> CalDateTime {
        CalDateTime::Floating(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> CalDateTime {
        CalDateTime::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_mime_data() {
        let mut mime = MimeData::new();
        assert!(mime.is_empty());
        mime.set_data(VCAL_MIME_TYPE, b"BEGIN:VCALENDAR".to_vec());
        assert!(mime.has_format("text/x-vcalendar"));
        assert!(VCalDrag::can_decode(&mime));
        assert!(ICalDrag::can_decode(&mime) == false);
        assert_eq!(mime.formats(), vec!["text/x-vcalendar"]);
    }

    #[test]
    fn test_create_mime_data() {
        let mut calendar = Calendar::new("Home");
        let event: Incidence = Event::new_with_times("Concert", at(2024, 5, 4, 20, 0), Some(at(2024, 5, 4, 23, 0))).into();
        calendar.add_incidence(event.clone());
        let factory = DndFactory::new(&mut calendar);

        let mime = factory.create_mime_data().unwrap();
        assert!(mime.has_format(ICAL_MIME_TYPE));
        assert!(mime.has_format(VCAL_MIME_TYPE));
        assert_eq!(mime.text(), Some("Concert"));
        assert_eq!(mime.urls().len(), 1);
        assert_eq!(mime.urls()[0].as_str(), event.uri());

        assert!(factory.create_mime_data_for(&[]).is_none());

        let dropped = factory.create_drop_event(&mime).unwrap();
        assert_eq!(dropped.base.summary, "Concert");
        assert_eq!(dropped.base.uid, event.uid());
        assert!(factory.create_drop_todo(&mime).is_none());
    }

    #[test]
    fn test_vcal_fallback() {
        let mut calendar = Calendar::new("Home");
        let todo: Incidence = Todo::new("Water plants").into();
        let factory = DndFactory::new(&mut calendar);
        let mut mime = MimeData::new();
        assert!(VCalDrag::populate_mime_data(&mut mime, vec![&todo]));
        mime.set_data(ICAL_MIME_TYPE, b"garbage".to_vec());

        let dropped = factory.create_drop_todo(&mime).unwrap();
        assert_eq!(dropped.base.summary, "Water plants");
    }

    #[test]
    fn test_undecodable() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut calendar = Calendar::new("Home");
        let mut factory = DndFactory::new(&mut calendar);
        let mut mime = MimeData::new();
        mime.set_data(ICAL_MIME_TYPE, vec![0xff, 0xfe]);
        assert!(factory.create_drop_calendar(&mime).is_none());

        let mut clipboard = MemoryClipboard::new();
        assert!(factory.paste_incidences(&clipboard, None, PasteFlags::empty()).is_empty());
        clipboard.set_mime_data(mime);
        assert!(factory.paste_incidences(&clipboard, None, PasteFlags::empty()).is_empty());
    }

    #[test]
    fn test_cut() {
        let mut calendar = Calendar::new("Home");
        let event: Incidence = Event::new("Nap").into();
        calendar.add_incidence(event.clone());
        let mut clipboard = MemoryClipboard::new();
        {
            let mut factory = DndFactory::new(&mut calendar);
            assert!(factory.cut_incidence(&event, &mut clipboard));
        }
        assert!(calendar.is_empty());
        assert!(clipboard.mime_data().is_some());
    }

    #[test]
    fn test_paste_moves_events() {
        let mut calendar = Calendar::new("Home");
        let event: Incidence = Event::new_with_times("Gym", at(2024, 5, 6, 7, 0), Some(at(2024, 5, 6, 8, 30))).into();
        let mut factory = DndFactory::new(&mut calendar);

        let pasted = factory.paste_incidence(&event, Some(&at(2024, 5, 8, 18, 0)), PasteFlags::empty());
        assert!(pasted.uid() != event.uid());
        assert_eq!(pasted.dt_start(), Some(&at(2024, 5, 8, 18, 0)));
        assert_eq!(pasted.date_end(), Some(&at(2024, 5, 8, 19, 30)));

        let pasted = factory.paste_incidence(&event, Some(&at(2024, 5, 9, 18, 0)), PasteFlags::PASTE_AT_ORIGINAL_TIME);
        assert_eq!(pasted.dt_start(), Some(&at(2024, 5, 9, 7, 0)));

        let pasted = factory.paste_incidence(&event, Some(&day(2024, 5, 10)), PasteFlags::empty());
        assert_eq!(pasted.dt_start(), Some(&at(2024, 5, 10, 7, 0)));
        assert_eq!(pasted.date_end(), Some(&at(2024, 5, 10, 8, 30)));

        let all_day: Incidence = Event::new_with_times("Fair", day(2024, 5, 1), Some(day(2024, 5, 3))).into();
        let pasted = factory.paste_incidence(&all_day, Some(&at(2024, 6, 1, 12, 0)), PasteFlags::empty());
        assert_eq!(pasted.dt_start(), Some(&day(2024, 6, 1)));
        assert_eq!(pasted.date_end(), Some(&day(2024, 6, 3)));

        assert_eq!(factory.calendar().events().len(), 4);
    }

    #[test]
    fn test_paste_zoned_event_across_dst() {
        let paris = |d: u32, h: u32| CalDateTime::Zoned {
            datetime: NaiveDate::from_ymd_opt(2024, 3, d).unwrap().and_hms_opt(h, 0, 0).unwrap(),
            tzid: "Europe/Paris".to_string(),
        };
        let mut calendar = Calendar::new("Home");
        let mut factory = DndFactory::new(&mut calendar);
        // Summer time starts on the 31st
        let event: Incidence = Event::new_with_times("Piano lesson", paris(30, 10), Some(paris(30, 11))).into();

        let target = CalDateTime::Floating(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(10, 0, 0).unwrap());
        let pasted = factory.paste_incidence(&event, Some(&target), PasteFlags::PASTE_AT_ORIGINAL_TIME);
        let pasted = pasted.as_event().unwrap();
        assert_eq!(pasted.base.dt_start.as_ref().and_then(|s| s.time()), NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(pasted.dt_end.as_ref().and_then(|e| e.time()), NaiveTime::from_hms_opt(11, 0, 0));
        assert_eq!(pasted.duration(), Some(Duration::hours(1)));

        let pasted = factory.paste_incidence(&event, Some(&paris(31, 14)), PasteFlags::empty());
        assert_eq!(pasted.as_event().unwrap().duration(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_paste_moves_todos_and_journals() {
        let mut calendar = Calendar::new("Home");
        let mut factory = DndFactory::new(&mut calendar);

        let mut todo = Todo::new("Report");
        todo.base.dt_start = Some(at(2024, 5, 1, 9, 0));
        todo.due = Some(at(2024, 5, 3, 17, 0));
        let todo: Incidence = todo.into();

        let by_due = factory.paste_incidence(&todo, Some(&at(2024, 5, 10, 17, 0)), PasteFlags::empty());
        assert_eq!(by_due.date_end(), Some(&at(2024, 5, 10, 17, 0)));
        assert_eq!(by_due.dt_start(), Some(&at(2024, 5, 8, 9, 0)));

        let by_start = factory.paste_incidence(&todo, Some(&at(2024, 5, 10, 9, 0)), PasteFlags::TODOS_PASTE_AT_DTSTART);
        assert_eq!(by_start.dt_start(), Some(&at(2024, 5, 10, 9, 0)));
        assert_eq!(by_start.date_end(), Some(&at(2024, 5, 12, 17, 0)));

        let journal: Incidence = Journal::new("Diary").into();
        let pasted = factory.paste_incidence(&journal, Some(&day(2024, 5, 20)), PasteFlags::empty());
        assert_eq!(pasted.dt_start(), Some(&day(2024, 5, 20)));
    }

    #[test]
    fn test_copy_paste_round_trip() {
        let mut calendar = Calendar::new("Work");
        let mut parent = Todo::new("Release");
        parent.due = Some(at(2024, 9, 30, 12, 0));
        let mut child = Todo::new("Write changelog");
        child.base.related_to = Some(parent.base.uid.clone());
        let mut orphan = Todo::new("Orphan");
        orphan.base.related_to = Some("somewhere-else".to_string());
        let meeting: Incidence = Event::new_with_times("Retro", at(2024, 9, 2, 14, 0), Some(at(2024, 9, 2, 15, 15))).into();
        let copied: Vec<Incidence> = vec![parent.into(), child.into(), orphan.into(), meeting];

        let mut clipboard = MemoryClipboard::new();
        let mut factory = DndFactory::new(&mut calendar);
        assert!(factory.copy_incidences(&copied, &mut clipboard));

        let pasted = factory.paste_incidences(&clipboard, None, PasteFlags::empty());
        assert_eq!(pasted.len(), 4);
        let find = |summary: &str| pasted.iter().find(|i| i.summary() == summary).unwrap();
        for original in &copied {
            assert!(find(original.summary()).uid() != original.uid());
        }

        let new_parent = find("Release");
        assert_eq!(find("Write changelog").base().related_to.as_deref(), Some(new_parent.uid()));
        assert_eq!(find("Orphan").base().related_to, None);

        let meeting = find("Retro").as_event().unwrap();
        assert_eq!(meeting.duration(), Some(Duration::minutes(75)));
        assert_eq!(factory.calendar().incidences().len(), 4);
    }
}
