//! Moving incidences between calendars: iCal text, clipboard, drag-and-drop

use calutils::dnd::{DndFactory, MemoryClipboard, PasteFlags, ICAL_MIME_TYPE};
use calutils::datetime::CalDateTime;
use calutils::ical::{build_calendar, parse_calendar};
use calutils::{Calendar, Incidence};

const TEAM_CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:standup-1\r\n\
DTSTAMP:20240301T080000Z\r\n\
DTSTART:20240314T090000\r\n\
DTEND:20240314T091500\r\n\
SUMMARY:Standup\r\n\
LOCATION:Room 2\r\n\
RRULE:FREQ=WEEKLY;BYDAY=TH\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
UID:release-1\r\n\
DTSTAMP:20240301T080000Z\r\n\
DUE:20240320T170000\r\n\
SUMMARY:Release\r\n\
PRIORITY:1\r\n\
END:VTODO\r\n\
BEGIN:VTODO\r\n\
UID:changelog-1\r\n\
DTSTAMP:20240301T080000Z\r\n\
SUMMARY:Write the changelog\r\n\
RELATED-TO:release-1\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

fn by_summary<'a>(incidences: &'a [Incidence], summary: &str) -> &'a Incidence {
    incidences.iter().find(|i| i.summary() == summary).unwrap()
}

#[test]
fn test_ical_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();

    let calendar = parse_calendar(TEAM_CALENDAR).unwrap();
    assert_eq!(calendar.events().len(), 1);
    assert_eq!(calendar.todos().len(), 2);

    let text = build_calendar(&calendar, None).unwrap();
    let reparsed = parse_calendar(&text).unwrap();
    assert_eq!(reparsed.incidences().len(), 3);

    let standup = reparsed.incidence("standup-1").unwrap();
    assert_eq!(standup.summary(), "Standup");
    assert_eq!(standup.base().location, "Room 2");
    assert!(standup.recurs());

    let changelog = reparsed.incidence("changelog-1").unwrap();
    assert_eq!(changelog.base().related_to.as_deref(), Some("release-1"));
}

#[test]
fn test_copy_between_calendars() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut team = parse_calendar(TEAM_CALENDAR).unwrap();
    let mut personal = Calendar::new("Personal");
    let mut clipboard = MemoryClipboard::new();

    let copied: Vec<Incidence> = team.todos().into_iter().cloned().map(Incidence::Todo).collect();
    assert!(DndFactory::new(&mut team).copy_incidences(&copied, &mut clipboard));

    let mut factory = DndFactory::new(&mut personal);
    let pasted = factory.paste_incidences(&clipboard, None, PasteFlags::empty());
    assert_eq!(pasted.len(), 2);

    let release = by_summary(&pasted, "Release");
    let changelog = by_summary(&pasted, "Write the changelog");
    assert_ne!(release.uid(), "release-1");
    // The sub-task follows its parent to its new UID
    assert_eq!(changelog.base().related_to.as_deref(), Some(release.uid()));
    assert_eq!(factory.calendar().todos().len(), 2);

    // The source calendar is untouched by a copy
    assert_eq!(team.incidences().len(), 3);
}

#[test]
fn test_cut_and_drop_on_a_day() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut team = parse_calendar(TEAM_CALENDAR).unwrap();
    let standup = team.incidence("standup-1").unwrap().clone();
    let mut clipboard = MemoryClipboard::new();

    let mut factory = DndFactory::new(&mut team);
    assert!(factory.cut_incidence(&standup, &mut clipboard));
    assert!(factory.calendar().contains("standup-1") == false);

    let day = CalDateTime::Date(chrono::NaiveDate::from_ymd_opt(2024, 4, 4).unwrap());
    let pasted = factory.paste_incidences(&clipboard, Some(&day), PasteFlags::empty());
    assert_eq!(pasted.len(), 1);

    // Dropping a timed event on a day keeps its time of day
    let start = pasted[0].dt_start().unwrap();
    assert_eq!(start.date(), chrono::NaiveDate::from_ymd_opt(2024, 4, 4).unwrap());
    assert_eq!(start.time(), Some(chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    assert_eq!(pasted[0].date_end().unwrap().time(), Some(chrono::NaiveTime::from_hms_opt(9, 15, 0).unwrap()));
}

#[test]
fn test_drag_payload() {
    let mut team = parse_calendar(TEAM_CALENDAR).unwrap();
    let factory = DndFactory::new(&mut team);
    let mime = factory.create_mime_data().unwrap();

    let payload = std::str::from_utf8(mime.data(ICAL_MIME_TYPE).unwrap()).unwrap();
    assert!(payload.starts_with("BEGIN:VCALENDAR"));

    let dropped = factory.create_drop_calendar(&mime).unwrap();
    assert_eq!(dropped.incidences().len(), 3);
    assert!(factory.create_drop_todo(&mime).is_some());
}
