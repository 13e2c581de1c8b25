//! This crate provides presentation and interchange helpers for iCalendar data.
//!
//! Calendars and their incidences (events, to-dos, journals and free/busy blocks) are modelled in the
//! [`calendar`] and [`incidence`] modules, and converted from and to iCal (and vCalendar 1.0) text in the [`ical`] module.
//!
//! On top of this model, this crate provides:
//! * human-readable strings and HTML fragments about incidences (tooltips, full views, mail bodies, recurrence descriptions) in the [`formatter`] module,
//! * a renderer for iTIP scheduling messages (invitations, replies, cancellations...) in [`formatter::invitation`],
//! * a static HTML export of a whole calendar in the [`html_export`] module,
//! * clipboard and drag-and-drop interchange of incidences in the [`dnd`] module.

pub mod config;
pub mod datetime;
pub mod attendee;
pub mod recurrence;
pub mod alarm;

pub mod incidence;
pub use incidence::Incidence;
mod event;
pub use event::Event;
pub use event::Transparency;
mod todo;
pub use todo::Todo;
pub use todo::CompletionStatus;
mod journal;
pub use journal::Journal;
mod freebusy;
pub use freebusy::{FreeBusy, FreeBusyPeriod, FreeBusyType};
pub mod calendar;
pub use calendar::Calendar;

pub mod ical;
pub mod stringify;
pub mod formatter;
pub mod html_export;
pub use html_export::{HtmlExport, HtmlExportSettings};
pub mod dnd;
pub use dnd::DndFactory;
