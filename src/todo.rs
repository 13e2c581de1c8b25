//! To-do tasks (iCal `VTODO` item)

use chrono::{DateTime, NaiveDate, Utc};

use crate::datetime::CalDateTime;
use crate::incidence::{IncidenceBase, Status};

/// RFC5545 defines the completion as several optional fields, yet some combinations make no sense.
/// This enum provides an API that forbids such impossible combinations.
///
/// * `COMPLETED` is an optional timestamp that tells whether this task is completed
/// * `STATUS` is an optional field, that can be set to `NEEDS-ACTION`, `COMPLETED`, or others.
/// Even though having a `COMPLETED` date but a `STATUS:NEEDS-ACTION` is theorically possible, it obviously makes no sense. This API ensures this cannot happen
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}

impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }
}

impl Default for CompletionStatus {
    fn default() -> Self {
        CompletionStatus::Uncompleted
    }
}

/// A to-do task
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Todo {
    pub base: IncidenceBase,
    pub due: Option<CalDateTime>,
    pub completion_status: CompletionStatus,
    /// 0 to 100
    pub percent_complete: u8,
}

impl Todo {
    /// Create a brand new task, with a random UID
    pub fn new(summary: &str) -> Self {
        Self {
            base: IncidenceBase::new(summary),
            ..Default::default()
        }
    }

    pub fn base(&self) -> &IncidenceBase              { &self.base }
    pub fn base_mut(&mut self) -> &mut IncidenceBase  { &mut self.base }
    pub fn date_end(&self) -> Option<&CalDateTime>   { self.due.as_ref() }
    pub fn has_start_date(&self) -> bool { self.base.dt_start.is_some() }
    pub fn has_due_date(&self) -> bool   { self.due.is_some() }
    pub fn completed(&self) -> bool      { self.completion_status.is_completed() }

    pub fn completion_date(&self) -> Option<&DateTime<Utc>> {
        match &self.completion_status {
            CompletionStatus::Completed(date) => date.as_ref(),
            CompletionStatus::Uncompleted => None,
        }
    }

    /// A to-do is all-day when its start (or its due date, when it has no start) is a date
    pub fn all_day(&self) -> bool {
        match (&self.base.dt_start, &self.due) {
            (Some(start), _) => start.is_all_day(),
            (None, Some(due)) => due.is_all_day(),
            (None, None) => false,
        }
    }

    /// Mark this task as completed (or not), keeping `STATUS` and the percentage consistent
    pub fn set_completion_status(&mut self, new_status: CompletionStatus) {
        if new_status.is_completed() {
            self.base.status = Status::Completed;
            self.percent_complete = 100;
        } else if self.base.status == Status::Completed {
            self.base.status = Status::NeedsAction;
            if self.percent_complete == 100 {
                self.percent_complete = 0;
            }
        }
        self.completion_status = new_status;
        self.base.last_modified = Some(Utc::now());
    }

    /// Whether the due date is strictly before `today` and the task is still open
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match &self.due {
            Some(due) => self.completed() == false && due.date() < today,
            None => false,
        }
    }
}
