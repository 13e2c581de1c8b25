//! Journal entries (iCal `VJOURNAL` item)

use crate::datetime::CalDateTime;
use crate::incidence::IncidenceBase;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Journal {
    pub base: IncidenceBase,
}

impl Journal {
    pub fn new(summary: &str) -> Self {
        Self { base: IncidenceBase::new(summary) }
    }

    pub fn base(&self) -> &IncidenceBase              { &self.base }
    pub fn base_mut(&mut self) -> &mut IncidenceBase  { &mut self.base }

    /// Journals have no end
    pub fn date_end(&self) -> Option<&CalDateTime> {
        None
    }

    pub fn all_day(&self) -> bool {
        self.base.dt_start.as_ref().map(|s| s.is_all_day()).unwrap_or(false)
    }
}
