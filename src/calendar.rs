//! A calendar: a named collection of incidences

use std::error::Error;

use chrono::NaiveDate;
use csscolorparser::Color;

use crate::incidence::Incidence;
use crate::{Event, FreeBusy, Journal, Todo};

/// An in-memory calendar
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calendar {
    name: String,
    color: Option<Color>,
    /// The e-mail addresses of the person this calendar belongs to
    owner_emails: Vec<String>,
    /// The iTIP `METHOD` this calendar was received with, if any
    method: Option<String>,
    /// The PRODID of the application that produced this calendar, if it was parsed
    prod_id: Option<String>,

    incidences: Vec<Incidence>,
}

impl Calendar {
    /// Create a new calendar
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str                 { &self.name }
    pub fn color(&self) -> Option<&Color>      { self.color.as_ref() }
    pub fn owner_emails(&self) -> &[String]    { &self.owner_emails }
    pub fn method(&self) -> Option<&str>       { self.method.as_deref() }
    pub fn prod_id(&self) -> Option<&str>      { self.prod_id.as_deref() }
    pub fn incidences(&self) -> &[Incidence]   { &self.incidences }
    pub fn is_empty(&self) -> bool             { self.incidences.is_empty() }

    pub fn into_incidences(self) -> Vec<Incidence> {
        self.incidences
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Set the colour from any CSS colour string (`#ff8800`, `rgb(...)`, `teal`...)
    pub fn set_color(&mut self, css_color: &str) -> Result<(), Box<dyn Error>> {
        let color = csscolorparser::parse(css_color)
            .map_err(|err| format!("Invalid calendar colour {:?}: {}", css_color, err))?;
        self.color = Some(color);
        Ok(())
    }

    pub fn add_owner_email(&mut self, email: &str) {
        if self.is_owner(email) == false {
            self.owner_emails.push(email.to_string());
        }
    }

    pub fn is_owner(&self, email: &str) -> bool {
        self.owner_emails.iter().any(|e| e.eq_ignore_ascii_case(email))
    }

    pub fn set_method(&mut self, method: Option<&str>) {
        self.method = method.map(|m| m.to_string());
    }

    pub fn set_prod_id(&mut self, prod_id: Option<&str>) {
        self.prod_id = prod_id.map(|p| p.to_string());
    }

    /// Add an incidence.
    /// An incidence with the same UID and recurrence ID is replaced.
    pub fn add_incidence(&mut self, incidence: Incidence) {
        let position = self.incidences.iter().position(|existing| {
            existing.uid() == incidence.uid()
                && existing.base().recurrence_id == incidence.base().recurrence_id
        });
        match position {
            Some(index) => {
                log::debug!("Replacing incidence {} in calendar {:?}", incidence.uid(), self.name);
                self.incidences[index] = incidence;
            },
            None => self.incidences.push(incidence),
        }
    }

    /// Remove an incidence (and its exceptions, that share its UID)
    pub fn delete_incidence(&mut self, uid: &str) -> Result<Incidence, Box<dyn Error>> {
        let index = self.incidences.iter().position(|i| i.uid() == uid && i.base().recurrence_id.is_none())
            .or_else(|| self.incidences.iter().position(|i| i.uid() == uid))
            .ok_or_else(|| format!("No incidence with UID {} in calendar {:?}", uid, self.name))?;
        let removed = self.incidences.remove(index);
        self.incidences.retain(|i| i.uid() != uid);
        Ok(removed)
    }

    /// Find the main incidence with this UID (not one of its exceptions, if possible)
    pub fn incidence(&self, uid: &str) -> Option<&Incidence> {
        self.incidences.iter().find(|i| i.uid() == uid && i.base().recurrence_id.is_none())
            .or_else(|| self.incidences.iter().find(|i| i.uid() == uid))
    }

    pub fn incidence_mut(&mut self, uid: &str) -> Option<&mut Incidence> {
        let index = self.incidences.iter().position(|i| i.uid() == uid && i.base().recurrence_id.is_none())
            .or_else(|| self.incidences.iter().position(|i| i.uid() == uid))?;
        self.incidences.get_mut(index)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.incidence(uid).is_some()
    }

    pub fn events(&self) -> Vec<&Event> {
        self.incidences.iter().filter_map(|i| i.as_event()).collect()
    }

    pub fn todos(&self) -> Vec<&Todo> {
        self.incidences.iter().filter_map(|i| i.as_todo()).collect()
    }

    pub fn journals(&self) -> Vec<&Journal> {
        self.incidences.iter().filter_map(|i| i.as_journal()).collect()
    }

    pub fn free_busys(&self) -> Vec<&FreeBusy> {
        self.incidences.iter().filter_map(|i| i.as_free_busy()).collect()
    }

    /// The events that take place on this day, all-day events first, then by start time.
    /// Recurring events are only listed on the days their stored instance covers.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events().into_iter()
            .filter(|e| e.covers(date))
            .collect();
        events.sort_by_key(|e| (e.all_day() == false, e.base.dt_start.as_ref().map(|s| s.to_utc())));
        events
    }

    /// The events that overlap the `[start, end]` range of days, sorted by start
    pub fn raw_events(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events().into_iter()
            .filter(|e| match (e.base.dt_start.as_ref(), e.last_day()) {
                (Some(first), Some(last)) => first.date() <= end && last >= start,
                _ => false,
            })
            .collect();
        events.sort_by_key(|e| e.base.dt_start.as_ref().map(|s| s.to_utc()));
        events
    }
}
