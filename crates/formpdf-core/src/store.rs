//! Collaborator contracts
//!
//! Forms, entries and configurations are owned by external stores. The
//! pipeline reaches them only through the traits in this module.
//! [`MemoryStore`] implements both contracts over fixture data.

use std::collections::BTreeMap;

use formpdf_model::{Entry, EntryId, Form, FormId, PdfConfiguration, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Source of PDF configurations
pub trait OptionsStore {
    /// Configurations of a form, in registration order
    fn configurations(&self, form_id: FormId) -> Result<Vec<PdfConfiguration>>;

    /// Site-wide value of a named option, if the store keeps one
    fn system_default(&self, _option: &str) -> Option<String> {
        None
    }
}

/// Source of forms and entries
pub trait FormStore {
    /// Fetch a form
    fn form(&self, id: FormId) -> Result<Form>;

    /// Fetch an entry
    fn entry(&self, id: EntryId) -> Result<Entry>;

    /// Count active entries of a form with the given id that match the filter
    fn count_active_entries(
        &self,
        form_id: FormId,
        entry_id: EntryId,
        filter: &EntryFilter,
    ) -> Result<usize>;
}

/// Extra conditions for [`FormStore::count_active_entries`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Submission IP must match
    pub ip: Option<String>,
    /// Owner must match
    pub created_by: Option<UserId>,
    /// Entry must be created at or after this time
    pub created_after: Option<Timestamp>,
}

impl EntryFilter {
    /// Filter on submission IP
    pub fn by_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            ..Default::default()
        }
    }

    /// Filter on owner
    pub fn by_owner(user: UserId) -> Self {
        Self {
            created_by: Some(user),
            ..Default::default()
        }
    }

    /// Restrict to entries created at or after `since`
    pub fn created_after(mut self, since: Timestamp) -> Self {
        self.created_after = Some(since);
        self
    }

    /// Whether an entry satisfies the filter
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(ref ip) = self.ip {
            if &entry.ip != ip {
                return false;
            }
        }
        if let Some(user) = self.created_by {
            if entry.created_by != Some(user) {
                return false;
            }
        }
        if let Some(since) = self.created_after {
            if entry.date_created < since {
                return false;
            }
        }
        true
    }
}

/// In-memory store backed by fixture data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    pub forms: Vec<Form>,
    pub entries: Vec<Entry>,
    pub configurations: Vec<PdfConfiguration>,
    /// Site-wide option values keyed by option name
    pub defaults: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a form
    pub fn insert_form(&mut self, form: Form) {
        self.forms.retain(|f| f.id != form.id);
        self.forms.push(form);
    }

    /// Add an entry
    pub fn insert_entry(&mut self, entry: Entry) {
        self.entries.retain(|e| e.id != entry.id);
        self.entries.push(entry);
    }

    /// Add a configuration after any existing ones of the same form
    pub fn insert_configuration(&mut self, config: PdfConfiguration) {
        self.configurations.push(config);
    }
}

impl OptionsStore for MemoryStore {
    fn configurations(&self, form_id: FormId) -> Result<Vec<PdfConfiguration>> {
        Ok(self
            .configurations
            .iter()
            .filter(|c| c.form_id == form_id)
            .cloned()
            .collect())
    }

    fn system_default(&self, option: &str) -> Option<String> {
        self.defaults.get(option).cloned()
    }
}

impl FormStore for MemoryStore {
    fn form(&self, id: FormId) -> Result<Form> {
        self.forms
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(Error::FormNotFound(id))
    }

    fn entry(&self, id: EntryId) -> Result<Entry> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(Error::EntryNotFound(id))
    }

    fn count_active_entries(
        &self,
        form_id: FormId,
        entry_id: EntryId,
        filter: &EntryFilter,
    ) -> Result<usize> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.form_id == form_id && e.id == entry_id && e.is_active())
            .filter(|e| filter.matches(e))
            .count())
    }
}
