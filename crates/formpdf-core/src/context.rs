//! Request-scoped context
//!
//! One [`RequestContext`] is created per request (direct link or
//! notification dispatch) and handed to every component. It owns the
//! configuration index, which is populated lazily per form and not
//! mutated afterwards. The context is `!Sync` so it cannot leak across
//! requests running on other threads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use formpdf_model::{ConfigurationId, FormId, PdfConfiguration};
use tracing::debug;

use crate::error::Result;
use crate::settings::Settings;
use crate::store::{FormStore, OptionsStore};

/// Per-form ordered list of configurations
///
/// Position 0 is the default configuration of a form.
#[derive(Debug, Default)]
pub struct ConfigurationIndex {
    forms: RefCell<HashMap<FormId, Rc<Vec<PdfConfiguration>>>>,
}

impl ConfigurationIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations of a form, loading them on first use
    pub fn get_or_load(
        &self,
        form_id: FormId,
        store: &dyn OptionsStore,
    ) -> Result<Rc<Vec<PdfConfiguration>>> {
        if let Some(list) = self.forms.borrow().get(&form_id) {
            return Ok(Rc::clone(list));
        }

        let list = Rc::new(store.configurations(form_id)?);
        debug!(form_id = %form_id, count = list.len(), "Built configuration index");
        self.forms.borrow_mut().insert(form_id, Rc::clone(&list));
        Ok(list)
    }

    /// Register a configuration for a form whose index is empty
    ///
    /// Returns `false` and leaves the index untouched when the form already
    /// has configurations.
    pub fn register(&self, config: PdfConfiguration) -> bool {
        let mut forms = self.forms.borrow_mut();
        let slot = forms.entry(config.form_id).or_default();
        if !slot.is_empty() {
            return false;
        }
        *slot = Rc::new(vec![config]);
        true
    }

    /// Position of a configuration within its form
    pub fn position(&self, form_id: FormId, id: &ConfigurationId) -> Option<usize> {
        self.forms
            .borrow()
            .get(&form_id)?
            .iter()
            .position(|c| &c.id == id)
    }
}

/// Key of a cached resolution
type ResolutionKey = (FormId, String, Option<usize>);

/// Everything one request needs, passed explicitly to each component
pub struct RequestContext<'a> {
    settings: &'a Settings,
    forms: &'a dyn FormStore,
    options: &'a dyn OptionsStore,
    index: ConfigurationIndex,
    resolutions: RefCell<HashMap<ResolutionKey, Option<ConfigurationId>>>,
}

impl<'a> RequestContext<'a> {
    /// Create a context over the given collaborators
    pub fn new(
        settings: &'a Settings,
        forms: &'a dyn FormStore,
        options: &'a dyn OptionsStore,
    ) -> Self {
        Self {
            settings,
            forms,
            options,
            index: ConfigurationIndex::new(),
            resolutions: RefCell::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn forms(&self) -> &'a dyn FormStore {
        self.forms
    }

    pub fn options(&self) -> &'a dyn OptionsStore {
        self.options
    }

    pub fn index(&self) -> &ConfigurationIndex {
        &self.index
    }

    /// Configurations of a form in index order
    pub fn configurations(&self, form_id: FormId) -> Result<Rc<Vec<PdfConfiguration>>> {
        self.index.get_or_load(form_id, self.options)
    }

    /// Look up one configuration of a form by id
    pub fn configuration(
        &self,
        form_id: FormId,
        id: &ConfigurationId,
    ) -> Result<Option<PdfConfiguration>> {
        Ok(self
            .configurations(form_id)?
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    pub(crate) fn cached_resolution(&self, key: &ResolutionKey) -> Option<Option<ConfigurationId>> {
        self.resolutions.borrow().get(key).cloned()
    }

    pub(crate) fn cache_resolution(&self, key: ResolutionKey, value: Option<ConfigurationId>) {
        self.resolutions.borrow_mut().insert(key, value);
    }
}
