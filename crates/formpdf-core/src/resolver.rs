//! Configuration Resolver
//!
//! Decides which PDF configuration of a form applies to a request.
//!
//! Precedence for a form with several configurations:
//!
//! 1. an explicit 1-based selector that names an existing position
//! 2. the first configuration (in index order) using the requested template
//! 3. position 0
//!
//! A form with exactly one configuration always resolves to it. A form with
//! none resolves to a synthesised default when the legacy fallback is on.

use formpdf_model::{ConfigurationId, Entry, FormId, PdfConfiguration};
use tracing::{debug, info};

use crate::conditional;
use crate::context::RequestContext;
use crate::error::Result;

/// Resolves configurations against the request's configuration index
pub struct ConfigurationResolver<'c, 'a> {
    ctx: &'c RequestContext<'a>,
}

impl<'c, 'a> ConfigurationResolver<'c, 'a> {
    pub fn new(ctx: &'c RequestContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolve the configuration id for a form
    ///
    /// `selector` is the external 1-based position. Returns `Ok(None)` when
    /// the form has no configuration and none can be synthesised.
    pub fn resolve(
        &self,
        form_id: FormId,
        requested_template: Option<&str>,
        selector: Option<usize>,
    ) -> Result<Option<ConfigurationId>> {
        let template = requested_template.unwrap_or("").trim().to_string();
        let key = (form_id, template, selector);
        if let Some(cached) = self.ctx.cached_resolution(&key) {
            return Ok(cached);
        }

        let resolved = self.resolve_uncached(form_id, &key.1, selector)?;
        self.ctx.cache_resolution(key, resolved.clone());
        Ok(resolved)
    }

    /// Resolve and return the full configuration record
    pub fn resolve_configuration(
        &self,
        form_id: FormId,
        requested_template: Option<&str>,
        selector: Option<usize>,
    ) -> Result<Option<PdfConfiguration>> {
        match self.resolve(form_id, requested_template, selector)? {
            Some(id) => self.ctx.configuration(form_id, &id),
            None => Ok(None),
        }
    }

    fn resolve_uncached(
        &self,
        form_id: FormId,
        template: &str,
        selector: Option<usize>,
    ) -> Result<Option<ConfigurationId>> {
        let configurations = self.ctx.configurations(form_id)?;

        match configurations.len() {
            0 => Ok(self.synthesise_default(form_id)),
            1 => Ok(Some(configurations[0].id.clone())),
            _ => {
                if let Some(position) = selector.and_then(|s| s.checked_sub(1)) {
                    if let Some(config) = configurations.get(position) {
                        return Ok(Some(config.id.clone()));
                    }
                    debug!(form_id = %form_id, selector = position + 1, "Selector out of range");
                }

                if !template.is_empty() {
                    if let Some(config) = configurations
                        .iter()
                        .find(|c| c.template_name() == template)
                    {
                        return Ok(Some(config.id.clone()));
                    }
                    // Unmatched templates fall back to the default position
                    debug!(form_id = %form_id, template, "No configuration uses requested template");
                }

                Ok(Some(configurations[0].id.clone()))
            }
        }
    }

    fn synthesise_default(&self, form_id: FormId) -> Option<ConfigurationId> {
        let settings = self.ctx.settings();
        if !settings.legacy.default_configuration {
            return None;
        }

        let config = PdfConfiguration::new(format!("default-{}", form_id), form_id)
            .with_template(settings.general.default_template.clone());
        let id = config.id.clone();
        if self.ctx.index().register(config) {
            info!(form_id = %form_id, configuration = %id, "Synthesised default configuration");
        }
        Some(id)
    }

    /// Active configurations whose conditional logic passes for the entry
    ///
    /// Returned in index order.
    pub fn applicable_configurations(&self, entry: &Entry) -> Result<Vec<PdfConfiguration>> {
        Ok(self
            .ctx
            .configurations(entry.form_id)?
            .iter()
            .filter(|c| is_applicable(c, entry))
            .cloned()
            .collect())
    }
}

/// Whether a configuration is active and its logic passes for the entry
pub fn is_applicable(config: &PdfConfiguration, entry: &Entry) -> bool {
    config.active && conditional::is_shown(config.conditional_logic.as_ref(), entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::store::MemoryStore;
    use formpdf_model::{ConditionalLogic, FieldId, FieldValue, Rule, RuleOperator};

    fn store_with(templates: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (i, template) in templates.iter().enumerate() {
            store.insert_configuration(
                PdfConfiguration::new(format!("cfg{}", i), FormId(1)).with_template(*template),
            );
        }
        store
    }

    fn resolve(
        store: &MemoryStore,
        settings: &Settings,
        template: Option<&str>,
        selector: Option<usize>,
    ) -> Option<String> {
        let ctx = RequestContext::new(settings, store, store);
        ConfigurationResolver::new(&ctx)
            .resolve(FormId(1), template, selector)
            .unwrap()
            .map(|id| id.0)
    }

    #[test]
    fn test_single_configuration_ignores_template() {
        let store = store_with(&["zadani"]);
        let settings = Settings::default();
        for template in [None, Some("rubix"), Some("zadani"), Some("")] {
            assert_eq!(resolve(&store, &settings, template, None).as_deref(), Some("cfg0"));
        }
        assert_eq!(resolve(&store, &settings, None, Some(7)).as_deref(), Some("cfg0"));
    }

    #[test]
    fn test_selector_is_one_based() {
        let store = store_with(&["zadani", "rubix", "focus-gravity"]);
        let settings = Settings::default();
        for k in 1..=3 {
            let expected = format!("cfg{}", k - 1);
            assert_eq!(resolve(&store, &settings, None, Some(k)), Some(expected));
        }
    }

    #[test]
    fn test_selector_beats_template() {
        let store = store_with(&["zadani", "rubix"]);
        let settings = Settings::default();
        assert_eq!(
            resolve(&store, &settings, Some("zadani"), Some(2)).as_deref(),
            Some("cfg1")
        );
    }

    #[test]
    fn test_out_of_range_selector_falls_through_to_template() {
        let store = store_with(&["zadani", "rubix"]);
        let settings = Settings::default();
        assert_eq!(
            resolve(&store, &settings, Some("rubix"), Some(5)).as_deref(),
            Some("cfg1")
        );
        assert_eq!(resolve(&store, &settings, None, Some(0)).as_deref(), Some("cfg0"));
    }

    #[test]
    fn test_template_match_takes_first_in_index_order() {
        let store = store_with(&["zadani", "rubix", "rubix"]);
        let settings = Settings::default();
        assert_eq!(resolve(&store, &settings, Some("rubix"), None).as_deref(), Some("cfg1"));
    }

    #[test]
    fn test_unmatched_template_falls_back_to_first() {
        let store = store_with(&["zadani", "rubix"]);
        let settings = Settings::default();
        assert_eq!(
            resolve(&store, &settings, Some("missing"), None).as_deref(),
            Some("cfg0")
        );
    }

    #[test]
    fn test_no_configuration_is_not_found() {
        let store = MemoryStore::new();
        let settings = Settings::default();
        assert_eq!(resolve(&store, &settings, None, None), None);
    }

    #[test]
    fn test_no_configuration_synthesises_default_when_enabled() {
        let store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.legacy.default_configuration = true;
        settings.general.default_template = "rubix".to_string();

        let ctx = RequestContext::new(&settings, &store, &store);
        let resolver = ConfigurationResolver::new(&ctx);
        let config = resolver
            .resolve_configuration(FormId(1), None, None)
            .unwrap()
            .unwrap();

        assert_eq!(config.id.as_str(), "default-1");
        assert_eq!(config.template_name(), "rubix");
        assert_eq!(ctx.configurations(FormId(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_resolution_is_cached_for_the_request() {
        let store = store_with(&["zadani", "rubix"]);
        let settings = Settings::default();
        let ctx = RequestContext::new(&settings, &store, &store);
        let resolver = ConfigurationResolver::new(&ctx);

        let first = resolver.resolve(FormId(1), Some("rubix"), None).unwrap();
        let second = resolver.resolve(FormId(1), Some("rubix"), None).unwrap();
        assert_eq!(first, second);
        assert!(ctx
            .cached_resolution(&(FormId(1), "rubix".to_string(), None))
            .is_some());
    }

    #[test]
    fn test_applicable_configurations_filter_inactive_and_logic() {
        let mut store = MemoryStore::new();
        store.insert_configuration(PdfConfiguration::new("on", FormId(1)));
        let mut off = PdfConfiguration::new("off", FormId(1));
        off.active = false;
        store.insert_configuration(off);
        let mut gated = PdfConfiguration::new("gated", FormId(1));
        gated.conditional_logic = Some(ConditionalLogic {
            rules: vec![Rule {
                field_id: FieldId(1),
                operator: RuleOperator::Is,
                value: "send".to_string(),
            }],
            ..Default::default()
        });
        store.insert_configuration(gated);

        let settings = Settings::default();
        let ctx = RequestContext::new(&settings, &store, &store);
        let resolver = ConfigurationResolver::new(&ctx);

        let mut entry = Entry::new(1, FormId(1));
        let ids: Vec<_> = resolver
            .applicable_configurations(&entry)
            .unwrap()
            .into_iter()
            .map(|c| c.id.0)
            .collect();
        assert_eq!(ids, vec!["on"]);

        entry.set(1, FieldValue::text("send"));
        assert_eq!(resolver.applicable_configurations(&entry).unwrap().len(), 2);
    }
}
