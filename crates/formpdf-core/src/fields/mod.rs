//! Field Renderer
//!
//! Maps each field type tag to a renderer through a dispatch table.
//! Unknown tags fall back to an opaque-text renderer; callers can register
//! renderers for their own tags.
//!
//! A single failing field never aborts a document: the error is logged with
//! field, entry and form ids and the field is skipped.

mod products;
mod standard;

use std::collections::HashMap;
use std::sync::Arc;

use formpdf_model::{Field, FieldId, FieldKind, FieldValue};
use tracing::warn;

use crate::error::FieldError;
use crate::html;
use crate::middleware::MiddlewareChain;
use crate::render::RenderContext;

pub use products::{format_money, product_table, ProductRenderer};
pub use standard::{
    ChoiceRenderer, CompoundRenderer, EmailRenderer, FileUploadRenderer, HtmlRenderer,
    ListRenderer, MultiChoiceRenderer, SectionRenderer, TextRenderer, TextareaRenderer,
    WebsiteRenderer,
};

/// Renders one field kind to an HTML fragment
pub trait FieldType: Send + Sync {
    /// Build the fragment for a field
    ///
    /// `value` is the entry's value for the field, if any.
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError>;

    /// Static fields carry no entry value and ignore the emptiness rule
    fn is_static(&self) -> bool {
        false
    }
}

/// Wrap a value in the standard label/value markup
pub fn wrap_standard(field: &Field, value_html: &str) -> String {
    let class = html::classes(&[
        &format!("gfpdf-{}", field.kind.as_str()),
        "gfpdf-field",
        &field.css_class,
    ]);
    format!(
        "<div id=\"field-{id}\" class=\"{class}\">\n\
         <div class=\"inner-container\">\n\
         <div class=\"label\"><strong>{label}</strong></div>\n\
         <div class=\"value\">{value}</div>\n\
         </div>\n\
         </div>\n",
        id = field.id,
        class = html::escape(&class),
        label = html::escape(&field.label),
        value = value_html,
    )
}

/// Dispatch table from field kind to renderer
#[derive(Clone)]
pub struct FieldRegistry {
    renderers: HashMap<FieldKind, Arc<dyn FieldType>>,
    fallback: Arc<dyn FieldType>,
}

impl FieldRegistry {
    /// A registry with the built-in renderers
    pub fn new() -> Self {
        let mut registry = Self {
            renderers: HashMap::new(),
            fallback: Arc::new(TextRenderer),
        };

        let text: Arc<dyn FieldType> = Arc::new(TextRenderer);
        for kind in [
            FieldKind::Text,
            FieldKind::Phone,
            FieldKind::Number,
            FieldKind::Hidden,
            FieldKind::Date,
            FieldKind::Time,
        ] {
            registry.register(kind, Arc::clone(&text));
        }

        let choice: Arc<dyn FieldType> = Arc::new(ChoiceRenderer);
        registry.register(FieldKind::Select, Arc::clone(&choice));
        registry.register(FieldKind::Radio, choice);

        let multi: Arc<dyn FieldType> = Arc::new(MultiChoiceRenderer);
        registry.register(FieldKind::Checkbox, Arc::clone(&multi));
        registry.register(FieldKind::Multiselect, multi);

        let compound: Arc<dyn FieldType> = Arc::new(CompoundRenderer);
        registry.register(FieldKind::Name, Arc::clone(&compound));
        registry.register(FieldKind::Address, compound);

        let product: Arc<dyn FieldType> = Arc::new(ProductRenderer);
        for kind in [
            FieldKind::Product,
            FieldKind::Quantity,
            FieldKind::Option,
            FieldKind::Shipping,
            FieldKind::Total,
        ] {
            registry.register(kind, Arc::clone(&product));
        }

        registry.register(FieldKind::Textarea, Arc::new(TextareaRenderer));
        registry.register(FieldKind::Email, Arc::new(EmailRenderer));
        registry.register(FieldKind::Website, Arc::new(WebsiteRenderer));
        registry.register(FieldKind::List, Arc::new(ListRenderer));
        registry.register(FieldKind::FileUpload, Arc::new(FileUploadRenderer));
        registry.register(FieldKind::Html, Arc::new(HtmlRenderer));
        registry.register(FieldKind::Section, Arc::new(SectionRenderer));
        registry
    }

    /// Register or replace the renderer for a kind
    pub fn register(&mut self, kind: FieldKind, renderer: Arc<dyn FieldType>) {
        self.renderers.insert(kind, renderer);
    }

    /// Renderer for a kind, or the opaque-text fallback
    pub fn get(&self, kind: &FieldKind) -> Arc<dyn FieldType> {
        self.renderers
            .get(kind)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    /// Whether a dedicated renderer exists for a kind
    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.renderers.contains_key(kind)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a field produced no fragment
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The kind never renders, or the caller blacklisted it
    Blacklisted,
    /// A middleware forced the skip
    Middleware(String),
    /// No value and empty fields are hidden
    Empty,
    /// The renderer failed
    Failed(FieldError),
}

/// Result of rendering one field
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Fragment(String),
    Skipped(SkipReason),
}

impl RenderOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RenderOutcome::Skipped(_))
    }
}

/// Renders fields through the blacklist, middleware and dispatch table
#[derive(Clone)]
pub struct FieldRenderer {
    registry: FieldRegistry,
    middleware: MiddlewareChain,
    blacklist: Vec<FieldKind>,
    blacklisted_fields: Vec<FieldId>,
}

impl FieldRenderer {
    /// Renderer with the built-in registry and middleware
    pub fn new() -> Self {
        Self {
            registry: FieldRegistry::new(),
            middleware: MiddlewareChain::with_defaults(),
            blacklist: Vec::new(),
            blacklisted_fields: Vec::new(),
        }
    }

    /// Replace the dispatch table
    pub fn with_registry(mut self, registry: FieldRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the middleware chain
    pub fn with_middleware(mut self, middleware: MiddlewareChain) -> Self {
        self.middleware = middleware;
        self
    }

    /// Add kinds that are never rendered
    pub fn with_blacklist(mut self, kinds: impl IntoIterator<Item = FieldKind>) -> Self {
        self.blacklist.extend(kinds);
        self
    }

    /// Add individual fields that are never rendered
    pub fn with_blacklisted_fields(mut self, ids: impl IntoIterator<Item = FieldId>) -> Self {
        self.blacklisted_fields.extend(ids);
        self
    }

    pub fn registry_mut(&mut self) -> &mut FieldRegistry {
        &mut self.registry
    }

    pub fn middleware_mut(&mut self) -> &mut MiddlewareChain {
        &mut self.middleware
    }

    /// Decide whether a field is skipped before rendering
    pub fn skip_reason(&self, field: &Field, ctx: &RenderContext<'_>) -> Option<SkipReason> {
        if field.kind.is_never_rendered()
            || self.blacklist.contains(&field.kind)
            || self.blacklisted_fields.contains(&field.id)
        {
            return Some(SkipReason::Blacklisted);
        }
        self.middleware
            .skipped_by(field, ctx)
            .map(SkipReason::Middleware)
    }

    /// Render one field
    pub fn render(&self, field: &Field, ctx: &RenderContext<'_>) -> RenderOutcome {
        if let Some(reason) = self.skip_reason(field, ctx) {
            return RenderOutcome::Skipped(reason);
        }

        let renderer = self.registry.get(&field.kind);
        let value = ctx.entry.value(field.id);
        let has_value = value.is_some_and(|v| !v.is_empty());
        if !renderer.is_static() && !has_value && !ctx.flags.show_empty_fields {
            return RenderOutcome::Skipped(SkipReason::Empty);
        }

        match renderer.render(field, value, ctx) {
            Ok(fragment) => RenderOutcome::Fragment(fragment),
            Err(error) => {
                warn!(
                    field_id = %field.id,
                    entry_id = %ctx.entry.id,
                    form_id = %ctx.form.id,
                    error = %error,
                    "Failed to render field"
                );
                RenderOutcome::Skipped(SkipReason::Failed(error))
            }
        }
    }
}

impl Default for FieldRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderFlags;
    use formpdf_model::{Entry, FieldId, Form, FormId, PdfConfiguration};

    struct Fixture {
        form: Form,
        entry: Entry,
        config: PdfConfiguration,
    }

    impl Fixture {
        fn new() -> Self {
            let mut entry = Entry::new(7, FormId(1));
            entry.set(1, FieldValue::text("Jane <Doe>"));
            entry.set(3, FieldValue::text("not rows"));
            Self {
                form: Form::new(1, "Test"),
                entry,
                config: PdfConfiguration::new("c", FormId(1)),
            }
        }

        fn render(&self, renderer: &FieldRenderer, field: &Field, flags: &RenderFlags) -> RenderOutcome {
            let ctx = RenderContext::new(&self.form, &self.entry, &self.config, flags);
            renderer.render(field, &ctx)
        }
    }

    #[test]
    fn test_standard_markup_is_escaped() {
        let fixture = Fixture::new();
        let field = Field::new(1, FieldKind::Text, "Name").with_class("gf_left_half");
        let outcome = fixture.render(&FieldRenderer::new(), &field, &RenderFlags::default());

        let RenderOutcome::Fragment(html) = outcome else {
            panic!("expected a fragment");
        };
        assert!(html.contains("id=\"field-1\""));
        assert!(html.contains("class=\"gfpdf-text gfpdf-field gf_left_half\""));
        assert!(html.contains("<strong>Name</strong>"));
        assert!(html.contains("Jane &lt;Doe&gt;"));
    }

    #[test]
    fn test_never_rendered_kinds() {
        let fixture = Fixture::new();
        let renderer = FieldRenderer::new();
        for kind in [FieldKind::Captcha, FieldKind::Password, FieldKind::Page] {
            let field = Field::new(1, kind, "x");
            assert_eq!(
                fixture.render(&renderer, &field, &RenderFlags::default()),
                RenderOutcome::Skipped(SkipReason::Blacklisted)
            );
        }
    }

    #[test]
    fn test_caller_blacklist() {
        let fixture = Fixture::new();
        let renderer = FieldRenderer::new().with_blacklist([FieldKind::Text]);
        let field = Field::new(1, FieldKind::Text, "Name");
        assert_eq!(
            fixture.render(&renderer, &field, &RenderFlags::default()),
            RenderOutcome::Skipped(SkipReason::Blacklisted)
        );
    }

    #[test]
    fn test_caller_blacklisted_field() {
        let fixture = Fixture::new();
        let renderer = FieldRenderer::new().with_blacklisted_fields([FieldId(1)]);
        let field = Field::new(1, FieldKind::Text, "Name");
        assert_eq!(
            fixture.render(&renderer, &field, &RenderFlags::default()),
            RenderOutcome::Skipped(SkipReason::Blacklisted)
        );
    }

    #[test]
    fn test_empty_rule() {
        let fixture = Fixture::new();
        let renderer = FieldRenderer::new();
        let field = Field::new(2, FieldKind::Text, "Phone");

        assert_eq!(
            fixture.render(&renderer, &field, &RenderFlags::default()),
            RenderOutcome::Skipped(SkipReason::Empty)
        );

        let flags = RenderFlags {
            show_empty_fields: true,
            ..Default::default()
        };
        assert!(!fixture.render(&renderer, &field, &flags).is_skipped());
    }

    #[test]
    fn test_failure_is_recovered() {
        let fixture = Fixture::new();
        let field = Field::new(3, FieldKind::List, "Items");
        let outcome = fixture.render(&FieldRenderer::new(), &field, &RenderFlags::default());
        assert!(matches!(
            outcome,
            RenderOutcome::Skipped(SkipReason::Failed(FieldError::ValueShape { field: FieldId(3), .. }))
        ));
    }

    #[test]
    fn test_unknown_kind_renders_as_text() {
        let mut fixture = Fixture::new();
        fixture.entry.set(4, FieldValue::text("5 stars"));
        let field = Field::new(4, FieldKind::Custom("rating".to_string()), "Rating");

        let renderer = FieldRenderer::new();
        assert!(!renderer.registry.contains(&field.kind));
        let RenderOutcome::Fragment(html) =
            fixture.render(&renderer, &field, &RenderFlags::default())
        else {
            panic!("expected a fragment");
        };
        assert!(html.contains("gfpdf-rating"));
        assert!(html.contains("5 stars"));
    }

    struct StarRenderer;

    impl FieldType for StarRenderer {
        fn render(
            &self,
            field: &Field,
            value: Option<&FieldValue>,
            _ctx: &RenderContext<'_>,
        ) -> Result<String, FieldError> {
            let stars = value.map(|v| v.display_text()).unwrap_or_default();
            Ok(wrap_standard(field, &"*".repeat(stars.len())))
        }
    }

    #[test]
    fn test_custom_registration() {
        let mut fixture = Fixture::new();
        fixture.entry.set(4, FieldValue::text("abc"));
        let kind = FieldKind::Custom("rating".to_string());

        let mut renderer = FieldRenderer::new();
        renderer.registry_mut().register(kind.clone(), Arc::new(StarRenderer));

        let field = Field::new(4, kind, "Rating");
        let RenderOutcome::Fragment(html) =
            fixture.render(&renderer, &field, &RenderFlags::default())
        else {
            panic!("expected a fragment");
        };
        assert!(html.contains("<div class=\"value\">***</div>"));
    }
}
