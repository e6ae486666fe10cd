//! Field middleware
//!
//! Middleware are predicates that can force a field to be skipped. The
//! renderer asks each one in order; the first that answers `true` wins.
//! Callers append their own for checks the built-ins do not cover.

use std::sync::Arc;

use formpdf_model::Field;

use crate::conditional;
use crate::render::RenderContext;

/// A predicate that may force a field to be skipped
pub trait Middleware: Send + Sync {
    /// Short name reported when the middleware skips a field
    fn name(&self) -> &str;

    /// Whether the field must be skipped
    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool;
}

/// Skips fields with the `exclude` class or listed in the excluded ids
#[derive(Debug, Default)]
pub struct ExcludeMiddleware;

impl Middleware for ExcludeMiddleware {
    fn name(&self) -> &str {
        "exclude"
    }

    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool {
        field.has_class("exclude") || ctx.flags.excluded_fields.contains(&field.id)
    }
}

/// Skips fields hidden by their own conditional logic
#[derive(Debug, Default)]
pub struct ConditionalLogicMiddleware;

impl Middleware for ConditionalLogicMiddleware {
    fn name(&self) -> &str {
        "conditional-logic"
    }

    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool {
        ctx.flags.enable_conditional
            && !conditional::is_shown(field.conditional_logic.as_ref(), ctx.entry)
    }
}

/// Skips html fields unless enabled
#[derive(Debug, Default)]
pub struct HtmlFieldMiddleware;

impl Middleware for HtmlFieldMiddleware {
    fn name(&self) -> &str {
        "html"
    }

    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool {
        field.kind == formpdf_model::FieldKind::Html && !ctx.flags.show_html
    }
}

/// Skips product fields when they are summarised in the product table
#[derive(Debug, Default)]
pub struct ProductMiddleware;

impl Middleware for ProductMiddleware {
    fn name(&self) -> &str {
        "product"
    }

    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool {
        field.kind.is_product_family() && !ctx.flags.show_individual_product_fields
    }
}

/// Skips fields only visible in the administration area
#[derive(Debug, Default)]
pub struct AdminOnlyMiddleware;

impl Middleware for AdminOnlyMiddleware {
    fn name(&self) -> &str {
        "admin-only"
    }

    fn skip(&self, field: &Field, _ctx: &RenderContext<'_>) -> bool {
        field.admin_only
    }
}

/// Middleware built from a closure
pub struct PredicateMiddleware<F> {
    name: String,
    predicate: F,
}

impl<F> PredicateMiddleware<F>
where
    F: Fn(&Field, &RenderContext<'_>) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> Middleware for PredicateMiddleware<F>
where
    F: Fn(&Field, &RenderContext<'_>) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn skip(&self, field: &Field, ctx: &RenderContext<'_>) -> bool {
        (self.predicate)(field, ctx)
    }
}

/// The ordered middleware list
#[derive(Clone)]
pub struct MiddlewareChain {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// An empty chain
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// The built-in middleware
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.push(Arc::new(ExcludeMiddleware));
        chain.push(Arc::new(ConditionalLogicMiddleware));
        chain.push(Arc::new(HtmlFieldMiddleware));
        chain.push(Arc::new(ProductMiddleware));
        chain.push(Arc::new(AdminOnlyMiddleware));
        chain
    }

    /// Append a middleware
    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Names of the registered middleware
    pub fn names(&self) -> Vec<&str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Name of the first middleware that skips the field
    pub fn skipped_by(&self, field: &Field, ctx: &RenderContext<'_>) -> Option<String> {
        self.middleware
            .iter()
            .find(|m| m.skip(field, ctx))
            .map(|m| m.name().to_string())
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderFlags;
    use formpdf_model::{
        ConditionalLogic, Entry, FieldId, FieldKind, Form, FormId, LogicAction, PdfConfiguration,
        Rule, RuleOperator,
    };

    fn check(field: &Field, flags: &RenderFlags) -> Option<String> {
        let form = Form::new(1, "Test");
        let entry = Entry::new(1, FormId(1));
        let config = PdfConfiguration::new("c", FormId(1));
        let ctx = RenderContext::new(&form, &entry, &config, flags);
        MiddlewareChain::with_defaults().skipped_by(field, &ctx)
    }

    #[test]
    fn test_default_chain_order() {
        assert_eq!(
            MiddlewareChain::with_defaults().names(),
            vec!["exclude", "conditional-logic", "html", "product", "admin-only"]
        );
    }

    #[test]
    fn test_exclude_class_and_ids() {
        let flags = RenderFlags::default();
        let field = Field::new(1, FieldKind::Text, "SSN").with_class("exclude");
        assert_eq!(check(&field, &flags).as_deref(), Some("exclude"));

        let flags = RenderFlags {
            excluded_fields: vec![FieldId(2)],
            ..Default::default()
        };
        let field = Field::new(2, FieldKind::Text, "Secret");
        assert_eq!(check(&field, &flags).as_deref(), Some("exclude"));
    }

    #[test]
    fn test_conditional_logic_respects_flag() {
        let mut field = Field::new(3, FieldKind::Text, "Hidden");
        field.conditional_logic = Some(ConditionalLogic {
            action: LogicAction::Show,
            rules: vec![Rule {
                field_id: FieldId(9),
                operator: RuleOperator::Is,
                value: "yes".to_string(),
            }],
            ..Default::default()
        });

        assert_eq!(
            check(&field, &RenderFlags::default()).as_deref(),
            Some("conditional-logic")
        );

        let flags = RenderFlags {
            enable_conditional: false,
            ..Default::default()
        };
        assert_eq!(check(&field, &flags), None);
    }

    #[test]
    fn test_html_and_product_flags() {
        let html = Field::new(4, FieldKind::Html, "Notice");
        let product = Field::new(5, FieldKind::Product, "Shirt");

        let flags = RenderFlags::default();
        assert_eq!(check(&html, &flags).as_deref(), Some("html"));
        assert_eq!(check(&product, &flags).as_deref(), Some("product"));

        let flags = RenderFlags {
            show_html: true,
            show_individual_product_fields: true,
            ..Default::default()
        };
        assert_eq!(check(&html, &flags), None);
        assert_eq!(check(&product, &flags), None);
    }

    #[test]
    fn test_predicate_middleware() {
        let form = Form::new(1, "Test");
        let entry = Entry::new(1, FormId(1));
        let config = PdfConfiguration::new("c", FormId(1));
        let flags = RenderFlags::default();
        let ctx = RenderContext::new(&form, &entry, &config, &flags);

        let mut chain = MiddlewareChain::new();
        chain.push(Arc::new(PredicateMiddleware::new("odd-ids", |f, _| f.id.0 % 2 == 1)));

        assert_eq!(
            chain.skipped_by(&Field::new(1, FieldKind::Text, "a"), &ctx).as_deref(),
            Some("odd-ids")
        );
        assert_eq!(chain.skipped_by(&Field::new(2, FieldKind::Text, "b"), &ctx), None);
    }
}
