//! Document Assembler
//!
//! Walks a form's fields in declared order and builds the HTML body of one
//! document: optional title, page names, field fragments wrapped by the
//! layout container, then the aggregated product table.

use std::io;

use formpdf_model::{Entry, Field, Form, PdfConfiguration};
use tracing::debug;

use crate::context::RequestContext;
use crate::fields::{product_table, FieldRenderer, RenderOutcome};
use crate::html;
use crate::layout::LayoutContainer;
use crate::options::{DocumentOptions, OptionResolver};
use crate::render::RenderContext;
use crate::template::TemplateRegistry;

/// An assembled body and the options it is rendered with
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    pub body: String,
    pub options: DocumentOptions,
}

/// Builds document bodies from a render context
#[derive(Clone, Default)]
pub struct DocumentAssembler {
    renderer: FieldRenderer,
}

impl DocumentAssembler {
    /// Assembler with the built-in field renderers and middleware
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(renderer: FieldRenderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &FieldRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut FieldRenderer {
        &mut self.renderer
    }

    /// Build the document body and return it
    pub fn assemble(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        self.build(ctx, &mut out);
        out
    }

    /// Build the document body and write it to a sink
    pub fn assemble_into<W: io::Write>(&self, ctx: &RenderContext<'_>, sink: &mut W) -> io::Result<()> {
        let mut out = String::new();
        self.build(ctx, &mut out);
        sink.write_all(out.as_bytes())
    }

    /// Resolve options for a configuration and assemble the entry's body
    pub fn prepare(
        &self,
        ctx: &RequestContext<'_>,
        templates: &TemplateRegistry,
        configuration: &PdfConfiguration,
        form: &Form,
        entry: &Entry,
    ) -> PreparedDocument {
        let resolver = OptionResolver::new(ctx.settings(), ctx.options());
        let template = templates.get(&resolver.template_name(configuration));
        let flags = resolver.render_flags(configuration, template, form);
        let options = resolver.document_options(configuration, template, form, entry);

        let render = RenderContext::new(form, entry, configuration, &flags);
        PreparedDocument {
            body: self.assemble(&render),
            options,
        }
    }

    fn build(&self, ctx: &RenderContext<'_>, out: &mut String) {
        let flags = ctx.flags;
        let form = ctx.form;

        if flags.show_form_title {
            out.push_str(&format!(
                "<div class=\"row-separator\">\n<h3 id=\"form_title\">{}</h3>\n</div>\n",
                html::escape(&form.title)
            ));
        }

        let mut container = flags.layout.container();
        let mut current_page = 0;
        let mut current_page_name: Option<&str> = None;

        for field in &form.fields {
            if flags.show_page_names && field.page != current_page {
                current_page = field.page;
                if let Some(name) = form.page_name(field.page) {
                    if current_page_name != Some(name) {
                        current_page_name = Some(name);
                        container.close(out);
                        write_page_name(name, out);
                    }
                }
            }

            self.write_field(field, ctx, container.as_mut(), out);
        }
        container.close(out);

        if flags.product_table && !flags.show_individual_product_fields {
            if let Some(table) = product_table(form, ctx.entry, ctx.currency()) {
                out.push_str(&table);
            }
        }
    }

    fn write_field(
        &self,
        field: &Field,
        ctx: &RenderContext<'_>,
        container: &mut dyn LayoutContainer,
        out: &mut String,
    ) {
        match self.renderer.render(field, ctx) {
            RenderOutcome::Fragment(fragment) => {
                container.generate(field, out);
                out.push_str(&fragment);
            }
            RenderOutcome::Skipped(reason) => {
                debug!(field_id = %field.id, entry_id = %ctx.entry.id, ?reason, "Skipped field");
                container.placeholder(field, out);
            }
        }
    }
}

fn write_page_name(name: &str, out: &mut String) {
    out.push_str(&format!(
        "<div class=\"row-separator\">\n<h3 class=\"gfpdf-page gfpdf-field\">{}</h3>\n</div>\n",
        html::escape(name)
    ));
}
