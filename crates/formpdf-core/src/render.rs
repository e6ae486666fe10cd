//! Render context
//!
//! The per-document bundle of entry, form, configuration and layout flags.
//! Created once per document render and discarded afterwards.

use formpdf_model::{Entry, FieldId, Form, PdfConfiguration};

use crate::layout::LayoutKind;

/// Flags controlling which parts of an entry are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFlags {
    pub show_form_title: bool,
    pub show_page_names: bool,
    pub show_html: bool,
    /// Include section descriptions
    pub show_section_description: bool,
    pub show_empty_fields: bool,
    /// Hide fields whose own conditional logic hides them
    pub enable_conditional: bool,
    /// Render product fields inline instead of the aggregated table
    pub show_individual_product_fields: bool,
    /// Append the aggregated product table
    pub product_table: bool,
    /// Row wrapping variant
    pub layout: LayoutKind,
    /// Field ids never written
    pub excluded_fields: Vec<FieldId>,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            show_form_title: false,
            show_page_names: false,
            show_html: false,
            show_section_description: false,
            show_empty_fields: false,
            enable_conditional: true,
            show_individual_product_fields: false,
            product_table: true,
            layout: LayoutKind::CssReady,
            excluded_fields: Vec::new(),
        }
    }
}

/// Everything one document render reads
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'r> {
    pub form: &'r Form,
    pub entry: &'r Entry,
    pub configuration: &'r PdfConfiguration,
    pub flags: &'r RenderFlags,
}

impl<'r> RenderContext<'r> {
    pub fn new(
        form: &'r Form,
        entry: &'r Entry,
        configuration: &'r PdfConfiguration,
        flags: &'r RenderFlags,
    ) -> Self {
        Self {
            form,
            entry,
            configuration,
            flags,
        }
    }

    /// Currency code used for money values
    pub fn currency(&self) -> &'r str {
        self.form.currency.as_deref().unwrap_or("USD")
    }
}
