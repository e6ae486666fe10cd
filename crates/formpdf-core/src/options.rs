//! Option resolution
//!
//! Every document option is resolved through one ordered list of layers:
//!
//! 1. the configuration's own value
//! 2. the template's default
//! 3. the options store's site-wide value
//! 4. [`Settings`], whose defaults are the built-in constants
//!
//! The first layer that sets a value wins.

use std::path::PathBuf;

use formpdf_model::{Entry, FieldId, Form, Orientation, PdfConfiguration, PdfFormat, Privilege};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::filename;
use crate::layout::LayoutKind;
use crate::render::RenderFlags;
use crate::settings::Settings;
use crate::store::OptionsStore;
use crate::template::{Template, TemplateDefaults};

/// All privileges, granted when a secured configuration lists none
pub const ALL_PRIVILEGES: [Privilege; 8] = [
    Privilege::Copy,
    Privilege::Print,
    Privilege::PrintHighres,
    Privilege::Modify,
    Privilege::Annotate,
    Privilege::FillForms,
    Privilege::Extract,
    Privilege::Assemble,
];

/// Options handed to the PDF renderer
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    pub template: String,
    pub paper_size: String,
    pub orientation: Orientation,
    pub format: PdfFormat,
    /// Encrypt the document
    pub security: bool,
    pub password: Option<String>,
    pub master_password: Option<String>,
    pub privileges: Vec<Privilege>,
    pub image_dpi: u32,
    pub font: String,
    pub font_size: f32,
    /// Directory holding `{font}.ttf`, loaded by the template stylesheet
    pub font_dir: Option<PathBuf>,
    pub rtl: bool,
    /// Output name without the `.pdf` suffix
    pub filename: String,
    /// Open the print dialog when the document is viewed
    pub print_dialog: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        let general = Settings::default().general;
        Self {
            template: general.default_template,
            paper_size: general.default_paper_size,
            orientation: general.default_orientation,
            format: general.default_format,
            security: false,
            password: None,
            master_password: None,
            privileges: Vec::new(),
            image_dpi: general.image_dpi,
            font: general.default_font,
            font_size: general.default_font_size,
            font_dir: None,
            rtl: general.default_rtl,
            filename: String::new(),
            print_dialog: false,
        }
    }
}

/// Resolves options for one configuration through the layer order
pub struct OptionResolver<'a> {
    settings: &'a Settings,
    store: &'a dyn OptionsStore,
}

impl<'a> OptionResolver<'a> {
    pub fn new(settings: &'a Settings, store: &'a dyn OptionsStore) -> Self {
        Self { settings, store }
    }

    /// Template name for a configuration
    pub fn template_name(&self, config: &PdfConfiguration) -> String {
        config
            .template
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.system("template"))
            .unwrap_or_else(|| self.settings.general.default_template.clone())
    }

    /// Site-wide value of an option, parsed to the option's type
    fn system<T: DeserializeOwned>(&self, option: &str) -> Option<T> {
        let raw = self.store.system_default(option)?;
        // Numbers and booleans parse as JSON, names as plain strings
        serde_json::from_str(&raw)
            .or_else(|_| serde_json::from_value(serde_json::Value::String(raw.clone())))
            .map_err(|e| debug!(option, value = %raw, error = %e, "Ignoring invalid system option"))
            .ok()
    }

    fn layered<T: DeserializeOwned>(
        &self,
        option: &str,
        configured: Option<T>,
        template: Option<T>,
        setting: T,
    ) -> T {
        configured
            .or(template)
            .or_else(|| self.system(option))
            .unwrap_or(setting)
    }

    /// Resolve the options passed to the renderer
    pub fn document_options(
        &self,
        config: &PdfConfiguration,
        template: &Template,
        form: &Form,
        entry: &Entry,
    ) -> DocumentOptions {
        let general = &self.settings.general;
        let defaults: &TemplateDefaults = &template.defaults;

        let format = self.layered("format", config.format, None, general.default_format);
        let security = format.allows_security()
            && self.layered("security", config.security, None, false);

        let (password, master_password, privileges) = if security {
            (
                config.password.clone().filter(|p| !p.is_empty()),
                config.master_password.clone().filter(|p| !p.is_empty()),
                config
                    .privileges
                    .clone()
                    .unwrap_or_else(|| ALL_PRIVILEGES.to_vec()),
            )
        } else {
            (None, None, Vec::new())
        };

        DocumentOptions {
            template: template.name.clone(),
            paper_size: self.layered(
                "paper_size",
                config.paper_size.clone(),
                defaults.paper_size.clone(),
                general.default_paper_size.clone(),
            ),
            orientation: self.layered(
                "orientation",
                config.orientation,
                defaults.orientation,
                general.default_orientation,
            ),
            format,
            security,
            password,
            master_password,
            privileges,
            image_dpi: self.layered("image_dpi", config.image_dpi, None, general.image_dpi),
            font: self.layered(
                "font",
                config.font.clone(),
                defaults.font.clone(),
                general.default_font.clone(),
            ),
            font_size: self.layered(
                "font_size",
                config.font_size,
                defaults.font_size,
                general.default_font_size,
            ),
            font_dir: self.settings.paths.font_dir.clone(),
            rtl: self.layered("rtl", config.rtl, None, general.default_rtl),
            filename: filename::build_filename(config.filename.as_deref(), form, entry),
            print_dialog: false,
        }
    }

    /// Resolve the flags the assembler and field renderer read
    pub fn render_flags(
        &self,
        config: &PdfConfiguration,
        template: &Template,
        form: &Form,
    ) -> RenderFlags {
        let general = &self.settings.general;
        let defaults = &template.defaults;
        let column_layout = self.layered("column_layout", None, None, general.column_layout);

        RenderFlags {
            show_form_title: self.layered(
                "show_form_title",
                config.show_form_title,
                defaults.show_form_title,
                general.show_form_title,
            ),
            show_page_names: self.layered(
                "show_page_names",
                config.show_page_names,
                defaults.show_page_names,
                general.show_page_names,
            ),
            show_html: self.layered(
                "show_html",
                config.show_html,
                defaults.show_html,
                general.show_html,
            ),
            show_section_description: self.layered(
                "show_section_content",
                config.show_section_content,
                defaults.show_section_content,
                general.show_section_content,
            ),
            show_empty_fields: self.layered(
                "show_empty",
                config.show_empty,
                defaults.show_empty,
                general.show_empty,
            ),
            enable_conditional: self.layered(
                "enable_conditional",
                config.enable_conditional,
                None,
                general.enable_conditional,
            ),
            show_individual_product_fields: self.layered(
                "show_individual_product_fields",
                config.show_individual_product_fields,
                None,
                false,
            ),
            product_table: self.layered("product_table", None, None, general.product_table),
            layout: LayoutKind::detect(form, column_layout),
            excluded_fields: config.excluded_fields.iter().copied().map(FieldId).collect(),
        }
    }
}

/// Resolve renderer options for a configuration
pub fn resolve_document_options(
    config: &PdfConfiguration,
    template: &Template,
    settings: &Settings,
    store: &dyn OptionsStore,
    form: &Form,
    entry: &Entry,
) -> DocumentOptions {
    OptionResolver::new(settings, store).document_options(config, template, form, entry)
}

/// Resolve render flags for a configuration
pub fn resolve_render_flags(
    config: &PdfConfiguration,
    template: &Template,
    settings: &Settings,
    store: &dyn OptionsStore,
    form: &Form,
) -> RenderFlags {
    OptionResolver::new(settings, store).render_flags(config, template, form)
}
