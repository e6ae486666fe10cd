//! Document templates
//!
//! A template contributes a stylesheet and option defaults, and wraps an
//! assembled body into a complete HTML document for the converter.

use std::collections::BTreeMap;
use std::path::Path;

use formpdf_model::Orientation;
use tracing::warn;

use crate::html;
use crate::options::DocumentOptions;

/// Template used when a requested name is unknown
pub const FALLBACK_TEMPLATE: &str = "blank-slate";

/// Separator between entries rendered into one document
pub const PAGE_BREAK: &str = "<div class=\"page-break\"></div>\n";

const BASE_STYLESHEET: &str = "\
.row-separator { clear: both; overflow: hidden; margin-bottom: 8px; }
.row-separator > div { float: left; }
.gf_left_half, .gf_right_half { width: 49%; margin-right: 1%; }
.gf_left_third, .gf_middle_third, .gf_right_third { width: 32%; margin-right: 1%; }
.gf_first_quarter, .gf_second_quarter, .gf_third_quarter, .gf_fourth_quarter { width: 24%; margin-right: 1%; }
.gfield--width-full { width: 100%; }
.gfield--width-three-quarter { width: 74%; }
.gfield--width-two-thirds { width: 65%; }
.gfield--width-half { width: 49%; }
.gfield--width-third { width: 32%; }
.gfield--width-quarter { width: 24%; }
.page-break { page-break-after: always; }
.label { font-weight: bold; }
ul.bulleted { margin: 0; padding-left: 1.2em; }
table.entry-products, table.gfield_list { width: 100%; border-collapse: collapse; }
table.entry-products th, table.entry-products td, table.gfield_list td, table.gfield_list th { border: 1px solid #ccc; padding: 4px; }
.textcenter { text-align: center; }
.totals { text-align: right; }
";

/// Option defaults a template applies when the configuration leaves them unset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDefaults {
    pub paper_size: Option<String>,
    pub orientation: Option<Orientation>,
    pub font: Option<String>,
    pub font_size: Option<f32>,
    pub show_form_title: Option<bool>,
    pub show_page_names: Option<bool>,
    pub show_html: Option<bool>,
    pub show_section_content: Option<bool>,
    pub show_empty: Option<bool>,
}

/// A named document template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    /// Styles added after the base stylesheet
    pub stylesheet: String,
    pub defaults: TemplateDefaults,
}

impl Template {
    pub fn new(name: impl Into<String>, stylesheet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stylesheet: stylesheet.into(),
            defaults: TemplateDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Wrap an assembled body into a full HTML document
    pub fn wrap(&self, body: &str, options: &DocumentOptions) -> String {
        let dir = if options.rtl { "rtl" } else { "ltr" };
        let mut out = String::with_capacity(body.len() + 4096);
        out.push_str("<!DOCTYPE html>\n");
        out.push_str(&format!("<html lang=\"en\" dir=\"{}\">\n<head>\n", dir));
        out.push_str("<meta charset=\"utf-8\" />\n");
        out.push_str(&format!("<title>{}</title>\n", html::escape(&options.filename)));
        out.push_str("<style>\n");
        out.push_str(BASE_STYLESHEET);
        out.push_str(&self.stylesheet);
        if let Some(dir) = &options.font_dir {
            out.push_str(&font_face(dir, &options.font));
        }
        out.push_str(&format!(
            "body {{ font-family: \"{}\"; font-size: {}pt; }}\n",
            html::escape(&options.font),
            options.font_size
        ));
        out.push_str("</style>\n</head>\n");
        out.push_str(&format!(
            "<body class=\"{}\">\n",
            html::escape(&format!("template-{}", self.name))
        ));
        out.push_str(body);
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// Named templates available to configurations
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Registry with the built-in templates
    pub fn new() -> Self {
        let mut registry = Self {
            templates: BTreeMap::new(),
        };

        registry.register(
            Template::new(
                "zadani",
                "h3 { border-bottom: 1px solid #ccc; padding-bottom: 4px; }\n\
                 .inner-container { padding: 4px 0; }\n",
            )
            .with_defaults(TemplateDefaults {
                font_size: Some(10.0),
                show_form_title: Some(true),
                ..Default::default()
            }),
        );
        registry.register(
            Template::new(
                "rubix",
                "h3 { background: #eee; padding: 6px; }\n\
                 .inner-container { border: 1px solid #ddd; border-radius: 4px; padding: 6px; }\n",
            )
            .with_defaults(TemplateDefaults {
                font: Some("dejavusans".to_string()),
                show_form_title: Some(true),
                show_page_names: Some(true),
                ..Default::default()
            }),
        );
        registry.register(
            Template::new(
                "focus-gravity",
                "#form_title { text-align: center; }\n\
                 .label { color: #555; text-transform: uppercase; font-size: 80%; }\n",
            )
            .with_defaults(TemplateDefaults {
                font_size: Some(11.0),
                show_form_title: Some(true),
                show_section_content: Some(true),
                ..Default::default()
            }),
        );
        registry.register(Template::new(FALLBACK_TEMPLATE, ""));
        registry
    }

    /// Register or replace a template
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Look up a template, falling back to the blank template
    pub fn get(&self, name: &str) -> &Template {
        if let Some(template) = self.templates.get(name) {
            return template;
        }
        warn!(template = name, fallback = FALLBACK_TEMPLATE, "Unknown template");
        self.templates
            .get(FALLBACK_TEMPLATE)
            .unwrap_or_else(|| blank_slate())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|k| k.as_str())
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_slate() -> &'static Template {
    static BLANK: std::sync::OnceLock<Template> = std::sync::OnceLock::new();
    BLANK.get_or_init(|| Template::new(FALLBACK_TEMPLATE, ""))
}

/// `@font-face` rule loading `{font}.ttf` from a local font directory
fn font_face(dir: &Path, font: &str) -> String {
    let css = |s: &str| s.replace(['"', '<', '>', '\\'], "");
    let path = dir.join(format!("{}.ttf", font));
    format!(
        "@font-face {{ font-family: \"{}\"; src: url(\"file://{}\"); }}\n",
        css(font),
        css(&path.to_string_lossy())
    )
}
