//! PDF configuration records
//!
//! A configuration is one named set of PDF options bound to a form. Render
//! options are optional so that unset values fall through to template and
//! system defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::FormId;
use crate::logic::ConditionalLogic;

/// Configuration identifier, stable per form
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(pub String);

impl ConfigurationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which notifications a configuration attaches to
///
/// Stored as `true`/`false`, a single notification name, or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawTarget", into = "RawTarget")]
pub enum NotificationTarget {
    /// Never attached
    #[default]
    None,
    /// Every submission notification of the form
    All,
    /// One named notification
    One(String),
    /// Several named notifications
    Many(Vec<String>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl From<RawTarget> for NotificationTarget {
    fn from(raw: RawTarget) -> Self {
        match raw {
            RawTarget::Flag(true) => NotificationTarget::All,
            RawTarget::Flag(false) => NotificationTarget::None,
            RawTarget::One(name) if name.is_empty() => NotificationTarget::None,
            RawTarget::One(name) => NotificationTarget::One(name),
            RawTarget::Many(names) => NotificationTarget::Many(names),
        }
    }
}

impl From<NotificationTarget> for RawTarget {
    fn from(target: NotificationTarget) -> Self {
        match target {
            NotificationTarget::None => RawTarget::Flag(false),
            NotificationTarget::All => RawTarget::Flag(true),
            NotificationTarget::One(name) => RawTarget::One(name),
            NotificationTarget::Many(names) => RawTarget::Many(names),
        }
    }
}

/// Who may open the PDF through a direct link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    /// Owner, submitter-by-IP and capability holders
    #[default]
    Restricted,
    /// Anyone with the link
    All,
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// PDF compliance format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfFormat {
    #[default]
    Standard,
    #[serde(rename = "pdfa1b")]
    PdfA1b,
    #[serde(rename = "pdfx1a")]
    PdfX1a,
}

impl PdfFormat {
    /// Compliance formats cannot be encrypted
    pub fn allows_security(self) -> bool {
        self == PdfFormat::Standard
    }
}

/// Permissions granted on a secured PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privilege {
    Copy,
    Print,
    PrintHighres,
    Modify,
    Annotate,
    FillForms,
    Extract,
    Assemble,
}

impl Privilege {
    pub fn as_str(self) -> &'static str {
        match self {
            Privilege::Copy => "copy",
            Privilege::Print => "print",
            Privilege::PrintHighres => "print-highres",
            Privilege::Modify => "modify",
            Privilege::Annotate => "annotate",
            Privilege::FillForms => "fill-forms",
            Privilege::Extract => "extract",
            Privilege::Assemble => "assemble",
        }
    }
}

/// A PDF configuration bound to one form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfiguration {
    pub id: ConfigurationId,
    pub form_id: FormId,
    /// Administrative label
    pub name: String,
    /// Template name
    pub template: Option<String>,
    /// Inactive configurations are never generated
    #[serde(default = "default_true")]
    pub active: bool,
    pub notifications: NotificationTarget,
    /// Persist generated PDFs on submission
    pub save: bool,
    pub access: AccessScope,
    /// Limit direct-link access to capability holders
    pub restrict_owner: Option<bool>,
    pub security: Option<bool>,
    pub password: Option<String>,
    pub master_password: Option<String>,
    pub privileges: Option<Vec<Privilege>>,
    pub paper_size: Option<String>,
    pub orientation: Option<Orientation>,
    pub format: Option<PdfFormat>,
    pub image_dpi: Option<u32>,
    pub rtl: Option<bool>,
    pub font: Option<String>,
    pub font_size: Option<f32>,
    /// Output filename, may contain merge tags
    pub filename: Option<String>,
    pub show_form_title: Option<bool>,
    pub show_page_names: Option<bool>,
    pub show_html: Option<bool>,
    pub show_section_content: Option<bool>,
    pub show_empty: Option<bool>,
    pub enable_conditional: Option<bool>,
    pub show_individual_product_fields: Option<bool>,
    /// Fields never written to this PDF
    pub excluded_fields: Vec<u32>,
    /// Whether the configuration applies to a given entry
    pub conditional_logic: Option<ConditionalLogic>,
}

fn default_true() -> bool {
    true
}

impl PdfConfiguration {
    /// Create an active configuration with every option unset
    pub fn new(id: impl Into<String>, form_id: FormId) -> Self {
        Self {
            id: ConfigurationId::new(id),
            form_id,
            active: true,
            ..Default::default()
        }
    }

    /// Set the template name
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Template name, empty when unset
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or("")
    }
}
