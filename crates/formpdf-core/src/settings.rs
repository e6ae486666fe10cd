//! System-wide settings
//!
//! Settings are loaded from `formpdf.toml`:
//!
//! ```toml
//! [general]
//! default_template = "zadani"
//! default_paper_size = "A4"
//!
//! [security]
//! logged_out_timeout = 20
//! admin_capabilities = ["gravityforms_view_entries"]
//!
//! [paths]
//! temp_dir = "/tmp/formpdf"
//! save_dir = "/var/lib/formpdf"
//!
//! [legacy]
//! default_configuration = false
//! ```
//!
//! Every section and key is optional; missing values use the defaults below.

use std::path::{Path, PathBuf};

use formpdf_model::{Orientation, PdfFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Document defaults
    pub general: GeneralSettings,
    /// Direct-link access settings
    pub security: SecuritySettings,
    /// Output locations
    pub paths: PathSettings,
    /// Fallbacks for forms configured before per-form configurations existed
    pub legacy: LegacySettings,
    /// External converter settings
    pub renderer: RendererSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_toml_str(&content)?)
    }
}

/// Document defaults applied when a configuration leaves an option unset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub default_template: String,
    pub default_paper_size: String,
    pub default_orientation: Orientation,
    pub default_font: String,
    pub default_font_size: f32,
    pub default_rtl: bool,
    pub default_format: PdfFormat,
    pub image_dpi: u32,
    /// Show the form title at the top of the document
    pub show_form_title: bool,
    pub show_page_names: bool,
    pub show_html: bool,
    pub show_section_content: bool,
    pub show_empty: bool,
    pub enable_conditional: bool,
    /// Use the column layout (false disables row wrapping)
    pub column_layout: bool,
    /// Append the aggregated product table
    pub product_table: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_template: "zadani".to_string(),
            default_paper_size: "A4".to_string(),
            default_orientation: Orientation::Portrait,
            default_font: "dejavusanscondensed".to_string(),
            default_font_size: 10.0,
            default_rtl: false,
            default_format: PdfFormat::Standard,
            image_dpi: 96,
            show_form_title: false,
            show_page_names: false,
            show_html: false,
            show_section_content: false,
            show_empty: false,
            enable_conditional: true,
            column_layout: true,
            product_table: true,
        }
    }
}

/// Direct-link access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Minutes an anonymous submitter may view their PDF (0 = unlimited)
    pub logged_out_timeout: u32,
    /// Only capability holders may view PDFs unless a configuration overrides it
    pub default_restrict_owner: bool,
    /// Capabilities that grant access to every entry
    pub admin_capabilities: Vec<String>,
    /// Where anonymous requesters are sent to authenticate
    pub login_url: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            logged_out_timeout: 20,
            default_restrict_owner: false,
            admin_capabilities: vec![
                "gravityforms_view_entries".to_string(),
                "gform_full_access".to_string(),
            ],
            login_url: "/login".to_string(),
        }
    }
}

impl SecuritySettings {
    /// Logged-out window in seconds, `None` when unlimited
    pub fn logged_out_window_secs(&self) -> Option<i64> {
        match self.logged_out_timeout {
            0 => None,
            minutes => Some(i64::from(minutes) * 60),
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Scratch directory for notification attachments and direct links
    pub temp_dir: PathBuf,
    /// Directory for PDFs persisted on submission
    pub save_dir: PathBuf,
    /// Directory holding custom fonts
    pub font_dir: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        let base = std::env::temp_dir().join("formpdf");
        Self {
            temp_dir: base.join("tmp"),
            save_dir: base.join("saved"),
            font_dir: None,
        }
    }
}

/// Fallbacks for forms without their own configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LegacySettings {
    /// Synthesise a configuration for forms that have none
    pub default_configuration: bool,
}

/// External converter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Converter executable
    pub command: String,
    /// Extra arguments passed before the generated ones
    pub extra_args: Vec<String>,
    /// Tool used to encrypt secured documents after conversion
    pub encrypt_command: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            command: "wkhtmltopdf".to_string(),
            extra_args: Vec::new(),
            encrypt_command: "qpdf".to_string(),
        }
    }
}
