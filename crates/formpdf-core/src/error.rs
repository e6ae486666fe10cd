//! Error types for the formpdf pipeline

use std::path::PathBuf;

use formpdf_model::{ConfigurationId, EntryId, FieldId, FormId};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the pipeline and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Form missing from the form store
    #[error("Form not found: {0}")]
    FormNotFound(FormId),

    /// Entry missing from the form store
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// A store collaborator failed
    #[error("Store error: {0}")]
    Store(String),

    /// The external renderer failed
    #[error("PDF generation failed for configuration {configuration}: {source}")]
    Generation {
        configuration: ConfigurationId,
        #[source]
        source: RendererError,
    },

    /// Settings file could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Fixture data could not be parsed
    #[error("Invalid store data: {0}")]
    StoreData(#[from] serde_json::Error),

    /// IO error while writing output
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an IO error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while building a single field fragment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// The stored value does not fit the field type
    #[error("Field {field}: unexpected value shape for {kind}")]
    ValueShape { field: FieldId, kind: String },

    /// A custom renderer reported a failure
    #[error("Field {field}: {message}")]
    Custom { field: FieldId, message: String },
}

/// Errors reported by an HTML to PDF renderer
#[derive(Error, Debug)]
pub enum RendererError {
    /// The converter is not installed or could not be started
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// The converter ran but failed
    #[error("Conversion failed: {0}")]
    Failed(String),

    /// IO error while exchanging files with the converter
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal outcomes of a direct-link request
#[derive(Error, Debug)]
pub enum DirectLinkError {
    /// No configuration or record matches the request
    #[error("PDF not found for form {form_id}")]
    NotFound { form_id: FormId },

    /// The configuration is disabled or its conditions fail for the entry
    #[error("Configuration {configuration} is not active for this entry")]
    Inactive { configuration: ConfigurationId },

    /// Anonymous requester must authenticate first
    #[error("Login required")]
    LoginRequired { login_url: String },

    /// Authenticated requester may not view the entry
    #[error("Access denied")]
    AccessDenied,

    /// Assembly or conversion failed
    #[error("Could not generate PDF: {0}")]
    Generation(#[from] Error),
}

impl DirectLinkError {
    /// Message shown to the requester
    ///
    /// Generation failures only carry their detail for privileged viewers.
    pub fn user_message(&self, privileged: bool) -> String {
        match self {
            DirectLinkError::Generation(_) if privileged => self.to_string(),
            DirectLinkError::Generation(_) => {
                "There was a problem generating your PDF".to_string()
            }
            DirectLinkError::NotFound { .. } | DirectLinkError::Inactive { .. } => {
                "PDF link not found".to_string()
            }
            DirectLinkError::LoginRequired { .. } => "Please log in to view this PDF".to_string(),
            DirectLinkError::AccessDenied => {
                "You do not have permission to view this PDF".to_string()
            }
        }
    }
}
