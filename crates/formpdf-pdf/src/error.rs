//! Error types for the converter backend

use formpdf_core::RendererError;
use thiserror::Error;

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur while running the external tools
#[derive(Error, Debug)]
pub enum PdfError {
    /// The tool could not be started
    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully
    #[error("{command} exited with {status}: {stderr}")]
    Conversion {
        command: String,
        status: String,
        stderr: String,
    },

    /// The tool succeeded but wrote nothing
    #[error("{0} produced an empty document")]
    EmptyOutput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PdfError> for RendererError {
    fn from(error: PdfError) -> Self {
        match error {
            PdfError::Spawn { .. } => RendererError::Unavailable(error.to_string()),
            PdfError::Io(e) => RendererError::Io(e),
            other => RendererError::Failed(other.to_string()),
        }
    }
}
