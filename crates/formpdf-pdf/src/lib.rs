//! formpdf-pdf - PDF backend driven by an external converter
//!
//! Implements [`formpdf_core::PdfRenderer`] by running a
//! wkhtmltopdf-compatible binary over the assembled HTML document.
//! Secured documents are encrypted afterwards with a qpdf-compatible tool.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use formpdf_core::PdfGenerator;
//! use formpdf_pdf::CommandRenderer;
//!
//! let generator = PdfGenerator::new(Arc::new(CommandRenderer::new("wkhtmltopdf")));
//! ```

mod command;
mod error;

pub use command::CommandRenderer;
pub use error::{PdfError, Result};
