//! PDF Generation Invoker
//!
//! Hands an assembled body and its document options to an HTML to PDF
//! renderer. The renderer itself is external; implementations live in
//! other crates (see `formpdf-pdf`) or in tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use formpdf_model::ConfigurationId;
use tracing::{error, info};

use crate::error::{Error, RendererError, Result};
use crate::options::DocumentOptions;
use crate::template::TemplateRegistry;

/// Converts a complete HTML document to PDF bytes
pub trait PdfRenderer: Send + Sync {
    fn render(
        &self,
        html: &str,
        options: &DocumentOptions,
    ) -> std::result::Result<Vec<u8>, RendererError>;
}

/// Wraps bodies in their template and drives a [`PdfRenderer`]
#[derive(Clone)]
pub struct PdfGenerator {
    renderer: Arc<dyn PdfRenderer>,
    templates: TemplateRegistry,
}

impl PdfGenerator {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self {
            renderer,
            templates: TemplateRegistry::new(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Wrap a body in the options' template
    pub fn document(&self, body: &str, options: &DocumentOptions) -> String {
        self.templates.get(&options.template).wrap(body, options)
    }

    /// Render a body to PDF bytes
    pub fn render(
        &self,
        configuration: &ConfigurationId,
        body: &str,
        options: &DocumentOptions,
    ) -> Result<Vec<u8>> {
        let document = self.document(body, options);
        self.renderer.render(&document, options).map_err(|source| {
            error!(configuration = %configuration, error = %source, "PDF renderer failed");
            Error::Generation {
                configuration: configuration.clone(),
                source,
            }
        })
    }

    /// Render a body and write it to `{dir}/{filename}.pdf`
    pub fn generate(
        &self,
        configuration: &ConfigurationId,
        body: &str,
        options: &DocumentOptions,
        dir: &Path,
    ) -> Result<PathBuf> {
        let bytes = self.render(configuration, body, options)?;

        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let path = dir.join(format!("{}.pdf", options.filename));
        fs::write(&path, &bytes).map_err(|e| Error::io(&path, e))?;

        info!(
            configuration = %configuration,
            path = %path.display(),
            bytes = bytes.len(),
            "Generated PDF"
        );
        Ok(path)
    }
}
