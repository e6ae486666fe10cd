//! Converter invocation
//!
//! The body is written to a temporary `.html` file, converted by a
//! wkhtmltopdf-compatible binary, and encrypted afterwards with a
//! qpdf-compatible tool when the options ask for security.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use formpdf_core::settings::RendererSettings;
use formpdf_core::{DocumentOptions, PdfRenderer, RendererError};
use formpdf_model::{Orientation, PdfFormat, Privilege};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use crate::error::{PdfError, Result};

/// Renders documents by running external tools
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: String,
    extra_args: Vec<String>,
    encrypt_command: String,
}

impl CommandRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
            encrypt_command: "qpdf".to_string(),
        }
    }

    pub fn from_settings(settings: &RendererSettings) -> Self {
        Self {
            command: settings.command.clone(),
            extra_args: settings.extra_args.clone(),
            encrypt_command: settings.encrypt_command.clone(),
        }
    }

    /// Arguments placed before the generated ones
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_encrypt_command(mut self, command: impl Into<String>) -> Self {
        self.encrypt_command = command.into();
        self
    }

    /// Converter arguments for a document
    pub fn convert_args(&self, options: &DocumentOptions, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();

        let orientation = match options.orientation {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        };
        let dpi = options.image_dpi.to_string();

        for arg in [
            "--quiet",
            "--encoding",
            "utf-8",
            "--page-size",
            options.paper_size.as_str(),
            "--orientation",
            orientation,
            "--dpi",
            dpi.as_str(),
            "--image-dpi",
            dpi.as_str(),
            "--title",
            options.filename.as_str(),
        ] {
            args.push(arg.into());
        }
        // Fonts are loaded from file:// URLs in the stylesheet
        if options.font_dir.is_some() {
            args.push("--enable-local-file-access".into());
        }
        args.push(input.into());
        args.push(output.into());
        args
    }

    /// Encryption arguments for a secured document
    pub fn encrypt_args(options: &DocumentOptions, input: &Path, output: &Path) -> Vec<OsString> {
        let user = options.password.clone().unwrap_or_default();
        let owner = options.master_password.clone().unwrap_or_else(|| user.clone());
        let has = |p: Privilege| options.privileges.contains(&p);
        let yn = |allowed: bool| if allowed { "y" } else { "n" };

        let print = match (has(Privilege::Print), has(Privilege::PrintHighres)) {
            (_, true) => "full",
            (true, false) => "low",
            (false, false) => "none",
        };

        let mut args: Vec<OsString> = vec!["--encrypt".into(), user.into(), owner.into(), "256".into()];
        for flag in [
            format!("--print={}", print),
            format!("--extract={}", yn(has(Privilege::Copy) || has(Privilege::Extract))),
            format!("--modify-other={}", yn(has(Privilege::Modify))),
            format!("--annotate={}", yn(has(Privilege::Annotate))),
            format!("--form={}", yn(has(Privilege::FillForms))),
            format!("--assemble={}", yn(has(Privilege::Assemble))),
        ] {
            args.push(flag.into());
        }
        args.push("--".into());
        args.push(input.into());
        args.push(output.into());
        args
    }

    fn run(program: &str, args: &[OsString]) -> Result<()> {
        debug!(command = program, ?args, "Running converter");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| PdfError::Spawn {
                command: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(PdfError::Conversion {
                command: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Convert a complete HTML document to PDF bytes
    pub fn convert(&self, html: &str, options: &DocumentOptions) -> Result<Vec<u8>> {
        if options.format != PdfFormat::Standard {
            warn!(format = ?options.format, "Converter writes standard PDF only");
        }
        if options.print_dialog {
            debug!("Print dialog is not supported by the converter");
        }

        let mut input = Builder::new().prefix("formpdf-").suffix(".html").tempfile()?;
        input.write_all(html.as_bytes())?;
        input.flush()?;
        let converted = pdf_tempfile()?;

        Self::run(
            &self.command,
            &self.convert_args(options, input.path(), converted.path()),
        )?;

        let bytes = if options.security {
            let encrypted = pdf_tempfile()?;
            Self::run(
                &self.encrypt_command,
                &Self::encrypt_args(options, converted.path(), encrypted.path()),
            )?;
            read_output(&self.encrypt_command, encrypted.path())?
        } else {
            read_output(&self.command, converted.path())?
        };

        info!(
            filename = %options.filename,
            size_kb = bytes.len() / 1024,
            secured = options.security,
            "PDF generated successfully"
        );
        Ok(bytes)
    }
}

fn pdf_tempfile() -> Result<NamedTempFile> {
    Ok(Builder::new().prefix("formpdf-").suffix(".pdf").tempfile()?)
}

fn read_output(command: &str, path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(PdfError::EmptyOutput(command.to_string()));
    }
    Ok(bytes)
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::from_settings(&RendererSettings::default())
    }
}

impl PdfRenderer for CommandRenderer {
    fn render(
        &self,
        html: &str,
        options: &DocumentOptions,
    ) -> std::result::Result<Vec<u8>, RendererError> {
        Ok(self.convert(html, options)?)
    }
}
