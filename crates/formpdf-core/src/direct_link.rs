//! Direct-link service
//!
//! Transport-agnostic handler behind the PDF links shared with submitters
//! and staff. Authorisation runs before any document is assembled.

use formpdf_model::{EntryId, FormId};
use tracing::{error, info};

use crate::access::{AccessAuthenticator, Requester};
use crate::assembler::DocumentAssembler;
use crate::context::RequestContext;
use crate::error::{DirectLinkError, Error};
use crate::invoker::PdfGenerator;
use crate::resolver::{is_applicable, ConfigurationResolver};
use crate::template::PAGE_BREAK;

/// How the PDF is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Shown in the browser
    #[default]
    View,
    /// Saved as a file
    Download,
}

/// A parsed direct-link request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectLinkRequest {
    /// Taken from the first entry when absent
    pub form_id: Option<FormId>,
    pub entry_ids: Vec<EntryId>,
    pub template: Option<String>,
    /// 1-based configuration selector
    pub selector: Option<usize>,
    pub output: OutputMode,
    /// Open the print dialog on view
    pub print: bool,
}

impl DirectLinkRequest {
    pub fn new(entry_ids: impl IntoIterator<Item = EntryId>) -> Self {
        Self {
            entry_ids: entry_ids.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// A generated PDF ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfResponse {
    pub bytes: Vec<u8>,
    /// File name including the `.pdf` suffix
    pub filename: String,
    pub headers: Vec<(String, String)>,
}

impl PdfResponse {
    fn new(bytes: Vec<u8>, filename: String, output: OutputMode) -> Self {
        let disposition = match output {
            OutputMode::View => "inline",
            OutputMode::Download => "attachment",
        };
        let headers = vec![
            ("Content-Type".to_string(), "application/pdf".to_string()),
            (
                "Content-Disposition".to_string(),
                format!("{}; filename=\"{}\"", disposition, filename.replace('"', "")),
            ),
            ("X-Robots-Tag".to_string(), "noindex, nofollow".to_string()),
        ];
        Self {
            bytes,
            filename,
            headers,
        }
    }

    /// Value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves direct-link requests for one request context
pub struct DirectLinkService<'c, 'a> {
    ctx: &'c RequestContext<'a>,
    generator: PdfGenerator,
    assembler: DocumentAssembler,
}

impl<'c, 'a> DirectLinkService<'c, 'a> {
    pub fn new(ctx: &'c RequestContext<'a>, generator: PdfGenerator) -> Self {
        Self {
            ctx,
            generator,
            assembler: DocumentAssembler::new(),
        }
    }

    pub fn with_assembler(mut self, assembler: DocumentAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Whether error details may be shown to this requester
    pub fn is_privileged(&self, requester: &Requester) -> bool {
        AccessAuthenticator::new(self.ctx).is_privileged(requester)
    }

    /// Resolve, authorise, assemble and render
    pub fn serve(
        &self,
        request: &DirectLinkRequest,
        requester: &Requester,
    ) -> Result<PdfResponse, DirectLinkError> {
        let form_id = self.form_id(request)?;
        let not_found = || DirectLinkError::NotFound { form_id };

        let configuration = ConfigurationResolver::new(self.ctx)
            .resolve_configuration(form_id, request.template.as_deref(), request.selector)?
            .ok_or_else(not_found)?;
        if !configuration.active {
            return Err(DirectLinkError::Inactive {
                configuration: configuration.id,
            });
        }

        let batch = AccessAuthenticator::new(self.ctx).authorize_batch(
            &request.entry_ids,
            form_id,
            &configuration,
            requester,
        )?;

        let form = self.ctx.forms().form(form_id).map_err(|e| missing(e, form_id))?;
        let mut entries = Vec::with_capacity(batch.entries.len());
        for id in &batch.entries {
            let entry = self.ctx.forms().entry(*id).map_err(|e| missing(e, form_id))?;
            if entry.form_id != form_id {
                return Err(not_found());
            }
            if !is_applicable(&configuration, &entry) {
                return Err(DirectLinkError::Inactive {
                    configuration: configuration.id,
                });
            }
            entries.push(entry);
        }

        let mut body = String::new();
        let mut options = None;
        for (i, entry) in entries.iter().enumerate() {
            let prepared = self.assembler.prepare(
                self.ctx,
                self.generator.templates(),
                &configuration,
                &form,
                entry,
            );
            if i > 0 {
                body.push_str(PAGE_BREAK);
            }
            body.push_str(&prepared.body);
            options.get_or_insert(prepared.options);
        }
        let mut options = options.ok_or_else(not_found)?;
        options.print_dialog = request.print;

        let bytes = self
            .generator
            .render(&configuration.id, &body, &options)
            .map_err(|e| {
                error!(
                    form_id = %form_id,
                    configuration = %configuration.id,
                    entries = ?batch.entries,
                    error = %e,
                    "Direct link generation failed"
                );
                DirectLinkError::Generation(e)
            })?;

        info!(
            form_id = %form_id,
            configuration = %configuration.id,
            entries = batch.entries.len(),
            "Served direct link"
        );
        Ok(PdfResponse::new(
            bytes,
            format!("{}.pdf", options.filename),
            request.output,
        ))
    }

    fn form_id(&self, request: &DirectLinkRequest) -> Result<FormId, DirectLinkError> {
        if let Some(id) = request.form_id {
            return Ok(id);
        }
        let first = request
            .entry_ids
            .first()
            .ok_or(DirectLinkError::NotFound {
                form_id: FormId::default(),
            })?;
        let entry = self
            .ctx
            .forms()
            .entry(*first)
            .map_err(|e| missing(e, FormId::default()))?;
        Ok(entry.form_id)
    }
}

/// Missing records are reported as not found, other store errors pass through
fn missing(error: Error, form_id: FormId) -> DirectLinkError {
    match error {
        Error::FormNotFound(_) | Error::EntryNotFound(_) => DirectLinkError::NotFound { form_id },
        other => DirectLinkError::Generation(other),
    }
}
