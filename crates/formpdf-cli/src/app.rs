//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use formpdf_core::{
    AttachmentReport, ConfigurationResolver, DirectLinkRequest, DirectLinkService,
    DocumentAssembler, FormStore, MemoryStore, NotificationAttacher, OutgoingNotification,
    OutputMode, PdfGenerator, PdfRenderer, RequestContext, Requester, Settings, TemplateRegistry,
};
use formpdf_model::{EntryId, FormId, Timestamp, UserId};
use formpdf_pdf::CommandRenderer;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "formpdf")]
#[command(author, version, about = "Form entries to PDF", long_about = None)]
struct Cli {
    /// JSON file holding forms, entries and configurations
    #[arg(short, long, global = true, default_value = "store.json")]
    store: PathBuf,

    /// Settings file (defaults to ./formpdf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which configuration a request selects
    Resolve {
        /// Form id
        #[arg(short, long)]
        form: u64,

        /// Requested template name
        #[arg(short, long)]
        template: Option<String>,

        /// 1-based configuration position
        #[arg(long)]
        selector: Option<usize>,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the assembled HTML of an entry
    Html {
        /// Entry id
        #[arg(short, long)]
        entry: u64,

        /// Requested template name
        #[arg(short, long)]
        template: Option<String>,

        /// 1-based configuration position
        #[arg(long)]
        selector: Option<usize>,

        /// Print the body without the template wrapper
        #[arg(long)]
        body_only: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve a direct link and write the PDF
    View {
        /// Entry ids, merged into one document in this order
        #[arg(required = true)]
        entries: Vec<u64>,

        /// Form id (taken from the first entry when omitted)
        #[arg(short, long)]
        form: Option<u64>,

        /// Requested template name
        #[arg(short, long)]
        template: Option<String>,

        /// 1-based configuration position
        #[arg(long)]
        selector: Option<usize>,

        /// Requester IP address
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,

        /// Authenticated user id (anonymous when omitted)
        #[arg(long)]
        user: Option<u64>,

        /// Capability held by the user
        #[arg(long = "capability")]
        capabilities: Vec<String>,

        /// Request time in unix seconds (now when omitted)
        #[arg(long)]
        now: Option<Timestamp>,

        /// Serve as a download instead of inline
        #[arg(long)]
        download: bool,

        /// Ask the viewer to open the print dialog
        #[arg(long)]
        print: bool,

        /// Output PDF file (defaults to the generated filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the attachments of a notification
    Notify {
        /// Entry id
        #[arg(short, long)]
        entry: u64,

        /// Notification id or name
        #[arg(short, long)]
        notification: String,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate and keep the PDFs of configurations marked for saving
    Save {
        /// Entry id
        #[arg(short, long)]
        entry: u64,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Settings and fixture data a command runs against
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub settings: Settings,
    pub store: MemoryStore,
}

impl Workspace {
    pub fn new(settings: Settings, store: MemoryStore) -> Self {
        Self { settings, store }
    }

    /// Load the store file and optional settings file
    pub fn load(store_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        if !store_path.exists() {
            anyhow::bail!("Store file not found: {}", store_path.display());
        }
        let content = fs::read_to_string(store_path)
            .with_context(|| format!("Failed to read store: {}", store_path.display()))?;
        let store = MemoryStore::from_json_str(&content)
            .with_context(|| format!("Failed to parse store: {}", store_path.display()))?;

        Ok(Self {
            settings: load_settings(config_path)?,
            store,
        })
    }

    /// Fresh request context over this workspace
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext::new(&self.settings, &self.store, &self.store)
    }
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let workspace = Workspace::load(&cli.store, cli.config.as_deref())?;
    let renderer: Arc<dyn PdfRenderer> =
        Arc::new(CommandRenderer::from_settings(&workspace.settings.renderer));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Resolve {
            form,
            template,
            selector,
            format,
        } => {
            resolve_command(&workspace, form, template.as_deref(), selector, format, &mut out)?;
        }
        Commands::Html {
            entry,
            template,
            selector,
            body_only,
            output,
        } => match output {
            Some(path) => {
                let mut file = fs::File::create(&path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                html_command(&workspace, entry, template.as_deref(), selector, body_only, &mut file)?;
                eprintln!("Wrote {}", path.display());
            }
            None => {
                html_command(&workspace, entry, template.as_deref(), selector, body_only, &mut out)?;
            }
        },
        Commands::View {
            entries,
            form,
            template,
            selector,
            ip,
            user,
            capabilities,
            now,
            download,
            print,
            output,
        } => {
            let request = DirectLinkRequest {
                form_id: form.map(FormId),
                entry_ids: entries.into_iter().map(EntryId).collect(),
                template,
                selector,
                output: if download {
                    OutputMode::Download
                } else {
                    OutputMode::View
                },
                print,
            };
            let now = now.unwrap_or_else(unix_now);
            let requester = match user {
                Some(id) => Requester::user(UserId(id), capabilities, ip, now),
                None => Requester::anonymous(ip, now),
            };
            view_command(&workspace, renderer, &request, &requester, output.as_deref(), &mut out)?;
        }
        Commands::Notify {
            entry,
            notification,
            format,
        } => {
            notify_command(&workspace, renderer, entry, &notification, format, &mut out)?;
        }
        Commands::Save { entry, format } => {
            save_command(&workspace, renderer, entry, format, &mut out)?;
        }
    }

    Ok(())
}

/// Execute the resolve command
pub fn resolve_command(
    workspace: &Workspace,
    form: u64,
    template: Option<&str>,
    selector: Option<usize>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let ctx = workspace.context();
    let configuration = ConfigurationResolver::new(&ctx)
        .resolve_configuration(FormId(form), template, selector)
        .with_context(|| format!("Failed to resolve configuration for form {}", form))?;

    match format {
        OutputFormat::Json => {
            let value = match &configuration {
                Some(config) => json!({
                    "form_id": form,
                    "configuration": config.id.as_str(),
                    "name": config.name,
                    "template": config.template_name(),
                    "active": config.active,
                }),
                None => json!({ "form_id": form, "configuration": null }),
            };
            let text = serde_json::to_string_pretty(&value)
                .context("Failed to serialize resolution to JSON")?;
            writeln!(out, "{}", text)?;
        }
        OutputFormat::Text => match &configuration {
            Some(config) => writeln!(
                out,
                "{} ({}, template {})",
                config.id,
                if config.active { "active" } else { "inactive" },
                config.template_name()
            )?,
            None => writeln!(out, "No configuration for form {}", form)?,
        },
    }

    Ok(())
}

/// Execute the html command
pub fn html_command(
    workspace: &Workspace,
    entry: u64,
    template: Option<&str>,
    selector: Option<usize>,
    body_only: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let entry = workspace
        .store
        .entry(EntryId(entry))
        .context("Failed to load entry")?;
    let form = workspace
        .store
        .form(entry.form_id)
        .context("Failed to load form")?;

    let ctx = workspace.context();
    let Some(configuration) = ConfigurationResolver::new(&ctx)
        .resolve_configuration(form.id, template, selector)
        .context("Failed to resolve configuration")?
    else {
        anyhow::bail!("No configuration for form {}", form.id);
    };

    let templates = TemplateRegistry::new();
    let prepared =
        DocumentAssembler::new().prepare(&ctx, &templates, &configuration, &form, &entry);

    if body_only {
        out.write_all(prepared.body.as_bytes())?;
    } else {
        let template = templates.get(&prepared.options.template);
        out.write_all(template.wrap(&prepared.body, &prepared.options).as_bytes())?;
    }
    Ok(())
}

/// Execute the view command
///
/// Denials and failures are reported with the message a visitor would see.
pub fn view_command(
    workspace: &Workspace,
    renderer: Arc<dyn PdfRenderer>,
    request: &DirectLinkRequest,
    requester: &Requester,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let ctx = workspace.context();
    let service = DirectLinkService::new(&ctx, PdfGenerator::new(renderer));
    let privileged = service.is_privileged(requester);

    let response = match service.serve(request, requester) {
        Ok(response) => response,
        Err(error) => anyhow::bail!("{}", error.user_message(privileged)),
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&response.filename));
    fs::write(&path, &response.bytes)
        .with_context(|| format!("Failed to write PDF: {}", path.display()))?;

    for (name, value) in &response.headers {
        writeln!(out, "{}: {}", name, value)?;
    }
    writeln!(out)?;
    writeln!(out, "Wrote {} ({} bytes)", path.display(), response.bytes.len())?;
    Ok(())
}

/// Execute the notify command
pub fn notify_command(
    workspace: &Workspace,
    renderer: Arc<dyn PdfRenderer>,
    entry: u64,
    notification: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let entry = workspace
        .store
        .entry(EntryId(entry))
        .context("Failed to load entry")?;
    let form = workspace
        .store
        .form(entry.form_id)
        .context("Failed to load form")?;
    let Some(notification) = form.notification(notification) else {
        anyhow::bail!("Form {} has no notification '{}'", form.id, notification);
    };

    let ctx = workspace.context();
    let attacher = NotificationAttacher::new(&ctx, PdfGenerator::new(renderer));
    let mut outgoing = OutgoingNotification::new(notification.clone());
    let report = attacher
        .attach(&mut outgoing, &form, &entry)
        .context("Failed to resolve configurations")?;

    write_report(&outgoing.notification.name, &report, format, out)
}

/// Execute the save command
pub fn save_command(
    workspace: &Workspace,
    renderer: Arc<dyn PdfRenderer>,
    entry: u64,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let entry = workspace
        .store
        .entry(EntryId(entry))
        .context("Failed to load entry")?;
    let form = workspace
        .store
        .form(entry.form_id)
        .context("Failed to load form")?;

    let ctx = workspace.context();
    let report = NotificationAttacher::new(&ctx, PdfGenerator::new(renderer))
        .on_submission(&form, &entry)
        .context("Failed to resolve configurations")?;

    write_report("save", &report, format, out)
}

fn write_report(
    label: &str,
    report: &AttachmentReport,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let failures: Vec<_> = report
                .failures
                .iter()
                .map(|f| json!({ "configuration": f.configuration.as_str(), "error": f.error.to_string() }))
                .collect();
            let value = json!({
                "label": label,
                "attachments": report.attachments,
                "failures": failures,
            });
            let text = serde_json::to_string_pretty(&value)
                .context("Failed to serialize report to JSON")?;
            writeln!(out, "{}", text)?;
        }
        OutputFormat::Text => {
            if report.attachments.is_empty() && report.failures.is_empty() {
                writeln!(out, "{}: no PDFs", label)?;
            }
            for path in &report.attachments {
                writeln!(out, "{}: {}", label, path.display())?;
            }
            for failure in &report.failures {
                writeln!(out, "{}: failed {}: {}", label, failure.configuration, failure.error)?;
            }
        }
    }
    Ok(())
}

fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path).with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => {
            let candidates = ["formpdf.toml", ".formpdf.toml"];
            for candidate in candidates {
                let path = Path::new(candidate);
                if path.exists() {
                    return Settings::load(path)
                        .with_context(|| format!("Failed to load config: {}", candidate));
                }
            }
            Ok(Settings::default())
        }
    }
}

fn unix_now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as Timestamp)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_resolve() {
        let args = vec!["formpdf", "resolve", "--form", "3", "--template", "rubix"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.store, PathBuf::from("store.json"));
        match cli.command {
            Commands::Resolve {
                form,
                template,
                selector,
                format,
            } => {
                assert_eq!(form, 3);
                assert_eq!(template.as_deref(), Some("rubix"));
                assert_eq!(selector, None);
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_cli_parse_global_store_after_subcommand() {
        let args = vec!["formpdf", "resolve", "--form", "1", "--store", "fixtures.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.store, PathBuf::from("fixtures.json"));
    }

    #[test]
    fn test_cli_parse_html_body_only() {
        let args = vec!["formpdf", "html", "--entry", "10", "--body-only"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Html {
                entry,
                body_only,
                output,
                ..
            } => {
                assert_eq!(entry, 10);
                assert!(body_only);
                assert!(output.is_none());
            }
            _ => panic!("Expected Html command"),
        }
    }

    #[test]
    fn test_cli_parse_view_batch() {
        let args = vec![
            "formpdf",
            "view",
            "10",
            "11",
            "--user",
            "7",
            "--capability",
            "gravityforms_view_entries",
            "--download",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::View {
                entries,
                user,
                capabilities,
                download,
                print,
                ip,
                ..
            } => {
                assert_eq!(entries, vec![10, 11]);
                assert_eq!(user, Some(7));
                assert_eq!(capabilities, vec!["gravityforms_view_entries"]);
                assert!(download);
                assert!(!print);
                assert_eq!(ip, "127.0.0.1");
            }
            _ => panic!("Expected View command"),
        }
    }

    #[test]
    fn test_cli_parse_view_requires_entries() {
        let args = vec!["formpdf", "view"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parse_notify_json() {
        let args = vec![
            "formpdf",
            "notify",
            "--entry",
            "5",
            "--notification",
            "Admin Notification",
            "--format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Notify {
                entry,
                notification,
                format,
            } => {
                assert_eq!(entry, 5);
                assert_eq!(notification, "Admin Notification");
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected Notify command"),
        }
    }

    #[test]
    fn test_cli_parse_save() {
        let args = vec!["formpdf", "save", "--entry", "5"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Commands::Save { entry: 5, .. }));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings(Some(Path::new("/nonexistent/formpdf.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_workspace_load_missing_store() {
        let result = Workspace::load(Path::new("/nonexistent/store.json"), None);
        assert!(result.is_err());
    }
}
