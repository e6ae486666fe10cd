//! formpdf-core - Form entry to PDF pipeline
//!
//! Resolves which PDF configuration applies to a request, decides who may
//! open an entry's PDF, assembles the HTML body field by field and hands
//! it to an external HTML to PDF renderer.
//!
//! # Example
//!
//! ```
//! use formpdf_core::{DocumentAssembler, RenderContext, RenderFlags};
//! use formpdf_model::{Entry, Field, FieldKind, FieldValue, Form, FormId, PdfConfiguration};
//!
//! let mut form = Form::new(1, "Contact");
//! form.push_field(Field::new(1, FieldKind::Text, "Name"));
//!
//! let mut entry = Entry::new(7, FormId(1));
//! entry.set(1, FieldValue::text("Jane"));
//!
//! let config = PdfConfiguration::new("main", FormId(1));
//! let flags = RenderFlags::default();
//! let ctx = RenderContext::new(&form, &entry, &config, &flags);
//!
//! let html = DocumentAssembler::new().assemble(&ctx);
//! assert!(html.contains("<strong>Name</strong>"));
//! assert!(html.contains("Jane"));
//! ```

pub mod access;
pub mod assembler;
pub mod conditional;
pub mod context;
pub mod direct_link;
pub mod error;
pub mod fields;
pub mod filename;
pub mod html;
pub mod invoker;
pub mod layout;
pub mod middleware;
pub mod notify;
pub mod options;
pub mod render;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod template;

pub use access::{AccessAuthenticator, AccessDecision, AuthorizedBatch, DenyReason, Requester, User};
pub use assembler::{DocumentAssembler, PreparedDocument};
pub use context::{ConfigurationIndex, RequestContext};
pub use direct_link::{DirectLinkRequest, DirectLinkService, OutputMode, PdfResponse};
pub use error::{DirectLinkError, Error, FieldError, RendererError, Result};
pub use fields::{FieldRegistry, FieldRenderer, FieldType, RenderOutcome, SkipReason};
pub use invoker::{PdfGenerator, PdfRenderer};
pub use layout::{LayoutContainer, LayoutKind};
pub use middleware::{Middleware, MiddlewareChain, PredicateMiddleware};
pub use notify::{AttachmentReport, NotificationAttacher, OutgoingNotification, OverridePredicate};
pub use options::{resolve_document_options, resolve_render_flags, DocumentOptions, OptionResolver};
pub use render::{RenderContext, RenderFlags};
pub use resolver::ConfigurationResolver;
pub use settings::Settings;
pub use store::{EntryFilter, FormStore, MemoryStore, OptionsStore};
pub use template::{Template, TemplateRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
