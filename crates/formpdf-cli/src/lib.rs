//! formpdf CLI - Command-line interface library
//!
//! Drives the formpdf pipeline over a JSON fixture store:
//! - Resolve: show which configuration a request selects
//! - Html: print the assembled document
//! - View: serve a direct link and write the PDF
//! - Notify: generate the attachments of a notification
//! - Save: run the on-submission save path
//!
//! # Binary Usage
//!
//! ```bash
//! # Which configuration does form 1 use for the rubix template?
//! formpdf --store store.json resolve --form 1 --template rubix
//!
//! # Assembled HTML for entry 10
//! formpdf --store store.json html --entry 10
//!
//! # Direct link as an anonymous visitor
//! formpdf --store store.json view 10 --ip 10.0.0.1 --output entry.pdf
//! ```

pub mod app;

pub use app::{
    html_command, notify_command, resolve_command, run_cli, save_command, view_command,
    OutputFormat, Workspace,
};
