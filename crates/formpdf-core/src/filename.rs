//! PDF filenames
//!
//! A configuration's filename may contain merge tags:
//!
//! | Tag | Value |
//! |-----|-------|
//! | `{form_id}` | form id |
//! | `{entry_id}` | entry id |
//! | `{form_title}` | form title |
//! | `{date_created}` | entry creation time, unix seconds |
//! | `{Label:ID}` | the entry's value for field `ID` |
//!
//! Unknown tags expand to nothing. The result never contains path
//! separators or characters rejected by common filesystems.

use std::sync::OnceLock;

use formpdf_model::{Entry, FieldId, Form};
use regex::{Captures, Regex};

const RESERVED: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Filename used when a configuration does not set one
pub fn default_filename(form: &Form, entry: &Entry) -> String {
    format!("form-{}-entry-{}", form.id, entry.id)
}

/// Expand merge tags and sanitise a filename, without the `.pdf` suffix
pub fn build_filename(pattern: Option<&str>, form: &Form, entry: &Entry) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"\{([^{}:]*)(?::(\d+))?\}").unwrap());

    let pattern = match pattern.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return default_filename(form, entry),
    };

    let expanded = re.replace_all(pattern, |caps: &Captures<'_>| {
        if let Some(id) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()) {
            return entry
                .value(FieldId(id))
                .map(|v| v.display_text())
                .unwrap_or_default();
        }
        match &caps[1] {
            "form_id" => form.id.to_string(),
            "entry_id" => entry.id.to_string(),
            "form_title" => form.title.clone(),
            "date_created" => entry.date_created.to_string(),
            _ => String::new(),
        }
    });

    let sanitised = sanitise(strip_pdf_suffix(&expanded));
    if sanitised.is_empty() {
        default_filename(form, entry)
    } else {
        sanitised
    }
}

fn strip_pdf_suffix(name: &str) -> &str {
    let trimmed = name.trim();
    let len = trimmed.len();
    if len >= 4 && trimmed.is_char_boundary(len - 4) && trimmed[len - 4..].eq_ignore_ascii_case(".pdf") {
        &trimmed[..len - 4]
    } else {
        trimmed
    }
}

fn sanitise(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
