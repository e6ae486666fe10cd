//! Built-in renderers for non-product fields

use formpdf_model::{Field, FieldKind, FieldValue};

use super::{wrap_standard, FieldType};
use crate::error::FieldError;
use crate::html;
use crate::render::RenderContext;

fn shape_error(field: &Field) -> FieldError {
    FieldError::ValueShape {
        field: field.id,
        kind: field.kind.to_string(),
    }
}

fn text_of(value: Option<&FieldValue>) -> String {
    value.map(|v| v.display_text()).unwrap_or_default()
}

/// Plain single-line values; also the fallback for unknown kinds
#[derive(Debug, Default)]
pub struct TextRenderer;

impl FieldType for TextRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        Ok(wrap_standard(field, &html::escape(&text_of(value))))
    }
}

/// Multi-line text
#[derive(Debug, Default)]
pub struct TextareaRenderer;

impl FieldType for TextareaRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        Ok(wrap_standard(field, &html::escape_multiline(&text_of(value))))
    }
}

#[derive(Debug, Default)]
pub struct EmailRenderer;

impl FieldType for EmailRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let email = text_of(value);
        if email.trim().is_empty() {
            return Ok(wrap_standard(field, ""));
        }
        let escaped = html::escape(email.trim());
        Ok(wrap_standard(
            field,
            &format!("<a href=\"mailto:{0}\">{0}</a>", escaped),
        ))
    }
}

#[derive(Debug, Default)]
pub struct WebsiteRenderer;

impl FieldType for WebsiteRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let url = text_of(value);
        let url = url.trim();
        // Only link http(s) targets
        if url.starts_with("http://") || url.starts_with("https://") {
            let escaped = html::escape(url);
            Ok(wrap_standard(
                field,
                &format!("<a href=\"{0}\" target=\"_blank\">{0}</a>", escaped),
            ))
        } else {
            Ok(wrap_standard(field, &html::escape(url)))
        }
    }
}

/// Select and radio fields: show the choice text, not the stored value
#[derive(Debug, Default)]
pub struct ChoiceRenderer;

impl FieldType for ChoiceRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let stored = text_of(value);
        Ok(wrap_standard(field, &html::escape(field.choice_text(&stored))))
    }
}

/// Checkbox and multiselect fields as a bulleted list
#[derive(Debug, Default)]
pub struct MultiChoiceRenderer;

impl FieldType for MultiChoiceRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let items: Vec<String> = match value {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) => vec![s.clone()],
            Some(_) => return Err(shape_error(field)),
            None => Vec::new(),
        };

        let mut list = String::from("<ul class=\"bulleted\">");
        for item in items.iter().filter(|s| !s.trim().is_empty()) {
            list.push_str(&format!("<li>{}</li>", html::escape(field.choice_text(item))));
        }
        list.push_str("</ul>");
        Ok(wrap_standard(field, &list))
    }
}

/// Name and address fields
///
/// Names join their parts with spaces; addresses put each part on a line.
/// Parts follow the field's declared input order when it has one.
#[derive(Debug, Default)]
pub struct CompoundRenderer;

impl FieldType for CompoundRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let parts: Vec<String> = match value {
            Some(FieldValue::Compound(parts)) if field.inputs.is_empty() => {
                parts.values().cloned().collect()
            }
            Some(FieldValue::Compound(parts)) => field
                .inputs
                .iter()
                .filter_map(|input| parts.get(&input.id).cloned())
                .collect(),
            Some(FieldValue::Text(s)) => vec![s.clone()],
            Some(_) => return Err(shape_error(field)),
            None => Vec::new(),
        };

        let parts: Vec<String> = parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(html::escape)
            .collect();

        let separator = if field.kind == FieldKind::Address {
            "<br />\n"
        } else {
            " "
        };
        Ok(wrap_standard(field, &parts.join(separator)))
    }
}

/// List fields as a table
#[derive(Debug, Default)]
pub struct ListRenderer;

impl FieldType for ListRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let rows = match value {
            Some(FieldValue::Rows(rows)) => rows.as_slice(),
            None => &[],
            Some(_) => return Err(shape_error(field)),
        };

        let mut table = String::from("<table class=\"gfield_list\" autosize=\"1\">");
        if !field.columns.is_empty() {
            table.push_str("<thead><tr>");
            for column in &field.columns {
                table.push_str(&format!("<th>{}</th>", html::escape(column)));
            }
            table.push_str("</tr></thead>");
        }
        table.push_str("<tbody>");
        for row in rows {
            table.push_str("<tr>");
            for cell in row {
                table.push_str(&format!("<td>{}</td>", html::escape(cell)));
            }
            table.push_str("</tr>");
        }
        table.push_str("</tbody></table>");
        Ok(wrap_standard(field, &table))
    }
}

/// File uploads as a list of links
#[derive(Debug, Default)]
pub struct FileUploadRenderer;

impl FieldType for FileUploadRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let files: Vec<String> = match value {
            Some(FieldValue::List(files)) => files.clone(),
            Some(FieldValue::Text(file)) => vec![file.clone()],
            Some(_) => return Err(shape_error(field)),
            None => Vec::new(),
        };

        let mut list = String::from("<ul class=\"bulleted\">");
        for file in files.iter().filter(|f| !f.trim().is_empty()) {
            let name = file.rsplit('/').next().unwrap_or(file);
            list.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                html::escape(file),
                html::escape(name)
            ));
        }
        list.push_str("</ul>");
        Ok(wrap_standard(field, &list))
    }
}

/// Html fields: static markup written as-is
#[derive(Debug, Default)]
pub struct HtmlRenderer;

impl FieldType for HtmlRenderer {
    fn render(
        &self,
        field: &Field,
        _value: Option<&FieldValue>,
        _ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let class = html::classes(&["gfpdf-html", "gfpdf-field", &field.css_class]);
        Ok(format!(
            "<div id=\"field-{}\" class=\"{}\">\n<div class=\"inner-container\">{}</div>\n</div>\n",
            field.id,
            html::escape(&class),
            field.content
        ))
    }

    fn is_static(&self) -> bool {
        true
    }
}

/// Section breaks: a heading and an optional description
#[derive(Debug, Default)]
pub struct SectionRenderer;

impl FieldType for SectionRenderer {
    fn render(
        &self,
        field: &Field,
        _value: Option<&FieldValue>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let class = html::classes(&["gfpdf-section-title", "gfpdf-field", &field.css_class]);
        let mut out = format!(
            "<div id=\"field-{}\" class=\"{}\">\n<h3>{}</h3>\n",
            field.id,
            html::escape(&class),
            html::escape(&field.label)
        );
        if ctx.flags.show_section_description && !field.description.trim().is_empty() {
            out.push_str(&format!(
                "<div class=\"gfpdf-section-description\">{}</div>\n",
                html::escape_multiline(&field.description)
            ));
        }
        out.push_str("</div>\n");
        Ok(out)
    }

    fn is_static(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderFlags;
    use formpdf_model::{Choice, Entry, Form, FormId, Input, PdfConfiguration};
    use std::collections::BTreeMap;

    fn render_with(
        renderer: &dyn FieldType,
        field: &Field,
        value: Option<FieldValue>,
        flags: &RenderFlags,
    ) -> Result<String, FieldError> {
        let form = Form::new(1, "Test");
        let entry = Entry::new(1, FormId(1));
        let config = PdfConfiguration::new("c", FormId(1));
        let ctx = RenderContext::new(&form, &entry, &config, flags);
        renderer.render(field, value.as_ref(), &ctx)
    }

    fn render(renderer: &dyn FieldType, field: &Field, value: Option<FieldValue>) -> String {
        render_with(renderer, field, value, &RenderFlags::default()).unwrap()
    }

    #[test]
    fn test_textarea_keeps_line_breaks() {
        let field = Field::new(1, FieldKind::Textarea, "Message");
        let html = render(&TextareaRenderer, &field, Some(FieldValue::text("one\ntwo")));
        assert!(html.contains("one<br />\ntwo"));
    }

    #[test]
    fn test_email_and_website_links() {
        let field = Field::new(1, FieldKind::Email, "Email");
        let html = render(&EmailRenderer, &field, Some(FieldValue::text("jane@example.com")));
        assert!(html.contains("<a href=\"mailto:jane@example.com\">jane@example.com</a>"));

        let field = Field::new(2, FieldKind::Website, "Site");
        let html = render(&WebsiteRenderer, &field, Some(FieldValue::text("https://example.com")));
        assert!(html.contains("href=\"https://example.com\""));

        let html = render(&WebsiteRenderer, &field, Some(FieldValue::text("javascript:alert(1)")));
        assert!(!html.contains("href"));
    }

    #[test]
    fn test_choice_text() {
        let mut field = Field::new(1, FieldKind::Checkbox, "Colours");
        field.choices = vec![
            Choice {
                text: "Red".to_string(),
                value: "r".to_string(),
            },
            Choice {
                text: "Blue".to_string(),
                value: "b".to_string(),
            },
        ];

        let html = render(
            &MultiChoiceRenderer,
            &field,
            Some(FieldValue::List(vec!["r".to_string(), "b".to_string()])),
        );
        assert!(html.contains("<ul class=\"bulleted\"><li>Red</li><li>Blue</li></ul>"));

        field.kind = FieldKind::Select;
        let html = render(&ChoiceRenderer, &field, Some(FieldValue::text("b")));
        assert!(html.contains("<div class=\"value\">Blue</div>"));
    }

    #[test]
    fn test_compound_follows_input_order() {
        let mut field = Field::new(1, FieldKind::Name, "Name");
        field.inputs = vec![
            Input {
                id: "3".to_string(),
                label: "First".to_string(),
            },
            Input {
                id: "6".to_string(),
                label: "Last".to_string(),
            },
        ];
        let mut parts = BTreeMap::new();
        parts.insert("6".to_string(), "Doe".to_string());
        parts.insert("3".to_string(), "Jane".to_string());

        let html = render(&CompoundRenderer, &field, Some(FieldValue::Compound(parts.clone())));
        assert!(html.contains("<div class=\"value\">Jane Doe</div>"));

        field.kind = FieldKind::Address;
        let html = render(&CompoundRenderer, &field, Some(FieldValue::Compound(parts)));
        assert!(html.contains("Jane<br />\nDoe"));
    }

    #[test]
    fn test_list_table() {
        let mut field = Field::new(1, FieldKind::List, "Guests");
        field.columns = vec!["Name".to_string(), "Age".to_string()];
        let rows = vec![vec!["Ann".to_string(), "30".to_string()]];

        let html = render(&ListRenderer, &field, Some(FieldValue::Rows(rows)));
        assert!(html.contains("<th>Name</th><th>Age</th>"));
        assert!(html.contains("<td>Ann</td><td>30</td>"));
    }

    #[test]
    fn test_list_rejects_other_shapes() {
        let field = Field::new(1, FieldKind::List, "Guests");
        let result = render_with(
            &ListRenderer,
            &field,
            Some(FieldValue::Number(1.0)),
            &RenderFlags::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_file_upload_links() {
        let field = Field::new(1, FieldKind::FileUpload, "Files");
        let html = render(
            &FileUploadRenderer,
            &field,
            Some(FieldValue::List(vec!["https://x.test/up/cv.pdf".to_string()])),
        );
        assert!(html.contains("<a href=\"https://x.test/up/cv.pdf\">cv.pdf</a>"));
    }

    #[test]
    fn test_html_is_not_escaped() {
        let mut field = Field::new(1, FieldKind::Html, "Notice");
        field.content = "<p>Terms</p>".to_string();
        let html = render(&HtmlRenderer, &field, None);
        assert!(html.contains("<p>Terms</p>"));
        assert!(HtmlRenderer.is_static());
    }

    #[test]
    fn test_section_description_flag() {
        let field = Field::new(1, FieldKind::Section, "Details").with_description("About you");

        let html = render(&SectionRenderer, &field, None);
        assert!(html.contains("<h3>Details</h3>"));
        assert!(!html.contains("About you"));

        let flags = RenderFlags {
            show_section_description: true,
            ..Default::default()
        };
        let html = render_with(&SectionRenderer, &field, None, &flags).unwrap();
        assert!(html.contains("<div class=\"gfpdf-section-description\">About you</div>"));
    }
}
