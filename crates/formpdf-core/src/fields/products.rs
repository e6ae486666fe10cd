//! Product fields
//!
//! Product values are normally gathered into one summary table appended
//! after the other fields. [`ProductRenderer`] handles the individual
//! display when a configuration asks for it.

use formpdf_model::{Entry, Field, FieldKind, FieldValue, Form, ProductLine};

use super::{wrap_standard, FieldType};
use crate::error::FieldError;
use crate::html;
use crate::render::RenderContext;

/// Format an amount in a currency
///
/// Known codes use their symbol; others are written as a prefix.
pub fn format_money(amount: f64, currency: &str) -> String {
    let symbol = match currency.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" | "NZD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{} ", other),
    };
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_thousands(amount.abs()))
}

fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}.{}", grouped, cents)
}

/// Individual display of product-family fields
#[derive(Debug, Default)]
pub struct ProductRenderer;

impl FieldType for ProductRenderer {
    fn render(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        ctx: &RenderContext<'_>,
    ) -> Result<String, FieldError> {
        let currency = ctx.currency();
        let inner = match (value, &field.kind) {
            (Some(FieldValue::Product(line)), _) => product_line_html(line, currency),
            (Some(FieldValue::Number(n)), FieldKind::Quantity) => html::escape(&n.to_string()),
            (Some(FieldValue::Number(n)), _) => html::escape(&format_money(*n, currency)),
            (Some(FieldValue::Text(s)), _) => html::escape(s),
            (None, _) => String::new(),
            (Some(_), kind) => {
                return Err(FieldError::ValueShape {
                    field: field.id,
                    kind: kind.to_string(),
                })
            }
        };
        Ok(wrap_standard(field, &inner))
    }
}

fn product_line_html(line: &ProductLine, currency: &str) -> String {
    let mut out = format!(
        "<div class=\"product_name\">{}</div>",
        html::escape(&line.name)
    );
    if !line.options.is_empty() {
        out.push_str("<ul class=\"product_options\">");
        for option in &line.options {
            out.push_str(&format!(
                "<li>{} {}</li>",
                html::escape(&option.name),
                html::escape(&format_money(option.price, currency))
            ));
        }
        out.push_str("</ul>");
    }
    out.push_str(&format!(
        "<div class=\"product_quantity\">Qty: {}</div><div class=\"product_price\">{}</div>",
        html::escape(&line.quantity.to_string()),
        html::escape(&format_money(line.subtotal(), currency))
    ));
    out
}

fn shipping_amount(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Product(line) => Some(line.subtotal()),
        FieldValue::Text(s) => s.replace([',', ' '], "").parse().ok(),
        _ => None,
    }
}

/// Build the aggregated product summary table
///
/// Returns `None` when the entry has no purchased product.
pub fn product_table(form: &Form, entry: &Entry, currency: &str) -> Option<String> {
    let lines: Vec<&ProductLine> = form
        .fields_of_kind(&FieldKind::Product)
        .filter_map(|f| match entry.value(f.id) {
            Some(value @ FieldValue::Product(line)) if !value.is_empty() => Some(line),
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        return None;
    }

    let shipping: f64 = form
        .fields_of_kind(&FieldKind::Shipping)
        .filter_map(|f| entry.value(f.id))
        .filter_map(shipping_amount)
        .sum();
    let subtotal: f64 = lines.iter().map(|l| l.subtotal()).sum();

    let mut out = String::new();
    out.push_str("<div class=\"row-separator products-title-container\">\n");
    out.push_str("<h3 class=\"product-field-title gfpdf-field\">Order</h3>\n");
    out.push_str("</div>\n");
    out.push_str("<div class=\"row-separator products-container\">\n");
    out.push_str("<div class=\"gfpdf-field gfpdf-products\">\n");
    out.push_str("<table class=\"entry-products\" autosize=\"1\">\n");
    out.push_str(
        "<thead><tr><th class=\"entry-products-col1\">Product</th>\
         <th class=\"textcenter entry-products-col2\">Qty</th>\
         <th class=\"entry-products-col3\">Unit Price</th>\
         <th class=\"entry-products-col4\">Price</th></tr></thead>\n",
    );
    out.push_str("<tbody>\n");
    for line in &lines {
        out.push_str("<tr><td>");
        out.push_str(&html::escape(&line.name));
        if !line.options.is_empty() {
            out.push_str("<ul class=\"product_options\">");
            for option in &line.options {
                out.push_str(&format!("<li>{}</li>", html::escape(&option.name)));
            }
            out.push_str("</ul>");
        }
        out.push_str(&format!(
            "</td><td class=\"textcenter\">{}</td><td>{}</td><td>{}</td></tr>\n",
            html::escape(&line.quantity.to_string()),
            html::escape(&format_money(line.unit_price(), currency)),
            html::escape(&format_money(line.subtotal(), currency)),
        ));
    }
    out.push_str("</tbody>\n<tfoot>\n");
    let totals = [
        ("subtotal", "Subtotal", subtotal),
        ("shipping", "Shipping", shipping),
        ("total", "Total", subtotal + shipping),
    ];
    for (class, label, amount) in totals {
        out.push_str(&format!(
            "<tr><td colspan=\"2\" class=\"emptycell\"></td>\
             <td class=\"{0} totals\">{1}</td><td class=\"{0}_price totals\">{2}</td></tr>\n",
            class,
            label,
            html::escape(&format_money(amount, currency))
        ));
    }
    out.push_str("</tfoot>\n</table>\n</div>\n</div>\n");
    Some(out)
}
