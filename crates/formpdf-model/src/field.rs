//! Field definitions
//!
//! Fields carry a type tag from a closed but extensible set. Unknown tags
//! survive deserialisation as [`FieldKind::Custom`] so callers can register
//! their own renderers for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::ConditionalLogic;

/// Field identifier, unique within a form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Website,
    Phone,
    Number,
    Hidden,
    Select,
    Radio,
    Checkbox,
    Multiselect,
    Name,
    Address,
    Date,
    Time,
    List,
    FileUpload,
    Html,
    Section,
    Page,
    Product,
    Quantity,
    Option,
    Shipping,
    Total,
    Captcha,
    Password,
    /// Any tag not known to this crate
    Custom(String),
}

impl FieldKind {
    /// The tag string for this kind
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Email => "email",
            FieldKind::Website => "website",
            FieldKind::Phone => "phone",
            FieldKind::Number => "number",
            FieldKind::Hidden => "hidden",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Multiselect => "multiselect",
            FieldKind::Name => "name",
            FieldKind::Address => "address",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::List => "list",
            FieldKind::FileUpload => "fileupload",
            FieldKind::Html => "html",
            FieldKind::Section => "section",
            FieldKind::Page => "page",
            FieldKind::Product => "product",
            FieldKind::Quantity => "quantity",
            FieldKind::Option => "option",
            FieldKind::Shipping => "shipping",
            FieldKind::Total => "total",
            FieldKind::Captcha => "captcha",
            FieldKind::Password => "password",
            FieldKind::Custom(tag) => tag,
        }
    }

    /// Product, quantity, option, shipping and total fields
    pub fn is_product_family(&self) -> bool {
        matches!(
            self,
            FieldKind::Product
                | FieldKind::Quantity
                | FieldKind::Option
                | FieldKind::Shipping
                | FieldKind::Total
        )
    }

    /// Kinds that never produce output
    pub fn is_never_rendered(&self) -> bool {
        matches!(self, FieldKind::Captcha | FieldKind::Password | FieldKind::Page)
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "email" => FieldKind::Email,
            "website" => FieldKind::Website,
            "phone" => FieldKind::Phone,
            "number" => FieldKind::Number,
            "hidden" => FieldKind::Hidden,
            "select" => FieldKind::Select,
            "radio" => FieldKind::Radio,
            "checkbox" => FieldKind::Checkbox,
            "multiselect" => FieldKind::Multiselect,
            "name" => FieldKind::Name,
            "address" => FieldKind::Address,
            "date" => FieldKind::Date,
            "time" => FieldKind::Time,
            "list" => FieldKind::List,
            "fileupload" => FieldKind::FileUpload,
            "html" => FieldKind::Html,
            "section" => FieldKind::Section,
            "page" => FieldKind::Page,
            "product" => FieldKind::Product,
            "quantity" => FieldKind::Quantity,
            "option" => FieldKind::Option,
            "shipping" => FieldKind::Shipping,
            "total" => FieldKind::Total,
            "captcha" => FieldKind::Captcha,
            "password" => FieldKind::Password,
            other => FieldKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from(tag.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable choice (select, radio, checkbox, option)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Display text
    pub text: String,
    /// Stored value
    pub value: String,
}

/// A sub-input of a compound field (name, address)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Sub-input key, e.g. "3" for the first name of a name field
    pub id: String,
    /// Label of the sub-input
    pub label: String,
}

/// A field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field identifier
    pub id: FieldId,
    /// Type tag
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Field label
    #[serde(default)]
    pub label: String,
    /// Descriptive text (used by section fields)
    #[serde(default)]
    pub description: String,
    /// Static content of html fields
    #[serde(default)]
    pub content: String,
    /// 1-based page the field lives on
    #[serde(default = "default_page")]
    pub page: u32,
    /// Space separated CSS classes
    #[serde(default)]
    pub css_class: String,
    /// Field is only visible to administrators
    #[serde(default)]
    pub admin_only: bool,
    /// Choices for choice-based fields
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Sub-inputs for compound fields
    #[serde(default)]
    pub inputs: Vec<Input>,
    /// Column headings for list fields
    #[serde(default)]
    pub columns: Vec<String>,
    /// Field-level visibility logic
    #[serde(default)]
    pub conditional_logic: Option<ConditionalLogic>,
}

fn default_page() -> u32 {
    1
}

impl Field {
    /// Create a field of the given kind on page 1
    pub fn new(id: u32, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: FieldId(id),
            kind,
            label: label.into(),
            description: String::new(),
            content: String::new(),
            page: 1,
            css_class: String::new(),
            admin_only: false,
            choices: Vec::new(),
            inputs: Vec::new(),
            columns: Vec::new(),
            conditional_logic: None,
        }
    }

    /// Set the CSS class string
    pub fn with_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = css_class.into();
        self
    }

    /// Set the page number
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Iterate over the individual CSS classes
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.css_class.split_whitespace()
    }

    /// Whether the field carries a given CSS class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Display text for a stored choice value
    pub fn choice_text<'a>(&'a self, value: &'a str) -> &'a str {
        self.choices
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.text.as_str())
            .unwrap_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_known_and_custom_tags() {
        assert_eq!(FieldKind::from("product"), FieldKind::Product);
        assert_eq!(
            FieldKind::from("signature"),
            FieldKind::Custom("signature".to_string())
        );
        assert_eq!(String::from(FieldKind::FileUpload), "fileupload");
    }

    #[test]
    fn test_field_deserialises_type_tag() {
        let json = r#"{"id": 4, "type": "likert", "label": "Rate us"}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.kind, FieldKind::Custom("likert".to_string()));
        assert_eq!(field.page, 1);
    }

    #[test]
    fn test_product_family() {
        assert!(FieldKind::Shipping.is_product_family());
        assert!(!FieldKind::Number.is_product_family());
        assert!(FieldKind::Captcha.is_never_rendered());
    }

    #[test]
    fn test_classes() {
        let field = Field::new(1, FieldKind::Text, "Name").with_class("gf_left_half  exclude");
        assert!(field.has_class("exclude"));
        assert!(field.has_class("gf_left_half"));
        assert!(!field.has_class("gf_right_half"));
    }

    #[test]
    fn test_choice_text_falls_back_to_value() {
        let mut field = Field::new(2, FieldKind::Select, "Colour");
        field.choices.push(Choice {
            text: "Bright Red".to_string(),
            value: "red".to_string(),
        });
        assert_eq!(field.choice_text("red"), "Bright Red");
        assert_eq!(field.choice_text("blue"), "blue");
    }
}
