//! Entry (form submission) records

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldId;
use crate::form::FormId;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Trash,
    Spam,
}

/// One form submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry identifier
    pub id: EntryId,
    /// Owning form
    pub form_id: FormId,
    /// Submitting user, if logged in at submission time
    #[serde(default)]
    pub created_by: Option<UserId>,
    /// Submission IP address
    #[serde(default)]
    pub ip: String,
    /// Entry status
    #[serde(default)]
    pub status: EntryStatus,
    /// Creation time
    #[serde(default)]
    pub date_created: Timestamp,
    /// Submitted values keyed by field
    #[serde(default)]
    pub values: BTreeMap<FieldId, FieldValue>,
}

impl Entry {
    /// Create an active entry with no values
    pub fn new(id: u64, form_id: FormId) -> Self {
        Self {
            id: EntryId(id),
            form_id,
            created_by: None,
            ip: String::new(),
            status: EntryStatus::Active,
            date_created: 0,
            values: BTreeMap::new(),
        }
    }

    /// Set a field value
    pub fn set(&mut self, field: u32, value: FieldValue) {
        self.values.insert(FieldId(field), value);
    }

    /// Value submitted for a field
    pub fn value(&self, field: FieldId) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Whether the field has a non-empty value
    pub fn has_value(&self, field: FieldId) -> bool {
        self.value(field).is_some_and(|v| !v.is_empty())
    }

    /// Whether the entry is active (not trashed or spam)
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }
}

/// A submitted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Single text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Multiple selected values (checkbox, multiselect)
    List(Vec<String>),
    /// Keyed sub-values (name, address)
    Compound(BTreeMap<String, String>),
    /// Tabular rows (list field)
    Rows(Vec<Vec<String>>),
    /// A purchased product line
    Product(ProductLine),
}

impl FieldValue {
    /// Convenience constructor for text values
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the value carries no user data
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            FieldValue::Compound(parts) => parts.values().all(|s| s.trim().is_empty()),
            FieldValue::Rows(rows) => rows.iter().flatten().all(|s| s.trim().is_empty()),
            FieldValue::Product(line) => line.quantity <= 0.0 || line.name.trim().is_empty(),
        }
    }

    /// Plain-text rendering used for comparisons and merge tags
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::List(items) => items
                .iter()
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Compound(parts) => parts
                .values()
                .filter(|s| !s.trim().is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            FieldValue::Rows(rows) => rows
                .iter()
                .map(|r| r.join(", "))
                .collect::<Vec<_>>()
                .join("; "),
            FieldValue::Product(line) => line.name.clone(),
        }
    }
}

/// Format a number without a trailing ".0" for integral values
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A purchased product with its selected options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    /// Product name
    pub name: String,
    /// Unit price before options
    #[serde(default)]
    pub price: f64,
    /// Quantity ordered
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Selected options
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

fn default_quantity() -> f64 {
    1.0
}

/// A selected product option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option label
    pub name: String,
    /// Price added to the unit price
    #[serde(default)]
    pub price: f64,
}

impl ProductLine {
    /// Unit price including options
    pub fn unit_price(&self) -> f64 {
        self.price + self.options.iter().map(|o| o.price).sum::<f64>()
    }

    /// Line total
    pub fn subtotal(&self) -> f64 {
        self.unit_price() * self.quantity
    }
}
