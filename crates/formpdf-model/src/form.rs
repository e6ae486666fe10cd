//! Form definitions
//!
//! A form is the ordered list of fields an entry was submitted against,
//! together with its notifications and pagination metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldId, FieldKind};
use crate::notification::{Notification, SUBMISSION_EVENT};

/// Form identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub u64);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// Form identifier
    pub id: FormId,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Fields in declared order
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Declared notifications
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Page names for multi-page forms
    #[serde(default)]
    pub pagination: Option<Pagination>,
    /// ISO currency code used by product fields
    #[serde(default)]
    pub currency: Option<String>,
}

/// Page number to page name mapping
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Page names; index 0 holds the name of page 1
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Pagination {
    /// Name of a 1-based page, if one was given
    pub fn page_name(&self, page: u32) -> Option<&str> {
        let index = (page as usize).checked_sub(1)?;
        self.pages
            .get(index)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }
}

impl Form {
    /// Create an empty form
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: FormId(id),
            title: title.into(),
            fields: Vec::new(),
            notifications: Vec::new(),
            pagination: None,
            currency: None,
        }
    }

    /// Append a field
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Look up a field by id
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Name of a page, if the form is paginated
    pub fn page_name(&self, page: u32) -> Option<&str> {
        self.pagination.as_ref()?.page_name(page)
    }

    /// Notifications fired on form submission
    pub fn submission_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications
            .iter()
            .filter(|n| n.event == SUBMISSION_EVENT)
    }

    /// Find a declared notification by name or id
    pub fn notification(&self, key: &str) -> Option<&Notification> {
        self.notifications
            .iter()
            .find(|n| n.name == key || n.id == key)
    }

    /// Whether any field belongs to the product family
    pub fn has_product_fields(&self) -> bool {
        self.fields.iter().any(|f| f.kind.is_product_family())
    }

    /// Fields of one kind, in declared order
    pub fn fields_of_kind<'a>(&'a self, kind: &'a FieldKind) -> impl Iterator<Item = &'a Field> {
        self.fields.iter().filter(move |f| &f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_name_is_one_based() {
        let pagination = Pagination {
            pages: vec!["Contact".to_string(), "Payment".to_string()],
        };
        assert_eq!(pagination.page_name(1), Some("Contact"));
        assert_eq!(pagination.page_name(2), Some("Payment"));
        assert_eq!(pagination.page_name(0), None);
        assert_eq!(pagination.page_name(3), None);
    }

    #[test]
    fn test_blank_page_name_is_none() {
        let pagination = Pagination {
            pages: vec!["  ".to_string()],
        };
        assert_eq!(pagination.page_name(1), None);
    }

    #[test]
    fn test_submission_notifications() {
        let mut form = Form::new(1, "Contact");
        form.notifications.push(Notification::new("n1", "Admin Notification"));
        form.notifications.push(Notification {
            event: "payment_completed".to_string(),
            ..Notification::new("n2", "Receipt")
        });

        let names: Vec<_> = form.submission_notifications().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Admin Notification"]);
        assert!(form.notification("n2").is_some());
        assert!(form.notification("Receipt").is_some());
    }
}
