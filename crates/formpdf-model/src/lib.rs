//! formpdf-model - Form, entry and configuration records
//!
//! This crate provides the plain data types consumed by the formpdf
//! pipeline. Forms, entries and PDF configurations are owned by external
//! stores; the pipeline only reads them.

pub mod configuration;
pub mod entry;
pub mod field;
pub mod form;
pub mod logic;
pub mod notification;

pub use configuration::{
    AccessScope, ConfigurationId, NotificationTarget, Orientation, PdfConfiguration, PdfFormat,
    Privilege,
};
pub use entry::{Entry, EntryId, EntryStatus, FieldValue, ProductLine, ProductOption, Timestamp, UserId};
pub use field::{Choice, Field, FieldId, FieldKind, Input};
pub use form::{Form, FormId, Pagination};
pub use logic::{ConditionalLogic, LogicAction, LogicType, Rule, RuleOperator};
pub use notification::{Notification, SUBMISSION_EVENT};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
