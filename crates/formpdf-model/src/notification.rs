//! Notification definitions

use serde::{Deserialize, Serialize};

/// Event name of notifications sent on form submission
pub const SUBMISSION_EVENT: &str = "form_submission";

/// A notification declared on a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier
    pub id: String,
    /// Display name, used by configurations to target the notification
    pub name: String,
    /// Event that fires the notification
    #[serde(default = "default_event")]
    pub event: String,
    /// Disabled notifications never fire
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_event() -> String {
    SUBMISSION_EVENT.to_string()
}

fn default_active() -> bool {
    true
}

impl Notification {
    /// Create an active submission notification
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            event: default_event(),
            active: true,
        }
    }

    /// Whether the notification is sent on form submission
    pub fn is_submission(&self) -> bool {
        self.event == SUBMISSION_EVENT
    }
}
