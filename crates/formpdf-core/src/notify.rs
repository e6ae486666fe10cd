//! Notification Attacher
//!
//! Generates the PDFs that belong to an outgoing notification, and the PDFs
//! persisted on submission. Configurations are handled in index order so
//! attachment lists are deterministic; a failing configuration is recorded
//! and the remaining ones are still attempted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use formpdf_model::{ConfigurationId, Entry, Form, Notification, NotificationTarget, PdfConfiguration};
use tracing::{debug, info, warn};

use crate::assembler::DocumentAssembler;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::invoker::PdfGenerator;
use crate::resolver::ConfigurationResolver;

/// Forces a configuration to qualify for a notification
pub type OverridePredicate =
    Arc<dyn Fn(&PdfConfiguration, &Notification, &Entry) -> bool + Send + Sync>;

/// A notification about to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingNotification {
    pub notification: Notification,
    pub attachments: Vec<PathBuf>,
}

impl OutgoingNotification {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            attachments: Vec::new(),
        }
    }
}

/// A configuration whose PDF could not be produced
#[derive(Debug)]
pub struct AttachmentFailure {
    pub configuration: ConfigurationId,
    pub error: Error,
}

/// Generated files and failures, both in configuration index order
#[derive(Debug, Default)]
pub struct AttachmentReport {
    pub attachments: Vec<PathBuf>,
    pub failures: Vec<AttachmentFailure>,
}

impl AttachmentReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Notifications a configuration targets, in the form's declared order
///
/// `true` targets every submission notification; names that are not real
/// notifications of the form are ignored.
pub fn target_notifications<'f>(
    configuration: &PdfConfiguration,
    form: &'f Form,
) -> Vec<&'f Notification> {
    match &configuration.notifications {
        NotificationTarget::None => Vec::new(),
        NotificationTarget::All => form.submission_notifications().collect(),
        NotificationTarget::One(key) => form.notification(key).into_iter().collect(),
        NotificationTarget::Many(keys) => form
            .notifications
            .iter()
            .filter(|n| keys.iter().any(|k| *k == n.name || *k == n.id))
            .collect(),
    }
}

fn same_notification(a: &Notification, b: &Notification) -> bool {
    a.id == b.id || a.name == b.name
}

/// Generates notification attachments and saved PDFs for one request
pub struct NotificationAttacher<'c, 'a> {
    ctx: &'c RequestContext<'a>,
    generator: PdfGenerator,
    assembler: DocumentAssembler,
    override_check: Option<OverridePredicate>,
}

impl<'c, 'a> NotificationAttacher<'c, 'a> {
    pub fn new(ctx: &'c RequestContext<'a>, generator: PdfGenerator) -> Self {
        Self {
            ctx,
            generator,
            assembler: DocumentAssembler::new(),
            override_check: None,
        }
    }

    pub fn with_assembler(mut self, assembler: DocumentAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Install a predicate that can force configurations to qualify
    pub fn with_override(mut self, predicate: OverridePredicate) -> Self {
        self.override_check = Some(predicate);
        self
    }

    /// Whether a configuration's PDF belongs to a notification
    pub fn qualifies(
        &self,
        configuration: &PdfConfiguration,
        notification: &Notification,
        form: &Form,
        entry: &Entry,
    ) -> bool {
        let targeted = target_notifications(configuration, form)
            .into_iter()
            .any(|n| same_notification(n, notification));
        targeted
            || self
                .override_check
                .as_ref()
                .is_some_and(|check| check(configuration, notification, entry))
    }

    /// Generate the PDFs to attach to a notification
    pub fn on_notification(
        &self,
        notification: &Notification,
        form: &Form,
        entry: &Entry,
    ) -> Result<AttachmentReport> {
        let configurations = ConfigurationResolver::new(self.ctx).applicable_configurations(entry)?;
        let qualifying: Vec<_> = configurations
            .iter()
            .filter(|c| self.qualifies(c, notification, form, entry))
            .collect();

        debug!(
            notification = %notification.name,
            entry_id = %entry.id,
            qualifying = qualifying.len(),
            "Resolved notification attachments"
        );

        let dir = self.output_dir(&self.ctx.settings().paths.temp_dir, form, entry);
        Ok(self.generate_all(&qualifying, form, entry, &dir))
    }

    /// Extend an outgoing notification's attachments
    pub fn attach(
        &self,
        outgoing: &mut OutgoingNotification,
        form: &Form,
        entry: &Entry,
    ) -> Result<AttachmentReport> {
        let report = self.on_notification(&outgoing.notification, form, entry)?;
        outgoing.attachments.extend(report.attachments.iter().cloned());
        Ok(report)
    }

    /// Generate and keep the PDFs of configurations with `save` enabled
    ///
    /// Runs whether or not any notification fires.
    pub fn on_submission(&self, form: &Form, entry: &Entry) -> Result<AttachmentReport> {
        let configurations = ConfigurationResolver::new(self.ctx).applicable_configurations(entry)?;
        let saved: Vec<_> = configurations.iter().filter(|c| c.save).collect();

        let dir = self.output_dir(&self.ctx.settings().paths.save_dir, form, entry);
        Ok(self.generate_all(&saved, form, entry, &dir))
    }

    fn output_dir(&self, base: &Path, form: &Form, entry: &Entry) -> PathBuf {
        base.join(form.id.to_string()).join(entry.id.to_string())
    }

    fn generate_all(
        &self,
        configurations: &[&PdfConfiguration],
        form: &Form,
        entry: &Entry,
        dir: &Path,
    ) -> AttachmentReport {
        let mut report = AttachmentReport::default();
        for configuration in configurations {
            match self.generate_one(configuration, form, entry, dir) {
                Ok(path) => report.attachments.push(path),
                Err(error) => {
                    warn!(
                        configuration = %configuration.id,
                        form_id = %form.id,
                        entry_id = %entry.id,
                        error = %error,
                        "Failed to generate PDF"
                    );
                    report.failures.push(AttachmentFailure {
                        configuration: configuration.id.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            form_id = %form.id,
            entry_id = %entry.id,
            generated = report.attachments.len(),
            failed = report.failures.len(),
            "Finished PDF generation"
        );
        report
    }

    fn generate_one(
        &self,
        configuration: &PdfConfiguration,
        form: &Form,
        entry: &Entry,
        dir: &Path,
    ) -> Result<PathBuf> {
        let prepared = self.assembler.prepare(
            self.ctx,
            self.generator.templates(),
            configuration,
            form,
            entry,
        );
        let dir = dir.join(configuration_dir(&configuration.id));
        self.generator
            .generate(&configuration.id, &prepared.body, &prepared.options, &dir)
    }
}

/// Directory name for a configuration's output, one per configuration
fn configuration_dir(id: &ConfigurationId) -> String {
    let name: String = id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    if name.is_empty() {
        "default".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Form {
        let mut form = Form::new(1, "Contact");
        form.notifications = vec![
            Notification::new("n1", "Admin Notification"),
            Notification::new("n2", "User Confirmation"),
            Notification {
                event: "payment_completed".to_string(),
                ..Notification::new("n3", "Receipt")
            },
        ];
        form
    }

    fn names(config: &PdfConfiguration, form: &Form) -> Vec<String> {
        target_notifications(config, form)
            .into_iter()
            .map(|n| n.name.clone())
            .collect()
    }

    #[test]
    fn test_target_sets() {
        let form = form();
        let mut config = PdfConfiguration::new("c", form.id);
        assert!(names(&config, &form).is_empty());

        config.notifications = NotificationTarget::All;
        assert_eq!(names(&config, &form), ["Admin Notification", "User Confirmation"]);

        config.notifications = NotificationTarget::One("Receipt".to_string());
        assert_eq!(names(&config, &form), ["Receipt"]);

        config.notifications = NotificationTarget::One("Missing".to_string());
        assert!(names(&config, &form).is_empty());

        config.notifications = NotificationTarget::Many(vec![
            "User Confirmation".to_string(),
            "Missing".to_string(),
            "n1".to_string(),
        ]);
        assert_eq!(names(&config, &form), ["Admin Notification", "User Confirmation"]);
    }

    #[test]
    fn test_configuration_dir_is_path_safe() {
        assert_eq!(configuration_dir(&ConfigurationId::new("5f1a_b-2")), "5f1a_b-2");
        assert_eq!(configuration_dir(&ConfigurationId::new("../etc")), "---etc");
        assert_eq!(configuration_dir(&ConfigurationId::new("")), "default");
    }
}
