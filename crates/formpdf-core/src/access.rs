//! Access Authenticator
//!
//! Decides whether a requester may open an entry's PDF through a direct
//! link. Rules are evaluated in order:
//!
//! 1. a configuration with `access = "all"` allows everyone
//! 2. anonymous requesters need a matching submission IP within the
//!    logged-out window
//! 3. authenticated requesters without a view capability need to own the
//!    entry, or pass the anonymous check as the original submitter
//! 4. capability holders are always allowed
//!
//! `restrict_owner` disables both fallbacks in 2 and 3.

use formpdf_model::{AccessScope, EntryId, FormId, PdfConfiguration, Timestamp, UserId};
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::error::{DirectLinkError, Result};
use crate::store::EntryFilter;

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub capabilities: Vec<String>,
}

/// Whoever is asking for a PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// `None` for anonymous visitors
    pub user: Option<User>,
    pub ip: String,
    /// Current time, unix seconds
    pub now: Timestamp,
}

impl Requester {
    pub fn anonymous(ip: impl Into<String>, now: Timestamp) -> Self {
        Self {
            user: None,
            ip: ip.into(),
            now,
        }
    }

    pub fn user(
        id: UserId,
        capabilities: impl IntoIterator<Item = impl Into<String>>,
        ip: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            user: Some(User {
                id,
                capabilities: capabilities.into_iter().map(Into::into).collect(),
            }),
            ip: ip.into(),
            now,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user.is_none()
    }
}

/// Why access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Send the requester to the login challenge
    LoginRequired,
    /// Authenticated but not allowed
    Forbidden,
    /// The anonymous viewing window has passed
    Expired,
}

/// Outcome for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self == AccessDecision::Allow
    }
}

/// Entries of a batch that passed authorisation, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedBatch {
    pub entries: Vec<EntryId>,
    pub denied: Vec<(EntryId, DenyReason)>,
}

/// Direct-link authorisation against the request's stores and settings
pub struct AccessAuthenticator<'c, 'a> {
    ctx: &'c RequestContext<'a>,
}

impl<'c, 'a> AccessAuthenticator<'c, 'a> {
    pub fn new(ctx: &'c RequestContext<'a>) -> Self {
        Self { ctx }
    }

    /// Whether a requester holds any capability that grants full access
    pub fn is_privileged(&self, requester: &Requester) -> bool {
        let admin = &self.ctx.settings().security.admin_capabilities;
        requester
            .user
            .as_ref()
            .is_some_and(|u| u.capabilities.iter().any(|c| admin.contains(c)))
    }

    /// Decide access to one entry
    pub fn authorize(
        &self,
        entry_id: EntryId,
        form_id: FormId,
        configuration: &PdfConfiguration,
        requester: &Requester,
    ) -> Result<AccessDecision> {
        if configuration.access == AccessScope::All {
            debug!(
                entry_id = %entry_id,
                configuration = %configuration.id,
                "Public access enabled for configuration"
            );
            return Ok(AccessDecision::Allow);
        }

        let restrict_owner = configuration
            .restrict_owner
            .unwrap_or(self.ctx.settings().security.default_restrict_owner);

        let decision = match requester.user {
            None if restrict_owner => AccessDecision::Deny(DenyReason::LoginRequired),
            None => self.submitter_check(entry_id, form_id, requester)?,
            Some(_) if self.is_privileged(requester) => AccessDecision::Allow,
            Some(_) if restrict_owner => AccessDecision::Deny(DenyReason::Forbidden),
            Some(ref user) => {
                if self.owns(entry_id, form_id, user.id)? {
                    AccessDecision::Allow
                } else if self.submitter_check(entry_id, form_id, requester)?.is_allowed() {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Deny(DenyReason::Forbidden)
                }
            }
        };

        if let AccessDecision::Deny(reason) = decision {
            info!(
                entry_id = %entry_id,
                form_id = %form_id,
                configuration = %configuration.id,
                ip = %requester.ip,
                ?reason,
                "Denied PDF access"
            );
        }
        Ok(decision)
    }

    /// Authorise a batch of entries
    ///
    /// Denied ids are dropped and the survivors keep their relative order.
    /// An empty result is terminal: anonymous requesters must log in,
    /// authenticated ones are refused.
    pub fn authorize_batch(
        &self,
        entry_ids: &[EntryId],
        form_id: FormId,
        configuration: &PdfConfiguration,
        requester: &Requester,
    ) -> std::result::Result<AuthorizedBatch, DirectLinkError> {
        let mut batch = AuthorizedBatch {
            entries: Vec::with_capacity(entry_ids.len()),
            denied: Vec::new(),
        };

        for &entry_id in entry_ids {
            match self.authorize(entry_id, form_id, configuration, requester)? {
                AccessDecision::Allow => batch.entries.push(entry_id),
                AccessDecision::Deny(reason) => batch.denied.push((entry_id, reason)),
            }
        }

        if batch.entries.is_empty() {
            return Err(if requester.is_anonymous() {
                DirectLinkError::LoginRequired {
                    login_url: self.ctx.settings().security.login_url.clone(),
                }
            } else {
                DirectLinkError::AccessDenied
            });
        }
        Ok(batch)
    }

    fn owns(&self, entry_id: EntryId, form_id: FormId, user: UserId) -> Result<bool> {
        let count =
            self.ctx
                .forms()
                .count_active_entries(form_id, entry_id, &EntryFilter::by_owner(user))?;
        Ok(count > 0)
    }

    /// Anonymous rule: same IP, inside the logged-out window
    fn submitter_check(
        &self,
        entry_id: EntryId,
        form_id: FormId,
        requester: &Requester,
    ) -> Result<AccessDecision> {
        let forms = self.ctx.forms();
        let by_ip = EntryFilter::by_ip(requester.ip.clone());

        let window = self.ctx.settings().security.logged_out_window_secs();
        let filter = match window {
            Some(secs) => by_ip.clone().created_after(requester.now - secs),
            None => by_ip.clone(),
        };
        if forms.count_active_entries(form_id, entry_id, &filter)? > 0 {
            return Ok(AccessDecision::Allow);
        }

        // Same submitter, but the window has passed
        if window.is_some() && forms.count_active_entries(form_id, entry_id, &by_ip)? > 0 {
            let owned = forms
                .entry(entry_id)
                .map(|e| e.created_by.is_some())
                .unwrap_or(false);
            let reason = if owned {
                DenyReason::LoginRequired
            } else {
                DenyReason::Expired
            };
            return Ok(AccessDecision::Deny(reason));
        }

        Ok(AccessDecision::Deny(DenyReason::LoginRequired))
    }
}
