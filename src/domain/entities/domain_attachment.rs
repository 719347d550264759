use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use super::{domain_status::DomainStatus, propagation_report::PropagationReport};
use crate::app_error::AppError;

/// A store's custom domain. At most one per store.
///
/// Invariants:
/// - `tls_enabled` implies `status == Verified`
/// - `redirect_https` implies `tls_enabled`
/// - `verified_at` is set only while `Verified`
/// - `error_message` is set only while `Error`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAttachment {
    pub store_id: Uuid,
    pub domain_name: String,
    pub status: DomainStatus,
    pub verification_token: String,
    pub verified_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub tls_enabled: bool,
    pub redirect_https: bool,
    pub redirect_www: bool,
    pub last_checked_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagGuardError {
    #[error("TLS can only be changed once the domain is verified")]
    NotVerified,

    #[error("HTTPS redirect requires TLS to be enabled")]
    TlsDisabled,
}

impl From<FlagGuardError> for AppError {
    fn from(err: FlagGuardError) -> Self {
        AppError::GuardViolation(err.to_string())
    }
}

/// Requested changes to the security flags. `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityFlagsUpdate {
    pub tls_enabled: Option<bool>,
    pub redirect_https: Option<bool>,
    pub redirect_www: Option<bool>,
}

impl DomainAttachment {
    /// `not_configured -> pending`. The caller has already validated `domain_name`.
    pub fn connect(
        store_id: Uuid,
        domain_name: String,
        verification_token: String,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            store_id,
            domain_name,
            status: DomainStatus::Pending,
            verification_token,
            verified_at: None,
            error_message: None,
            tls_enabled: false,
            redirect_https: false,
            redirect_www: false,
            last_checked_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Feed a propagation verdict into the state machine.
    ///
    /// `pending | error` move to `verified` or `error`. A verified domain only
    /// records the check time; nothing but disconnect takes it out of `verified`.
    pub fn apply_verification(&mut self, report: &PropagationReport, now: NaiveDateTime) {
        self.last_checked_at = Some(now);
        self.updated_at = Some(now);

        if !self.status.accepts_verification() {
            return;
        }

        if report.is_propagated() {
            self.status = DomainStatus::Verified;
            self.verified_at = Some(now);
            self.error_message = None;
            self.tls_enabled = true;
        } else {
            self.status = DomainStatus::Error;
            self.verified_at = None;
            self.error_message = Some(report.mismatches.join("; "));
            self.tls_enabled = false;
            self.redirect_https = false;
        }
    }

    pub fn set_tls(&mut self, enabled: bool) -> Result<(), FlagGuardError> {
        if self.status != DomainStatus::Verified {
            return Err(FlagGuardError::NotVerified);
        }
        self.tls_enabled = enabled;
        if !enabled {
            self.redirect_https = false;
        }
        Ok(())
    }

    pub fn set_redirect_https(&mut self, enabled: bool) -> Result<(), FlagGuardError> {
        if !self.tls_enabled {
            return Err(FlagGuardError::TlsDisabled);
        }
        self.redirect_https = enabled;
        Ok(())
    }

    pub fn set_redirect_www(&mut self, enabled: bool) {
        self.redirect_www = enabled;
    }

    /// Apply several flag changes atomically, in dependency order.
    ///
    /// Enabling TLS happens before the HTTPS redirect is checked, so
    /// `{tls: true, redirect_https: true}` succeeds on a verified domain. On a
    /// guard failure `self` is left untouched.
    pub fn apply_flags(&mut self, update: SecurityFlagsUpdate) -> Result<(), FlagGuardError> {
        let mut next = self.clone();
        if let Some(tls) = update.tls_enabled {
            next.set_tls(tls)?;
        }
        if let Some(redirect) = update.redirect_https {
            next.set_redirect_https(redirect)?;
        }
        if let Some(www) = update.redirect_www {
            next.set_redirect_www(www);
        }
        *self = next;
        Ok(())
    }

    pub fn flags_consistent(&self) -> bool {
        (!self.tls_enabled || self.status == DomainStatus::Verified)
            && (!self.redirect_https || self.tls_enabled)
            && (self.verified_at.is_none() || self.status == DomainStatus::Verified)
            && (self.error_message.is_none() || self.status == DomainStatus::Error)
    }
}
