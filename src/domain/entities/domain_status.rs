use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a store's custom domain.
///
/// `NotConfigured` is never persisted: a store without a row is not configured.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DomainStatus {
    #[default]
    NotConfigured,
    Pending,
    Verified,
    Error,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::NotConfigured => "not_configured",
            DomainStatus::Pending => "pending",
            DomainStatus::Verified => "verified",
            DomainStatus::Error => "error",
        }
    }

    /// Parse a stored status, falling back to `Pending` for unknown values so a
    /// bad row gets re-verified instead of silently trusted.
    pub fn from_db(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(status = %s, "Unknown domain status in storage, treating as pending");
            DomainStatus::Pending
        })
    }

    /// Whether a verification run may move this attachment.
    pub fn accepts_verification(&self) -> bool {
        matches!(self, DomainStatus::Pending | DomainStatus::Error)
    }
}
