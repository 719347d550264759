//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{domain_attachment::DomainAttachment, domain_status::DomainStatus};

use super::TEST_TOKEN;

/// Create a pending test attachment for a fresh store.
pub fn create_test_attachment(overrides: impl FnOnce(&mut DomainAttachment)) -> DomainAttachment {
    let mut attachment = DomainAttachment {
        store_id: Uuid::new_v4(),
        domain_name: "example.com".to_string(),
        status: DomainStatus::Pending,
        verification_token: TEST_TOKEN.to_string(),
        verified_at: None,
        error_message: None,
        tls_enabled: false,
        redirect_https: false,
        redirect_www: false,
        last_checked_at: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut attachment);
    attachment
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Returns a consistent test datetime (2024-01-15 12:00:00 UTC).
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_attachment_with_defaults() {
        let attachment = create_test_attachment(|_| {});
        assert_eq!(attachment.domain_name, "example.com");
        assert_eq!(attachment.status, DomainStatus::Pending);
        assert!(attachment.flags_consistent());
    }

    #[test]
    fn test_create_attachment_with_overrides() {
        let attachment = create_test_attachment(|a| {
            a.domain_name = "custom.com".to_string();
            a.status = DomainStatus::Verified;
            a.tls_enabled = true;
        });
        assert_eq!(attachment.domain_name, "custom.com");
        assert_eq!(attachment.status, DomainStatus::Verified);
        assert!(attachment.tls_enabled);
    }
}
