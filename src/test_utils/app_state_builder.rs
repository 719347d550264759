//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a minimal `AppState`
//! with in-memory mocks for testing HTTP endpoints.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::domain::DomainAttachmentRepo,
    domain::entities::domain_attachment::DomainAttachment,
    infra::{RateLimiterTrait, config::AppConfig},
    test_utils::{
        InMemoryDomainAttachmentRepo, ScriptedDnsResolver, TEST_TARGET_IPV4, domain_use_cases,
    },
};

pub const TEST_SERVICE_TOKEN: &str = "test-service-token";

/// Counting rate limiter keyed by IP.
pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(u64::MAX)
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(ip.to_string()).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let attachment = create_test_attachment(|a| a.status = DomainStatus::Verified);
///
/// let app_state = TestAppStateBuilder::new()
///     .with_attachment(attachment)
///     .build();
/// ```
pub struct TestAppStateBuilder {
    attachments: Vec<DomainAttachment>,
    resolver: Arc<ScriptedDnsResolver>,
    repo: Option<Arc<dyn DomainAttachmentRepo>>,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            attachments: vec![],
            resolver: Arc::new(ScriptedDnsResolver::new()),
            repo: None,
            rate_limiter: None,
        }
    }

    /// Seed an attachment into the in-memory repo.
    pub fn with_attachment(mut self, attachment: DomainAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Use a scripted resolver the test keeps a handle to.
    pub fn with_resolver(mut self, resolver: Arc<ScriptedDnsResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Share a repo with the test so it can inspect stored state afterwards.
    /// Seeded attachments are ignored when a repo is supplied.
    pub fn with_repo(mut self, repo: Arc<dyn DomainAttachmentRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let repo = self.repo.unwrap_or_else(|| {
            Arc::new(InMemoryDomainAttachmentRepo::with_attachments(
                self.attachments,
            )) as Arc<dyn DomainAttachmentRepo>
        });

        let domain_use_cases = Arc::new(domain_use_cases(repo, self.resolver));

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            database_url: String::new(),
            service_token: SecretString::new(TEST_SERVICE_TOKEN.into()),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            target_ipv4: TEST_TARGET_IPV4,
            doh_url: Url::parse("https://dns.test/dns-query").unwrap(),
            dns_server: None,
            dns_query_timeout: Duration::from_secs(1),
            verify_timeout: Duration::from_secs(1),
            verify_poll_interval: None,
            token_prefix: "plat-verify".to_string(),
            redis_url: String::new(),
            rate_limit_window_secs: 60,
            rate_limit_per_ip: 60,
            trust_proxy: false,
        });

        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(InMemoryRateLimiter::permissive()));

        AppState {
            config,
            domain_use_cases,
            rate_limiter,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rate_limiter_blocks_after_limit() {
        let limiter = InMemoryRateLimiter::new(2);

        assert!(limiter.check("198.51.100.1").await.is_ok());
        assert!(limiter.check("198.51.100.1").await.is_ok());
        assert!(matches!(
            limiter.check("198.51.100.1").await,
            Err(AppError::RateLimited)
        ));
        assert!(limiter.check("198.51.100.2").await.is_ok());
    }
}
