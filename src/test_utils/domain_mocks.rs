//! In-memory doubles for the domain verification seams.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult, ResolutionError},
    application::use_cases::domain::{DnsResolver, DomainAttachmentRepo, TokenGenerator},
    domain::entities::{
        dns_record::RecordType, domain_attachment::DomainAttachment, domain_status::DomainStatus,
    },
};

/// In-memory implementation of DomainAttachmentRepo for testing.
#[derive(Default)]
pub struct InMemoryDomainAttachmentRepo {
    pub attachments: Mutex<HashMap<Uuid, DomainAttachment>>,
}

impl InMemoryDomainAttachmentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial attachments for testing.
    pub fn with_attachments(attachments: Vec<DomainAttachment>) -> Self {
        let map = attachments.into_iter().map(|a| (a.store_id, a)).collect();
        Self {
            attachments: Mutex::new(map),
        }
    }

    pub fn get(&self, store_id: Uuid) -> Option<DomainAttachment> {
        self.attachments.lock().unwrap().get(&store_id).cloned()
    }

    /// Get all attachments (for test assertions).
    pub fn get_all(&self) -> Vec<DomainAttachment> {
        self.attachments.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl DomainAttachmentRepo for InMemoryDomainAttachmentRepo {
    async fn get_by_store(&self, store_id: Uuid) -> AppResult<Option<DomainAttachment>> {
        Ok(self.get(store_id))
    }

    async fn get_by_domain(&self, domain_name: &str) -> AppResult<Option<DomainAttachment>> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .find(|a| a.domain_name == domain_name)
            .cloned())
    }

    async fn create(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        let mut attachments = self.attachments.lock().unwrap();

        if attachments.contains_key(&attachment.store_id) {
            return Err(AppError::AlreadyConnected);
        }
        if attachments
            .values()
            .any(|a| a.domain_name == attachment.domain_name)
        {
            return Err(AppError::DomainTaken);
        }

        attachments.insert(attachment.store_id, attachment.clone());
        Ok(attachment.clone())
    }

    async fn save(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        let mut attachments = self.attachments.lock().unwrap();
        let stored = attachments
            .get_mut(&attachment.store_id)
            .ok_or(AppError::NotFound)?;
        *stored = attachment.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, store_id: Uuid) -> AppResult<()> {
        self.attachments.lock().unwrap().remove(&store_id);
        Ok(())
    }

    async fn list_by_status(&self, statuses: &[DomainStatus]) -> AppResult<Vec<DomainAttachment>> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .filter(|a| statuses.contains(&a.status))
            .cloned()
            .collect())
    }
}

/// Repo whose every call fails as if the database were down.
#[derive(Default)]
pub struct UnavailableDomainAttachmentRepo;

impl UnavailableDomainAttachmentRepo {
    fn down<T>() -> AppResult<T> {
        Err(AppError::Database("Database operation failed".into()))
    }
}

#[async_trait]
impl DomainAttachmentRepo for UnavailableDomainAttachmentRepo {
    async fn get_by_store(&self, _store_id: Uuid) -> AppResult<Option<DomainAttachment>> {
        Self::down()
    }

    async fn get_by_domain(&self, _domain_name: &str) -> AppResult<Option<DomainAttachment>> {
        Self::down()
    }

    async fn create(&self, _attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        Self::down()
    }

    async fn save(&self, _attachment: &DomainAttachment) -> AppResult<DomainAttachment> {
        Self::down()
    }

    async fn delete(&self, _store_id: Uuid) -> AppResult<()> {
        Self::down()
    }

    async fn list_by_status(
        &self,
        _statuses: &[DomainStatus],
    ) -> AppResult<Vec<DomainAttachment>> {
        Self::down()
    }
}

type Answer = Result<Vec<String>, ResolutionError>;

/// Resolver that replays scripted answers. Unscripted names resolve to an
/// empty answer (record absent).
#[derive(Default)]
pub struct ScriptedDnsResolver {
    answers: Mutex<HashMap<(String, RecordType), Answer>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, name: &str, record_type: RecordType, answer: Answer) {
        self.answers
            .lock()
            .unwrap()
            .insert((name.to_string(), record_type), answer);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of lookups observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DnsResolver for ScriptedDnsResolver {
    async fn resolve(&self, name: &str, record_type: RecordType) -> Answer {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.answers
            .lock()
            .unwrap()
            .get(&(name.to_string(), record_type))
            .cloned()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

/// Token generator returning predictable values.
pub struct FixedTokenGenerator {
    tokens: Mutex<VecDeque<String>>,
    fallback: String,
}

impl FixedTokenGenerator {
    pub fn new(token: &str) -> Self {
        Self {
            tokens: Mutex::new(VecDeque::new()),
            fallback: token.to_string(),
        }
    }

    /// Hand out `tokens` in order, then repeat the last one.
    pub fn sequence(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| t.to_string()).collect()),
            fallback: tokens.last().copied().unwrap_or_default().to_string(),
        }
    }
}

impl TokenGenerator for FixedTokenGenerator {
    fn generate(&self) -> String {
        self.tokens
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_attachment;

    #[tokio::test]
    async fn test_create_rejects_second_attachment_for_store() {
        let repo = InMemoryDomainAttachmentRepo::new();
        let first = create_test_attachment(|_| {});
        let second = create_test_attachment(|a| {
            a.store_id = first.store_id;
            a.domain_name = "other.com".into();
        });

        repo.create(&first).await.unwrap();
        let result = repo.create(&second).await;

        assert!(matches!(result, Err(AppError::AlreadyConnected)));
    }

    #[tokio::test]
    async fn test_save_unknown_store_fails() {
        let repo = InMemoryDomainAttachmentRepo::new();

        let result = repo.save(&create_test_attachment(|_| {})).await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_scripted_resolver_defaults_to_absent() {
        let resolver = ScriptedDnsResolver::new();
        resolver.set("example.com", RecordType::A, Ok(vec!["203.0.113.10".into()]));

        assert_eq!(
            resolver.resolve("example.com", RecordType::A).await.unwrap(),
            vec!["203.0.113.10"]
        );
        assert!(
            resolver
                .resolve("example.com", RecordType::Txt)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(resolver.calls(), 2);
    }
}
