use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult, ResolutionError};
use crate::application::helpers::domain_parsing::{
    apex_from_www_host, normalize_domain, normalize_host,
};
use crate::application::helpers::store_locks::StoreLocks;
use crate::application::propagation::{ObservedRecords, evaluate};
use crate::domain::entities::{
    dns_record::{RecordType, RequiredDnsRecord, ownership_txt_name, required_records, www_name},
    domain_attachment::{DomainAttachment, SecurityFlagsUpdate},
    domain_status::DomainStatus,
    propagation_report::PropagationReport,
};

#[async_trait]
pub trait DomainAttachmentRepo: Send + Sync {
    async fn get_by_store(&self, store_id: Uuid) -> AppResult<Option<DomainAttachment>>;
    async fn get_by_domain(&self, domain_name: &str) -> AppResult<Option<DomainAttachment>>;
    /// Insert a new attachment. Fails with `AlreadyConnected` when the store
    /// already has one and `DomainTaken` when another store owns the name.
    async fn create(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment>;
    /// Overwrite the mutable fields of an existing attachment.
    async fn save(&self, attachment: &DomainAttachment) -> AppResult<DomainAttachment>;
    /// Remove the store's attachment. Succeeds when there is none.
    async fn delete(&self, store_id: Uuid) -> AppResult<()>;
    async fn list_by_status(&self, statuses: &[DomainStatus]) -> AppResult<Vec<DomainAttachment>>;
}

/// Thin DNS primitive. An absent record is `Ok(vec![])`.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolutionError>;
}

pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Clone)]
pub struct DomainUseCases {
    repo: Arc<dyn DomainAttachmentRepo>,
    resolver: Arc<dyn DnsResolver>,
    tokens: Arc<dyn TokenGenerator>,
    target_ipv4: Ipv4Addr,
    verify_timeout: Duration,
    locks: Arc<StoreLocks>,
}

impl DomainUseCases {
    pub fn new(
        repo: Arc<dyn DomainAttachmentRepo>,
        resolver: Arc<dyn DnsResolver>,
        tokens: Arc<dyn TokenGenerator>,
        target_ipv4: Ipv4Addr,
        verify_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            resolver,
            tokens,
            target_ipv4,
            verify_timeout,
            locks: Arc::new(StoreLocks::new()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, store_id: Uuid) -> AppResult<DomainAttachmentView> {
        let attachment = self.repo.get_by_store(store_id).await?;
        Ok(self.view(store_id, attachment))
    }

    #[instrument(skip(self))]
    pub async fn connect(&self, store_id: Uuid, domain_name: &str) -> AppResult<DomainAttachmentView> {
        let normalized = normalize_domain(domain_name).map_err(AppError::InvalidInput)?;

        let _guard = self.locks.lock(store_id).await;

        if self.repo.get_by_store(store_id).await?.is_some() {
            return Err(AppError::AlreadyConnected);
        }
        if self.repo.get_by_domain(&normalized).await?.is_some() {
            return Err(AppError::DomainTaken);
        }

        let attachment =
            DomainAttachment::connect(store_id, normalized, self.tokens.generate(), now());
        let created = self.repo.create(&attachment).await?;

        info!(domain = %created.domain_name, "Domain connected, awaiting DNS");
        Ok(self.view(store_id, Some(created)))
    }

    /// Resolve the required records, evaluate them and move the attachment.
    ///
    /// A resolver failure or the overall timeout surfaces as `DnsUnavailable`
    /// and leaves the attachment untouched.
    #[instrument(skip(self))]
    pub async fn verify(&self, store_id: Uuid) -> AppResult<VerificationOutcome> {
        let _guard = self.locks.lock(store_id).await;

        let mut attachment = self
            .repo
            .get_by_store(store_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let report = match self.check_propagation(&attachment).await {
            Ok(report) => report,
            Err(e) => {
                warn!(domain = %attachment.domain_name, error = %e, "DNS check could not complete");
                return Err(e.into());
            }
        };

        let previous = attachment.status;
        attachment.apply_verification(&report, now());
        debug_assert!(attachment.flags_consistent());
        let saved = self.repo.save(&attachment).await?;

        if previous != saved.status {
            info!(
                domain = %saved.domain_name,
                from = %previous,
                to = %saved.status,
                mismatches = ?report.mismatches,
                "Domain status changed"
            );
        }

        Ok(VerificationOutcome {
            report,
            attachment: self.view(store_id, Some(saved)),
        })
    }

    #[instrument(skip(self))]
    pub async fn disconnect(&self, store_id: Uuid) -> AppResult<()> {
        let _guard = self.locks.lock(store_id).await;
        self.repo.delete(store_id).await?;
        info!("Domain disconnected");
        Ok(())
    }

    pub async fn set_tls(&self, store_id: Uuid, enabled: bool) -> AppResult<DomainAttachmentView> {
        self.update_security(
            store_id,
            SecurityFlagsUpdate {
                tls_enabled: Some(enabled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_redirect_https(
        &self,
        store_id: Uuid,
        enabled: bool,
    ) -> AppResult<DomainAttachmentView> {
        self.update_security(
            store_id,
            SecurityFlagsUpdate {
                redirect_https: Some(enabled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_redirect_www(
        &self,
        store_id: Uuid,
        enabled: bool,
    ) -> AppResult<DomainAttachmentView> {
        self.update_security(
            store_id,
            SecurityFlagsUpdate {
                redirect_www: Some(enabled),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply flag changes in dependency order; all or nothing.
    #[instrument(skip(self))]
    pub async fn update_security(
        &self,
        store_id: Uuid,
        update: SecurityFlagsUpdate,
    ) -> AppResult<DomainAttachmentView> {
        let _guard = self.locks.lock(store_id).await;

        let mut attachment = self
            .repo
            .get_by_store(store_id)
            .await?
            .ok_or(AppError::NotFound)?;

        attachment.apply_flags(update)?;
        attachment.updated_at = Some(now());
        let saved = self.repo.save(&attachment).await?;

        Ok(self.view(store_id, Some(saved)))
    }

    pub async fn list_awaiting_verification(&self) -> AppResult<Vec<DomainAttachment>> {
        self.repo
            .list_by_status(&[DomainStatus::Pending, DomainStatus::Error])
            .await
    }

    /// Edge on-demand TLS ask: a host may get a certificate only when its
    /// attachment is verified with TLS on. Accepts the apex or its `www` name.
    #[instrument(skip(self))]
    pub async fn is_domain_allowed(&self, hostname: &str) -> AppResult<bool> {
        let host = normalize_host(hostname);
        let attachment = match self.repo.get_by_domain(&host).await? {
            Some(attachment) => Some(attachment),
            None => {
                let apex = apex_from_www_host(&host);
                if apex == host {
                    None
                } else {
                    self.repo.get_by_domain(&apex).await?
                }
            }
        };

        Ok(matches!(
            attachment,
            Some(a) if a.status == DomainStatus::Verified && a.tls_enabled
        ))
    }

    pub fn get_dns_records(&self, domain: &str, token: &str) -> Vec<RequiredDnsRecord> {
        required_records(domain, self.target_ipv4, token)
    }

    async fn check_propagation(
        &self,
        attachment: &DomainAttachment,
    ) -> Result<PropagationReport, ResolutionError> {
        let started = Instant::now();
        let domain = attachment.domain_name.as_str();
        let www = www_name(domain);
        let txt_name = ownership_txt_name(domain);

        let lookups = async {
            let (apex_a, www_a, txt) = tokio::join!(
                self.resolver.resolve(domain, RecordType::A),
                self.resolver.resolve(&www, RecordType::A),
                self.resolver.resolve(&txt_name, RecordType::Txt),
            );
            Ok::<_, ResolutionError>(ObservedRecords {
                apex_a: apex_a?,
                www_a: www_a?,
                txt: txt?,
            })
        };

        let observed = tokio::time::timeout(self.verify_timeout, lookups)
            .await
            .map_err(|_| ResolutionError::Timeout(self.verify_timeout))??;

        Ok(evaluate(
            domain,
            self.target_ipv4,
            &attachment.verification_token,
            &observed,
            started.elapsed(),
        ))
    }

    fn view(&self, store_id: Uuid, attachment: Option<DomainAttachment>) -> DomainAttachmentView {
        match attachment {
            Some(a) => {
                let dns_records = self.get_dns_records(&a.domain_name, &a.verification_token);
                DomainAttachmentView {
                    store_id,
                    domain_name: Some(a.domain_name),
                    status: a.status,
                    verification_token: Some(a.verification_token),
                    verified_at: a.verified_at,
                    error_message: a.error_message,
                    tls_enabled: a.tls_enabled,
                    redirect_https: a.redirect_https,
                    redirect_www: a.redirect_www,
                    last_checked_at: a.last_checked_at,
                    dns_records,
                }
            }
            None => DomainAttachmentView::not_configured(store_id),
        }
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// What callers see of a store's domain, including the records to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAttachmentView {
    pub store_id: Uuid,
    pub domain_name: Option<String>,
    pub status: DomainStatus,
    pub verification_token: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub tls_enabled: bool,
    pub redirect_https: bool,
    pub redirect_www: bool,
    pub last_checked_at: Option<NaiveDateTime>,
    pub dns_records: Vec<RequiredDnsRecord>,
}

impl DomainAttachmentView {
    pub fn not_configured(store_id: Uuid) -> Self {
        Self {
            store_id,
            domain_name: None,
            status: DomainStatus::NotConfigured,
            verification_token: None,
            verified_at: None,
            error_message: None,
            tls_enabled: false,
            redirect_https: false,
            redirect_www: false,
            last_checked_at: None,
            dns_records: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub report: PropagationReport,
    pub attachment: DomainAttachmentView,
}
