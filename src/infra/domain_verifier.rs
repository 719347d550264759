use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::app_error::AppError;
use crate::use_cases::domain::DomainUseCases;

/// Periodically re-verify every pending or failed attachment.
///
/// This is an ordinary caller of `verify`: resolver outages are logged and
/// simply retried on the next tick.
pub async fn run_domain_verification_loop(
    domain_use_cases: Arc<DomainUseCases>,
    poll_interval: Duration,
) {
    let mut ticker = interval(poll_interval);

    info!(
        "Domain verification service started (polling every {}s)",
        poll_interval.as_secs()
    );

    loop {
        ticker.tick().await;

        let attachments = match domain_use_cases.list_awaiting_verification().await {
            Ok(attachments) => attachments,
            Err(e) => {
                error!(error = %e, "Failed to fetch domains awaiting verification");
                continue;
            }
        };

        for attachment in attachments {
            match domain_use_cases.verify(attachment.store_id).await {
                Ok(outcome) if outcome.report.is_propagated() => {
                    info!(domain = %attachment.domain_name, "Domain verified successfully");
                }
                Ok(outcome) => {
                    debug!(
                        domain = %attachment.domain_name,
                        mismatches = ?outcome.report.mismatches,
                        "DNS not propagated yet"
                    );
                }
                // Disconnected between listing and verifying.
                Err(AppError::NotFound) => {}
                Err(e) => {
                    warn!(domain = %attachment.domain_name, error = %e, "DNS check failed");
                }
            }
        }
    }
}
