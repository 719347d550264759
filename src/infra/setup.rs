use crate::{
    adapters::{
        dns::{doh::DohDnsResolver, hickory::HickoryDnsResolver},
        http::app_state::AppState,
    },
    infra::{
        config::AppConfig, error::InfraError, http_client::try_build_client,
        postgres_persistence, rate_limit::RedisRateLimiter,
        verification_token::OsRngTokenGenerator,
    },
    use_cases::domain::{DnsResolver, DomainAttachmentRepo, DomainUseCases},
};
use std::fs::File;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let attachment_repo = postgres_arc.clone() as Arc<dyn DomainAttachmentRepo>;

    let resolver: Arc<dyn DnsResolver> = match config.dns_server {
        Some(addr) => {
            info!(dns_server = %addr, "Using plain DNS resolver");
            Arc::new(HickoryDnsResolver::with_nameserver(
                addr,
                config.dns_query_timeout,
            ))
        }
        None => {
            info!(doh_url = %config.doh_url, "Using DNS-over-HTTPS resolver");
            let client =
                try_build_client(config.dns_query_timeout).map_err(InfraError::HttpClient)?;
            Arc::new(DohDnsResolver::new(
                client,
                config.doh_url.clone(),
                config.dns_query_timeout,
            ))
        }
    };

    let domain_use_cases = DomainUseCases::new(
        attachment_repo,
        resolver,
        Arc::new(OsRngTokenGenerator::new(config.token_prefix.clone())),
        config.target_ipv4,
        config.verify_timeout,
    );

    let rate_limiter = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
        )
        .await?,
    );

    Ok(AppState {
        config: Arc::new(config),
        domain_use_cases: Arc::new(domain_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "store_domains=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), skipped when the file cannot be created
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
