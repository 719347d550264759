use std::net::{AddrParseError, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub database_url: String,
    /// Bearer token the storefront backend presents on every store route.
    pub service_token: SecretString,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// The address both required A records must point at.
    pub target_ipv4: Ipv4Addr,
    /// DNS-over-HTTPS JSON endpoint used for propagation checks.
    pub doh_url: Url,
    /// Optional plain DNS server (e.g., "127.0.0.1:5353" for local CoreDNS). Replaces DoH when set.
    pub dns_server: Option<SocketAddr>,
    pub dns_query_timeout: Duration,
    /// Upper bound for one whole verification, across all three lookups.
    pub verify_timeout: Duration,
    /// Background re-verification interval. `None` disables the poller.
    pub verify_poll_interval: Option<Duration>,
    pub token_prefix: String,
    pub redis_url: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy (Caddy, nginx).
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let service_token = SecretString::new(get_env::<String>("SERVICE_TOKEN").into());

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let target_ipv4: Ipv4Addr = get_env_default("TARGET_IPV4", Ipv4Addr::new(203, 0, 113, 10));
        let doh_url: Url = get_env_default(
            "DOH_URL",
            "https://cloudflare-dns.com/dns-query".parse().unwrap(),
        );
        let dns_server = parse_dns_server(std::env::var("DNS_SERVER").ok().as_deref())
            .expect("DNS_SERVER must be an ip:port socket address");
        let dns_query_timeout_secs: u64 = get_env_default("DNS_QUERY_TIMEOUT_SECS", 5);
        let verify_timeout_secs: u64 = get_env_default("VERIFY_TIMEOUT_SECS", 12);
        let verify_poll_secs: u64 = get_env_default("VERIFY_POLL_SECS", 0);
        let token_prefix: String = get_env_default("TOKEN_PREFIX", "plat-verify".to_string());

        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 60);
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);

        Self {
            database_url,
            service_token,
            bind_addr,
            cors_origin,
            target_ipv4,
            doh_url,
            dns_server,
            dns_query_timeout: Duration::from_secs(dns_query_timeout_secs),
            verify_timeout: Duration::from_secs(verify_timeout_secs),
            verify_poll_interval: (verify_poll_secs > 0)
                .then(|| Duration::from_secs(verify_poll_secs)),
            token_prefix,
            redis_url,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
        }
    }
}

/// Unset or blank means "use DoH"; anything else must be a socket address.
fn parse_dns_server(raw: Option<&str>) -> Result<Option<SocketAddr>, AddrParseError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(addr) => addr.parse().map(Some),
    }
}
