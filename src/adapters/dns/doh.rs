use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::fqdn;
use crate::{
    app_error::ResolutionError, domain::entities::dns_record::RecordType,
    use_cases::domain::DnsResolver,
};

const DNS_JSON: &str = "application/dns-json";
const RCODE_NOERROR: u32 = 0;
const RCODE_NXDOMAIN: u32 = 3;

/// Resolver speaking the JSON flavour of DNS-over-HTTPS
/// (Cloudflare, Google and compatible endpoints).
pub struct DohDnsResolver {
    client: Client,
    endpoint: Url,
    query_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

impl DohDnsResolver {
    pub fn new(client: Client, endpoint: Url, query_timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            query_timeout,
        }
    }

    async fn query(&self, name: &str, record_type: RecordType) -> Result<String, ResolutionError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("name", name), ("type", record_type.as_str())])
            .header(ACCEPT, DNS_JSON)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolutionError::Timeout(self.query_timeout)
                } else {
                    ResolutionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ResolutionError::Transport(e.to_string()))
    }
}

/// Pull the answers of the requested type out of a DoH JSON body.
///
/// NOERROR and NXDOMAIN both count as a definitive answer; every other rcode
/// means the resolver could not tell us anything.
fn parse_answers(body: &str, record_type: RecordType) -> Result<Vec<String>, ResolutionError> {
    let response: DohResponse =
        serde_json::from_str(body).map_err(|e| ResolutionError::Malformed(e.to_string()))?;

    match response.status {
        RCODE_NOERROR | RCODE_NXDOMAIN => {}
        rcode => return Err(ResolutionError::Rcode(rcode)),
    }

    Ok(response
        .answer
        .into_iter()
        .filter(|a| a.record_type == record_type.code())
        .map(|a| a.data)
        .collect())
}

#[async_trait]
impl DnsResolver for DohDnsResolver {
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolutionError> {
        let name = fqdn(name);
        debug!(name = %name, record_type = record_type.as_str(), "DoH lookup");

        let body = tokio::time::timeout(self.query_timeout, self.query(&name, record_type))
            .await
            .map_err(|_| ResolutionError::Timeout(self.query_timeout))??;

        parse_answers(&body, record_type).inspect_err(|e| {
            warn!(
                name = %name,
                record_type = record_type.as_str(),
                error = %e,
                "DoH lookup failed"
            );
        })
    }
}
