use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::{NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType as HickoryRecordType;
use hickory_resolver::proto::xfer::Protocol;
use tracing::{debug, warn};

use super::fqdn;
use crate::{
    app_error::ResolutionError, domain::entities::dns_record::RecordType,
    use_cases::domain::DnsResolver,
};

/// Plain UDP resolver pointed at one nameserver (local dev with CoreDNS).
pub struct HickoryDnsResolver {
    resolver: TokioResolver,
    query_timeout: Duration,
}

impl HickoryDnsResolver {
    pub fn with_nameserver(addr: SocketAddr, query_timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));

        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default()).build();
        Self {
            resolver,
            query_timeout,
        }
    }
}

fn hickory_type(record_type: RecordType) -> HickoryRecordType {
    match record_type {
        RecordType::A => HickoryRecordType::A,
        RecordType::Txt => HickoryRecordType::TXT,
        RecordType::Cname => HickoryRecordType::CNAME,
    }
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolutionError> {
        let name = fqdn(name);
        debug!(name = %name, record_type = record_type.as_str(), "DNS lookup");

        let lookup = tokio::time::timeout(
            self.query_timeout,
            self.resolver.lookup(name.as_str(), hickory_type(record_type)),
        )
        .await
        .map_err(|_| ResolutionError::Timeout(self.query_timeout))?;

        let lookup = match lookup {
            Ok(lookup) => lookup,
            Err(e) if e.is_no_records_found() => return Ok(vec![]),
            Err(e) => {
                warn!(name = %name, error = %e, "DNS lookup failed");
                return Err(ResolutionError::Transport(e.to_string()));
            }
        };

        let values = lookup
            .records()
            .iter()
            .filter_map(|record| {
                let data = record.data();
                match record_type {
                    RecordType::A => data.as_a().map(|a| a.0.to_string()),
                    RecordType::Cname => data.as_cname().map(|c| c.0.to_string()),
                    // One TXT record may be split into several character strings.
                    RecordType::Txt => data.as_txt().map(|txt| {
                        txt.txt_data()
                            .iter()
                            .map(|part| String::from_utf8_lossy(part).into_owned())
                            .collect::<String>()
                    }),
                }
            })
            .collect();

        Ok(values)
    }
}
