use std::net::Ipv4Addr;

use serde::Serialize;
use strum::{Display, EnumString};

/// Label under which the ownership token is published, e.g.
/// `_ownership-verification.example.com`.
pub const OWNERSHIP_TXT_LABEL: &str = "_ownership-verification";

/// TTL recommended to the store owner for every required record.
pub const RECOMMENDED_TTL: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Txt,
    Cname,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Txt => "TXT",
            RecordType::Cname => "CNAME",
        }
    }

    /// Numeric RR type as it appears on the wire and in DoH JSON answers.
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Cname => 5,
            RecordType::Txt => 16,
        }
    }
}

/// A record the store owner must publish before verification can pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredDnsRecord {
    pub record_type: RecordType,
    pub name: String,
    pub value: String,
    pub ttl: u32,
}

pub fn www_name(domain: &str) -> String {
    format!("www.{domain}")
}

pub fn ownership_txt_name(domain: &str) -> String {
    format!("{OWNERSHIP_TXT_LABEL}.{domain}")
}

/// The three records (apex A, `www` A, ownership TXT) for a domain.
pub fn required_records(domain: &str, target: Ipv4Addr, token: &str) -> Vec<RequiredDnsRecord> {
    vec![
        RequiredDnsRecord {
            record_type: RecordType::A,
            name: domain.to_string(),
            value: target.to_string(),
            ttl: RECOMMENDED_TTL,
        },
        RequiredDnsRecord {
            record_type: RecordType::A,
            name: www_name(domain),
            value: target.to_string(),
            ttl: RECOMMENDED_TTL,
        },
        RequiredDnsRecord {
            record_type: RecordType::Txt,
            name: ownership_txt_name(domain),
            value: token.to_string(),
            ttl: RECOMMENDED_TTL,
        },
    ]
}
