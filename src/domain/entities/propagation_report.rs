use std::time::Duration;

use serde::Serialize;

use super::dns_record::RecordType;

/// Outcome of one required-record check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordCheck {
    pub record_type: RecordType,
    pub name: String,
    pub expected: String,
    pub observed: Vec<String>,
    pub passed: bool,
}

/// Ephemeral result of comparing observed DNS against the expected records.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    pub a_ok: bool,
    pub www_ok: bool,
    pub txt_ok: bool,
    /// Informational only; apex deployments do not use a CNAME.
    pub cname_ok: bool,
    pub checks: Vec<RecordCheck>,
    pub mismatches: Vec<String>,
    pub elapsed: Duration,
}

impl PropagationReport {
    pub fn is_propagated(&self) -> bool {
        self.a_ok && self.www_ok && self.txt_ok
    }
}
