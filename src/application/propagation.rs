//! Compares observed DNS answers with the records a store was asked to publish.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::domain::entities::{
    dns_record::{RecordType, ownership_txt_name, www_name},
    propagation_report::{PropagationReport, RecordCheck},
};

/// Raw answers for the three required lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedRecords {
    pub apex_a: Vec<String>,
    pub www_a: Vec<String>,
    pub txt: Vec<String>,
}

pub fn evaluate(
    domain: &str,
    target: Ipv4Addr,
    token: &str,
    observed: &ObservedRecords,
    elapsed: Duration,
) -> PropagationReport {
    let mut mismatches = Vec::new();

    let apex = check_a_record(domain, target, &observed.apex_a);
    if let Some(mismatch) = a_mismatch("A record", &apex, target) {
        mismatches.push(mismatch);
    }

    let www = check_a_record(&www_name(domain), target, &observed.www_a);
    if let Some(mismatch) = a_mismatch("www A record", &www, target) {
        mismatches.push(mismatch);
    }

    let txt = check_txt_record(&ownership_txt_name(domain), token, &observed.txt);
    if !txt.passed {
        mismatches.push(if txt.observed.is_empty() {
            format!("TXT record missing: {} has no TXT record", txt.name)
        } else {
            format!(
                "TXT record incorrect: {} does not contain the verification token",
                txt.name
            )
        });
    }

    PropagationReport {
        a_ok: apex.passed,
        www_ok: www.passed,
        txt_ok: txt.passed,
        cname_ok: true,
        checks: vec![apex, www, txt],
        mismatches,
        elapsed,
    }
}

fn check_a_record(name: &str, target: Ipv4Addr, answers: &[String]) -> RecordCheck {
    let passed = answers
        .iter()
        .any(|value| value.trim().parse::<Ipv4Addr>() == Ok(target));

    RecordCheck {
        record_type: RecordType::A,
        name: name.to_string(),
        expected: target.to_string(),
        observed: answers.to_vec(),
        passed,
    }
}

fn a_mismatch(label: &str, check: &RecordCheck, target: Ipv4Addr) -> Option<String> {
    if check.passed {
        return None;
    }
    Some(if check.observed.is_empty() {
        format!("{label} missing: {} has no A record", check.name)
    } else {
        format!(
            "{label} incorrect: {} points to {}, expected {target}",
            check.name,
            check.observed.join(", ")
        )
    })
}

fn check_txt_record(name: &str, token: &str, answers: &[String]) -> RecordCheck {
    let passed = answers
        .iter()
        .any(|value| normalize_txt_value(value) == token);

    RecordCheck {
        record_type: RecordType::Txt,
        name: name.to_string(),
        expected: token.to_string(),
        observed: answers.to_vec(),
        passed,
    }
}

/// Strip the presentation quoting some resolvers put around TXT data.
///
/// `"abc"` becomes `abc`; a value split into several character-strings
/// (`"abc" "def"`) is joined back into `abcdef`. Unquoted values pass through.
pub fn normalize_txt_value(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = &trimmed[1..trimmed.len() - 1];
        inner.split("\" \"").collect::<String>().replace("\\\"", "\"")
    } else {
        trimmed.to_string()
    }
}
