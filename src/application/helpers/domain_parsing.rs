const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalize and validate a domain typed by a store owner.
///
/// Trims whitespace, lower-cases, and drops a single trailing dot. Returns a
/// human-readable reason on rejection.
pub fn normalize_domain(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    // Unicode case folding can turn some symbols into ASCII letters (U+212A -> 'k').
    if !trimmed.is_ascii() {
        return Err("Domain may only contain ASCII letters, digits, hyphens and dots".into());
    }
    let trimmed = trimmed.to_ascii_lowercase();
    let domain = trimmed.strip_suffix('.').unwrap_or(&trimmed);

    if domain.is_empty() {
        return Err("Domain must not be empty".into());
    }

    if domain.len() > MAX_DOMAIN_LEN {
        return Err(format!("Domain must be at most {MAX_DOMAIN_LEN} characters"));
    }

    let labels: Vec<&str> = domain.split('.').collect();

    // Must have at least 2 parts (name + TLD)
    if labels.len() < 2 {
        return Err("Please enter a full domain name (e.g., example.com)".into());
    }

    for label in &labels {
        validate_label(label)?;
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("Top-level domain '{tld}' must be at least 2 letters"));
    }

    Ok(domain.to_string())
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("Domain contains an empty label".into());
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!("Domain label '{label}' exceeds {MAX_LABEL_LEN} characters"));
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(format!("Domain label '{label}' may only contain letters, digits and hyphens"));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("Domain label '{label}' must not start or end with a hyphen"));
    }
    Ok(())
}

/// Normalize a hostname as presented by an edge proxy (case, trailing dot).
pub fn normalize_host(host: &str) -> String {
    let lower = host.trim().to_ascii_lowercase();
    lower.strip_suffix('.').unwrap_or(&lower).to_string()
}

/// Strip a leading `www.` from a hostname.
/// e.g., "www.example.com" -> "example.com"
/// Special case: "www.com" stays as is (the remainder would be a bare TLD).
pub fn apex_from_www_host(hostname: &str) -> String {
    match hostname.strip_prefix("www.") {
        Some(remainder) if remainder.contains('.') => remainder.to_string(),
        _ => hostname.to_string(),
    }
}
