use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A domain is already connected to this store")]
    AlreadyConnected,

    #[error("Domain is already connected to another store")]
    DomainTaken,

    #[error("Guard violation: {0}")]
    GuardViolation(String),

    #[error("Could not verify at this time: {0}")]
    DnsUnavailable(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Transport-level failure while talking to a DNS resolver.
///
/// Distinct from an empty answer: an absent record is `Ok(vec![])`, while this
/// means the resolver could not tell us anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("DNS query timed out after {0:?}")]
    Timeout(Duration),

    #[error("DNS transport failed: {0}")]
    Transport(String),

    #[error("DNS resolver returned HTTP {0}")]
    HttpStatus(u16),

    #[error("DNS resolver returned rcode {0}")]
    Rcode(u32),

    #[error("Malformed DNS response: {0}")]
    Malformed(String),
}

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        AppError::DnsUnavailable(err.to_string())
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidCredentials,
    RateLimited,
    InvalidInput,
    DomainAlreadyConnected,
    DomainTaken,
    GuardViolation,
    DnsUnavailable,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::DomainAlreadyConnected => "DOMAIN_ALREADY_CONNECTED",
            ErrorCode::DomainTaken => "DOMAIN_TAKEN",
            ErrorCode::GuardViolation => "GUARD_VIOLATION",
            ErrorCode::DnsUnavailable => "DNS_UNAVAILABLE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
