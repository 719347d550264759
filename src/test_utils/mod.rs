//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository and scripted resolver implementations
//! - Helper builders for constructing use case and app state instances

mod app_state_builder;
mod domain_mocks;
mod factories;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

pub use app_state_builder::*;
pub use domain_mocks::*;
pub use factories::*;

use crate::application::use_cases::domain::{DnsResolver, DomainAttachmentRepo, DomainUseCases};

pub const TEST_TARGET_IPV4: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 10);
pub const TEST_TOKEN: &str = "plat-verify-abc123";

/// Use cases wired to the given doubles, a fixed token and a 1s check timeout.
pub fn domain_use_cases(
    repo: Arc<dyn DomainAttachmentRepo>,
    resolver: Arc<dyn DnsResolver>,
) -> DomainUseCases {
    DomainUseCases::new(
        repo,
        resolver,
        Arc::new(FixedTokenGenerator::new(TEST_TOKEN)),
        TEST_TARGET_IPV4,
        Duration::from_secs(1),
    )
}
