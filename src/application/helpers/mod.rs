pub mod domain_parsing;
pub mod store_locks;
