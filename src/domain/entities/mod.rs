pub mod dns_record;
pub mod domain_attachment;
pub mod domain_status;
pub mod propagation_report;
