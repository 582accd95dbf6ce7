//! Domain model: payment records, campaign filtering and progress summaries.

pub mod filter;
pub mod payment;
pub mod ports;
pub mod summary;
