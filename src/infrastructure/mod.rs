//! Payment ledger implementations.

pub mod in_memory;
pub mod stripe;
