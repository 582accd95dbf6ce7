//! Application layer: walking the payment ledger and reducing it to campaign
//! progress.
//!
//! `LedgerFetcher` owns pagination, `CampaignAggregator` owns filtering,
//! reduction and the per-query deadline. Neither keeps state between calls.

pub mod aggregator;
pub mod fetcher;
