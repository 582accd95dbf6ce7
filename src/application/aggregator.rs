use super::fetcher::LedgerFetcher;
use crate::config::CampaignConfig;
use crate::domain::filter::CampaignFilter;
use crate::domain::payment::{MinorUnits, PaymentRecord};
use crate::domain::summary::{CampaignSummary, Goals};
use crate::error::{CampaignError, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Reduces records to campaign progress.
///
/// Malformed records that pass the filter are skipped and logged; they never
/// fail the whole summary.
pub fn compute_summary(
    records: &[PaymentRecord],
    filter: &CampaignFilter,
    goals: Goals,
    now: DateTime<Utc>,
) -> CampaignSummary {
    let mut donor_count = 0u64;
    let mut total = MinorUnits::ZERO;

    for record in records.iter().filter(|r| filter.matches(r)) {
        match record.amount() {
            Ok(amount) => {
                donor_count += 1;
                total += amount;
            }
            Err(e) => warn!(error = %e, "Skipping payment record"),
        }
    }

    CampaignSummary::new(donor_count, total.to_major(), goals, now)
}

/// Answers the progress query: fetch everything, then reduce.
///
/// Holds no mutable state, so one instance can serve concurrent queries.
pub struct CampaignAggregator {
    fetcher: LedgerFetcher,
    config: CampaignConfig,
}

impl CampaignAggregator {
    pub fn new(fetcher: LedgerFetcher, config: CampaignConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    /// One attempt, bounded by the configured fetch timeout. No retries.
    pub async fn summary(&self) -> Result<CampaignSummary> {
        let timeout = self.config.fetch_timeout;
        let records = tokio::time::timeout(timeout, self.fetcher.fetch_all_completed_records())
            .await
            .map_err(|_| CampaignError::Timeout(timeout))??;

        let summary = compute_summary(&records, &self.config.filter, self.config.goals, Utc::now());
        info!(
            fetched = records.len(),
            donors = summary.donor_count,
            total = %summary.total_amount,
            policy = %self.config.filter.policy,
            "Computed campaign summary"
        );
        Ok(summary)
    }
}
