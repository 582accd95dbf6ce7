use crate::application::aggregator::CampaignAggregator;
use crate::domain::summary::CampaignSummary;
use crate::error::Result;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

/// Refreshes a summary on a fixed cadence and remembers the last good one.
///
/// A failed refresh leaves the previous summary in place, so a consumer keeps
/// showing stale-but-consistent progress while the provider is unavailable.
pub struct Poller {
    aggregator: Arc<CampaignAggregator>,
    last: Option<CampaignSummary>,
}

impl Poller {
    pub fn new(aggregator: Arc<CampaignAggregator>) -> Self {
        Self {
            aggregator,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&CampaignSummary> {
        self.last.as_ref()
    }

    /// Returns `true` when a fresh summary replaced the previous one.
    pub async fn refresh(&mut self) -> bool {
        match self.aggregator.summary().await {
            Ok(summary) => {
                self.last = Some(summary);
                true
            }
            Err(e) => {
                match &self.last {
                    Some(previous) => warn!(
                        error = %e,
                        last_updated = %previous.last_updated,
                        "Donation data temporarily unavailable, keeping last summary"
                    ),
                    None => warn!(error = %e, "Donation data temporarily unavailable"),
                }
                false
            }
        }
    }

    /// Polls every `period` and writes one JSON line per fresh summary.
    ///
    /// A zero period refreshes once and returns.
    pub async fn run<W: Write>(&mut self, period: Duration, out: &mut W) -> Result<()> {
        if period.is_zero() {
            if self.refresh().await {
                self.write_last(out)?;
            }
            return Ok(());
        }

        info!(period_secs = period.as_secs(), "Polling donation progress");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if self.refresh().await {
                self.write_last(out)?;
            }
        }
    }

    fn write_last<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Some(summary) = &self.last {
            serde_json::to_writer(&mut *out, summary)?;
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }
}
