//! Deployment-time configuration.
//!
//! Every value can be given as a flag or through the environment (a `.env`
//! file is honored). Nothing here changes after startup.

use crate::application::aggregator::CampaignAggregator;
use crate::application::fetcher::LedgerFetcher;
use crate::domain::filter::{CampaignFilter, FilterPolicy};
use crate::domain::ports::{MAX_PAGE_SIZE, PaymentLedgerRef};
use crate::domain::summary::Goals;
use crate::error::{CampaignError, Result};
use crate::infrastructure::in_memory::InMemoryLedger;
use crate::infrastructure::stripe::{DEFAULT_API_BASE, StripeLedger};
use crate::interfaces::json::record_reader::RecordReader;
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What the aggregator needs to turn records into a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    pub filter: CampaignFilter,
    pub goals: Goals,
    /// Deadline for fetching every page of one query.
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Args)]
pub struct CampaignArgs {
    /// Payment link identifying the campaign. Unset counts every completed payment.
    #[arg(long, env = "STRIPE_PAYMENT_LINK_ID")]
    pub campaign_id: Option<String>,

    /// Target amount in major currency units.
    #[arg(long, env = "GOAL_AMOUNT", default_value = "10000")]
    pub goal_amount: Decimal,

    /// Target number of donors.
    #[arg(long, env = "GOAL_DONORS", default_value_t = 100)]
    pub goal_donors: u64,

    /// Which records count as donations: `transaction` or `session`.
    #[arg(long, env = "FILTER_POLICY", default_value_t = FilterPolicy::Transaction)]
    pub filter_policy: FilterPolicy,

    /// Records requested per upstream page.
    #[arg(
        long,
        env = "PAGE_SIZE",
        default_value_t = MAX_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE))
    )]
    pub page_size: u32,

    /// Overall deadline for one summary computation, in seconds.
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 25)]
    pub fetch_timeout_secs: u64,

    /// Deadline for a single upstream request, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,

    #[arg(long, env = "STRIPE_API_BASE", default_value = DEFAULT_API_BASE)]
    pub stripe_api_base: String,

    /// Read payment records from a JSON file instead of Stripe.
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

impl CampaignArgs {
    pub fn campaign_config(&self) -> Result<CampaignConfig> {
        if self.fetch_timeout_secs == 0 {
            return Err(CampaignError::Config(
                "Fetch timeout must be at least one second".to_string(),
            ));
        }
        Ok(CampaignConfig {
            filter: CampaignFilter::new(self.filter_policy, self.campaign_id.clone()),
            goals: Goals::new(self.goal_amount, self.goal_donors)?,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        })
    }

    pub fn ledger(&self) -> Result<PaymentLedgerRef> {
        if let Some(path) = &self.fixture {
            let file = File::open(path)?;
            let records = RecordReader::new(file).records()?;
            info!(path = %path.display(), records = records.len(), "Using fixture ledger");
            return Ok(Arc::new(InMemoryLedger::with_records(records)));
        }

        let secret_key = self.stripe_secret_key.clone().unwrap_or_default();
        let ledger = StripeLedger::new(
            self.stripe_api_base.clone(),
            secret_key,
            self.filter_policy,
            Duration::from_secs(self.request_timeout_secs.max(1)),
        )?;
        info!(api_base = %self.stripe_api_base, policy = %self.filter_policy, "Using Stripe ledger");
        Ok(Arc::new(ledger))
    }

    pub fn aggregator(&self) -> Result<CampaignAggregator> {
        let config = self.campaign_config()?;
        let fetcher = LedgerFetcher::new(self.ledger()?).with_page_size(self.page_size);
        Ok(CampaignAggregator::new(fetcher, config))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// Allowed CORS origin; `*` allows any.
    #[arg(long, env = "CORS_ALLOW_ORIGIN", default_value = "*")]
    pub cors_allow_origin: String,
}
