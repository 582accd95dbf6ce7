#![allow(dead_code)]

use campaign_progress::application::aggregator::CampaignAggregator;
use campaign_progress::application::fetcher::LedgerFetcher;
use campaign_progress::config::CampaignConfig;
use campaign_progress::domain::filter::{CampaignFilter, FilterPolicy};
use campaign_progress::domain::ports::PaymentLedgerRef;
use campaign_progress::domain::summary::Goals;
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves `app` on an ephemeral local port until the sender is dropped or fired.
pub async fn spawn_http_server(
    app: axum::Router,
) -> std::io::Result<(SocketAddr, oneshot::Sender<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let _ = server.await;
    });
    Ok((addr, shutdown_tx))
}

pub fn aggregator(
    ledger: PaymentLedgerRef,
    campaign_id: Option<&str>,
    goal_amount: Decimal,
    goal_donors: u64,
) -> CampaignAggregator {
    let config = CampaignConfig {
        filter: CampaignFilter::new(FilterPolicy::Transaction, campaign_id.map(str::to_string)),
        goals: Goals::new(goal_amount, goal_donors).unwrap(),
        fetch_timeout: Duration::from_secs(10),
    };
    CampaignAggregator::new(LedgerFetcher::new(ledger), config)
}
