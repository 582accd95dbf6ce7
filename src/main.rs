use campaign_progress::config::{CampaignArgs, ServeArgs};
use campaign_progress::interfaces::http;
use campaign_progress::interfaces::poller::Poller;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    campaign: CampaignArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the donation progress endpoint over HTTP
    Serve(ServeArgs),
    /// Compute the summary once and print it as JSON
    Summary,
    /// Recompute the summary periodically, printing one JSON line per refresh
    Watch {
        /// Seconds between refreshes; 0 refreshes once
        #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 60)]
        interval: u64,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let aggregator = Arc::new(cli.campaign.aggregator().into_diagnostic()?);

    match cli.command {
        Command::Serve(serve) => {
            let router = http::router(aggregator, &serve.cors_allow_origin).into_diagnostic()?;
            let listener = tokio::net::TcpListener::bind(serve.listen_addr)
                .await
                .into_diagnostic()?;
            tracing::info!("Listening on {}", serve.listen_addr);
            axum::serve(listener, router).await.into_diagnostic()?;
        }
        Command::Summary => {
            let summary = aggregator.summary().await.into_diagnostic()?;
            let stdout = io::stdout();
            serde_json::to_writer_pretty(stdout.lock(), &summary).into_diagnostic()?;
            println!();
        }
        Command::Watch { interval } => {
            let mut poller = Poller::new(aggregator);
            let stdout = io::stdout();
            poller
                .run(Duration::from_secs(interval), &mut stdout.lock())
                .await
                .into_diagnostic()?;
        }
    }

    Ok(())
}
