use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Payment provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Payment provider rejected request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },
    #[error("Malformed payment provider response: {0}")]
    MalformedResponse(String),
    #[error("Pagination stalled: cursor {cursor:?} did not advance")]
    UpstreamPaginationStall { cursor: Option<String> },
    #[error("Payment record {id} is malformed: {reason}")]
    MalformedRecord { id: String, reason: &'static str },
    #[error("Aggregation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CampaignError>;
