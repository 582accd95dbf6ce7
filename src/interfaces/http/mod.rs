//! The read-only donation progress endpoint.
//!
//! `GET /api/donations` recomputes the summary on every call; browsers may
//! poll it from any allowed origin.

pub mod error;

use crate::application::aggregator::CampaignAggregator;
use crate::domain::summary::CampaignSummary;
use crate::error::{CampaignError, Result};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use error::ApiResult;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const DONATIONS_PATH: &str = "/api/donations";

pub fn router(aggregator: Arc<CampaignAggregator>, cors_allow_origin: &str) -> Result<Router> {
    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route(
            DONATIONS_PATH,
            get(get_donations).fallback(method_not_allowed),
        )
        .layer(cors_layer(cors_allow_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator))
}

fn cors_layer(allow_origin: &str) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    let allow_origin = allow_origin.trim();
    if allow_origin == "*" {
        return Ok(cors.allow_origin(Any));
    }
    let origin = allow_origin
        .parse::<HeaderValue>()
        .map_err(|e| CampaignError::Config(format!("Invalid CORS origin '{allow_origin}': {e}")))?;
    Ok(cors.allow_origin(origin))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_donations(
    State(aggregator): State<Arc<CampaignAggregator>>,
) -> ApiResult<Json<CampaignSummary>> {
    let summary = aggregator.summary().await?;
    Ok(Json(summary))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}
