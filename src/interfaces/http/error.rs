use crate::error::CampaignError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// A failed query. The body never carries a partial summary.
#[derive(Debug)]
pub struct ApiError(pub CampaignError);

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl From<CampaignError> for ApiError {
    fn from(err: CampaignError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Donation query failed");
        let body = Json(ErrorBody {
            error: "Failed to fetch donation data",
            message: self.0.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
