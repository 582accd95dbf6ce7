use crate::domain::filter::FilterPolicy;
use crate::domain::payment::{CampaignRef, PaymentRecord, PaymentStatus};
use crate::domain::ports::{Page, PageRequest, PaymentLedger};
use crate::error::{CampaignError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const METADATA_LINK_KEY: &str = "payment_link";

/// Reads payments from the Stripe REST API.
///
/// The listed object depends on the filter policy: payment intents for
/// `Transaction`, checkout sessions for `Session`.
#[derive(Debug, Clone)]
pub struct StripeLedger {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    policy: FilterPolicy,
}

impl StripeLedger {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        policy: FilterPolicy,
        request_timeout: Duration,
    ) -> Result<Self> {
        let secret_key = secret_key.into().trim().to_string();
        if secret_key.is_empty() {
            return Err(CampaignError::Config(
                "Stripe secret key is required".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| CampaignError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key,
            policy,
        })
    }

    fn endpoint(&self) -> String {
        let path = match self.policy {
            FilterPolicy::Transaction => "/v1/payment_intents",
            FilterPolicy::Session => "/v1/checkout/sessions",
        };
        format!("{}{}", self.base_url, path)
    }

    async fn get_list<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<ListResponse<T>> {
        let response = self
            .http
            .get(self.endpoint())
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| CampaignError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CampaignError::UpstreamUnavailable(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(CampaignError::UpstreamRejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| CampaignError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentLedger for StripeLedger {
    async fn list_page(&self, request: PageRequest) -> Result<Page> {
        let mut query = vec![("limit", request.limit.to_string())];
        if let Some(cursor) = request.cursor {
            query.push(("starting_after", cursor));
        }

        match self.policy {
            FilterPolicy::Transaction => {
                // payment_intents cannot be filtered by status server-side
                let list = self.get_list::<WirePaymentIntent>(&query).await?;
                Ok(list.into_page())
            }
            FilterPolicy::Session => {
                if request.status_filter == Some(PaymentStatus::Completed) {
                    query.push(("status", "complete".to_string()));
                }
                let list = self.get_list::<WireCheckoutSession>(&query).await?;
                Ok(list.into_page())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    has_more: bool,
}

impl<T: Into<PaymentRecord>> ListResponse<T> {
    fn into_page(self) -> Page {
        Page {
            records: self.data.into_iter().map(Into::into).collect(),
            has_more: self.has_more,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePaymentIntent {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    amount_received: Option<i64>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    payment_method_options: Option<WireMethodOptions>,
}

#[derive(Debug, Deserialize)]
struct WireMethodOptions {
    #[serde(default)]
    link: Option<WireLinkOptions>,
}

#[derive(Debug, Deserialize)]
struct WireLinkOptions {
    #[serde(default)]
    payment_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCheckoutSession {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    payment_link: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

fn metadata_link(metadata: Option<HashMap<String, String>>) -> Option<String> {
    metadata.and_then(|mut m| m.remove(METADATA_LINK_KEY))
}

fn intent_status(status: Option<&str>) -> PaymentStatus {
    match status {
        Some("succeeded") => PaymentStatus::Completed,
        Some(
            "processing"
            | "requires_payment_method"
            | "requires_confirmation"
            | "requires_action"
            | "requires_capture",
        ) => PaymentStatus::Pending,
        Some("canceled") => PaymentStatus::Canceled,
        _ => PaymentStatus::Unknown,
    }
}

fn session_status(status: Option<&str>, payment_status: Option<&str>) -> PaymentStatus {
    match (status, payment_status) {
        (Some("complete"), Some("paid")) => PaymentStatus::Completed,
        (Some("complete") | Some("open"), _) => PaymentStatus::Pending,
        (Some("expired"), _) => PaymentStatus::Canceled,
        _ => PaymentStatus::Unknown,
    }
}

impl From<WirePaymentIntent> for PaymentRecord {
    fn from(intent: WirePaymentIntent) -> Self {
        let link = intent
            .payment_method_options
            .and_then(|options| options.link)
            .and_then(|link| link.payment_link);
        Self {
            status: intent_status(intent.status.as_deref()),
            amount_minor_units: intent.amount_received,
            campaign_ref: CampaignRef {
                tag: metadata_link(intent.metadata),
                link,
            },
            id: intent.id,
        }
    }
}

impl From<WireCheckoutSession> for PaymentRecord {
    fn from(session: WireCheckoutSession) -> Self {
        Self {
            status: session_status(session.status.as_deref(), session.payment_status.as_deref()),
            amount_minor_units: session.amount_total,
            campaign_ref: CampaignRef {
                tag: metadata_link(session.metadata),
                link: session.payment_link,
            },
            id: session.id,
        }
    }
}
