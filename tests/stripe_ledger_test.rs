mod common;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use campaign_progress::application::fetcher::LedgerFetcher;
use campaign_progress::domain::filter::FilterPolicy;
use campaign_progress::domain::payment::PaymentStatus;
use campaign_progress::error::CampaignError;
use campaign_progress::infrastructure::stripe::StripeLedger;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SECRET_KEY: &str = "sk_test_campaign";

#[derive(Clone, Default)]
struct StubState {
    objects: Arc<Vec<Value>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    ignore_cursor: bool,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "message": "Invalid API Key provided: sk_test_***",
                "type": "invalid_request_error"
            }
        })),
    )
        .into_response()
}

async fn list_objects(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {SECRET_KEY}"));
    if !authorized {
        return unauthorized();
    }
    state.queries.lock().unwrap().push(query.clone());

    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let start = match query.get("starting_after") {
        Some(cursor) if !state.ignore_cursor => state
            .objects
            .iter()
            .position(|o| o["id"] == cursor.as_str())
            .map_or(state.objects.len(), |p| p + 1),
        _ => 0,
    };
    let end = (start + limit).min(state.objects.len());

    Json(json!({
        "object": "list",
        "data": state.objects[start..end].to_vec(),
        "has_more": end < state.objects.len(),
    }))
    .into_response()
}

async fn spawn_stub(state: StubState) -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = Router::new()
        .route("/v1/payment_intents", get(list_objects))
        .route("/v1/checkout/sessions", get(list_objects))
        .with_state(state);
    let (addr, shutdown) = common::spawn_http_server(app).await.unwrap();
    (format!("http://{addr}"), shutdown)
}

fn intents(n: usize) -> Vec<Value> {
    (1..=n)
        .map(|i| {
            let status = if i % 10 == 0 { "canceled" } else { "succeeded" };
            let metadata = if i % 2 == 0 {
                json!({"payment_link": "plink_1"})
            } else {
                json!({})
            };
            json!({
                "id": format!("pi_{i:04}"),
                "object": "payment_intent",
                "status": status,
                "amount_received": 1000,
                "metadata": metadata,
            })
        })
        .collect()
}

fn ledger(base_url: &str, key: &str, policy: FilterPolicy) -> StripeLedger {
    StripeLedger::new(base_url, key, policy, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetches_every_page_with_cursor() {
    let state = StubState {
        objects: Arc::new(intents(250)),
        ..Default::default()
    };
    let (base_url, _shutdown) = spawn_stub(state.clone()).await;
    let fetcher = LedgerFetcher::new(Arc::new(ledger(&base_url, SECRET_KEY, FilterPolicy::Transaction)));

    let records = fetcher.fetch_all_completed_records().await.unwrap();

    assert_eq!(records.len(), 250);
    assert_eq!(records[0].id, "pi_0001");
    assert_eq!(records[249].id, "pi_0250");
    assert_eq!(records[9].status, PaymentStatus::Canceled);
    assert_eq!(records[1].campaign_ref.tag.as_deref(), Some("plink_1"));

    let queries = state.queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("100"));
    assert_eq!(queries[0].get("starting_after"), None);
    assert_eq!(queries[1].get("starting_after").map(String::as_str), Some("pi_0100"));
    assert_eq!(queries[2].get("starting_after").map(String::as_str), Some("pi_0200"));
    assert!(queries.iter().all(|q| q.get("status").is_none()));
}

#[tokio::test]
async fn test_campaign_summary_over_stripe() {
    let (base_url, _shutdown) = spawn_stub(StubState {
        objects: Arc::new(intents(250)),
        ..Default::default()
    })
    .await;
    let aggregator = common::aggregator(
        Arc::new(ledger(&base_url, SECRET_KEY, FilterPolicy::Transaction)),
        Some("plink_1"),
        dec!(1000),
        100,
    );

    let summary = aggregator.summary().await.unwrap();

    // even ids are tagged, every tenth is canceled: 125 - 25
    assert_eq!(summary.donor_count, 100);
    assert_eq!(summary.total_amount, dec!(1000));
    assert_eq!(summary.amount_percent, dec!(100));
    assert_eq!(summary.donor_percent, dec!(100));
}

#[tokio::test]
async fn test_sessions_request_completed_status() {
    let sessions = vec![
        json!({"id": "cs_1", "status": "complete", "payment_status": "paid", "amount_total": 1500, "payment_link": "plink_1"}),
        json!({"id": "cs_2", "status": "complete", "payment_status": "paid", "amount_total": 2500, "metadata": {"payment_link": "plink_1"}}),
    ];
    let state = StubState {
        objects: Arc::new(sessions),
        ..Default::default()
    };
    let (base_url, _shutdown) = spawn_stub(state.clone()).await;
    let ledger = Arc::new(ledger(&base_url, SECRET_KEY, FilterPolicy::Session));

    let records = LedgerFetcher::new(ledger).fetch_all_completed_records().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, PaymentStatus::Completed);
    assert_eq!(records[0].campaign_ref.link.as_deref(), Some("plink_1"));
    let queries = state.queries.lock().unwrap().clone();
    assert_eq!(queries[0].get("status").map(String::as_str), Some("complete"));
}

#[tokio::test]
async fn test_rejected_key_surfaces_provider_message() {
    let (base_url, _shutdown) = spawn_stub(StubState {
        objects: Arc::new(intents(3)),
        ..Default::default()
    })
    .await;
    let fetcher = LedgerFetcher::new(Arc::new(ledger(&base_url, "sk_test_wrong", FilterPolicy::Transaction)));

    match fetcher.fetch_all_completed_records().await {
        Err(CampaignError::UpstreamRejected { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Invalid API Key provided"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_provider_ignoring_cursor_stalls() {
    let state = StubState {
        objects: Arc::new(intents(150)),
        ignore_cursor: true,
        ..Default::default()
    };
    let (base_url, _shutdown) = spawn_stub(state.clone()).await;
    let fetcher = LedgerFetcher::new(Arc::new(ledger(&base_url, SECRET_KEY, FilterPolicy::Transaction)));

    assert!(matches!(
        fetcher.fetch_all_completed_records().await,
        Err(CampaignError::UpstreamPaginationStall { .. })
    ));
    assert_eq!(state.queries.lock().unwrap().len(), 2);
}

async fn spawn_fixed_body(body: Value) -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = Router::new().route(
        "/v1/payment_intents",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let (addr, shutdown) = common::spawn_http_server(app).await.unwrap();
    (format!("http://{addr}"), shutdown)
}

#[tokio::test]
async fn test_non_list_response_is_malformed() {
    for body in [
        json!({}),
        json!({"object": "payment_intent", "id": "pi_1"}),
        json!({"object": "list", "data": intents(1)}),
    ] {
        let (base_url, _shutdown) = spawn_fixed_body(body.clone()).await;
        let ledger = Arc::new(ledger(&base_url, SECRET_KEY, FilterPolicy::Transaction));

        let fetched = LedgerFetcher::new(ledger.clone()).fetch_all_completed_records().await;
        assert!(
            matches!(fetched, Err(CampaignError::MalformedResponse(_))),
            "{body}: {fetched:?}"
        );

        let summary = common::aggregator(ledger, None, dec!(1000), 100).summary().await;
        assert!(
            matches!(summary, Err(CampaignError::MalformedResponse(_))),
            "{body}: {summary:?}"
        );
    }
}

#[tokio::test]
async fn test_unreachable_provider() {
    let fetcher = LedgerFetcher::new(Arc::new(ledger(
        "http://127.0.0.1:1",
        SECRET_KEY,
        FilterPolicy::Transaction,
    )));

    assert!(matches!(
        fetcher.fetch_all_completed_records().await,
        Err(CampaignError::UpstreamUnavailable(_))
    ));
}
