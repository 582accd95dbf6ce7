use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{Page, PageRequest, PaymentLedger};
use crate::error::{CampaignError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe, cursor-paginated ledger held in memory.
///
/// Pages follow insertion order and behave like the provider's listing: the
/// cursor is the id of the last record already seen, and an unknown cursor is
/// rejected. Used by tests and by the `--fixture` command-line mode.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PaymentRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Appends a record, as a new donation arriving upstream would.
    pub async fn push(&self, record: PaymentRecord) {
        self.records.write().await.push(record);
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryLedger {
    async fn list_page(&self, request: PageRequest) -> Result<Page> {
        let records = self.records.read().await;

        let start = match request.cursor.as_deref() {
            None => 0,
            Some(cursor) => {
                let position = records
                    .iter()
                    .position(|r| r.id == cursor)
                    .ok_or_else(|| CampaignError::UpstreamRejected {
                        status: 400,
                        message: format!("No such object: '{cursor}'"),
                    })?;
                position + 1
            }
        };

        let limit = usize::try_from(request.limit.max(1)).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(records.len());

        Ok(Page {
            records: records[start..end].to_vec(),
            has_more: end < records.len(),
        })
    }
}
