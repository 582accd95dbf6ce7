use super::payment::{PaymentRecord, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Upper bound on page size accepted by the payment provider.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    /// Id of the last record of the previous page; `None` for the first page.
    pub cursor: Option<String>,
    /// Hint only: ledgers that cannot filter server-side return every status.
    pub status_filter: Option<PaymentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub records: Vec<PaymentRecord>,
    pub has_more: bool,
}

/// A cursor-paginated listing of payment records.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn list_page(&self, request: PageRequest) -> Result<Page>;
}

pub type PaymentLedgerRef = Arc<dyn PaymentLedger>;
