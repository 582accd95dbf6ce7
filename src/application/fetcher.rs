use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::ports::{MAX_PAGE_SIZE, PageRequest, PaymentLedgerRef};
use crate::error::{CampaignError, Result};
use tracing::debug;

/// Walks a cursor-paginated ledger to the end.
///
/// Pages are requested strictly in cursor order, since each cursor is the id
/// of the previous page's last record.
#[derive(Clone)]
pub struct LedgerFetcher {
    ledger: PaymentLedgerRef,
    page_size: u32,
}

impl LedgerFetcher {
    pub fn new(ledger: PaymentLedgerRef) -> Self {
        Self {
            ledger,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns every record the ledger lists, in ledger order.
    ///
    /// The completed-status filter is passed as a hint; callers must still
    /// check each record's status. Any page error discards what was fetched.
    pub async fn fetch_all_completed_records(&self) -> Result<Vec<PaymentRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .ledger
                .list_page(PageRequest {
                    limit: self.page_size,
                    cursor: cursor.clone(),
                    status_filter: Some(PaymentStatus::Completed),
                })
                .await?;
            pages += 1;

            let has_more = page.has_more;
            let next_cursor = page.records.last().map(|r| r.id.clone());
            debug!(
                page = pages,
                records = page.records.len(),
                has_more,
                "Fetched ledger page"
            );
            records.extend(page.records);

            if !has_more {
                break;
            }

            match next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => return Err(CampaignError::UpstreamPaginationStall { cursor }),
            }
        }

        Ok(records)
    }
}
