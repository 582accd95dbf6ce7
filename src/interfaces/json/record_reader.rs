use crate::domain::payment::PaymentRecord;
use crate::error::Result;
use std::io::{BufReader, Read};

/// Reads payment records from a JSON array.
///
/// Field names follow the summary's camelCase convention:
/// `[{"id": "pi_1", "status": "completed", "amountMinorUnits": 500,
///    "campaignRef": {"tag": "plink_1"}}]`.
pub struct RecordReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RecordReader<R> {
    /// Creates a new `RecordReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Parses the whole document; a structural error rejects the file.
    ///
    /// Records with unknown statuses or missing amounts are kept as-is and
    /// dealt with during aggregation.
    pub fn records(self) -> Result<Vec<PaymentRecord>> {
        Ok(serde_json::from_reader(self.reader)?)
    }
}
