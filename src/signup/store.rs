use std::sync::Arc;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use crate::sheets::SheetsClient;

/// Canonical worksheet schema, positional. Row 1 is the header, rows 2+ are data.
pub const HEADER: [&str; 5] = ["ig_handle", "email", "source", "created_at_utc", "consent"];

/// Range probed for an existing header. Only emptiness of these five cells is
/// checked: a sheet whose first row holds unrelated non-empty data is accepted
/// as-is and further rows land under whatever columns it declares.
const HEADER_RANGE: &str = "A1:E1";

/// Full worksheet range for exports.
const ALL_RANGE: &str = "A:E";

/// One validated signup. Fields map positionally onto [`HEADER`];
/// rows are appended once and never updated or deleted.
#[derive(Debug, Clone)]
pub struct SignupRecord {
    pub handle: String,
    pub email: String,
    pub source: String,
    pub created_at: OffsetDateTime,
    pub consent: String,
}

impl SignupRecord {
    /// Builds a record for an affirmatively consented submission. Consent is
    /// the fixed literal `"yes"`; callers must have checked the flag already.
    pub fn consented(handle: String, email: String, source: String) -> Self {
        Self {
            handle,
            email,
            source,
            created_at: OffsetDateTime::now_utc(),
            consent: "yes".to_string(),
        }
    }

    fn to_row(&self) -> anyhow::Result<Vec<String>> {
        Ok(vec![
            self.handle.clone(),
            self.email.clone(),
            self.source.clone(),
            self.created_at.format(&Rfc3339)?,
            self.consent.clone(),
        ])
    }
}

/// All rows of the worksheet, keyed by its first row as column names.
#[derive(Debug, Clone)]
pub struct SignupTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SignupTable {
    pub fn empty() -> Self {
        Self {
            columns: HEADER.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// UTF-8 CSV with one header line followed by the data rows. Rows are
    /// padded to the column count; the remote API trims trailing empty cells.
    pub fn to_csv(&self) -> anyhow::Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            let mut record = row.clone();
            record.resize(self.columns.len(), String::new());
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        wtr.into_inner()
            .map_err(|e| anyhow::anyhow!("finish csv buffer: {e}"))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signup store unavailable")]
    Unavailable(anyhow::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Unavailable(e)
    }
}

/// Append-only view of the backing worksheet. No locking: concurrent appends
/// rely on the remote service's single-row append atomicity.
#[derive(Clone)]
pub struct SignupStore {
    sheets: Arc<dyn SheetsClient>,
}

impl SignupStore {
    pub fn new(sheets: Arc<dyn SheetsClient>) -> Self {
        Self { sheets }
    }

    /// Appends one record, lazily writing the header the first time the sheet
    /// is touched. The header write and the data write are sequential awaits
    /// on this one call path, so they cannot reorder.
    pub async fn append(&self, record: &SignupRecord) -> Result<(), StoreError> {
        let first_row = self.sheets.get_range(HEADER_RANGE).await?;
        let header_missing = first_row
            .iter()
            .all(|row| row.iter().all(|cell| cell.trim().is_empty()));

        if header_missing {
            self.sheets
                .append_row(HEADER.iter().map(|c| c.to_string()).collect())
                .await?;
            info!("header row written to empty signup sheet");
        }

        self.sheets.append_row(record.to_row()?).await?;
        Ok(())
    }

    /// Every row of the sheet. Fewer than two rows (no header or no data)
    /// yields an empty table with the canonical schema.
    pub async fn read_all(&self) -> Result<SignupTable, StoreError> {
        let mut values = self.sheets.get_range(ALL_RANGE).await?;
        if values.len() < 2 {
            return Ok(SignupTable::empty());
        }
        let columns = values.remove(0);
        Ok(SignupTable {
            columns,
            rows: values,
        })
    }
}
