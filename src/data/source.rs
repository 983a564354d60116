use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::domain::{MonthRange, Region, TransactionRecord};

/// Anything that can hand over the raw trades of one region for a span of months.
pub trait TransactionSource: Sync {
    // Either the region's trades OR an anyhow::Error
    fn fetch(&self, region: &Region, range: &MonthRange) -> Result<Vec<TransactionRecord>>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Records with an unparseable month are kept so the aggregator can count them.
fn in_range(record: &TransactionRecord, range: &MonthRange) -> bool {
    record.month_key().is_none_or(|m| range.contains(m))
}

// ============================================================================
// CsvTransactionSource: one `<code>.csv` per region in a directory
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawTransactionRow {
    region_code: String,
    year: i32,
    month: u32,
    exclusive_use_area: f64,
    // Upstream writes amounts with thousands separators ("12,500")
    trade_amount: String,
}

impl RawTransactionRow {
    fn into_record(self) -> Result<TransactionRecord> {
        let amount = parse_amount(&self.trade_amount)?;
        Ok(TransactionRecord::new(
            self.region_code.trim(),
            self.year,
            self.month,
            self.exclusive_use_area,
            amount,
        ))
    }
}

/// Parses a trade amount, ignoring thousands separators and surrounding whitespace.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned
        .parse::<f64>()
        .with_context(|| format!("Invalid trade amount: {:?}", raw))
}

pub struct CsvTransactionSource {
    pub directory: PathBuf,
}

impl CsvTransactionSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn region_path(&self, region: &Region) -> PathBuf {
        self.directory.join(format!("{}.csv", region.code()))
    }

    fn read_path(path: &Path) -> Result<Vec<TransactionRecord>> {
        let mut reader = csv::Reader::from_path(path)
            .context(format!("Failed to open transactions file: {}", path.display()))?;

        let mut records = Vec::new();
        for (line, row) in reader.deserialize::<RawTransactionRow>().enumerate() {
            match row.map_err(anyhow::Error::from).and_then(RawTransactionRow::into_record) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("{}: skipping row {}: {:#}", path.display(), line + 1, e),
            }
        }
        Ok(records)
    }
}

impl TransactionSource for CsvTransactionSource {
    fn fetch(&self, region: &Region, range: &MonthRange) -> Result<Vec<TransactionRecord>> {
        let path = self.region_path(region);
        let mut records = Self::read_path(&path)?;
        records.retain(|r| in_range(r, range));

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_csv_io {
            log::info!(
                "Read {} transactions for {} from {}",
                records.len(),
                region,
                path.display()
            );
        }
        Ok(records)
    }

    fn signature(&self) -> &'static str {
        "CSV transactions"
    }
}

// ============================================================================
// InMemorySource: fixed records, filtered per request
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub records: Vec<TransactionRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }
}

impl TransactionSource for InMemorySource {
    fn fetch(&self, region: &Region, range: &MonthRange) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.region_code == region.code() && in_range(r, range))
            .cloned()
            .collect())
    }

    fn signature(&self) -> &'static str {
        "In-memory transactions"
    }
}
