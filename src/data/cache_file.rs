use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::summary_cache_filename;
use crate::domain::{MonthRange, Region};
use crate::error::PipelineError;
use crate::models::MonthlySummary;
use crate::utils::time_utils::how_many_seconds_ago;

/// Serialized cache of one region's aggregated summaries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SummaryCache {
    pub version: f64,
    pub timestamp_ms: i64,
    pub region_code: String,
    pub range: MonthRange,
    pub data: Vec<MonthlySummary>,
    /// Records the aggregation rejected, so skip counts survive a cache hit
    pub rejected: Vec<PipelineError>,
}

impl SummaryCache {
    pub fn new(
        region: &Region,
        range: MonthRange,
        data: Vec<MonthlySummary>,
        rejected: Vec<PipelineError>,
        version: f64,
    ) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            region_code: region.code().to_string(),
            range,
            data,
            rejected,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open cache file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let cache = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize cache: {:?}", path))?;
        Ok(cache)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }

    pub fn cache_path(cache_dir: &Path, region: &Region, range: &MonthRange) -> PathBuf {
        cache_dir.join(summary_cache_filename(region, range))
    }

    /// Rejects a cache written for another region, range or layout version, or
    /// one older than `recency_required_secs`.
    pub fn check_validity(
        &self,
        region: &Region,
        range: &MonthRange,
        recency_required_secs: i64,
        version_required: f64,
    ) -> Result<()> {
        if self.version != version_required {
            bail!(
                "Cache version mismatch: file v{} vs required v{}",
                self.version,
                version_required
            );
        }

        if self.region_code != region.code() || self.range != *range {
            bail!(
                "Cache key mismatch: file has {} {}, expected {} {}",
                self.region_code,
                self.range,
                region.code(),
                range
            );
        }

        let seconds_ago = how_many_seconds_ago(self.timestamp_ms);
        if seconds_ago > recency_required_secs {
            bail!(
                "Cache too old: created {} seconds ago (limit: {} seconds)",
                seconds_ago,
                recency_required_secs
            );
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_cache_events {
            log::info!(
                "Cache valid for {}: v{}, {}s old (limit {}s)",
                region,
                self.version,
                seconds_ago,
                recency_required_secs
            );
        }

        Ok(())
    }
}
