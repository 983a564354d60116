// Summary loading before the statistical core runs

use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::analysis::{AggregationOutput, RegionAggregator};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::{AggregationSettings, PERSISTENCE};
use crate::data::cache_file::SummaryCache;
use crate::data::source::TransactionSource;
use crate::domain::{MonthRange, Region};

/// Where summaries are cached and which side wins when both are usable.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// `None` disables the cache entirely
    pub directory: Option<PathBuf>,
    pub prefer_source: bool,
    pub acceptable_age_secs: i64,
    pub version: f64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from(PERSISTENCE.summary_cache.directory)),
            prefer_source: false,
            acceptable_age_secs: PERSISTENCE.summary_cache.acceptable_age_secs,
            version: PERSISTENCE.summary_cache.version,
        }
    }
}

impl CachePolicy {
    pub fn disabled() -> Self {
        Self {
            directory: None,
            ..Default::default()
        }
    }
}

/// Monthly summaries for one region, from a valid cache or freshly aggregated.
///
/// If the cache is valid both routes are available and `prefer_source` picks
/// the first one to try; otherwise the source is the only choice. Fresh
/// aggregations refresh the cache.
pub fn load_region_summaries(
    source: &dyn TransactionSource,
    region: &Region,
    range: &MonthRange,
    settings: &AggregationSettings,
    policy: &CachePolicy,
) -> Result<AggregationOutput> {
    let cached = read_cache(region, range, policy);

    match (policy.prefer_source, cached) {
        (false, Ok(cache)) => Ok(from_cache(cache)),
        (true, Ok(cache)) => match aggregate_fresh(source, region, range, settings, policy) {
            Ok(output) => Ok(output),
            Err(e) => {
                log::warn!("{}: {} failed ({:#}), using cached summaries", region, source.signature(), e);
                Ok(from_cache(cache))
            }
        },
        (_, Err(e)) => {
            log::debug!("{}: summary cache unavailable: {:#}", region, e);
            aggregate_fresh(source, region, range, settings, policy)
        }
    }
}

fn read_cache(region: &Region, range: &MonthRange, policy: &CachePolicy) -> Result<SummaryCache> {
    let directory = policy
        .directory
        .as_ref()
        .ok_or_else(|| anyhow!("summary cache disabled"))?;
    let cache = SummaryCache::load_from_path(&SummaryCache::cache_path(directory, region, range))?;
    cache.check_validity(region, range, policy.acceptable_age_secs, policy.version)?;
    Ok(cache)
}

fn from_cache(cache: SummaryCache) -> AggregationOutput {
    AggregationOutput {
        summaries: cache.data,
        rejected: cache.rejected,
    }
}

fn aggregate_fresh(
    source: &dyn TransactionSource,
    region: &Region,
    range: &MonthRange,
    settings: &AggregationSettings,
    policy: &CachePolicy,
) -> Result<AggregationOutput> {
    let records = source.fetch(region, range)?;
    let output = RegionAggregator::new(region, settings).aggregate(&records);
    log::info!(
        "{}: {} records -> {} summary rows via {}",
        region,
        records.len(),
        output.summaries.len(),
        source.signature()
    );

    if let Some(directory) = &policy.directory
        && !output.summaries.is_empty()
    {
        let path = SummaryCache::cache_path(directory, region, range);
        let cache = SummaryCache::new(
            region,
            *range,
            output.summaries.clone(),
            output.rejected.clone(),
            policy.version,
        );
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_cache_events {
            log::info!("Writing summary cache: {}", path.display());
        }
        // Not fatal
        if let Err(e) = cache.save_to_path(&path) {
            log::warn!("Failed to write summary cache: {:#}", e);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;
    use crate::data::source::InMemorySource;
    use crate::domain::TransactionRecord;
    use tempfile::TempDir;

    fn range() -> MonthRange {
        MonthRange::new("201512".parse().unwrap(), "201612".parse().unwrap()).unwrap()
    }

    fn policy(dir: &TempDir, prefer_source: bool) -> CachePolicy {
        CachePolicy {
            directory: Some(dir.path().to_path_buf()),
            prefer_source,
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_is_written_then_used() {
        let dir = TempDir::new().unwrap();
        let region = Region::new("Namdong", "28200");
        let source = InMemorySource::new(vec![
            TransactionRecord::new("28200", 2016, 3, 59.0, 25_000.0),
            TransactionRecord::new("28200", 2016, 3, 0.0, 25_000.0),
        ]);

        let fresh =
            load_region_summaries(&source, &region, &range(), &ANALYSIS.aggregation, &policy(&dir, false)).unwrap();
        assert_eq!(fresh.summaries.len(), 1);
        assert_eq!(fresh.rejected.len(), 1);

        // An empty source proves the second call is served from the cache
        let empty = InMemorySource::default();
        let cached =
            load_region_summaries(&empty, &region, &range(), &ANALYSIS.aggregation, &policy(&dir, false)).unwrap();
        assert_eq!(cached.summaries, fresh.summaries);
        assert_eq!(cached.rejected, fresh.rejected);

        let preferred =
            load_region_summaries(&empty, &region, &range(), &ANALYSIS.aggregation, &policy(&dir, true)).unwrap();
        assert!(preferred.summaries.is_empty());
    }

    #[test]
    fn test_disabled_cache_always_aggregates() {
        let region = Region::new("Namdong", "28200");
        let source = InMemorySource::new(vec![TransactionRecord::new("28200", 2016, 3, 59.0, 25_000.0)]);
        let output = load_region_summaries(
            &source,
            &region,
            &range(),
            &ANALYSIS.aggregation,
            &CachePolicy::disabled(),
        )
        .unwrap();
        assert_eq!(output.summaries.len(), 1);
    }
}
