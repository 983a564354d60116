use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::aggregator::AggregationOutput;
use crate::analysis::feature_engine::FeatureEngine;
use crate::analysis::index_composer::{CompositeWeights, IndexComposer};
use crate::analysis::normalizer::NormalizationBounds;
use crate::config::{ANALYSIS, AggregationSettings, DEBUG_FLAGS, WindowSettings};
use crate::domain::{MonthKey, Region};
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::models::{CompositeResult, ExternalSeriesSet, MonthlySummary, RegionSeries, SeriesScope};

/// Runtime configuration threaded through every stage of a region run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub aggregation: AggregationSettings,
    pub windows: WindowSettings,
    pub weights: CompositeWeights,
    pub scope: SeriesScope,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aggregation: ANALYSIS.aggregation,
            windows: ANALYSIS.windows,
            weights: ANALYSIS.weights,
            scope: SeriesScope::AllBands,
        }
    }
}

/// Number of skipped records or months per error kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkipCounts(BTreeMap<ErrorKind, usize>);

impl SkipCounts {
    pub fn from_errors<'a>(errors: impl IntoIterator<Item = &'a PipelineError>) -> Self {
        let mut counts = Self::default();
        for error in errors {
            counts.record(error.kind());
        }
        counts
    }

    pub fn record(&mut self, kind: ErrorKind) {
        *self.0.entry(kind).or_default() += 1;
    }

    pub fn get(&self, kind: ErrorKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Everything one region run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionScores {
    pub region: Region,
    pub summaries: Vec<MonthlySummary>,
    pub bounds: NormalizationBounds,
    pub results: Vec<CompositeResult>,
    /// Rejected records first, then skipped months
    pub skipped: Vec<PipelineError>,
}

impl RegionScores {
    pub fn skip_counts(&self) -> SkipCounts {
        SkipCounts::from_errors(&self.skipped)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionOutcome {
    Scored(RegionScores),
    Failed { region: Region, reason: String },
}

impl RegionOutcome {
    pub fn region(&self) -> &Region {
        match self {
            RegionOutcome::Scored(scores) => &scores.region,
            RegionOutcome::Failed { region, .. } => region,
        }
    }
}

/// Bounds pass over the whole series, then one composition per requested month.
pub fn score_summaries(
    region: &Region,
    summaries: Vec<MonthlySummary>,
    externals: &ExternalSeriesSet,
    months: &[MonthKey],
    config: &PipelineConfig,
) -> PipelineResult<RegionScores> {
    let series = RegionSeries::from_summaries(
        region.clone(),
        &summaries,
        config.scope,
        config.aggregation.pyeong_divisor,
    )?;
    let engine = FeatureEngine::new(&series, config.windows);

    let bounds = NormalizationBounds::for_series(&engine, config.windows.bounds_policy);
    let degenerate = bounds.degenerate_metrics();
    if !degenerate.is_empty() {
        log::debug!("{}: constant metrics scale to 50: {:?}", region.name(), degenerate);
    }
    if cfg!(debug_assertions) && DEBUG_FLAGS.print_bounds {
        log::info!("{}: bounds {:?}", region.name(), bounds);
    }

    let composer = IndexComposer::new(
        &engine,
        &bounds,
        externals,
        &config.weights,
        config.windows.scoring_policy,
    );
    let (results, skipped) = composer.compose_range(months);

    Ok(RegionScores {
        region: region.clone(),
        summaries,
        bounds,
        results,
        skipped,
    })
}

/// Scores one region from its aggregation output. Records rejected during
/// aggregation are carried into the skip list.
pub fn score_region(
    region: &Region,
    aggregated: AggregationOutput,
    externals: &ExternalSeriesSet,
    months: &[MonthKey],
    config: &PipelineConfig,
) -> RegionOutcome {
    let AggregationOutput {
        summaries,
        rejected,
    } = aggregated;

    match score_summaries(region, summaries, externals, months, config) {
        Ok(mut scores) => {
            let month_skips = std::mem::replace(&mut scores.skipped, rejected);
            scores.skipped.extend(month_skips);

            let counts = scores.skip_counts();
            log::info!(
                "{}: {} rows scored, {} records rejected, {} months skipped",
                region,
                scores.results.len(),
                counts.get(ErrorKind::InvalidRecord),
                counts.get(ErrorKind::MonthNotFound) + counts.get(ErrorKind::ExternalSeriesMiss),
            );
            RegionOutcome::Scored(scores)
        }
        Err(e) => {
            log::warn!("{}: not scored: {}", region, e);
            RegionOutcome::Failed {
                region: region.clone(),
                reason: e.to_string(),
            }
        }
    }
}

/// Runs every region independently across the rayon pool. Outcomes keep the
/// order of `regions`; a failing region never affects the others.
pub fn run_regions<F>(
    regions: &[Region],
    loader: F,
    externals: &ExternalSeriesSet,
    months: &[MonthKey],
    config: &PipelineConfig,
) -> Vec<RegionOutcome>
where
    F: Fn(&Region) -> anyhow::Result<AggregationOutput> + Sync,
{
    if !config.weights.is_normalized() {
        log::warn!(
            "Composite weights sum to {} instead of 1.0; scores leave the 0..100 range",
            config.weights.total()
        );
    }

    regions
        .par_iter()
        .map(|region| match loader(region) {
            Ok(aggregated) => score_region(region, aggregated, externals, months, config),
            Err(e) => {
                log::warn!("{}: failed to load transactions: {:#}", region, e);
                RegionOutcome::Failed {
                    region: region.clone(),
                    reason: format!("{:#}", e),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::RegionAggregator;
    use crate::domain::{MonthRange, SizeBand, TransactionRecord};
    use crate::models::{ExternalSeries, ExternalSeriesKind};

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn months(start: &str, end: &str) -> Vec<MonthKey> {
        MonthRange::new(month(start), month(end)).unwrap().months()
    }

    // Fifteen months, so the twelve-month rolling bounds have values
    fn records(code: &str) -> Vec<TransactionRecord> {
        let mut out = Vec::new();
        for (i, m) in months("201512", "201702").iter().enumerate() {
            let bump = ((i * 7) % 5) as f64 * 400.0 + i as f64 * 150.0;
            for k in 0..=(i % 3) {
                out.push(TransactionRecord::new(
                    code,
                    m.year(),
                    m.month(),
                    59.0 + k as f64 * 25.0,
                    20_000.0 + bump + k as f64 * 8_000.0,
                ));
            }
        }
        out
    }

    fn externals() -> ExternalSeriesSet {
        let span = months("201512", "201702");
        ExternalSeriesSet {
            search_volume: ExternalSeries::from_pairs(
                ExternalSeriesKind::SearchVolume,
                span.iter().enumerate().map(|(i, m)| (*m, 40.0 + i as f64)),
            ),
            psychology: ExternalSeries::from_pairs(
                ExternalSeriesKind::Psychology,
                span.iter().map(|m| (*m, 55.0)),
            ),
        }
    }

    #[test]
    fn test_skip_counts() {
        let errors = vec![
            PipelineError::MonthNotFound(month("201601")),
            PipelineError::MonthNotFound(month("201602")),
            PipelineError::InvalidSeries("empty".to_string()),
        ];
        let counts = SkipCounts::from_errors(&errors);
        assert_eq!(counts.get(ErrorKind::MonthNotFound), 2);
        assert_eq!(counts.get(ErrorKind::ExternalSeriesMiss), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"month_not_found":2,"invalid_series":1}"#
        );
    }

    #[test]
    fn test_run_regions_end_to_end() {
        let config = PipelineConfig::default();
        let regions = vec![Region::new("Ganghwa", "28710"), Region::new("Gyeyang", "28245")];
        let externals = externals();
        let requested = months("201512", "201703");

        let loader = |region: &Region| -> anyhow::Result<AggregationOutput> {
            if region.code() == "28245" {
                anyhow::bail!("no transactions file");
            }
            let mut recs = records(region.code());
            recs.push(TransactionRecord::new(region.code(), 2016, 1, -1.0, 10_000.0));
            Ok(RegionAggregator::new(region, &config.aggregation).aggregate(&recs))
        };

        let outcomes = run_regions(&regions, loader, &externals, &requested, &config);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].region().code(), "28710");

        let RegionOutcome::Scored(scores) = &outcomes[0] else {
            panic!("Ganghwa should be scored");
        };
        assert_eq!(scores.results.len(), 15);
        assert!(scores.results.windows(2).all(|w| w[0].month_key < w[1].month_key));
        assert_eq!(scores.results[0].fear_greed_index, None);
        assert!(scores.results[14].fear_greed_index.is_some());
        assert_eq!(scores.results[14].average_search_volume, 54.0);

        let counts = scores.skip_counts();
        assert_eq!(counts.get(ErrorKind::InvalidRecord), 1);
        assert_eq!(counts.get(ErrorKind::MonthNotFound), 1);
        assert_eq!(scores.skipped[0].kind(), ErrorKind::InvalidRecord);

        match &outcomes[1] {
            RegionOutcome::Failed { region, reason } => {
                assert_eq!(region.name(), "Gyeyang");
                assert!(reason.contains("no transactions file"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_single_band_scope() {
        let region = Region::new("Yeonsu", "28185");
        let config = PipelineConfig {
            scope: SeriesScope::Band(SizeBand::Under20),
            ..Default::default()
        };
        let aggregated = RegionAggregator::new(&region, &config.aggregation).aggregate(&records("28185"));
        let requested = months("201512", "201702");

        let RegionOutcome::Scored(scores) =
            score_region(&region, aggregated, &externals(), &requested, &config)
        else {
            panic!("Yeonsu should be scored");
        };
        // 59 m2 trades are the only ones under 20 pyeong, one per month
        let first = scores
            .summaries
            .iter()
            .find(|s| s.size_band == SizeBand::Under20)
            .unwrap();
        assert_eq!(scores.results[0].price_per_unit, first.price_per_unit);
        assert_eq!(scores.results.len(), 15);
    }

    #[test]
    fn test_region_without_valid_records_fails_alone() {
        let region = Region::new("Jung-gu", "28110");
        let config = PipelineConfig::default();
        let aggregated = RegionAggregator::new(&region, &config.aggregation)
            .aggregate(&[TransactionRecord::new("28110", 2016, 1, 0.0, 1.0)]);

        let outcome = score_region(&region, aggregated, &externals(), &[month("201601")], &config);
        assert!(matches!(outcome, RegionOutcome::Failed { .. }));
    }
}
