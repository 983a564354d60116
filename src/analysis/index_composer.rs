use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::analysis::feature_engine::{FeatureEngine, WindowPolicy};
use crate::analysis::normalizer::NormalizationBounds;
use crate::config::DEBUG_FLAGS;
use crate::domain::MonthKey;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CompositeResult, ExternalSeriesKind, ExternalSeriesSet, Metric};

/// Weights of the five fear-greed components. Missing fields in an override
/// file fall back to the defaults.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeWeights {
    pub volatility: f64,
    pub volume: f64,
    pub momentum: f64,
    pub search: f64,
    pub psychology: f64,
}

impl CompositeWeights {
    pub const DEFAULT: CompositeWeights = CompositeWeights {
        volatility: 0.125,
        volume: 0.125,
        momentum: 0.35,
        search: 0.15,
        psychology: 0.25,
    };

    pub fn total(&self) -> f64 {
        self.volatility + self.volume + self.momentum + self.search + self.psychology
    }

    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= 1e-9
    }

    pub fn score(&self, inputs: &ScoreInputs) -> f64 {
        inputs.volatility_diff * self.volatility
            + inputs.volume_diff * self.volume
            + inputs.momentum * self.momentum
            + inputs.search_volume * self.search
            + inputs.psychology * self.psychology
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scaled sub-scores plus the two external values for one month.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreInputs {
    pub volatility_diff: f64,
    pub volume_diff: f64,
    pub momentum: f64,
    pub search_volume: f64,
    pub psychology: f64,
}

/// Scores individual months of one region against precomputed bounds.
pub struct IndexComposer<'a> {
    engine: &'a FeatureEngine<'a>,
    bounds: &'a NormalizationBounds,
    externals: &'a ExternalSeriesSet,
    weights: &'a CompositeWeights,
    policy: WindowPolicy,
}

impl<'a> IndexComposer<'a> {
    pub fn new(
        engine: &'a FeatureEngine<'a>,
        bounds: &'a NormalizationBounds,
        externals: &'a ExternalSeriesSet,
        weights: &'a CompositeWeights,
        policy: WindowPolicy,
    ) -> Self {
        Self {
            engine,
            bounds,
            externals,
            weights,
            policy,
        }
    }

    pub fn compose_month(&self, month: MonthKey) -> PipelineResult<CompositeResult> {
        let series = self.engine.series();
        let index = series
            .index_of(month)
            .ok_or(PipelineError::MonthNotFound(month))?;

        let features = self.engine.features_at(index, self.policy);
        if cfg!(debug_assertions) && DEBUG_FLAGS.print_month_features {
            log::info!("{} {}: {:?}", series.region().name(), month, features);
        }

        let scaled_volatility_diff = self
            .bounds
            .scale(Metric::VolatilityDiff, features.volatility_diff);
        let scaled_volume_diff = self.bounds.scale(Metric::VolumeDiff, features.volume_diff);
        let scaled_momentum = self.bounds.scale(Metric::Momentum, features.momentum);

        let search_volume = self.external_value(month, ExternalSeriesKind::SearchVolume)?;
        let psychology = self.external_value(month, ExternalSeriesKind::Psychology)?;

        let fear_greed_index = match (scaled_volatility_diff, scaled_volume_diff, scaled_momentum) {
            (Some(volatility_diff), Some(volume_diff), Some(momentum)) => {
                Some(self.weights.score(&ScoreInputs {
                    volatility_diff,
                    volume_diff,
                    momentum,
                    search_volume,
                    psychology,
                }))
            }
            _ => None,
        };

        Ok(CompositeResult {
            month_key: month,
            date: month.first_day(),
            scaled_volatility_diff,
            scaled_volume_diff,
            scaled_momentum,
            price_per_unit: series.prices()[index],
            average_search_volume: search_volume,
            normalized_index: psychology,
            fear_greed_index,
        })
    }

    /// Scores every requested month in ascending order. Months that cannot be
    /// scored are left out of the rows and returned alongside them.
    pub fn compose_range(&self, months: &[MonthKey]) -> (Vec<CompositeResult>, Vec<PipelineError>) {
        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for month in months.iter().copied().sorted().dedup() {
            match self.compose_month(month) {
                Ok(row) => results.push(row),
                Err(e) => {
                    if cfg!(debug_assertions) && DEBUG_FLAGS.print_skipped_months {
                        log::info!("{}: skipping {}", self.engine.series().region().name(), e);
                    }
                    skipped.push(e);
                }
            }
        }

        (results, skipped)
    }

    fn external_value(&self, month: MonthKey, kind: ExternalSeriesKind) -> PipelineResult<f64> {
        let series = match kind {
            ExternalSeriesKind::SearchVolume => &self.externals.search_volume,
            ExternalSeriesKind::Psychology => &self.externals.psychology,
        };
        series
            .get(month)
            .ok_or(PipelineError::ExternalSeriesMiss {
                month,
                series: kind,
            })
    }
}
