//! Analysis and computation configuration

use serde::{Deserialize, Serialize};

use crate::analysis::feature_engine::WindowPolicy;
use crate::analysis::index_composer::CompositeWeights;

/// Settings for turning raw transactions into monthly size-band summaries
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    // Square metres per pyeong. Also the multiplier for price-per-pyeong.
    pub pyeong_divisor: f64,
    // Lower edges (pyeong) of the 2nd..5th size bands; the first band starts at 0
    pub band_edges: [f64; 4],
}

/// Rolling window lengths (in months) and how windows near the series start behave
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    pub short_months: usize,
    pub long_months: usize,
    pub momentum_months: usize,
    // A window statistic backed by fewer defined points than this has no value
    pub min_points: usize,
    // Policy for the whole-series pass that produces normalization bounds.
    // Scores computed under `Truncated` can land outside 0..100 when bounds use `Full`.
    pub bounds_policy: WindowPolicy,
    // Policy for the per-month scoring pass
    pub scoring_policy: WindowPolicy,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    pub aggregation: AggregationSettings,
    pub windows: WindowSettings,
    pub weights: CompositeWeights,
    // Inclusive month range scored when the CLI is given no range
    pub default_start_month: &'static str,
    pub default_end_month: &'static str,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    aggregation: AggregationSettings {
        pyeong_divisor: 3.3,
        band_edges: [20.0, 30.0, 40.0, 50.0],
    },

    windows: WindowSettings {
        short_months: 3,
        long_months: 12,
        momentum_months: 2,
        min_points: 2,
        bounds_policy: WindowPolicy::Full,
        scoring_policy: WindowPolicy::Truncated,
    },

    weights: CompositeWeights::DEFAULT,

    default_start_month: "201512",
    default_end_month: "202402",
};
