use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::analysis::feature_engine::{FeatureEngine, WindowPolicy};
use crate::models::{DerivedFeatureSet, Metric};
use crate::utils::maths_utils::get_min_max;

/// Scaled value reported when a metric never varies across the series.
pub const DEGENERATE_SCALE_MIDPOINT: f64 = 50.0;

/// Min-Max Scaling onto 0..100. A zero-width range maps to the midpoint.
pub fn min_max_scale(value: f64, min: f64, max: f64) -> f64 {
    if max - min == 0.0 {
        return DEGENERATE_SCALE_MIDPOINT;
    }
    (value - min) / (max - min) * 100.0
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

impl MetricBounds {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (min, max) = get_min_max(values)?;
        Some(Self { min, max })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max - self.min == 0.0
    }

    pub fn scale(&self, value: f64) -> f64 {
        min_max_scale(value, self.min, self.max)
    }
}

/// Per-metric bounds over a whole region series. Computed once, before any
/// month is scored, and never updated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    bounds: BTreeMap<Metric, MetricBounds>,
}

impl NormalizationBounds {
    /// Metrics with no defined value in any month get no bounds.
    pub fn from_features(features: &[DerivedFeatureSet]) -> Self {
        let bounds = Metric::iter()
            .filter_map(|metric| {
                let values: Vec<f64> = features.iter().filter_map(|f| f.metric(metric)).collect();
                MetricBounds::from_values(&values).map(|b| (metric, b))
            })
            .collect();
        Self { bounds }
    }

    /// Runs the feature engine over every month and takes the bounds of the result.
    pub fn for_series(engine: &FeatureEngine, policy: WindowPolicy) -> Self {
        Self::from_features(&engine.features_all(policy))
    }

    pub fn get(&self, metric: Metric) -> Option<MetricBounds> {
        self.bounds.get(&metric).copied()
    }

    /// `None` if the value is undefined or the metric has no bounds.
    pub fn scale(&self, metric: Metric, value: Option<f64>) -> Option<f64> {
        Some(self.get(metric)?.scale(value?))
    }

    pub fn degenerate_metrics(&self) -> Vec<Metric> {
        self.bounds
            .iter()
            .filter(|(_, b)| b.is_degenerate())
            .map(|(metric, _)| *metric)
            .collect()
    }
}
