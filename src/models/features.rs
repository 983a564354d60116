use serde::{Deserialize, Serialize};

/// The windowed metrics that get min-max scaled into the composite.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    VolatilityDiff,
    VolumeDiff,
    Momentum,
}

/// Rolling statistics for one month. `None` means "no value": the window
/// held too few defined points, or an input was itself undefined.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatureSet {
    pub price_change_pct: Option<f64>,
    pub volatility_short: Option<f64>,
    pub volatility_long: Option<f64>,
    pub volume_short: Option<f64>,
    pub volume_long: Option<f64>,
    pub momentum: Option<f64>,
    pub volatility_diff: Option<f64>,
    pub volume_diff: Option<f64>,
}

impl DerivedFeatureSet {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::VolatilityDiff => self.volatility_diff,
            Metric::VolumeDiff => self.volume_diff,
            Metric::Momentum => self.momentum,
        }
    }
}
