use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::MonthKey;

/// Final output row for one (region, month). Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub month_key: MonthKey,
    pub date: NaiveDate,
    pub scaled_volatility_diff: Option<f64>,
    pub scaled_volume_diff: Option<f64>,
    pub scaled_momentum: Option<f64>,
    pub price_per_unit: f64,
    pub average_search_volume: f64,
    pub normalized_index: f64,
    // None whenever one of the scaled sub-scores is None
    pub fear_greed_index: Option<f64>,
}
