use serde::{Deserialize, Serialize};

use crate::domain::{MonthKey, SizeBand};

/// Aggregated trades of one region for one (month, size band).
/// Only created for pairs with at least one trade, so `summed_area > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month_key: MonthKey,
    pub size_band: SizeBand,
    pub summed_area: f64,
    pub summed_amount: f64,
    pub trade_count: u32,
    pub price_per_unit: f64,
}

impl MonthlySummary {
    pub fn new(
        month_key: MonthKey,
        size_band: SizeBand,
        summed_area: f64,
        summed_amount: f64,
        trade_count: u32,
        pyeong_divisor: f64,
    ) -> Self {
        MonthlySummary {
            month_key,
            size_band,
            summed_area,
            summed_amount,
            trade_count,
            price_per_unit: price_per_unit(summed_amount, summed_area, pyeong_divisor),
        }
    }
}

/// Price per pyeong of a batch of trades.
pub fn price_per_unit(summed_amount: f64, summed_area: f64, pyeong_divisor: f64) -> f64 {
    summed_amount / summed_area * pyeong_divisor
}
