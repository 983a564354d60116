use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MonthKey, Region, SizeBand};
use crate::error::{PipelineError, PipelineResult};
use crate::models::summary::{MonthlySummary, price_per_unit};

/// Which summary rows feed a region series.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesScope {
    /// Collapse every size band into one series per month (sums, then price-per-unit)
    #[default]
    AllBands,
    /// Only the rows of one size band
    Band(SizeBand),
}

/// One month of a region series.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month_key: MonthKey,
    pub price_per_unit: f64,
    pub trade_count: f64,
}

// ============================================================================
// RegionSeries: chronologically ordered monthly scalars for one region
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    region: Region,
    // Strictly increasing, no duplicates
    months: Vec<MonthKey>,
    prices: Vec<f64>,
    trade_counts: Vec<f64>,
}

impl RegionSeries {
    /// Builds the series from aggregated summaries, collapsing bands or
    /// selecting one according to `scope`.
    pub fn from_summaries(
        region: Region,
        summaries: &[MonthlySummary],
        scope: SeriesScope,
        pyeong_divisor: f64,
    ) -> PipelineResult<Self> {
        // (area, amount, count) per month; BTreeMap keeps months sorted
        let mut per_month: BTreeMap<MonthKey, (f64, f64, u32)> = BTreeMap::new();
        for summary in summaries {
            if let SeriesScope::Band(band) = scope
                && summary.size_band != band
            {
                continue;
            }
            let entry = per_month.entry(summary.month_key).or_default();
            entry.0 += summary.summed_area;
            entry.1 += summary.summed_amount;
            entry.2 += summary.trade_count;
        }

        let points = per_month
            .into_iter()
            .map(|(month_key, (area, amount, count))| SeriesPoint {
                month_key,
                price_per_unit: price_per_unit(amount, area, pyeong_divisor),
                trade_count: count as f64,
            })
            .collect();

        Self::from_points(region, points)
    }

    /// Builds the series from already-aggregated monthly points. Points must be
    /// in strictly increasing month order with positive, finite prices.
    pub fn from_points(region: Region, points: Vec<SeriesPoint>) -> PipelineResult<Self> {
        if points.is_empty() {
            return Err(PipelineError::InvalidSeries(format!(
                "{} has no monthly data",
                region
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].month_key >= w[1].month_key) {
            return Err(PipelineError::InvalidSeries(format!(
                "{}: months out of order or duplicated at {} -> {}",
                region, pair[0].month_key, pair[1].month_key
            )));
        }
        if let Some(bad) = points
            .iter()
            .find(|p| !(p.price_per_unit.is_finite() && p.price_per_unit > 0.0))
        {
            return Err(PipelineError::InvalidSeries(format!(
                "{}: non-positive price per unit {} in {}",
                region, bad.price_per_unit, bad.month_key
            )));
        }

        Ok(RegionSeries {
            region,
            months: points.iter().map(|p| p.month_key).collect(),
            prices: points.iter().map(|p| p.price_per_unit).collect(),
            trade_counts: points.iter().map(|p| p.trade_count).collect(),
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn trade_counts(&self) -> &[f64] {
        &self.trade_counts
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn index_of(&self, month: MonthKey) -> Option<usize> {
        self.months.binary_search(&month).ok()
    }
}
