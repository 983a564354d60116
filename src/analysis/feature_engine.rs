use std::ops::Range;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::WindowSettings;
use crate::models::{DerivedFeatureSet, RegionSeries};
use crate::utils::maths_utils::{mean, pct_change, sample_std_dev};

/// How a trailing window behaves when it would reach before the first month.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPolicy {
    /// Clamp to the series start and use the shorter window
    Truncated,
    /// The statistic needs the full nominal window of defined values (rolling semantics)
    Full,
}

/// Derives rolling-window features from one region series.
pub struct FeatureEngine<'a> {
    series: &'a RegionSeries,
    windows: WindowSettings,
    // price_changes[0] is always None
    price_changes: Vec<Option<f64>>,
}

impl<'a> FeatureEngine<'a> {
    pub fn new(series: &'a RegionSeries, windows: WindowSettings) -> Self {
        Self {
            series,
            windows,
            price_changes: price_change_series(series.prices()),
        }
    }

    pub fn series(&self) -> &'a RegionSeries {
        self.series
    }

    /// Features for every month of the series, in month order.
    pub fn features_all(&self, policy: WindowPolicy) -> Vec<DerivedFeatureSet> {
        (0..self.series.len())
            .map(|t| self.features_at(t, policy))
            .collect()
    }

    /// Features for the month at index `t`, with every window anchored at `t`.
    pub fn features_at(&self, t: usize, policy: WindowPolicy) -> DerivedFeatureSet {
        let w = &self.windows;
        let volatility_short = self.volatility(t, w.short_months, policy);
        let volatility_long = self.volatility(t, w.long_months, policy);
        let volume_short = self.volume_mean(t, w.short_months, policy);
        let volume_long = self.volume_mean(t, w.long_months, policy);

        DerivedFeatureSet {
            price_change_pct: self.price_changes.get(t).copied().flatten(),
            volatility_short,
            volatility_long,
            volume_short,
            volume_long,
            momentum: self.momentum(t, policy),
            volatility_diff: difference(volatility_short, volatility_long),
            volume_diff: difference(volume_short, volume_long),
        }
    }

    /// Sample standard deviation of price-change % over the window.
    fn volatility(&self, t: usize, length: usize, policy: WindowPolicy) -> Option<f64> {
        let range = self.window(t, length, policy)?;
        let values = self.required_points(&self.price_changes[range], length, policy)?;
        sample_std_dev(&values)
    }

    /// Mean trade count over the window.
    fn volume_mean(&self, t: usize, length: usize, policy: WindowPolicy) -> Option<f64> {
        let range = self.window(t, length, policy)?;
        let counts: Vec<Option<f64>> = self.series.trade_counts()[range]
            .iter()
            .map(|&c| Some(c))
            .collect();
        let values = self.required_points(&counts, length, policy)?;
        mean(&values)
    }

    /// Mean price-change % times mean trade count over the momentum window.
    fn momentum(&self, t: usize, policy: WindowPolicy) -> Option<f64> {
        let length = self.windows.momentum_months;
        let range = self.window(t, length, policy)?;
        let changes = self.required_points(&self.price_changes[range], length, policy)?;
        Some(mean(&changes)? * self.volume_mean(t, length, policy)?)
    }

    /// Index range of the trailing window of `length` months ending at `t`.
    fn window(&self, t: usize, length: usize, policy: WindowPolicy) -> Option<Range<usize>> {
        if t >= self.series.len() || length == 0 {
            return None;
        }
        let end = t + 1;
        match policy {
            WindowPolicy::Truncated => Some(end.saturating_sub(length)..end),
            WindowPolicy::Full => (end >= length).then(|| end - length..end),
        }
    }

    /// The defined values of a window, or `None` if there are too few of them.
    fn required_points(&self, window: &[Option<f64>], length: usize, policy: WindowPolicy) -> Option<Vec<f64>> {
        let defined: Vec<f64> = window.iter().flatten().copied().collect();
        let required = match policy {
            WindowPolicy::Truncated => self.windows.min_points,
            WindowPolicy::Full => length.max(self.windows.min_points),
        };
        (defined.len() >= required).then_some(defined)
    }
}

/// Month-over-month price change in percent; the first month has no value.
pub fn price_change_series(prices: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(
            prices
                .iter()
                .tuple_windows()
                .map(|(&previous, &current)| pct_change(previous, current)),
        )
        .take(prices.len())
        .collect()
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}
