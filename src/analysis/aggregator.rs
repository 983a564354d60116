use std::collections::BTreeMap;

use crate::config::AggregationSettings;
use crate::domain::{MonthKey, Region, SizeBand, TransactionRecord};
use crate::error::{PipelineError, PipelineResult};
use crate::models::MonthlySummary;

/// Summaries for one region plus the records that were rejected on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutput {
    pub summaries: Vec<MonthlySummary>,
    pub rejected: Vec<PipelineError>,
}

#[derive(Default)]
struct BandAccumulator {
    area: f64,
    amount: f64,
    count: u32,
}

/// Groups one region's raw trades by (month, size band).
pub struct RegionAggregator<'a> {
    region: &'a Region,
    settings: &'a AggregationSettings,
}

impl<'a> RegionAggregator<'a> {
    pub fn new(region: &'a Region, settings: &'a AggregationSettings) -> Self {
        Self { region, settings }
    }

    /// Bad records are skipped with a warning and returned in `rejected`;
    /// they never abort the batch.
    pub fn aggregate(&self, records: &[TransactionRecord]) -> AggregationOutput {
        let mut groups: BTreeMap<(MonthKey, SizeBand), BandAccumulator> = BTreeMap::new();
        let mut rejected = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match self.classify(index, record) {
                Ok(key) => {
                    let acc = groups.entry(key).or_default();
                    acc.area += record.exclusive_use_area;
                    acc.amount += record.trade_amount;
                    acc.count += 1;
                }
                Err(e) => {
                    log::warn!("Skipping record: {}", e);
                    rejected.push(e);
                }
            }
        }

        let summaries = groups
            .into_iter()
            .map(|((month_key, band), acc)| {
                MonthlySummary::new(
                    month_key,
                    band,
                    acc.area,
                    acc.amount,
                    acc.count,
                    self.settings.pyeong_divisor,
                )
            })
            .collect();

        AggregationOutput {
            summaries,
            rejected,
        }
    }

    fn classify(&self, index: usize, record: &TransactionRecord) -> PipelineResult<(MonthKey, SizeBand)> {
        let code = self.region.code();
        if record.region_code != code {
            return Err(PipelineError::invalid_record(
                index,
                code,
                format!("belongs to region code {}", record.region_code),
            ));
        }
        if !(record.exclusive_use_area.is_finite() && record.exclusive_use_area > 0.0) {
            return Err(PipelineError::invalid_record(
                index,
                code,
                format!("non-positive area {}", record.exclusive_use_area),
            ));
        }
        if !(record.trade_amount.is_finite() && record.trade_amount > 0.0) {
            return Err(PipelineError::invalid_record(
                index,
                code,
                format!("non-positive trade amount {}", record.trade_amount),
            ));
        }
        let month_key = record.month_key().ok_or_else(|| {
            PipelineError::invalid_record(
                index,
                code,
                format!("unparseable month {}-{}", record.year, record.month),
            )
        })?;
        let band = SizeBand::classify(
            record.pyeong(self.settings.pyeong_divisor),
            &self.settings.band_edges,
        )
        .ok_or_else(|| PipelineError::invalid_record(index, code, "no size band for area"))?;

        Ok((month_key, band))
    }
}
