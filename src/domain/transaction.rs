use serde::{Deserialize, Serialize};

use crate::domain::month_key::MonthKey;

/// A single apartment sale as returned by the transaction source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub region_code: String,
    pub year: i32,
    pub month: u32,
    /// Exclusive-use area in square metres
    pub exclusive_use_area: f64,
    pub trade_amount: f64,
}

impl TransactionRecord {
    pub fn new(
        region_code: impl Into<String>,
        year: i32,
        month: u32,
        exclusive_use_area: f64,
        trade_amount: f64,
    ) -> Self {
        TransactionRecord {
            region_code: region_code.into(),
            year,
            month,
            exclusive_use_area,
            trade_amount,
        }
    }

    pub fn month_key(&self) -> Option<MonthKey> {
        MonthKey::new(self.year, self.month)
    }

    // Unit size in pyeong
    pub fn pyeong(&self, pyeong_divisor: f64) -> f64 {
        self.exclusive_use_area / pyeong_divisor
    }
}
