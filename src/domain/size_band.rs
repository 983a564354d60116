use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Unit-size bands (in pyeong). Each band is half-open: `[lower, upper)`.
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
    strum_macros::EnumString,
)]
pub enum SizeBand {
    #[serde(rename = "under_20")]
    #[strum(serialize = "under_20")]
    Under20,
    #[serde(rename = "20_30")]
    #[strum(serialize = "20_30")]
    From20To30,
    #[serde(rename = "30_40")]
    #[strum(serialize = "30_40")]
    From30To40,
    #[serde(rename = "40_50")]
    #[strum(serialize = "40_50")]
    From40To50,
    #[serde(rename = "50_plus")]
    #[strum(serialize = "50_plus")]
    Over50,
}

impl SizeBand {
    /// Finds the band containing `pyeong`. `edges` are the lower bounds of the
    /// 2nd..5th bands. Negative or NaN sizes belong to no band.
    pub fn classify(pyeong: f64, edges: &[f64; 4]) -> Option<SizeBand> {
        if pyeong.is_nan() || pyeong < 0.0 {
            return None;
        }
        let index = edges.iter().take_while(|&&edge| pyeong >= edge).count();
        SizeBand::iter().nth(index)
    }
}
