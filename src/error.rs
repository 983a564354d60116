use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MonthKey;
use crate::models::ExternalSeriesKind;

/// Recoverable failures inside the statistical core. None of them abort a
/// run: records, months or regions that hit one are left out of the output
/// and reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum PipelineError {
    #[error("invalid record #{index} for region {region_code}: {reason}")]
    InvalidRecord {
        index: usize,
        region_code: String,
        reason: String,
    },

    #[error("month {0} is not present in the region series")]
    MonthNotFound(MonthKey),

    #[error("{series} has no value for month {month}")]
    ExternalSeriesMiss {
        month: MonthKey,
        series: ExternalSeriesKind,
    },

    #[error("invalid region series: {0}")]
    InvalidSeries(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Discriminant of [`PipelineError`], used to count skips.
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
    strum_macros::EnumIter,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidRecord,
    MonthNotFound,
    ExternalSeriesMiss,
    InvalidSeries,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidRecord { .. } => ErrorKind::InvalidRecord,
            PipelineError::MonthNotFound(_) => ErrorKind::MonthNotFound,
            PipelineError::ExternalSeriesMiss { .. } => ErrorKind::ExternalSeriesMiss,
            PipelineError::InvalidSeries(_) => ErrorKind::InvalidSeries,
        }
    }

    pub(crate) fn invalid_record(index: usize, region_code: &str, reason: impl Into<String>) -> Self {
        PipelineError::InvalidRecord {
            index,
            region_code: region_code.to_string(),
            reason: reason.into(),
        }
    }
}
