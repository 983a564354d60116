//! File persistence and serialization configuration

use crate::domain::{MonthRange, Region};

/// Default locations of the collaborator inputs
pub struct SourcePaths {
    /// Directory holding one `<sigungu code>.csv` of raw transactions per region
    pub transactions_dir: &'static str,
    pub search_volume_path: &'static str,
    pub psychology_path: &'static str,
}

/// Column layout of the two external series files (headers as published upstream)
pub struct ExternalColumns {
    pub search_month_column: &'static str,
    pub search_value_column: &'static str,
    pub psychology_scope_column: &'static str,
    pub psychology_date_column: &'static str,
    pub psychology_date_format: &'static str,
    pub psychology_value_column: &'static str,
    /// Geographic scope the psychology index is filtered to before scoring
    pub psychology_scope: &'static str,
}

/// Per-region bincode cache of aggregated monthly summaries
pub struct SummaryCacheSettings {
    pub directory: &'static str,
    pub filename_prefix: &'static str,
    /// Bump whenever `MonthlySummary` or the cache layout changes
    pub version: f64,
    /// Cached summaries older than this are re-aggregated from the source
    pub acceptable_age_secs: i64,
}

pub struct OutputSettings {
    pub directory: &'static str,
    pub summary_suffix: &'static str,
    pub index_suffix: &'static str,
    pub report_filename: &'static str,
}

pub struct PersistenceConfig {
    pub sources: SourcePaths,
    pub external_columns: ExternalColumns,
    pub summary_cache: SummaryCacheSettings,
    pub output: OutputSettings,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    sources: SourcePaths {
        transactions_dir: "transactions",
        search_volume_path: "search_volume_monthly.csv",
        psychology_path: "standardized_data.csv",
    },
    external_columns: ExternalColumns {
        search_month_column: "년월",
        search_value_column: "검색량_평균",
        psychology_scope_column: "C1_NM",
        psychology_date_column: "PRD_DE",
        psychology_date_format: "%Y-%m-%d",
        psychology_value_column: "normalized_DT",
        psychology_scope: "인천광역시",
    },
    summary_cache: SummaryCacheSettings {
        directory: "summary_cache",
        filename_prefix: "summary",
        version: 2.0,
        // 7 days (60 * 60 * 24 * 7)
        acceptable_age_secs: 604_800,
    },
    output: OutputSettings {
        directory: "output",
        summary_suffix: "_data_summary.csv",
        index_suffix: "_fear_greed_index_full.csv",
        report_filename: "run_report.json",
    },
};

/// Generate the region/range specific cache filename
/// Example: "summary_28710_201512-202402_v2.bin"
pub fn summary_cache_filename(region: &Region, range: &MonthRange) -> String {
    format!(
        "{}_{}_{}_v{}.bin",
        PERSISTENCE.summary_cache.filename_prefix,
        region.code(),
        range,
        PERSISTENCE.summary_cache.version
    )
}

/// Example: "Ganghwa_data_summary.csv"
pub fn summary_output_filename(region: &Region) -> String {
    format!("{}{}", region.name(), PERSISTENCE.output.summary_suffix)
}

/// Example: "Ganghwa_fear_greed_index_full.csv"
pub fn index_output_filename(region: &Region) -> String {
    format!("{}{}", region.name(), PERSISTENCE.output.index_suffix)
}
