use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::{CompositeWeights, RegionOutcome, RegionScores, SkipCounts};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::{index_output_filename, summary_output_filename};
use crate::domain::MonthRange;
use crate::models::{CompositeResult, MonthlySummary};
use crate::utils::time_utils::now_rfc3339;

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create file: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .context(format!("Failed to write row to: {}", path.display()))?;
    }
    writer.flush()?;

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_csv_io {
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}

pub fn write_summary_csv(path: &Path, summaries: &[MonthlySummary]) -> Result<()> {
    write_rows(path, summaries)
}

/// Missing sub-scores and scores are written as empty fields.
pub fn write_index_csv(path: &Path, results: &[CompositeResult]) -> Result<()> {
    write_rows(path, results)
}

/// Writes both per-region files into `directory` and returns their paths.
pub fn write_region_outputs(directory: &Path, scores: &RegionScores) -> Result<(PathBuf, PathBuf)> {
    let summary_path = directory.join(summary_output_filename(&scores.region));
    let index_path = directory.join(index_output_filename(&scores.region));
    write_summary_csv(&summary_path, &scores.summaries)?;
    write_index_csv(&index_path, &scores.results)?;
    Ok((summary_path, index_path))
}

// ============================================================================
// Run report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    Scored,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub name: String,
    pub code: String,
    pub status: RegionStatus,
    pub rows_written: usize,
    pub skipped: SkipCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl From<&RegionOutcome> for RegionReport {
    fn from(outcome: &RegionOutcome) -> Self {
        let region = outcome.region();
        match outcome {
            RegionOutcome::Scored(scores) => RegionReport {
                name: region.name().to_string(),
                code: region.code().to_string(),
                status: RegionStatus::Scored,
                rows_written: scores.results.len(),
                skipped: scores.skip_counts(),
                failure: None,
            },
            RegionOutcome::Failed { reason, .. } => RegionReport {
                name: region.name().to_string(),
                code: region.code().to_string(),
                status: RegionStatus::Failed,
                rows_written: 0,
                skipped: SkipCounts::default(),
                failure: Some(reason.clone()),
            },
        }
    }
}

/// Summary of one run, written next to the per-region files.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub range: MonthRange,
    pub weights: CompositeWeights,
    pub regions: Vec<RegionReport>,
}

impl RunReport {
    pub fn new(range: MonthRange, weights: CompositeWeights, outcomes: &[RegionOutcome]) -> Self {
        Self {
            generated_at: now_rfc3339(),
            range,
            weights,
            regions: outcomes.iter().map(RegionReport::from).collect(),
        }
    }

    pub fn failed_regions(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.status == RegionStatus::Failed)
            .count()
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context(format!("Failed to write run report to: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NormalizationBounds;
    use crate::domain::{MonthKey, Region, SizeBand};
    use crate::error::PipelineError;
    use std::fs;
    use tempfile::TempDir;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn scores() -> RegionScores {
        RegionScores {
            region: Region::new("Ganghwa", "28710"),
            summaries: vec![MonthlySummary::new(
                month("201601"),
                SizeBand::Under20,
                60.0,
                20_000.0,
                1,
                3.3,
            )],
            bounds: NormalizationBounds::default(),
            results: vec![CompositeResult {
                month_key: month("201601"),
                date: month("201601").first_day(),
                scaled_volatility_diff: None,
                scaled_volume_diff: Some(25.0),
                scaled_momentum: Some(75.0),
                price_per_unit: 1100.0,
                average_search_volume: 42.0,
                normalized_index: 61.5,
                fear_greed_index: None,
            }],
            skipped: vec![PipelineError::MonthNotFound(month("201602"))],
        }
    }

    #[test]
    fn test_region_csv_layout() {
        let dir = TempDir::new().unwrap();
        let (summary_path, index_path) = write_region_outputs(dir.path(), &scores()).unwrap();
        assert!(summary_path.ends_with("Ganghwa_data_summary.csv"));

        let summary = fs::read_to_string(summary_path).unwrap();
        let mut lines = summary.lines();
        assert_eq!(
            lines.next(),
            Some("month_key,size_band,summed_area,summed_amount,trade_count,price_per_unit")
        );
        assert!(lines.next().unwrap().starts_with("201601,under_20,60.0,20000.0,1,"));

        let index = fs::read_to_string(index_path).unwrap();
        let mut lines = index.lines();
        assert_eq!(
            lines.next(),
            Some(
                "month_key,date,scaled_volatility_diff,scaled_volume_diff,scaled_momentum,\
                 price_per_unit,average_search_volume,normalized_index,fear_greed_index"
            )
        );
        assert_eq!(
            lines.next(),
            Some("201601,2016-01-01,,25.0,75.0,1100.0,42.0,61.5,")
        );
    }

    #[test]
    fn test_run_report_json() {
        let dir = TempDir::new().unwrap();
        let range = MonthRange::new(month("201512"), month("202402")).unwrap();
        let outcomes = vec![
            RegionOutcome::Scored(scores()),
            RegionOutcome::Failed {
                region: Region::new("Gyeyang", "28245"),
                reason: "no transactions".to_string(),
            },
        ];
        let report = RunReport::new(range, CompositeWeights::DEFAULT, &outcomes);
        assert_eq!(report.failed_regions(), 1);

        let path = dir.path().join("run_report.json");
        report.save_to_path(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["range"]["start"], "201512");
        assert_eq!(json["regions"][0]["status"], "scored");
        assert_eq!(json["regions"][0]["rows_written"], 1);
        assert_eq!(json["regions"][0]["skipped"]["month_not_found"], 1);
        assert!(json["regions"][0].get("failure").is_none());
        assert_eq!(json["regions"][1]["failure"], "no transactions");
        assert_eq!(json["weights"]["momentum"], 0.35);
    }
}
