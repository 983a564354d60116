#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use analysis::{CompositeWeights, PipelineConfig, RegionOutcome, run_regions};
pub use domain::{MonthKey, MonthRange, Region, SizeBand, TransactionRecord};
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use models::{CompositeResult, MonthlySummary, SeriesScope};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
// CLI argument parsing
use clap::Parser;

use crate::config::{ANALYSIS, PERSISTENCE};
use crate::data::{
    CachePolicy, CsvTransactionSource, RunReport, load_external_series, load_region_summaries,
    load_weights, write_region_outputs,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory with one `<sigungu code>.csv` of transactions per region
    #[arg(long, default_value = PERSISTENCE.sources.transactions_dir)]
    pub transactions_dir: PathBuf,

    /// Monthly search volume CSV
    #[arg(long, default_value = PERSISTENCE.sources.search_volume_path)]
    pub search_volume: PathBuf,

    /// Standardized psychology index CSV
    #[arg(long, default_value = PERSISTENCE.sources.psychology_path)]
    pub psychology: PathBuf,

    /// Geographic scope the psychology rows are filtered to
    #[arg(long, default_value = PERSISTENCE.external_columns.psychology_scope)]
    pub psychology_scope: String,

    #[arg(long, default_value = PERSISTENCE.output.directory)]
    pub output_dir: PathBuf,

    #[arg(long, default_value = PERSISTENCE.summary_cache.directory)]
    pub cache_dir: PathBuf,

    /// First month to score (YYYYMM)
    #[arg(long, default_value = ANALYSIS.default_start_month)]
    pub start: MonthKey,

    /// Last month to score (YYYYMM), inclusive
    #[arg(long, default_value = ANALYSIS.default_end_month)]
    pub end: MonthKey,

    /// Restrict the run to these regions (name or code); repeatable
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Score a single size band instead of all bands combined (e.g. `20_30`)
    #[arg(long)]
    pub band: Option<SizeBand>,

    /// JSON file overriding the composite weights
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Aggregate from the transaction files even when a valid summary cache exists
    #[arg(long, default_value_t = false)]
    pub prefer_source: bool,

    /// Neither read nor write the summary cache
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

/// Regions named by `selectors`, or the whole region table if there are none.
pub fn select_regions(selectors: &[String]) -> Result<Vec<Region>> {
    let all = Region::all();
    if selectors.is_empty() {
        return Ok(all);
    }
    selectors
        .iter()
        .map(|selector| {
            all.iter()
                .find(|r| r.matches(selector))
                .cloned()
                .ok_or_else(|| anyhow!("Unknown region: {}", selector))
        })
        .collect()
}

/// Main application entry point: score every selected region and write the outputs.
pub fn run_app(args: &Cli) -> Result<()> {
    let range = MonthRange::new(args.start, args.end)
        .ok_or_else(|| anyhow!("Empty month range: {} is after {}", args.start, args.end))?;
    let regions = select_regions(&args.regions)?;

    let weights = match &args.weights {
        Some(path) => load_weights(path)?,
        None => ANALYSIS.weights,
    };
    let config = PipelineConfig {
        weights,
        scope: args.band.map(SeriesScope::Band).unwrap_or_default(),
        ..Default::default()
    };

    let externals = load_external_series(
        &args.search_volume,
        &args.psychology,
        &PERSISTENCE.external_columns,
        &args.psychology_scope,
    )?;
    log::info!(
        "Loaded {} search volume and {} psychology months",
        externals.search_volume.len(),
        externals.psychology.len()
    );

    // Early months of the range still get full-length windows
    let fetch_range = range.with_lookback(config.windows.long_months as u32);
    let source = CsvTransactionSource::new(&args.transactions_dir);
    let policy = if args.no_cache {
        CachePolicy::disabled()
    } else {
        CachePolicy {
            directory: Some(args.cache_dir.clone()),
            prefer_source: args.prefer_source,
            ..Default::default()
        }
    };

    let outcomes = run_regions(
        &regions,
        |region| load_region_summaries(&source, region, &fetch_range, &config.aggregation, &policy),
        &externals,
        &range.months(),
        &config,
    );

    write_outputs(&args.output_dir, range, &config, &outcomes)
}

fn write_outputs(
    output_dir: &Path,
    range: MonthRange,
    config: &PipelineConfig,
    outcomes: &[RegionOutcome],
) -> Result<()> {
    for outcome in outcomes {
        if let RegionOutcome::Scored(scores) = outcome {
            let (_, index_path) = write_region_outputs(output_dir, scores)
                .with_context(|| format!("Failed to write outputs for {}", scores.region))?;
            log::info!("{}: wrote {}", scores.region, index_path.display());
        }
    }

    let report = RunReport::new(range, config.weights, outcomes);
    let report_path = output_dir.join(PERSISTENCE.output.report_filename);
    report.save_to_path(&report_path)?;

    let failed = report.failed_regions();
    if failed == outcomes.len() && !outcomes.is_empty() {
        bail!("No region could be scored; see {}", report_path.display());
    }
    if failed > 0 {
        log::warn!("{} of {} regions failed; see {}", failed, outcomes.len(), report_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_regions() {
        assert_eq!(select_regions(&[]).unwrap().len(), 9);

        let picked = select_regions(&["28710".to_string(), "michuhol".to_string()]).unwrap();
        let codes: Vec<&str> = picked.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["28710", "28177"]);

        assert!(select_regions(&["Gangnam".to_string()]).is_err());
    }

    #[test]
    fn test_cli_defaults_and_band() {
        let cli = Cli::parse_from(["fear-greed"]);
        assert_eq!(cli.start.to_string(), "201512");
        assert_eq!(cli.end.to_string(), "202402");
        assert!(cli.band.is_none());

        let cli = Cli::parse_from(["fear-greed", "--band", "20_30", "--region", "Yeonsu", "--region", "Jung-gu"]);
        assert_eq!(cli.band, Some(SizeBand::From20To30));
        assert_eq!(cli.regions.len(), 2);
        assert!(Cli::try_parse_from(["fear-greed", "--start", "2015-12"]).is_err());
    }

    #[test]
    fn test_run_app_writes_outputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("tx")).unwrap();
        std::fs::write(
            root.join("tx/28710.csv"),
            "region_code,year,month,exclusive_use_area,trade_amount\n\
             28710,2015,12,59.9,\"20,000\"\n\
             28710,2016,1,59.9,\"21,000\"\n\
             28710,2016,2,84.9,\"30,500\"\n\
             28710,2016,3,59.9,\"20,800\"\n\
             28710,2016,3,-1,\"20,800\"\n",
        )
        .unwrap();
        std::fs::write(root.join("search.csv"), "년월,검색량_평균\n201601,40\n201602,45\n").unwrap();
        std::fs::write(
            root.join("psy.csv"),
            "C1_NM,PRD_DE,normalized_DT\n\
             인천광역시,2016-01-01,55\n\
             인천광역시,2016-02-01,57\n\
             인천광역시,2016-03-01,52\n",
        )
        .unwrap();

        let arg = |p: &str| root.join(p).to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "fear-greed".to_string(),
            "--transactions-dir".to_string(),
            arg("tx"),
            "--search-volume".to_string(),
            arg("search.csv"),
            "--psychology".to_string(),
            arg("psy.csv"),
            "--output-dir".to_string(),
            arg("out"),
            "--start".to_string(),
            "201601".to_string(),
            "--end".to_string(),
            "201603".to_string(),
            "--region".to_string(),
            "Ganghwa".to_string(),
            "--no-cache".to_string(),
        ]);
        run_app(&cli).unwrap();

        // March has no search volume, so only two rows are written
        let index = std::fs::read_to_string(root.join("out/Ganghwa_fear_greed_index_full.csv")).unwrap();
        assert_eq!(index.lines().count(), 3);
        assert!(index.lines().nth(1).unwrap().starts_with("201601,2016-01-01,"));

        // The lookback month is part of the summaries
        let summary = std::fs::read_to_string(root.join("out/Ganghwa_data_summary.csv")).unwrap();
        assert!(summary.lines().nth(1).unwrap().starts_with("201512,"));

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(root.join("out/run_report.json")).unwrap()).unwrap();
        assert_eq!(report["regions"][0]["rows_written"], 2);
        assert_eq!(report["regions"][0]["skipped"]["invalid_record"], 1);
        assert_eq!(report["regions"][0]["skipped"]["external_series_miss"], 1);
    }

    #[test]
    fn test_cached_run_reports_same_skips() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("tx")).unwrap();
        std::fs::write(
            root.join("tx/28710.csv"),
            "region_code,year,month,exclusive_use_area,trade_amount\n\
             28710,2016,1,59.9,\"21,000\"\n\
             28710,2016,2,84.9,\"30,500\"\n\
             28710,2016,2,-1,\"20,800\"\n",
        )
        .unwrap();
        std::fs::write(root.join("search.csv"), "년월,검색량_평균\n201601,40\n201602,45\n").unwrap();
        std::fs::write(
            root.join("psy.csv"),
            "C1_NM,PRD_DE,normalized_DT\n\
             인천광역시,2016-01-01,55\n\
             인천광역시,2016-02-01,57\n",
        )
        .unwrap();

        let arg = |p: &str| root.join(p).to_string_lossy().into_owned();
        let cli = Cli::parse_from([
            "fear-greed".to_string(),
            "--transactions-dir".to_string(),
            arg("tx"),
            "--search-volume".to_string(),
            arg("search.csv"),
            "--psychology".to_string(),
            arg("psy.csv"),
            "--output-dir".to_string(),
            arg("out"),
            "--cache-dir".to_string(),
            arg("cache"),
            "--start".to_string(),
            "201601".to_string(),
            "--end".to_string(),
            "201602".to_string(),
            "--region".to_string(),
            "Ganghwa".to_string(),
        ]);
        let invalid_records = || {
            run_app(&cli).unwrap();
            let report: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(root.join("out/run_report.json")).unwrap())
                    .unwrap();
            report["regions"][0]["skipped"]["invalid_record"].clone()
        };

        assert_eq!(invalid_records(), 1);
        // The transaction file is gone, so the second run can only come from the cache
        std::fs::remove_file(root.join("tx/28710.csv")).unwrap();
        assert_eq!(invalid_records(), 1);
    }
}
