use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use fear_greed::config::{ANALYSIS, PERSISTENCE};
use fear_greed::{MonthKey, MonthRange, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Writes deterministic synthetic inputs so the pipeline can run end to end offline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the demo inputs are written under
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Months of history generated before the default scoring range
    #[arg(long, default_value_t = 12)]
    warmup_months: u32,
}

// Exclusive-use areas (m2) typical of the region's apartment stock
const AREAS: [f64; 6] = [39.6, 59.9, 74.8, 84.9, 114.7, 134.9];

/// "12500" -> "12,500", as the upstream transaction feed writes amounts.
fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn demo_range(warmup_months: u32) -> Result<MonthRange> {
    let start: MonthKey = ANALYSIS.default_start_month.parse()?;
    let end: MonthKey = ANALYSIS.default_end_month.parse()?;
    let range = MonthRange::new(start, end).ok_or_else(|| anyhow!("empty demo range"))?;
    Ok(range.with_lookback(warmup_months))
}

// Market cycle shared by every region: a slow swing on a rising trend
fn market_level(index: usize) -> f64 {
    let t = index as f64;
    1.0 + 0.12 * (t / 14.0).sin() + 0.004 * t
}

fn write_transactions(dir: &Path, region: &Region, seed: u64, months: &[MonthKey]) -> Result<usize> {
    std::fs::create_dir_all(dir).context(format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", region.code()));
    let mut writer =
        csv::Writer::from_path(&path).context(format!("Failed to create file: {}", path.display()))?;
    writer.write_record(["region_code", "year", "month", "exclusive_use_area", "trade_amount"])?;

    // Same seed, same files
    let mut rng = StdRng::seed_from_u64(seed);
    // Price per m2 in 10k KRW
    let base_price = rng.gen_range(450.0..800.0);
    let mut rows = 0;
    for (i, month) in months.iter().enumerate() {
        let trades = rng.gen_range(4..18) + (8.0 * market_level(i)) as usize;
        for _ in 0..trades {
            let area = AREAS[rng.gen_range(0..AREAS.len())];
            let noise = 0.9 + rng.r#gen::<f64>() * 0.2;
            let amount = (area * base_price * market_level(i) * noise).round() as u64;
            writer.write_record([
                region.code().to_string(),
                month.year().to_string(),
                month.month().to_string(),
                format!("{:.2}", area),
                with_thousands(amount),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn write_search_volume(path: &Path, months: &[MonthKey]) -> Result<()> {
    let columns = &PERSISTENCE.external_columns;
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create file: {}", path.display()))?;
    writer.write_record([columns.search_month_column, columns.search_value_column])?;
    for (i, month) in months.iter().enumerate() {
        let volume = 50.0 + 30.0 * ((i as f64) / 9.0).sin() * market_level(i);
        writer.write_record([month.to_string(), format!("{:.2}", volume)])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_psychology(path: &Path, months: &[MonthKey]) -> Result<()> {
    let columns = &PERSISTENCE.external_columns;
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create file: {}", path.display()))?;
    writer.write_record([
        columns.psychology_scope_column,
        columns.psychology_date_column,
        columns.psychology_value_column,
    ])?;
    // A second scope exercises the scope filter
    for (scope, offset) in [(columns.psychology_scope, 0.0), ("서울특별시", 7.5)] {
        for (i, month) in months.iter().enumerate() {
            let value = (50.0 + offset + 35.0 * ((i as f64) / 11.0).cos()).clamp(0.0, 100.0);
            let date = month.first_day().format(columns.psychology_date_format);
            writer.write_record([scope.to_string(), date.to_string(), format!("{:.3}", value)])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let args = Args::parse();

    let range = demo_range(args.warmup_months)?;
    let months = range.months();
    let sources = &PERSISTENCE.sources;

    let transactions_dir = args.out_dir.join(sources.transactions_dir);
    for (seed, region) in Region::all().iter().enumerate() {
        let rows = write_transactions(&transactions_dir, region, seed as u64 + 1, &months)?;
        log::info!("{}: {} demo transactions", region, rows);
    }

    write_search_volume(&args.out_dir.join(sources.search_volume_path), &months)?;
    write_psychology(&args.out_dir.join(sources.psychology_path), &months)?;

    println!(
        "✅ Demo inputs for {} written under {:?} ({} months).",
        range,
        args.out_dir,
        months.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(950), "950");
        assert_eq!(with_thousands(12_500), "12,500");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_transactions_are_reproducible_per_seed() {
        let dir = TempDir::new().unwrap();
        let region = Region::new("Ganghwa", "28710");
        let months = demo_range(0).unwrap().months()[..6].to_vec();

        let write = |sub: &str, seed: u64| {
            let path = dir.path().join(sub);
            let rows = write_transactions(&path, &region, seed, &months).unwrap();
            (rows, std::fs::read_to_string(path.join("28710.csv")).unwrap())
        };
        let (rows, first) = write("a", 7);
        let (_, again) = write("b", 7);
        let (_, other) = write("c", 8);

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(first.lines().count(), rows + 1);
        assert!(rows >= 6 * 4);
    }
}
