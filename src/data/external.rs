use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::StringRecord;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::persistence::ExternalColumns;
use crate::domain::MonthKey;
use crate::models::{ExternalSeries, ExternalSeriesKind, ExternalSeriesSet};

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        .ok_or_else(|| anyhow!("{}: missing column {:?}", path.display(), name))
}

fn field<'r>(row: &'r StringRecord, index: usize) -> Result<&'r str> {
    row.get(index)
        .map(str::trim)
        .ok_or_else(|| anyhow!("row has no field {}", index))
}

fn parse_value(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .with_context(|| format!("Invalid value: {:?}", raw))
}

/// Adds a value, keeping the first one if the month is already present.
fn insert_logged(series: &mut ExternalSeries, path: &Path, month: MonthKey, value: f64) {
    if !series.insert_first(month, value) {
        log::warn!(
            "{}: duplicate {} for {}, keeping the first value",
            path.display(),
            series.kind,
            month
        );
    }
}

/// Monthly search volume keyed by a `YYYYMM` column.
pub fn load_search_volume(path: &Path, columns: &ExternalColumns) -> Result<ExternalSeries> {
    let mut reader = csv::Reader::from_path(path)
        .context(format!("Failed to open search volume file: {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let month_col = column_index(&headers, columns.search_month_column, path)?;
    let value_col = column_index(&headers, columns.search_value_column, path)?;

    let mut series = ExternalSeries::new(ExternalSeriesKind::SearchVolume);
    for (line, row) in reader.records().enumerate() {
        let parsed = row.map_err(anyhow::Error::from).and_then(|row| {
            let month: MonthKey = field(&row, month_col)?.parse()?;
            let value = parse_value(field(&row, value_col)?)?;
            Ok((month, value))
        });
        match parsed {
            Ok((month, value)) => insert_logged(&mut series, path, month, value),
            Err(e) => log::warn!("{}: skipping row {}: {:#}", path.display(), line + 1, e),
        }
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_csv_io {
        log::info!("Loaded {} search volume months from {}", series.len(), path.display());
    }
    Ok(series)
}

/// Psychology index rows for one geographic scope, dates reduced to their month.
pub fn load_psychology(path: &Path, columns: &ExternalColumns, scope: &str) -> Result<ExternalSeries> {
    let mut reader = csv::Reader::from_path(path)
        .context(format!("Failed to open psychology file: {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let scope_col = column_index(&headers, columns.psychology_scope_column, path)?;
    let date_col = column_index(&headers, columns.psychology_date_column, path)?;
    let value_col = column_index(&headers, columns.psychology_value_column, path)?;

    let mut series = ExternalSeries::new(ExternalSeriesKind::Psychology);
    for (line, row) in reader.records().enumerate() {
        let parsed = row.map_err(anyhow::Error::from).and_then(|row| {
            if field(&row, scope_col)? != scope {
                return Ok(None);
            }
            let raw_date = field(&row, date_col)?;
            let date = NaiveDate::parse_from_str(raw_date, columns.psychology_date_format)
                .with_context(|| format!("Invalid date: {:?}", raw_date))?;
            let value = parse_value(field(&row, value_col)?)?;
            Ok(Some((MonthKey::from_date(date), value)))
        });
        match parsed {
            Ok(Some((month, value))) => insert_logged(&mut series, path, month, value),
            Ok(None) => {}
            Err(e) => log::warn!("{}: skipping row {}: {:#}", path.display(), line + 1, e),
        }
    }

    if series.is_empty() {
        log::warn!("{}: no psychology rows for scope {:?}", path.display(), scope);
    }
    Ok(series)
}

pub fn load_external_series(
    search_volume_path: &Path,
    psychology_path: &Path,
    columns: &ExternalColumns,
    psychology_scope: &str,
) -> Result<ExternalSeriesSet> {
    Ok(ExternalSeriesSet {
        search_volume: load_search_volume(search_volume_path, columns)?,
        psychology: load_psychology(psychology_path, columns, psychology_scope)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PERSISTENCE;
    use std::fs;
    use tempfile::TempDir;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_search_volume_keeps_first_duplicate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.csv");
        fs::write(
            &path,
            "년월,검색량_평균\n201512,41.5\n201601,44\n201601,99\nbad,1\n201602,\n",
        )
        .unwrap();

        let series = load_search_volume(&path, &PERSISTENCE.external_columns).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(month("201512")), Some(41.5));
        assert_eq!(series.get(month("201601")), Some(44.0));
        assert_eq!(series.get(month("201602")), None);
    }

    #[test]
    fn test_psychology_filters_scope_and_converts_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("psychology.csv");
        fs::write(
            &path,
            "C1_NM,PRD_DE,normalized_DT\n\
             인천광역시,2015-12-01,63.2\n\
             서울특별시,2015-12-01,70.0\n\
             인천광역시,2016-01-01,58.9\n",
        )
        .unwrap();

        let series = load_psychology(&path, &PERSISTENCE.external_columns, "인천광역시").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(month("201512")), Some(63.2));
        assert_eq!(series.get(month("201601")), Some(58.9));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.csv");
        fs::write(&path, "month,volume\n201512,1\n").unwrap();
        let err = load_search_volume(&path, &PERSISTENCE.external_columns).unwrap_err();
        assert!(err.to_string().contains("년월"));
    }
}
