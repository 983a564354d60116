use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar month, rendered and joined on as a zero-padded `YYYYMM` string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month key '{0}' (expected YYYYMM)")]
pub struct ParseMonthKeyError(pub String);

impl MonthKey {
    /// Returns `None` unless `month` is 1..=12 and `year` fits in four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((0..=9999).contains(&year) && (1..=12).contains(&month)).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // Always valid: year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The month `count` months earlier, or `None` before year 0.
    pub fn months_before(&self, count: u32) -> Option<Self> {
        let total = i64::from(self.year) * 12 + i64::from(self.month) - 1 - i64::from(count);
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        Self::new(year, total.rem_euclid(12) as u32 + 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseMonthKeyError(s.to_string()));
        }
        let year: i32 = trimmed[..4]
            .parse()
            .map_err(|_| ParseMonthKeyError(s.to_string()))?;
        let month: u32 = trimmed[4..]
            .parse()
            .map_err(|_| ParseMonthKeyError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| ParseMonthKeyError(s.to_string()))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ParseMonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Inclusive range of months, e.g. the span requested from the transaction source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: MonthKey,
    pub end: MonthKey,
}

impl MonthRange {
    /// Returns `None` if `end` precedes `start`.
    pub fn new(start: MonthKey, end: MonthKey) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, month: MonthKey) -> bool {
        self.start <= month && month <= self.end
    }

    /// The same range starting `count` months earlier, clamped at year 0.
    pub fn with_lookback(&self, count: u32) -> Self {
        let start = self
            .start
            .months_before(count)
            .unwrap_or(MonthKey { year: 0, month: 1 });
        Self { start, end: self.end }
    }

    /// Every month in the range, ascending.
    pub fn months(&self) -> Vec<MonthKey> {
        std::iter::successors(Some(self.start), |m| m.next())
            .take_while(|m| *m <= self.end)
            .collect()
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        let key = MonthKey::new(2016, 3).unwrap();
        assert_eq!(key.to_string(), "201603");
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert!("201613".parse::<MonthKey>().is_err());
        assert!("20161".parse::<MonthKey>().is_err());
        assert!("2016-01".parse::<MonthKey>().is_err());
        assert!("201600".parse::<MonthKey>().is_err());
        assert_eq!(
            "201512".parse::<MonthKey>().unwrap(),
            MonthKey::new(2015, 12).unwrap()
        );
    }

    #[test]
    fn test_range_crosses_year_boundary() {
        let range = MonthRange::new(
            MonthKey::new(2015, 11).unwrap(),
            MonthKey::new(2016, 2).unwrap(),
        )
        .unwrap();
        let months: Vec<String> = range.months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["201511", "201512", "201601", "201602"]);
        assert!(range.contains(MonthKey::new(2016, 1).unwrap()));
        assert!(!range.contains(MonthKey::new(2016, 3).unwrap()));
    }

    #[test]
    fn test_lookback_crosses_years() {
        let key = MonthKey::new(2015, 12).unwrap();
        assert_eq!(key.months_before(12), MonthKey::new(2014, 12));
        assert_eq!(key.months_before(14), MonthKey::new(2014, 10));
        assert_eq!(key.months_before(0), Some(key));
        assert_eq!(MonthKey::new(0, 3).unwrap().months_before(3), None);

        let range = MonthRange::new(key, MonthKey::new(2024, 2).unwrap()).unwrap();
        assert_eq!(range.with_lookback(12).to_string(), "201412-202402");
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let a = MonthKey::new(2020, 5).unwrap();
        let b = MonthKey::new(2020, 4).unwrap();
        assert!(MonthRange::new(a, b).is_none());
    }

    #[test]
    fn test_first_day() {
        let key = MonthKey::new(2024, 2).unwrap();
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(MonthKey::from_date(key.first_day()), key);
    }
}
