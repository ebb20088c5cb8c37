//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - persisted to and reloaded from the local store
//! - transformed in-memory during alignment
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const MAX_ID_LEN: usize = 64;

/// A validated series identifier (e.g. `UNRATE`).
///
/// Identifiers double as SQLite table and column names, so only ASCII
/// alphanumerics and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeriesId(String);

impl SeriesId {
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AppError::invalid_series(raw, "identifier is empty"));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(AppError::invalid_series(
                raw,
                format!("identifier longer than {MAX_ID_LEN} characters"),
            ));
        }
        if let Some(bad) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(AppError::invalid_series(
                raw.clone(),
                format!("unexpected character {bad:?}"),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SeriesId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SeriesId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SeriesId> for String {
    fn from(value: SeriesId) -> Self {
        value.0
    }
}

/// A named, date-indexed sequence of observations.
///
/// The ordered map guarantees strictly increasing, unique dates.
/// `None` marks a date the provider listed without a published value.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: SeriesId,
    pub points: BTreeMap<NaiveDate, Option<f64>>,
}

impl Series {
    pub fn new(id: SeriesId) -> Self {
        Self {
            id,
            points: BTreeMap::new(),
        }
    }

    pub fn from_points(id: SeriesId, points: impl IntoIterator<Item = (NaiveDate, Option<f64>)>) -> Self {
        Self {
            id,
            points: points.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Last date that carries a published (non-null) value.
    pub fn last_valid_date(&self) -> Option<NaiveDate> {
        self.points
            .iter()
            .rev()
            .find(|(_, v)| v.is_some())
            .map(|(d, _)| *d)
    }

    /// Observations restricted to the inclusive window `[start, end]`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: self.id.clone(),
            points: self
                .points
                .range(start..=end)
                .map(|(d, v)| (*d, *v))
                .collect(),
        }
    }

    /// Number of null observations.
    pub fn null_count(&self) -> usize {
        self.points.values().filter(|v| v.is_none()).count()
    }
}

/// Unit of a lag/lead offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    Months,
    Days,
}

impl OffsetUnit {
    pub fn label(self) -> &'static str {
        match self {
            OffsetUnit::Months => "months",
            OffsetUnit::Days => "days",
        }
    }

    /// Granularity a series must be at before an offset in this unit is applied.
    pub fn granularity(self) -> Granularity {
        match self {
            OffsetUnit::Months => Granularity::Monthly,
            OffsetUnit::Days => Granularity::Daily,
        }
    }
}

/// Signed shift applied to a series' date index.
///
/// Positive moves values later in calendar time (lag), negative earlier (lead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub amount: i32,
    pub unit: OffsetUnit,
}

impl Offset {
    pub const fn months(amount: i32) -> Self {
        Self {
            amount,
            unit: OffsetUnit::Months,
        }
    }

    pub const fn days(amount: i32) -> Self {
        Self {
            amount,
            unit: OffsetUnit::Days,
        }
    }

    pub const fn inverse(self) -> Self {
        Self {
            amount: -self.amount,
            unit: self.unit,
        }
    }

    /// Move a single date by this offset. `None` when the result leaves chrono's range.
    ///
    /// Month shifts clamp the day-of-month (Jan 31 + 1 month = Feb 28/29), so they
    /// only invert exactly on month-start indices.
    pub fn apply(self, date: NaiveDate) -> Option<NaiveDate> {
        let magnitude = self.amount.unsigned_abs();
        match (self.unit, self.amount >= 0) {
            (OffsetUnit::Months, true) => date.checked_add_months(Months::new(magnitude)),
            (OffsetUnit::Months, false) => date.checked_sub_months(Months::new(magnitude)),
            (OffsetUnit::Days, true) => date.checked_add_days(Days::new(u64::from(magnitude))),
            (OffsetUnit::Days, false) => date.checked_sub_days(Days::new(u64::from(magnitude))),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+} {}", self.amount, self.unit.label())
    }
}

/// Period every aligned series is resampled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Calendar months, indexed at the first day of the month.
    Monthly,
    /// Observations kept at their native dates.
    Daily,
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month, so `with_day(1)` cannot fail.
    date.with_day(1).unwrap_or(date)
}

/// Settings that drive one alignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignConfig {
    pub offset: Offset,
    pub granularity: Granularity,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AlignConfig {
    /// Monthly alignment with an offset in months (the unemployment/oil layout).
    pub fn monthly(offset_months: i32, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            offset: Offset::months(offset_months),
            granularity: Granularity::Monthly,
            start,
            end,
        }
    }

    /// Daily alignment with an offset in days (the asset/monetary-aggregate layout).
    pub fn daily(offset_days: i32, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            offset: Offset::days(offset_days),
            granularity: Granularity::Daily,
            start,
            end,
        }
    }
}

/// Per-invocation chart settings. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub offset: Offset,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Years of empty axis drawn past `end`.
    pub extend_years: u32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn series_id_rejects_sql_metacharacters() {
        assert!(SeriesId::new("UNRATE").is_ok());
        assert!(SeriesId::new("GLOBAL_M2").is_ok());
        assert!(SeriesId::new("").is_err());
        assert!(SeriesId::new("UNRATE; DROP TABLE x").is_err());
        assert!(SeriesId::new("a\"b").is_err());
        assert!(SeriesId::new("X".repeat(65)).is_err());
    }

    #[test]
    fn offset_apply_handles_both_signs() {
        assert_eq!(Offset::months(12).apply(d(2020, 1, 1)), Some(d(2021, 1, 1)));
        assert_eq!(Offset::months(-3).apply(d(2020, 1, 1)), Some(d(2019, 10, 1)));
        assert_eq!(Offset::days(94).apply(d(2024, 1, 1)), Some(d(2024, 4, 4)));
        assert_eq!(Offset::days(-1).apply(d(2024, 3, 1)), Some(d(2024, 2, 29)));
    }

    #[test]
    fn last_valid_date_skips_trailing_nulls() {
        let id = SeriesId::new("X").unwrap();
        let s = Series::from_points(
            id,
            [(d(2024, 1, 1), Some(1.0)), (d(2024, 2, 1), Some(2.0)), (d(2024, 3, 1), None)],
        );
        assert_eq!(s.last_date(), Some(d(2024, 3, 1)));
        assert_eq!(s.last_valid_date(), Some(d(2024, 2, 1)));
        assert_eq!(s.null_count(), 1);
    }

    #[test]
    fn window_is_inclusive() {
        let id = SeriesId::new("X").unwrap();
        let s = Series::from_points(
            id,
            (1..=12).map(|m| (d(2024, m, 1), Some(f64::from(m)))),
        );
        let w = s.window(d(2024, 3, 1), d(2024, 5, 1));
        assert_eq!(w.len(), 3);
        assert_eq!(w.first_date(), Some(d(2024, 3, 1)));
        assert_eq!(w.last_date(), Some(d(2024, 5, 1)));
    }
}
