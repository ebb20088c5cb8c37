//! Reporting utilities: run summaries printed to stdout.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::SeriesId;

pub mod format;

pub use format::*;

/// Outcome of refreshing one identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRefresh {
    pub id: SeriesId,
    pub rows: usize,
    pub nulls: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

/// Outcome of a whole `refresh` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub store: PathBuf,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: Vec<SeriesRefresh>,
}

impl RefreshReport {
    pub fn total_rows(&self) -> usize {
        self.series.iter().map(|s| s.rows).sum()
    }
}
