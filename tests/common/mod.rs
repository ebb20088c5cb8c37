//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use lagplot::data::SeriesSource;
use lagplot::domain::{Series, SeriesId};
use lagplot::error::AppError;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn id(raw: &str) -> SeriesId {
    SeriesId::new(raw).unwrap()
}

/// One observation per month start in `[first, last]`.
pub fn monthly(name: &str, first: NaiveDate, last: NaiveDate, value: impl Fn(usize) -> Option<f64>) -> Series {
    let mut s = Series::new(id(name));
    let mut date = first;
    let mut i = 0;
    while date <= last {
        s.points.insert(date, value(i));
        date = date.checked_add_months(Months::new(1)).unwrap();
        i += 1;
    }
    s
}

/// One observation per weekday in `[first, last]`.
pub fn business_daily(name: &str, first: NaiveDate, last: NaiveDate, value: impl Fn(usize) -> Option<f64>) -> Series {
    let mut s = Series::new(id(name));
    let mut date = first;
    let mut i = 0;
    while date <= last {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            s.points.insert(date, value(i));
            i += 1;
        }
        date = date.checked_add_days(Days::new(1)).unwrap();
    }
    s
}

/// In-memory source: serves canned series, fails on request for listed ids.
#[derive(Default)]
pub struct FakeSource {
    series: HashMap<SeriesId, Series>,
    failing: HashSet<SeriesId>,
    ignore_window: bool,
    pub requests: RefCell<Vec<SeriesId>>,
}

impl FakeSource {
    pub fn with(mut self, series: Series) -> Self {
        self.series.insert(series.id.clone(), series);
        self
    }

    pub fn failing(mut self, raw: &str) -> Self {
        self.failing.insert(id(raw));
        self
    }

    /// Serve whole series regardless of the requested window.
    pub fn ignoring_window(mut self) -> Self {
        self.ignore_window = true;
        self
    }
}

impl SeriesSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate) -> Result<Series, AppError> {
        self.requests.borrow_mut().push(id.clone());
        if self.failing.contains(id) {
            return Err(AppError::fetch(id.as_str(), "connection reset"));
        }
        match self.series.get(id) {
            Some(s) if self.ignore_window => Ok(s.clone()),
            Some(s) => Ok(s.window(start, end)),
            None => Err(AppError::invalid_series(id.as_str(), "The series does not exist.")),
        }
    }
}
