//! Period resampling.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Granularity, Series, month_start};

/// Resample `series` to `granularity`.
pub fn resample(series: &Series, granularity: Granularity) -> Series {
    match granularity {
        Granularity::Monthly => resample_monthly(series),
        Granularity::Daily => series.clone(),
    }
}

/// Collapse observations into calendar months (mean of published values).
///
/// Each month is indexed at its first day. Null observations are skipped; a month
/// with no published value becomes a null month. A series already indexed on month
/// starts with one value per month comes back unchanged.
pub fn resample_monthly(series: &Series) -> Series {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for (date, value) in &series.points {
        let entry = buckets.entry(month_start(*date)).or_insert((0.0, 0));
        if let Some(v) = value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    Series {
        id: series.id.clone(),
        points: buckets
            .into_iter()
            .map(|(month, (sum, n))| (month, (n > 0).then(|| sum / n as f64)))
            .collect(),
    }
}
