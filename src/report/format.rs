//! Formatted terminal output.
//!
//! We keep formatting code in one place so output changes are localized and the
//! golden tests below pin the exact layout.

use chrono::NaiveDate;

use super::RefreshReport;
use crate::store::TableInfo;
use crate::transform::AlignedPair;

/// Per-series rows written plus a batch total.
pub fn format_refresh_report(report: &RefreshReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Refreshed {} series into {} ({} .. {})\n",
        report.series.len(),
        report.store.display(),
        report.start,
        report.end
    ));
    for s in &report.series {
        out.push_str(&format!(
            "  {:<12} rows={:<6} nulls={:<5} {} .. {}\n",
            s.id.as_str(),
            s.rows,
            s.nulls,
            fmt_date(s.first),
            fmt_date(s.last)
        ));
    }
    out.push_str(&format!("Total rows: {}\n", report.total_rows()));
    out
}

/// Stored identifiers, one per line.
pub fn format_store_listing(tables: &[TableInfo]) -> String {
    if tables.is_empty() {
        return "No series stored yet. Run `lagplot refresh` first.\n".to_string();
    }
    let mut out = format!("{:<12} {:>8}  {:<10} .. {:<10}\n", "SERIES", "ROWS", "FIRST", "LAST");
    for t in tables {
        out.push_str(&format!(
            "{:<12} {:>8}  {:<10} .. {:<10}\n",
            t.id.as_str(),
            t.rows,
            fmt_date(t.first),
            fmt_date(t.last)
        ));
    }
    out
}

/// Summary of an aligned pair: span, length, trim, and value ranges.
pub fn format_alignment_summary(pair: &AlignedPair) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Aligned {} with {} shifted {}\n",
        pair.primary_id, pair.secondary_id, pair.offset
    ));
    out.push_str(&format!(
        "Points: n={} | {} .. {}\n",
        pair.len(),
        fmt_date(pair.first_date()),
        fmt_date(pair.last_date())
    ));
    if pair.trimmed > 0 {
        out.push_str(&format!(
            "Trimmed {} trailing period(s) not yet published for {}\n",
            pair.trimmed, pair.primary_id
        ));
    }
    out.push_str(&format!("{:<12} {}\n", pair.primary_id.as_str(), fmt_range(&pair.primary)));
    out.push_str(&format!("{:<12} {}\n", pair.secondary_id.as_str(), fmt_range(&pair.secondary)));
    out
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_range(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        format!("min={min:.2} max={max:.2}")
    } else {
        "min=- max=-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Offset, SeriesId};
    use crate::report::SeriesRefresh;
    use std::path::PathBuf;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn refresh_report_golden() {
        let report = RefreshReport {
            store: PathBuf::from("data/fred.db"),
            start: d(2020, 1, 1),
            end: d(2020, 12, 31),
            series: vec![SeriesRefresh {
                id: SeriesId::new("UNRATE").unwrap(),
                rows: 12,
                nulls: 0,
                first: Some(d(2020, 1, 1)),
                last: Some(d(2020, 12, 1)),
            }],
        };
        let expected = concat!(
            "Refreshed 1 series into data/fred.db (2020-01-01 .. 2020-12-31)\n",
            "  UNRATE       rows=12     nulls=0     2020-01-01 .. 2020-12-01\n",
            "Total rows: 12\n",
        );
        assert_eq!(format_refresh_report(&report), expected);
    }

    #[test]
    fn empty_listing_hints_at_refresh() {
        assert!(format_store_listing(&[]).contains("lagplot refresh"));
    }

    #[test]
    fn alignment_summary_mentions_trim() {
        let pair = AlignedPair {
            primary_id: SeriesId::new("UNRATE").unwrap(),
            secondary_id: SeriesId::new("DCOILWTICO").unwrap(),
            offset: Offset::months(12),
            dates: vec![d(2021, 1, 1), d(2021, 2, 1)],
            primary: vec![6.4, 6.2],
            secondary: vec![57.5, 50.5],
            trimmed: 1,
        };
        let txt = format_alignment_summary(&pair);
        assert!(txt.starts_with("Aligned UNRATE with DCOILWTICO shifted +12 months\n"));
        assert!(txt.contains("Points: n=2 | 2021-01-01 .. 2021-02-01"));
        assert!(txt.contains("Trimmed 1 trailing period(s)"));
        assert!(txt.contains("min=50.50 max=57.50"));
    }
}
