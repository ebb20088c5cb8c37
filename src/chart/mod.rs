//! SVG chart rendering with Plotters.
//!
//! Three layouts share the helpers in this module:
//!
//! - [`styled`]: unemployment vs oil, fixed percentage axis + doubling log axis
//! - [`paired`]: asset price (log) vs a rebased monetary aggregate
//! - [`multi`]: any number of series on one axis pair
//!
//! Axes with hand-picked ticks go through [`axis::TickAxis`].
//!
//! The x axis is always in decimal years so tick placement is plain float math.
//! Every range helper widens degenerate spans, so a single aligned point still
//! produces a drawable chart.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use plotters::style::RGBColor;

use crate::error::AppError;

pub mod axis;
pub mod multi;
pub mod paired;
pub mod styled;

pub use axis::TickAxis;
pub use multi::render_multi;
pub use paired::render_paired;
pub use styled::render_styled;

/// Boxed error used inside drawing closures; converted to [`AppError::Render`] at the edge.
pub(crate) type DrawResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const GRID_BOLD: RGBColor = RGBColor(200, 200, 200);
pub(crate) const GRID_LIGHT: RGBColor = RGBColor(238, 238, 238);
pub(crate) const FOOTNOTE: RGBColor = RGBColor(128, 128, 128);

/// Line colors for the multi-series chart (cycled).
pub(crate) const PALETTE: [RGBColor; 6] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x99, 0x00),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
];

/// Smallest x span drawn, in years (one month).
pub(crate) const MIN_X_SPAN: f64 = 1.0 / 12.0;

/// Where a chart ends up: the explicit path, or `<dir>/<name>_<timestamp>.svg`.
///
/// Two runs within the same second produce the same derived path.
pub fn resolve_output_path(
    explicit: Option<&Path>,
    output_dir: &Path,
    chart_name: &str,
    now: NaiveDateTime,
) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(format!("{chart_name}_{}.svg", now.format("%Y%m%d_%H%M%S"))),
    }
}

/// Create the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub(crate) fn render_error(err: Box<dyn std::error::Error>) -> AppError {
    AppError::Render(err.to_string())
}

/// `2024-07-01` -> `2024.4973`.
pub fn decimal_year(date: NaiveDate) -> f64 {
    let year = date.year();
    let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    f64::from(year) + f64::from(date.ordinal0()) / days_in_year
}

/// X-axis bounds from the first/last data dates plus `extend_years` of empty axis.
pub fn x_range(first: NaiveDate, last: NaiveDate, extend_years: u32) -> (f64, f64) {
    let x0 = decimal_year(first);
    let x1 = decimal_year(last) + f64::from(extend_years);
    widen(x0, x1, MIN_X_SPAN)
}

/// Ensure `hi - lo >= min_span`, growing symmetrically around the midpoint.
pub fn widen(lo: f64, hi: f64, min_span: f64) -> (f64, f64) {
    if hi - lo >= min_span {
        return (lo, hi);
    }
    let mid = (lo + hi) / 2.0;
    (mid - min_span / 2.0, mid + min_span / 2.0)
}

/// Data bounds padded by `frac` of the span on each side.
///
/// Constant data gets a unit-relative pad so the axis never collapses.
pub fn padded_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 {
        span * frac
    } else {
        (min.abs() * frac).max(0.5)
    };
    (min - pad, max + pad)
}

/// Whole years in `[x0, x1]` that are multiples of `step`.
///
/// Falls back to every year, then to the range endpoints, so the result is never empty.
pub fn year_ticks(x0: f64, x1: f64, step: i32) -> Vec<f64> {
    let collect = |step: i32| -> Vec<f64> {
        let first = x0.ceil() as i32;
        let last = x1.floor() as i32;
        (first..=last)
            .filter(|y| y.rem_euclid(step.max(1)) == 0)
            .map(f64::from)
            .collect()
    };
    let ticks = collect(step);
    if !ticks.is_empty() {
        return ticks;
    }
    let ticks = collect(1);
    if !ticks.is_empty() {
        return ticks;
    }
    vec![x0, x1]
}

/// Month starts in `[x0, x1]`, for minor grid lines on short ranges.
pub fn month_ticks(x0: f64, x1: f64) -> Vec<f64> {
    let first_year = x0.floor() as i32;
    let last_year = x1.ceil() as i32;
    (first_year..=last_year)
        .flat_map(|y| (1..=12).filter_map(move |m| NaiveDate::from_ymd_opt(y, m, 1)))
        .map(decimal_year)
        .filter(|x| (x0..=x1).contains(x))
        .collect()
}

/// `floor, 2*floor, 4*floor, ...` up to the first value covering `max`.
pub fn doubling_ticks(floor: f64, max: f64) -> Vec<f64> {
    let mut ticks = vec![floor];
    let mut v = floor;
    while v < max {
        v *= 2.0;
        ticks.push(v);
    }
    if ticks.len() < 2 {
        ticks.push(floor * 2.0);
    }
    ticks
}

/// 1-2-5 ticks per decade covering `[min, max]` for a log axis.
pub fn log_ticks(min: f64, max: f64) -> Vec<f64> {
    let lo = min.log10().floor() as i32;
    let hi = max.log10().ceil() as i32;
    let mut out = Vec::new();
    for exp in lo..=hi {
        let base = 10f64.powi(exp);
        for m in [1.0, 2.0, 5.0] {
            let v = m * base;
            if v >= min && v <= max {
                out.push(v);
            }
        }
    }
    if out.is_empty() {
        out.extend([min, max]);
    }
    out
}

/// Decade-aligned bounds for a log axis over positive data.
pub fn log_bounds(min: f64, max: f64) -> (f64, f64) {
    let lo = 10f64.powi(min.log10().floor() as i32);
    let mut hi = 10f64.powi(max.log10().ceil() as i32);
    if hi <= lo {
        hi = lo * 10.0;
    }
    (lo, hi)
}

/// Label for a decimal-year tick: `2024` on whole years, `2024-07` otherwise.
pub fn format_year_tick(x: f64) -> String {
    if (x - x.round()).abs() < 1e-6 {
        return format!("{:.0}", x.round());
    }
    let year = x.floor() as i32;
    let month = (1..=12)
        .rev()
        .find(|&m| NaiveDate::from_ymd_opt(year, m, 1).is_some_and(|d| decimal_year(d) <= x + 1e-9))
        .unwrap_or(1);
    format!("{year}-{month:02}")
}

/// Smallest and largest finite value.
pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut it = values.iter().copied().filter(|v| v.is_finite());
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Split `points` into runs of consecutive published values (gaps at nulls).
pub fn segments(points: impl IntoIterator<Item = (f64, Option<f64>)>) -> Vec<Vec<(f64, f64)>> {
    let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        match y {
            Some(y) if y.is_finite() => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn decimal_year_is_monotone_and_anchored() {
        assert_eq!(decimal_year(d(2024, 1, 1)), 2024.0);
        assert!(decimal_year(d(2024, 12, 31)) < 2025.0);
        assert!(decimal_year(d(2023, 6, 1)) < decimal_year(d(2023, 6, 2)));
    }

    #[test]
    fn single_point_range_is_widened() {
        let (x0, x1) = x_range(d(2024, 3, 1), d(2024, 3, 1), 0);
        assert!(x1 > x0);
        assert!((x1 - x0 - MIN_X_SPAN).abs() < 1e-9);
        assert!(!year_ticks(x0, x1, 5).is_empty());
    }

    #[test]
    fn year_ticks_respect_step() {
        assert_eq!(year_ticks(1998.3, 2012.0, 5), vec![2000.0, 2005.0, 2010.0]);
        assert_eq!(year_ticks(2021.2, 2023.5, 5), vec![2022.0, 2023.0]);
        assert_eq!(year_ticks(2024.1, 2024.2, 5), vec![2024.1, 2024.2]);
    }

    #[test]
    fn doubling_ticks_cover_max() {
        assert_eq!(doubling_ticks(10.0, 75.0), vec![10.0, 20.0, 40.0, 80.0]);
        assert_eq!(doubling_ticks(10.0, 5.0), vec![10.0, 20.0]);
    }

    #[test]
    fn padded_range_handles_constant_data() {
        let (lo, hi) = padded_range(4.0, 4.0, 0.05);
        assert!(hi > lo);
        let (lo, hi) = padded_range(0.0, 0.0, 0.05);
        assert!(hi > lo);
    }

    #[test]
    fn log_ticks_and_bounds() {
        assert_eq!(log_ticks(1.0, 100.0), vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]);
        assert_eq!(log_bounds(250.0, 250.0), (100.0, 1000.0));
        assert_eq!(log_bounds(100.0, 100.0), (100.0, 1000.0));
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_year_tick(2020.0), "2020");
        assert_eq!(format_year_tick(decimal_year(d(2024, 7, 1))), "2024-07");
    }

    #[test]
    fn segments_break_at_nulls() {
        let segs = segments(vec![(1.0, Some(1.0)), (2.0, None), (3.0, Some(3.0)), (4.0, Some(4.0))]);
        assert_eq!(segs, vec![vec![(1.0, 1.0)], vec![(3.0, 3.0), (4.0, 4.0)]]);
    }

    #[test]
    fn derived_output_path_uses_timestamp() {
        let now = d(2025, 5, 31).and_hms_opt(14, 3, 9).unwrap();
        let p = resolve_output_path(None, Path::new("outputs"), "oil_unrate", now);
        assert_eq!(p, PathBuf::from("outputs/oil_unrate_20250531_140309.svg"));
        let explicit = resolve_output_path(Some(Path::new("x/y.svg")), Path::new("outputs"), "n", now);
        assert_eq!(explicit, PathBuf::from("x/y.svg"));
    }
}
