//! Asset price vs a shifted monetary aggregate.
//!
//! The asset (primary) sits on a logarithmic left axis. The aggregate (secondary)
//! is rebased so its first aligned observation reads 100 and drawn on a linear
//! right axis.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::{
    DrawResult, FONT, GRID_BOLD, GRID_LIGHT, TickAxis, decimal_year, ensure_parent, format_year_tick,
    log_bounds, log_ticks, min_max, month_ticks, padded_range, render_error, x_range, year_ticks,
};
use crate::domain::ChartConfig;
use crate::error::AppError;
use crate::transform::AlignedPair;

const ASSET_COLOR: RGBColor = RGBColor(0xf7, 0x93, 0x1a);
const AGGREGATE_COLOR: RGBColor = RGBColor(0x00, 0xaa, 0x00);
const TEXT_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);
/// Monthly minor grid lines are drawn only up to this many years of axis.
const MONTH_GRID_MAX_YEARS: f64 = 6.0;

/// Rebase `values` so the first element becomes 100.
///
/// `None` when the base is zero or not finite.
pub fn rebase_to_100(values: &[f64]) -> Option<Vec<f64>> {
    let base = *values.first()?;
    if base == 0.0 || !base.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| v / base * 100.0).collect())
}

/// Render the paired-asset chart to `path` (SVG).
pub fn render_paired(pair: &AlignedPair, config: &ChartConfig, path: &Path) -> Result<(), AppError> {
    if pair.is_empty() {
        return Err(AppError::Render("aligned pair is empty".to_string()));
    }
    let index = rebase_to_100(&pair.secondary).ok_or_else(|| {
        AppError::Render(format!(
            "cannot rebase {}: first aligned value is zero",
            pair.secondary_id
        ))
    })?;
    let asset: Vec<f64> = pair.primary.iter().copied().filter(|v| *v > 0.0).collect();
    if asset.is_empty() {
        return Err(AppError::Render(format!(
            "{} has no positive values for a log axis",
            pair.primary_id
        )));
    }

    ensure_parent(path)?;
    draw(pair, &index, config, path).map_err(render_error)?;
    info!(path = %path.display(), points = pair.len(), "wrote paired chart");
    Ok(())
}

fn draw(pair: &AlignedPair, index: &[f64], config: &ChartConfig, path: &Path) -> DrawResult {
    let (first, last) = match (pair.first_date(), pair.last_date()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Ok(()),
    };
    let x = x_range(first, last, config.extend_years);
    let minor = if x.1 - x.0 <= MONTH_GRID_MAX_YEARS {
        month_ticks(x.0, x.1)
    } else {
        Vec::new()
    };
    let x_axis = TickAxis::linear(x.0, x.1, year_ticks(x.0, x.1, 1)).with_minor(minor);

    let positive: Vec<f64> = pair.primary.iter().copied().filter(|v| *v > 0.0).collect();
    let (a_min, a_max) = min_max(&positive).unwrap_or((1.0, 10.0));
    let (lo, hi) = log_bounds(a_min, a_max);
    let left_axis = TickAxis::log(lo, hi, log_ticks(lo, hi));

    let (i_min, i_max) = min_max(index).unwrap_or((100.0, 100.0));
    let (r0, r1) = padded_range(i_min, i_max, 0.05);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs {} (shifted {})", pair.primary_id, pair.secondary_id, pair.offset),
            (FONT, 20),
        )
        .margin(16)
        .x_label_area_size(36)
        .y_label_area_size(72)
        .right_y_label_area_size(64)
        .build_cartesian_2d(x_axis, left_axis)?
        .set_secondary_coord(x.0..x.1, r0..r1);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(&GRID_BOLD)
        .light_line_style(&GRID_LIGHT)
        .x_label_formatter(&|v| format_year_tick(*v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_desc(format!("{} (USD, log)", pair.primary_id))
        .label_style((FONT, 12).into_font().color(&TEXT_COLOR))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_desc(format!("{} index (base 100, linear)", pair.secondary_id))
        .label_style((FONT, 12).into_font().color(&TEXT_COLOR))
        .draw()?;

    let asset_points: Vec<(f64, f64)> = pair
        .primary_points()
        .filter(|(_, v)| *v > 0.0)
        .map(|(d, v)| (decimal_year(d), v))
        .collect();
    let index_points: Vec<(f64, f64)> = pair
        .dates
        .iter()
        .zip(index.iter())
        .map(|(d, v)| (decimal_year(*d), *v))
        .collect();

    chart
        .draw_series(LineSeries::new(asset_points.iter().copied(), ASSET_COLOR.stroke_width(2)))?
        .label(format!("{} (USD, log-scale)", pair.primary_id))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ASSET_COLOR.stroke_width(2)));
    chart
        .draw_secondary_series(LineSeries::new(index_points.iter().copied(), AGGREGATE_COLOR.stroke_width(2)))?
        .label(format!("{} index (base 100)", pair.secondary_id))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AGGREGATE_COLOR.stroke_width(2)));

    if pair.len() < 2 {
        chart.draw_series(asset_points.iter().map(|&p| Circle::new(p, 4, ASSET_COLOR.filled())))?;
        chart.draw_secondary_series(index_points.iter().map(|&p| Circle::new(p, 4, AGGREGATE_COLOR.filled())))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&TRANSPARENT)
        .label_font((FONT, 13))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Offset, SeriesId};
    use chrono::{Days, NaiveDate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn pair(n: u64) -> AlignedPair {
        let dates: Vec<NaiveDate> = (0..n).map(|i| d(2024, 7, 1).checked_add_days(Days::new(i)).unwrap()).collect();
        AlignedPair {
            primary_id: SeriesId::new("CBBTCUSD").unwrap(),
            secondary_id: SeriesId::new("M2SL").unwrap(),
            offset: Offset::days(94),
            primary: (0..n).map(|i| 60_000.0 + i as f64 * 100.0).collect(),
            secondary: (0..n).map(|i| 21_000.0 + i as f64).collect(),
            dates,
            trimmed: 0,
        }
    }

    fn config() -> ChartConfig {
        ChartConfig {
            offset: Offset::days(94),
            start: d(2024, 1, 1),
            end: d(2024, 12, 31),
            extend_years: 1,
            width: 960,
            height: 480,
        }
    }

    #[test]
    fn rebase_starts_at_100() {
        assert_eq!(rebase_to_100(&[50.0, 75.0, 100.0]), Some(vec![100.0, 150.0, 200.0]));
        assert_eq!(rebase_to_100(&[0.0, 1.0]), None);
        assert_eq!(rebase_to_100(&[]), None);
    }

    #[test]
    fn renders_tick_labels_and_legend() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("btc_m2.svg");
        render_paired(&pair(10), &config(), &out).unwrap();
        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        // Yearly x tick inside the extended axis, 1-2-5 tick on the log axis.
        assert!(svg.contains("2025"), "missing x tick label");
        assert!(svg.contains("50000"), "missing log tick label");
        assert!(svg.contains("CBBTCUSD (USD, log-scale)"));
        assert!(svg.contains("M2SL index (base 100)"));
    }

    #[test]
    fn single_point_renders() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("one.svg");
        let mut cfg = config();
        cfg.extend_years = 0;
        render_paired(&pair(1), &cfg, &out).unwrap();
        assert!(out.exists());
    }
}
