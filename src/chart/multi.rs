//! Any number of series on a single axis pair.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::{
    DrawResult, FONT, GRID_BOLD, GRID_LIGHT, MIN_X_SPAN, PALETTE, TickAxis, decimal_year,
    ensure_parent, format_year_tick, min_max, padded_range, render_error, segments, widen, year_ticks,
};
use crate::domain::Series;
use crate::error::AppError;

const MAJOR_YEARS: i32 = 5;
const Y_PADDING: f64 = 0.05;

/// Render `series` on one shared axis pair to `path` (SVG).
///
/// Interior nulls break a line into separate runs.
pub fn render_multi(series: &[Series], size: (u32, u32), path: &Path) -> Result<(), AppError> {
    let values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.values().flatten().copied())
        .filter(|v| v.is_finite())
        .collect();
    let (y_min, y_max) = min_max(&values)
        .ok_or_else(|| AppError::Render("no published values to plot".to_string()))?;

    let first = series.iter().filter_map(Series::first_date).min();
    let last = series.iter().filter_map(Series::last_date).max();
    let (Some(first), Some(last)) = (first, last) else {
        return Err(AppError::Render("no dates to plot".to_string()));
    };

    let x = widen(decimal_year(first), decimal_year(last), MIN_X_SPAN);
    let y = padded_range(y_min, y_max, Y_PADDING);

    ensure_parent(path)?;
    draw(series, x, y, size, path).map_err(render_error)?;
    info!(path = %path.display(), series = series.len(), "wrote multi-series chart");
    Ok(())
}

fn draw(series: &[Series], x: (f64, f64), y: (f64, f64), size: (u32, u32), path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let title = series
        .iter()
        .map(|s| s.id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let x_axis = TickAxis::linear(x.0, x.1, year_ticks(x.0, x.1, MAJOR_YEARS)).with_minor(year_ticks(x.0, x.1, 1));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 20))
        .margin(16)
        .x_label_area_size(36)
        .y_label_area_size(64)
        .build_cartesian_2d(x_axis, y.0..y.1)?;

    chart
        .configure_mesh()
        .bold_line_style(&GRID_BOLD)
        .light_line_style(&GRID_LIGHT)
        .x_label_formatter(&|v| format_year_tick(*v))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .label_style((FONT, 13))
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let runs = segments(s.points.iter().map(|(d, v)| (decimal_year(*d), *v)));
        for (j, run) in runs.iter().enumerate() {
            let drawn = chart.draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(2)))?;
            if j == 0 {
                drawn
                    .label(s.id.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }
            if run.len() < 2 {
                chart.draw_series(run.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&TRANSPARENT)
        .label_font((FONT, 14))
        .draw()?;

    root.present()?;
    Ok(())
}
