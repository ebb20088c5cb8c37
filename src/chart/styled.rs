//! Unemployment rate vs lagged crude oil, dual axis.
//!
//! Left axis: linear percentage, default domain 3-15 with a tick per point.
//! Right axis: log scale with ticks doubling from a fixed floor.
//! X axis: 5-year major ticks, yearly minor ticks, extended past the data.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::{
    DrawResult, FONT, FOOTNOTE, GRID_BOLD, GRID_LIGHT, TickAxis, decimal_year, doubling_ticks,
    ensure_parent, format_year_tick, min_max, render_error, x_range, year_ticks,
};
use crate::domain::ChartConfig;
use crate::error::AppError;
use crate::transform::AlignedPair;

const TITLE: &str = "Unemployment Rate and US Oil Price";
const SUBTITLE: &str = "Civilian Unemployment Rate and WTI Crude Oil Price";

const LEFT_MIN: f64 = 3.0;
const LEFT_MAX: f64 = 15.0;
const LEFT_STEP: f64 = 1.0;
const RIGHT_FLOOR: f64 = 10.0;
const MAJOR_YEARS: i32 = 5;

const PRIMARY_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const SECONDARY_COLOR: RGBColor = RGBColor(0xff, 0x99, 0x00);
const FOOTER_HEIGHT: u32 = 44;

/// Resolved axis layout; split from drawing so it can be tested without a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledAxes {
    pub x: (f64, f64),
    pub x_major: Vec<f64>,
    pub x_minor: Vec<f64>,
    pub left: (f64, f64),
    pub left_ticks: Vec<f64>,
    pub right: (f64, f64),
    pub right_ticks: Vec<f64>,
}

impl StyledAxes {
    pub fn for_pair(pair: &AlignedPair, extend_years: u32) -> Option<Self> {
        let first = pair.first_date()?;
        let last = pair.last_date()?;
        let x = x_range(first, last, extend_years);

        let x_major = year_ticks(x.0, x.1, MAJOR_YEARS);
        let x_minor = year_ticks(x.0, x.1, 1);

        // The fixed domain only grows when the data leaves it.
        let (p_min, p_max) = min_max(&pair.primary)?;
        let left = (LEFT_MIN.min(p_min.floor()), LEFT_MAX.max(p_max.ceil()));
        let left_ticks = step_ticks(left.0, left.1, LEFT_STEP);

        let positive: Vec<f64> = pair.secondary.iter().copied().filter(|v| *v > 0.0).collect();
        let (s_min, s_max) = min_max(&positive).unwrap_or((RIGHT_FLOOR, RIGHT_FLOOR * 2.0));
        let mut floor = RIGHT_FLOOR;
        while floor > s_min {
            floor /= 2.0;
        }
        let right_ticks = doubling_ticks(floor, s_max);
        let right = (floor, right_ticks[right_ticks.len() - 1]);

        Some(Self {
            x,
            x_major,
            x_minor,
            left,
            left_ticks,
            right,
            right_ticks,
        })
    }
}

/// Render the styled chart to `path` (SVG).
pub fn render_styled(pair: &AlignedPair, config: &ChartConfig, path: &Path) -> Result<(), AppError> {
    let axes = StyledAxes::for_pair(pair, config.extend_years)
        .ok_or_else(|| AppError::Render("aligned pair is empty".to_string()))?;
    ensure_parent(path)?;
    draw(pair, config, &axes, path).map_err(render_error)?;
    info!(path = %path.display(), points = pair.len(), "wrote styled chart");
    Ok(())
}

fn draw(pair: &AlignedPair, config: &ChartConfig, axes: &StyledAxes, path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(TITLE, (FONT, 26).into_font().style(FontStyle::Bold))?;
    let body_height = body.dim_in_pixel().1;
    let (plot_area, footer) = body.split_vertically(body_height.saturating_sub(FOOTER_HEIGHT) as i32);

    let x_axis = TickAxis::linear(axes.x.0, axes.x.1, axes.x_major.clone()).with_minor(axes.x_minor.clone());
    let left_axis = TickAxis::linear(axes.left.0, axes.left.1, axes.left_ticks.clone());
    let right_axis = TickAxis::log(axes.right.0, axes.right.1, axes.right_ticks.clone());

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(SUBTITLE, (FONT, 16))
        .margin(16)
        .x_label_area_size(36)
        .y_label_area_size(64)
        .right_y_label_area_size(72)
        .build_cartesian_2d(x_axis, left_axis)?
        .set_secondary_coord(axes.x.0..axes.x.1, right_axis);

    chart
        .configure_mesh()
        .bold_line_style(&GRID_BOLD)
        .light_line_style(&GRID_LIGHT)
        .x_label_formatter(&|v| format_year_tick(*v))
        .y_label_formatter(&|v| format!("{v:.0}%"))
        .y_desc("Unemployment rate (%)")
        .label_style((FONT, 13))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_label_formatter(&|v| format!("${v:.0}"))
        .y_desc("Oil price (USD, log scale)")
        .label_style((FONT, 13))
        .draw()?;

    let primary: Vec<(f64, f64)> = pair.primary_points().map(|(d, v)| (decimal_year(d), v)).collect();
    let secondary: Vec<(f64, f64)> = pair
        .secondary_points()
        .filter(|(_, v)| *v > 0.0)
        .map(|(d, v)| (decimal_year(d), v))
        .collect();

    chart
        .draw_series(LineSeries::new(primary.iter().copied(), PRIMARY_COLOR.stroke_width(3)))?
        .label(format!("{} (LHS)", pair.primary_id))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRIMARY_COLOR.stroke_width(3)));
    chart
        .draw_secondary_series(LineSeries::new(secondary.iter().copied(), SECONDARY_COLOR.stroke_width(2)))?
        .label(format!("{} shifted {} (RHS)", pair.secondary_id, pair.offset))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], SECONDARY_COLOR.stroke_width(2)));

    // A line needs two points; mark lone observations so they stay visible.
    if primary.len() < 2 {
        chart.draw_series(primary.iter().map(|&p| Circle::new(p, 4, PRIMARY_COLOR.filled())))?;
        chart.draw_secondary_series(secondary.iter().map(|&p| Circle::new(p, 4, SECONDARY_COLOR.filled())))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(&TRANSPARENT)
        .label_font((FONT, 14))
        .draw()?;

    let span = match (pair.first_date(), pair.last_date()) {
        (Some(first), Some(last)) => format!(
            "Dates: {} through {}. Offset: {}.",
            first.format("%b %Y"),
            last.format("%d %b %Y"),
            pair.offset
        ),
        _ => String::new(),
    };
    let foot_style = (FONT, 12).into_font().color(&FOOTNOTE);
    footer.draw(&Text::new(span, (16, 4), foot_style.clone()))?;
    footer.draw(&Text::new("Source: FRED.", (16, 20), foot_style))?;

    root.present()?;
    Ok(())
}

fn step_ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let n = ((hi - lo) / step).round() as usize;
    (0..=n).map(|i| lo + step * i as f64).collect()
}
