//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of an alignment in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The two series carry different units, so each is scaled to the full grid
//! height independently. Plot elements:
//! - primary series: `*`
//! - shifted secondary series: `+`
//! - both in the same cell: `#`

use chrono::NaiveDate;

use crate::transform::AlignedPair;

const PRIMARY: char = '*';
const SECONDARY: char = '+';
const BOTH: char = '#';

/// Render both series of `pair` into a `width` x `height` character grid.
pub fn render_ascii_pair(pair: &AlignedPair, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    let (Some(first), Some(last)) = (pair.first_date(), pair.last_date()) else {
        out.push_str("Plot: (no aligned points)\n");
        return out;
    };

    let (p_min, p_max) = value_range(&pair.primary);
    let (s_min, s_max) = value_range(&pair.secondary);

    let mut grid = vec![vec![' '; width]; height];
    for (i, date) in pair.dates.iter().enumerate() {
        let x = map_x(*date, first, last, width);
        let yp = map_y(pair.primary[i], p_min, p_max, height);
        let ys = map_y(pair.secondary[i], s_min, s_max, height);
        put(&mut grid, x, yp, PRIMARY);
        put(&mut grid, x, ys, SECONDARY);
    }

    out.push_str(&format!(
        "Plot: {first} .. {last} | {PRIMARY} {}=[{p_min:.2}, {p_max:.2}] | {SECONDARY} {} {}=[{s_min:.2}, {s_max:.2}]\n",
        pair.primary_id, pair.secondary_id, pair.offset
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn put(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    let cell = &mut grid[y][x];
    *cell = match *cell {
        ' ' => ch,
        existing if existing == ch => ch,
        _ => BOTH,
    };
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        (min, max)
    } else {
        (0.0, 1.0)
    }
}

fn map_x(date: NaiveDate, first: NaiveDate, last: NaiveDate, width: usize) -> usize {
    let span = (last - first).num_days();
    if span <= 0 {
        return 0;
    }
    let u = (date - first).num_days() as f64 / span as f64;
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    if y_max <= y_min {
        return height / 2;
    }
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // max value -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Offset, SeriesId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let pair = AlignedPair {
            primary_id: SeriesId::new("A").unwrap(),
            secondary_id: SeriesId::new("B").unwrap(),
            offset: Offset::months(1),
            dates: vec![d(2024, 1, 1), d(2024, 1, 11)],
            primary: vec![1.0, 2.0],
            secondary: vec![20.0, 10.0],
            trimmed: 0,
        };
        let txt = render_ascii_pair(&pair, 10, 5);
        let expected = concat!(
            "Plot: 2024-01-01 .. 2024-01-11 | * A=[1.00, 2.00] | + B +1 months=[10.00, 20.00]\n",
            "+        *\n",
            "\n",
            "\n",
            "\n",
            "*        +\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn overlapping_marks_and_flat_series() {
        let pair = AlignedPair {
            primary_id: SeriesId::new("A").unwrap(),
            secondary_id: SeriesId::new("B").unwrap(),
            offset: Offset::days(0),
            dates: vec![d(2024, 1, 1)],
            primary: vec![5.0],
            secondary: vec![7.0],
            trimmed: 0,
        };
        let txt = render_ascii_pair(&pair, 10, 5);
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(rows[3], "#");
    }
}
