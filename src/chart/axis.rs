//! Axis coordinate with caller-chosen tick positions.
//!
//! Plotters picks its own key points for plain ranges. The charts here need exact
//! ticks (every 5 years, every percentage point, doublings on a log axis), so this
//! coordinate maps values itself and hands the mesh the precomputed ticks: `major`
//! for bold grid lines and labels, `minor` for light grid lines.

use std::ops::Range;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickAxis {
    lo: f64,
    hi: f64,
    scale: Scale,
    major: Vec<f64>,
    minor: Vec<f64>,
}

impl TickAxis {
    pub fn linear(lo: f64, hi: f64, major: Vec<f64>) -> Self {
        Self::new(lo, hi, Scale::Linear, major)
    }

    /// Log axis over `[lo, hi]`; both bounds must be positive.
    pub fn log(lo: f64, hi: f64, major: Vec<f64>) -> Self {
        Self::new(lo, hi, Scale::Log, major)
    }

    fn new(lo: f64, hi: f64, scale: Scale, major: Vec<f64>) -> Self {
        let mut axis = Self {
            lo,
            hi,
            scale,
            major: Vec::new(),
            minor: Vec::new(),
        };
        axis.major = axis.inside(major);
        axis
    }

    pub fn with_minor(mut self, minor: Vec<f64>) -> Self {
        self.minor = self.inside(minor);
        self
    }

    pub fn major(&self) -> &[f64] {
        &self.major
    }

    pub fn minor(&self) -> &[f64] {
        &self.minor
    }

    fn inside(&self, ticks: Vec<f64>) -> Vec<f64> {
        let eps = (self.hi - self.lo).abs() * 1e-9;
        ticks
            .into_iter()
            .filter(|t| t.is_finite() && *t >= self.lo - eps && *t <= self.hi + eps)
            .filter(|t| self.scale == Scale::Linear || *t > 0.0)
            .collect()
    }

    /// Position of `value` along the axis, 0.0 at `lo` and 1.0 at `hi`.
    ///
    /// Non-positive values on a log axis sit at `lo`.
    pub fn fraction(&self, value: f64) -> f64 {
        let (v, lo, hi) = match self.scale {
            Scale::Linear => (value, self.lo, self.hi),
            Scale::Log if value <= 0.0 => return 0.0,
            Scale::Log => (
                value.ln(),
                self.lo.max(f64::MIN_POSITIVE).ln(),
                self.hi.max(f64::MIN_POSITIVE).ln(),
            ),
        };
        if hi == lo {
            return 0.5;
        }
        (v - lo) / (hi - lo)
    }
}

impl Ranged for TickAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = f64::from(limit.1 - limit.0);
        limit.0 + (self.fraction(*value) * span).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minor.clone()
        } else {
            self.major.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.lo..self.hi
    }
}
