//! Alignment & transform: resample, shift, intersect, trim, validate.
//!
//! The routine is a pure function of two in-memory series:
//!
//! 1. resample both to the configured granularity
//! 2. shift the secondary series by the offset
//! 3. join the date indices: exact intersection for monthly data, an as-of join
//!    on the primary's dates for daily data
//! 4. truncate both to the primary's last published value
//! 5. validate (non-empty, no nulls, ascending, overlapping)
//!
//! Only the primary series drives the trailing trim. A trailing null in the
//! secondary is reported as a validation failure.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{AlignConfig, Granularity, Offset, Series, SeriesId};
use crate::error::{AppError, ValidationRule};

pub mod resample;
pub mod shift;
pub mod validate;

pub use resample::{resample, resample_monthly};
pub use shift::shift;
pub use validate::{validate_overlap, validate_series};

/// Two series on an identical, gap-free date index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    pub primary_id: SeriesId,
    pub secondary_id: SeriesId,
    pub offset: Offset,
    pub dates: Vec<NaiveDate>,
    pub primary: Vec<f64>,
    pub secondary: Vec<f64>,
    /// Trailing dates dropped because the primary had not published them yet.
    pub trimmed: usize,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn primary_points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.primary.iter().copied())
    }

    pub fn secondary_points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.secondary.iter().copied())
    }
}

/// Align `secondary` against `primary` per `config`.
///
/// Both inputs are first restricted to `[config.start, config.end]`; the shift is
/// applied after that, so a positive offset can push secondary values past `end`
/// where no primary dates exist to meet them.
pub fn align_pair(primary: &Series, secondary: &Series, config: &AlignConfig) -> Result<AlignedPair, AppError> {
    if config.start > config.end {
        return Err(AppError::Usage(format!(
            "Start date {} is after end date {}.",
            config.start, config.end
        )));
    }

    let primary = resample(&primary.window(config.start, config.end), config.granularity);
    let secondary = resample(&secondary.window(config.start, config.end), config.granularity);
    for s in [&primary, &secondary] {
        if s.is_empty() {
            return Err(AppError::validation(s.id.as_str(), ValidationRule::Empty)
                .with_detail(format!("no observations in {}..{}", config.start, config.end)));
        }
    }

    let shifted = shift(&secondary, config.offset)?;
    debug!(
        primary = %primary.id,
        secondary = %shifted.id,
        offset = %config.offset,
        primary_len = primary.len(),
        secondary_len = shifted.len(),
        "resampled and shifted"
    );

    let (mut common_primary, mut common_secondary) = match config.granularity {
        Granularity::Monthly => intersect(&primary, &shifted),
        Granularity::Daily => join_as_of(&primary, &shifted),
    };
    if common_primary.is_empty() {
        return Err(validate::no_overlap(&primary, &shifted));
    }

    let trimmed = trim_trailing(&mut common_primary, &mut common_secondary);
    if trimmed > 0 {
        info!(series = %common_primary.id, trimmed, "dropped unpublished trailing periods");
    }

    validate_series(&common_primary)?;
    validate_series(&common_secondary)?;
    validate_overlap(&common_primary, &common_secondary)?;

    let dates: Vec<NaiveDate> = common_primary.points.keys().copied().collect();
    let primary_values: Vec<f64> = common_primary.points.values().flatten().copied().collect();
    let secondary_values: Vec<f64> = common_secondary.points.values().flatten().copied().collect();

    info!(
        primary = %common_primary.id,
        secondary = %common_secondary.id,
        points = dates.len(),
        first = %dates[0],
        last = %dates[dates.len() - 1],
        "aligned pair"
    );

    Ok(AlignedPair {
        primary_id: common_primary.id,
        secondary_id: common_secondary.id,
        offset: config.offset,
        dates,
        primary: primary_values,
        secondary: secondary_values,
        trimmed,
    })
}

/// Keep the dates present in both series.
fn intersect(primary: &Series, secondary: &Series) -> (Series, Series) {
    let mut common_primary = Series::new(primary.id.clone());
    let mut common_secondary = Series::new(secondary.id.clone());
    for (date, value) in &primary.points {
        if let Some(other) = secondary.points.get(date) {
            common_primary.points.insert(*date, *value);
            common_secondary.points.insert(*date, *other);
        }
    }
    (common_primary, common_secondary)
}

/// Every primary date inside the span both series cover, paired with the
/// secondary's last published value on or before that date.
///
/// A daily asset meets a monthly aggregate on every trading day instead of only
/// on month starts. A date with nothing published yet keeps a null, which
/// validation reports.
fn join_as_of(primary: &Series, secondary: &Series) -> (Series, Series) {
    let mut common_primary = Series::new(primary.id.clone());
    let mut common_secondary = Series::new(secondary.id.clone());
    let bounds = (primary.first_date(), primary.last_date(), secondary.first_date(), secondary.last_date());
    let (Some(p0), Some(p1), Some(s0), Some(s1)) = bounds else {
        return (common_primary, common_secondary);
    };
    let (from, to) = (p0.max(s0), p1.min(s1));
    if from > to {
        return (common_primary, common_secondary);
    }
    for (date, value) in primary.points.range(from..=to) {
        let latest = secondary.points.range(..=*date).rev().find_map(|(_, v)| *v);
        common_primary.points.insert(*date, *value);
        common_secondary.points.insert(*date, latest);
    }
    (common_primary, common_secondary)
}

/// Truncate both series to the last date where `primary` has a value.
///
/// Returns how many primary dates were dropped.
fn trim_trailing(primary: &mut Series, secondary: &mut Series) -> usize {
    let Some(cutoff) = primary.last_valid_date() else {
        // Nothing published at all: leave it for validation to report.
        return 0;
    };
    let before = primary.len();
    primary.points.retain(|d, _| *d <= cutoff);
    secondary.points.retain(|d, _| *d <= cutoff);
    before - primary.len()
}

/// Prepare one series for the generic multi-series chart.
///
/// Trailing unpublished values are trimmed and the series must keep at least one
/// published value. Interior nulls are kept; the chart draws them as gaps.
pub fn prepare_for_plot(series: &Series) -> Result<Series, AppError> {
    let Some(cutoff) = series.last_valid_date() else {
        return Err(AppError::validation(series.id.as_str(), ValidationRule::Empty)
            .with_detail("no published values in the requested window"));
    };
    let mut out = series.clone();
    out.points.retain(|d, _| *d <= cutoff);
    Ok(out)
}
