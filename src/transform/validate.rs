//! Pre-render sanity checks.
//!
//! Every failure names the rule and the series so the CLI message is enough to
//! diagnose the problem.

use crate::domain::Series;
use crate::error::{AppError, ValidationRule};

/// Reject empty series, null values, and out-of-order dates.
pub fn validate_series(series: &Series) -> Result<(), AppError> {
    if series.is_empty() {
        return Err(AppError::validation(series.id.as_str(), ValidationRule::Empty));
    }

    if let Some((date, _)) = series.points.iter().find(|(_, v)| v.is_none()) {
        return Err(AppError::validation(series.id.as_str(), ValidationRule::NullValues)
            .with_detail(format!("first null at {date}, {} null(s) total", series.null_count())));
    }

    let dates: Vec<_> = series.points.keys().collect();
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AppError::validation(series.id.as_str(), ValidationRule::UnorderedIndex)
            .with_detail(format!("{} then {}", pair[0], pair[1])));
    }

    Ok(())
}

/// Reject two series whose date ranges do not intersect.
pub fn validate_overlap(a: &Series, b: &Series) -> Result<(), AppError> {
    let (Some(a0), Some(a1), Some(b0), Some(b1)) =
        (a.first_date(), a.last_date(), b.first_date(), b.last_date())
    else {
        return Err(no_overlap(a, b));
    };
    // A single shared day still counts as overlap.
    if a0.max(b0) > a1.min(b1) {
        return Err(no_overlap(a, b));
    }
    Ok(())
}

pub(crate) fn no_overlap(a: &Series, b: &Series) -> AppError {
    let span = |s: &Series| match (s.first_date(), s.last_date()) {
        (Some(f), Some(l)) => format!("{f}..{l}"),
        _ => "empty".to_string(),
    };
    AppError::validation(format!("{} vs {}", a.id, b.id), ValidationRule::NoOverlap)
        .with_detail(format!("{} covers {}, {} covers {}", a.id, span(a), b.id, span(b)))
}
