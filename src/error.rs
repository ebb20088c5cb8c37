//! Error taxonomy for the whole pipeline.
//!
//! Every variant maps to a process exit code so the binary can report failures
//! without inspecting message text.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which validation check rejected a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// The series has no observations in the requested window.
    Empty,
    /// The series contains null values that the trailing trim does not cover.
    NullValues,
    /// The date index is not strictly ascending.
    UnorderedIndex,
    /// The two series share no dates after shifting.
    NoOverlap,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationRule::Empty => "series is empty",
            ValidationRule::NullValues => "series contains null values",
            ValidationRule::UnorderedIndex => "date index is not strictly ascending",
            ValidationRule::NoOverlap => "series have no overlapping dates",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch {series}: {reason}")]
    Fetch { series: String, reason: String },

    #[error("Invalid series identifier '{series}': {reason}")]
    InvalidSeries { series: String, reason: String },

    #[error(
        "Series '{series}' not found in {}. Run `lagplot refresh --series {series}` first.",
        .store.display()
    )]
    SeriesNotFound { series: String, store: PathBuf },

    #[error("Validation failed for {series}: {rule}{}", detail_suffix(.detail))]
    Validation {
        series: String,
        rule: ValidationRule,
        detail: Option<String>,
    },

    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl AppError {
    pub fn fetch(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            series: series.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_series(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSeries {
            series: series.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(series: impl Into<String>, rule: ValidationRule) -> Self {
        Self::Validation {
            series: series.into(),
            rule,
            detail: None,
        }
    }

    /// Attach extra context (e.g. the offending date) to a validation error.
    pub fn with_detail(self, text: impl Into<String>) -> Self {
        match self {
            Self::Validation { series, rule, .. } => Self::Validation {
                series,
                rule,
                detail: Some(text.into()),
            },
            other => other,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) | AppError::Config(_) | AppError::InvalidSeries { .. } => 2,
            AppError::SeriesNotFound { .. } => 3,
            AppError::Fetch { .. } => 4,
            AppError::Validation { .. } => 5,
            AppError::Store(_) => 6,
            AppError::Render(_) | AppError::Io(_) => 7,
        }
    }

    /// The validation rule, if this is a validation failure.
    pub fn validation_rule(&self) -> Option<ValidationRule> {
        match self {
            AppError::Validation { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(err.to_string())
    }
}
