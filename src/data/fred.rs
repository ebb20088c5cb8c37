//! FRED API integration.
//!
//! Observations are requested as JSON, paged with `offset`/`limit` so long daily
//! series arrive complete, and converted into a [`Series`]. FRED marks an
//! unpublished value with `"."`; those dates are kept with a `None` value.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::domain::{Series, SeriesId};
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
/// FRED's maximum page size.
const OBS_LIMIT: usize = 100_000;

/// A remote provider of date-indexed series.
///
/// The store layer sits above this trait; sources never touch the database.
pub trait SeriesSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch every observation of `id` within `[start, end]`.
    fn fetch(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate) -> Result<Series, AppError>;
}

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let api_key = settings
            .fred_api_key
            .clone()
            .ok_or_else(|| AppError::Config("Missing FRED_API_KEY in environment (.env).".to_string()))?;
        Self::new(api_key, settings.http_timeout)
    }

    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_page(
        &self,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
        offset: usize,
    ) -> Result<ObservationsResponse, AppError> {
        let start = start.to_string();
        let end = end.to_string();
        let limit = OBS_LIMIT.to_string();
        let offset = offset.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
            .send()
            .map_err(|e| AppError::fetch(id.as_str(), format!("FRED request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            let reason = resp
                .json::<FredErrorBody>()
                .map(|b| b.error_message)
                .unwrap_or_else(|_| "rejected by FRED".to_string());
            return Err(bad_request_error(id, reason));
        }
        if !status.is_success() {
            return Err(AppError::fetch(
                id.as_str(),
                format!("FRED request failed with status {status}."),
            ));
        }

        resp.json()
            .map_err(|e| AppError::fetch(id.as_str(), format!("Failed to parse FRED response: {e}")))
    }
}

/// Classify a FRED 400 response.
///
/// FRED uses 400 both for unknown series and for a rejected `api_key`. Only the
/// message tells them apart, and a key problem is a configuration error.
fn bad_request_error(id: &SeriesId, reason: String) -> AppError {
    if reason.to_ascii_lowercase().contains("api_key") {
        return AppError::Config(format!("FRED rejected the API key (FRED_API_KEY): {reason}"));
    }
    AppError::invalid_series(id.as_str(), reason)
}

impl SeriesSource for FredClient {
    fn name(&self) -> &str {
        "FRED"
    }

    fn fetch(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate) -> Result<Series, AppError> {
        let mut series = Series::new(id.clone());
        let mut offset = 0;

        loop {
            let page = self.fetch_page(id, start, end, offset)?;
            let received = page.observations.len();
            debug!(series = %id, offset, received, total = page.count, "received FRED page");

            for obs in page.observations {
                let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                    AppError::fetch(id.as_str(), format!("Invalid FRED date '{}': {e}", obs.date))
                })?;
                series.points.insert(date, parse_value(&obs.value));
            }

            offset += received;
            if received == 0 || offset >= page.count {
                break;
            }
        }

        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    count: usize,
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_message: String,
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_treats_dot_as_missing() {
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value(" 3.5 "), Some(3.5));
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("abc"), None);
    }

    #[test]
    fn observations_payload_deserializes() {
        let body = r#"{
            "realtime_start": "2025-01-01",
            "count": 2,
            "offset": 0,
            "limit": 100000,
            "observations": [
                {"realtime_start": "2025-01-01", "realtime_end": "2025-01-01", "date": "2024-11-01", "value": "4.2"},
                {"realtime_start": "2025-01-01", "realtime_end": "2025-01-01", "date": "2024-12-01", "value": "."}
            ]
        }"#;
        let parsed: ObservationsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parse_value(&parsed.observations[1].value), None);
    }

    #[test]
    fn error_payload_deserializes() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        let parsed: FredErrorBody = serde_json::from_str(body).unwrap();
        assert!(parsed.error_message.contains("does not exist"));
    }

    #[test]
    fn rejected_api_key_is_a_config_error() {
        let id = SeriesId::new("UNRATE").unwrap();
        let reason = "Bad Request.  The value for variable api_key is not registered.  Read https://fred.stlouisfed.org/docs/api/api_key.html for more information.";
        let err = bad_request_error(&id, reason.to_string());
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("not registered")));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_series_stays_invalid_series() {
        let id = SeriesId::new("NOPE").unwrap();
        let err = bad_request_error(&id, "Bad Request.  The series does not exist.".to_string());
        assert!(matches!(err, AppError::InvalidSeries { ref series, .. } if series == "NOPE"));
    }
}
