//! Runtime settings resolved from the environment.
//!
//! `.env` is loaded first (if present); CLI flags override what is resolved here.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "data/fred.db";
const DEFAULT_OUTPUT_DIR: &str = "outputs";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Only `refresh` needs it.
    pub fred_api_key: Option<String>,
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fred_api_key: lookup("FRED_API_KEY").filter(|k| !k.trim().is_empty()),
            db_path: lookup("LAGPLOT_DB").map(PathBuf::from).unwrap_or(defaults.db_path),
            output_dir: lookup("LAGPLOT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            http_timeout: lookup("LAGPLOT_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }

    /// Apply a `--db` override.
    pub fn with_db(mut self, db: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.db_path = db;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let s = Settings::from_lookup(|_| None);
        assert_eq!(s.db_path, PathBuf::from("data/fred.db"));
        assert_eq!(s.output_dir, PathBuf::from("outputs"));
        assert_eq!(s.http_timeout, Duration::from_secs(30));
        assert!(s.fred_api_key.is_none());
    }

    #[test]
    fn env_values_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("FRED_API_KEY", "abc"),
            ("LAGPLOT_DB", "/tmp/x.db"),
            ("LAGPLOT_HTTP_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let s = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(s.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(s.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(s.http_timeout, Duration::from_secs(5));

        let s = s.with_db(Some(PathBuf::from("other.db")));
        assert_eq!(s.db_path, PathBuf::from("other.db"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let s = Settings::from_lookup(|k| (k == "FRED_API_KEY").then(|| "  ".to_string()));
        assert!(s.fred_api_key.is_none());
    }
}
