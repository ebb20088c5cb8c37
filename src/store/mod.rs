//! Local SQLite store: one table per series identifier.
//!
//! Table layout:
//!
//! - `date TEXT PRIMARY KEY` (ISO `YYYY-MM-DD`)
//! - a nullable `REAL` column named after the identifier
//!
//! Refreshing a series replaces its table inside a single transaction, so a failed
//! write never leaves a half-populated table behind and never touches other tables.
//! Identifiers are validated by [`SeriesId`] before they are spliced into SQL.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info};

use crate::domain::{Series, SeriesId};
use crate::error::AppError;

/// Summary of one stored table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub id: SeriesId,
    pub rows: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct SeriesStore {
    conn: Connection,
    path: PathBuf,
}

impl SeriesStore {
    /// Open (or create) the store for writing.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened store");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing store read-only.
    ///
    /// A missing file means nothing has been fetched yet; callers report that as
    /// [`AppError::SeriesNotFound`] for the first identifier they wanted.
    pub fn open_existing(path: &Path) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Some(Self {
            conn,
            path: path.to_path_buf(),
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &SeriesId) -> Result<bool, AppError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Replace the stored table for `series.id` with `series`.
    ///
    /// Empty series are rejected so that table existence always implies rows.
    pub fn replace_series(&mut self, series: &Series) -> Result<usize, AppError> {
        if series.is_empty() {
            return Err(AppError::fetch(
                series.id.as_str(),
                "no observations returned; refusing to store an empty table",
            ));
        }

        let table = quote_ident(&series.id);
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (date TEXT PRIMARY KEY NOT NULL, {table} REAL);"
        ))?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {table} (date, {table}) VALUES (?1, ?2)"))?;
            for (date, value) in &series.points {
                stmt.execute(params![date.format("%Y-%m-%d").to_string(), value])?;
            }
        }
        tx.commit()?;

        info!(series = %series.id, rows = series.len(), "stored series");
        Ok(series.len())
    }

    /// Load `id` restricted to `[start, end]`.
    pub fn load_series(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate) -> Result<Series, AppError> {
        if !self.contains(id)? {
            return Err(AppError::SeriesNotFound {
                series: id.to_string(),
                store: self.path.clone(),
            });
        }

        let table = quote_ident(id);
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT date, {table} FROM {table} ORDER BY date"))?;
        let rows = stmt.query_map([], |row| {
            let date: String = row.get(0)?;
            let value: Option<f64> = row.get(1)?;
            Ok((date, value))
        })?;

        let mut series = Series::new(id.clone());
        for row in rows {
            let (raw_date, value) = row?;
            let date = parse_stored_date(&raw_date).ok_or_else(|| {
                AppError::Store(format!("Unreadable date '{raw_date}' in table {id}"))
            })?;
            if date < start || date > end {
                continue;
            }
            series.points.insert(date, value.filter(|v| v.is_finite()));
        }

        debug!(series = %id, rows = series.len(), %start, %end, "loaded series");
        Ok(series)
    }

    /// Every identifier currently stored, with row counts and date span.
    pub fn list(&self) -> Result<Vec<TableInfo>, AppError> {
        let names: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
            stmt.query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<_, _>>()?
        };

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            // Tables that aren't series (foreign tooling) are skipped.
            let Ok(id) = SeriesId::new(name) else {
                continue;
            };
            let table = quote_ident(&id);
            let (rows, first, last): (i64, Option<String>, Option<String>) = self.conn.query_row(
                &format!("SELECT COUNT(*), MIN(date), MAX(date) FROM {table}"),
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            out.push(TableInfo {
                id,
                rows: usize::try_from(rows).unwrap_or(0),
                first: first.as_deref().and_then(parse_stored_date),
                last: last.as_deref().and_then(parse_stored_date),
            });
        }
        Ok(out)
    }
}

fn quote_ident(id: &SeriesId) -> String {
    format!("\"{}\"", id.as_str())
}

/// Accept `YYYY-MM-DD` and the `YYYY-MM-DD HH:MM:SS` form written by pandas.
fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn id(s: &str) -> SeriesId {
        SeriesId::new(s).unwrap()
    }

    fn sample(name: &str) -> Series {
        Series::from_points(
            id(name),
            [
                (d(2024, 1, 1), Some(3.7)),
                (d(2024, 2, 1), Some(3.9)),
                (d(2024, 3, 1), None),
            ],
        )
    }

    #[test]
    fn replace_then_load_round_trips_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        store.replace_series(&sample("UNRATE")).unwrap();

        let loaded = store.load_series(&id("UNRATE"), d(2000, 1, 1), d(2030, 1, 1)).unwrap();
        assert_eq!(loaded, sample("UNRATE"));
    }

    #[test]
    fn load_filters_to_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        store.replace_series(&sample("UNRATE")).unwrap();

        let loaded = store.load_series(&id("UNRATE"), d(2024, 2, 1), d(2024, 2, 29)).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.first_date(), Some(d(2024, 2, 1)));
    }

    #[test]
    fn replace_overwrites_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        store.replace_series(&sample("UNRATE")).unwrap();

        let newer = Series::from_points(id("UNRATE"), [(d(2025, 1, 1), Some(4.0))]);
        store.replace_series(&newer).unwrap();

        let loaded = store.load_series(&id("UNRATE"), d(2000, 1, 1), d(2030, 1, 1)).unwrap();
        assert_eq!(loaded, newer);
    }

    #[test]
    fn empty_series_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        let err = store.replace_series(&Series::new(id("EMPTY"))).unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
        assert!(!store.contains(&id("EMPTY")).unwrap());
    }

    #[test]
    fn missing_table_is_series_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        let err = store.load_series(&id("FOO"), d(2000, 1, 1), d(2030, 1, 1)).unwrap_err();
        match err {
            AppError::SeriesNotFound { series, .. } => assert_eq!(series, "FOO"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn open_existing_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SeriesStore::open_existing(&dir.path().join("absent.db")).unwrap().is_none());
    }

    #[test]
    fn reads_pandas_style_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fred.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE \"UNRATE\" (date TIMESTAMP, \"UNRATE\" REAL);
                 INSERT INTO \"UNRATE\" VALUES ('2024-01-01 00:00:00', 3.7);
                 INSERT INTO \"UNRATE\" VALUES ('2024-02-01 00:00:00', 3.9);",
            )
            .unwrap();
        }
        let store = SeriesStore::open_existing(&path).unwrap().unwrap();
        let loaded = store.load_series(&id("UNRATE"), d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.points[&d(2024, 2, 1)], Some(3.9));
    }

    #[test]
    fn list_reports_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SeriesStore::open(&dir.path().join("fred.db")).unwrap();
        store.replace_series(&sample("UNRATE")).unwrap();
        store.replace_series(&sample("DCOILWTICO")).unwrap();

        let tables = store.list().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].id, id("DCOILWTICO"));
        assert_eq!(tables[1].rows, 3);
        assert_eq!(tables[1].first, Some(d(2024, 1, 1)));
        assert_eq!(tables[1].last, Some(d(2024, 3, 1)));
    }
}
