//! Shared pipeline logic behind the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! FRED fetch -> store -> load -> align -> render
//!
//! The functions take explicit paths and a [`SeriesSource`] so integration tests
//! can drive them against a temporary store and a fake source.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::chart::{render_multi, render_paired, render_styled};
use crate::data::SeriesSource;
use crate::domain::{AlignConfig, ChartConfig, Series, SeriesId};
use crate::error::AppError;
use crate::report::{RefreshReport, SeriesRefresh};
use crate::store::{SeriesStore, TableInfo};
use crate::transform::{AlignedPair, align_pair, prepare_for_plot};

pub const UNRATE: &str = "UNRATE";
pub const OIL: &str = "DCOILWTICO";

/// Reject `start > end` before anything touches the network or the store.
pub fn check_window(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Usage(format!("Start date {start} is after end date {end}.")));
    }
    Ok(())
}

/// Fetch each identifier in order and replace its stored table.
///
/// Stops at the first failure; tables committed before it stay committed.
pub fn refresh(
    source: &dyn SeriesSource,
    db_path: &Path,
    ids: &[SeriesId],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RefreshReport, AppError> {
    check_window(start, end)?;
    let mut store = SeriesStore::open(db_path)?;
    let mut report = RefreshReport {
        store: db_path.to_path_buf(),
        start,
        end,
        series: Vec::with_capacity(ids.len()),
    };

    for id in ids {
        info!(series = %id, source = source.name(), %start, %end, "fetching");
        let fetched = source.fetch(id, start, end)?;
        // Sources are asked for a window; enforce it in case they over-deliver.
        let series = fetched.window(start, end);
        if series.len() < fetched.len() {
            warn!(series = %id, dropped = fetched.len() - series.len(), "source returned dates outside the window");
        }
        let rows = store.replace_series(&series)?;
        report.series.push(SeriesRefresh {
            id: id.clone(),
            rows,
            nulls: series.null_count(),
            first: series.first_date(),
            last: series.last_date(),
        });
    }
    Ok(report)
}

/// Load every identifier over `[start, end]`.
///
/// A missing store file is reported as the first identifier not being found.
pub fn load_series_set(
    db_path: &Path,
    ids: &[SeriesId],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Series>, AppError> {
    let Some(store) = SeriesStore::open_existing(db_path)? else {
        let series = ids.first().map(|id| id.to_string()).unwrap_or_default();
        return Err(AppError::SeriesNotFound {
            series,
            store: db_path.to_path_buf(),
        });
    };
    ids.iter().map(|id| store.load_series(id, start, end)).collect()
}

/// Identifiers in the store with row counts and spans.
pub fn list_store(db_path: &Path) -> Result<Vec<TableInfo>, AppError> {
    match SeriesStore::open_existing(db_path)? {
        Some(store) => store.list(),
        None => Ok(Vec::new()),
    }
}

/// Load and align two stored series.
pub fn align_stored(
    db_path: &Path,
    primary: &SeriesId,
    secondary: &SeriesId,
    config: &AlignConfig,
) -> Result<AlignedPair, AppError> {
    check_window(config.start, config.end)?;
    let ids = [primary.clone(), secondary.clone()];
    let mut loaded = load_series_set(db_path, &ids, config.start, config.end)?.into_iter();
    let (Some(p), Some(s)) = (loaded.next(), loaded.next()) else {
        return Err(AppError::Store("store returned fewer series than requested".to_string()));
    };
    align_pair(&p, &s, config)
}

/// Unemployment vs oil: monthly alignment, styled chart.
pub fn oil_unrate(db_path: &Path, chart: &ChartConfig, output: &Path) -> Result<AlignedPair, AppError> {
    let config = AlignConfig {
        offset: chart.offset,
        granularity: chart.offset.unit.granularity(),
        start: chart.start,
        end: chart.end,
    };
    let pair = align_stored(db_path, &SeriesId::new(UNRATE)?, &SeriesId::new(OIL)?, &config)?;
    render_styled(&pair, chart, output)?;
    Ok(pair)
}

/// Asset vs monetary aggregate: daily alignment, paired chart.
pub fn btc_m2(
    db_path: &Path,
    btc: &SeriesId,
    m2: &SeriesId,
    chart: &ChartConfig,
    output: &Path,
) -> Result<AlignedPair, AppError> {
    let config = AlignConfig {
        offset: chart.offset,
        granularity: chart.offset.unit.granularity(),
        start: chart.start,
        end: chart.end,
    };
    let pair = align_stored(db_path, btc, m2, &config)?;
    render_paired(&pair, chart, output)?;
    Ok(pair)
}

/// Any number of stored series on one axis pair.
pub fn custom(
    db_path: &Path,
    ids: &[SeriesId],
    start: NaiveDate,
    end: NaiveDate,
    size: (u32, u32),
    output: &Path,
) -> Result<Vec<Series>, AppError> {
    check_window(start, end)?;
    if ids.is_empty() {
        return Err(AppError::Usage("At least one --series is required.".to_string()));
    }
    let loaded = load_series_set(db_path, ids, start, end)?;
    let prepared = loaded.iter().map(prepare_for_plot).collect::<Result<Vec<_>, _>>()?;
    render_multi(&prepared, size, output)?;
    Ok(prepared)
}

/// Output path for a chart, explicit or derived from the current local time.
pub fn chart_path(explicit: Option<&Path>, output_dir: &Path, chart_name: &str) -> PathBuf {
    crate::chart::resolve_output_path(explicit, output_dir, chart_name, chrono::Local::now().naive_local())
}
