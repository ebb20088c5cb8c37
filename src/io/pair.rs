//! Read/write aligned-pair JSON files.
//!
//! The JSON file is the portable form of one `align` run: which series, which
//! offset, the window that was requested, and one row per aligned date.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Offset, SeriesId};
use crate::error::AppError;
use crate::transform::AlignedPair;

/// On-disk schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFile {
    pub tool: String,
    pub primary: SeriesId,
    pub secondary: SeriesId,
    pub offset: Offset,
    pub trimmed: usize,
    pub rows: Vec<PairRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    pub date: NaiveDate,
    pub primary: f64,
    pub secondary: f64,
}

impl From<&AlignedPair> for PairFile {
    fn from(pair: &AlignedPair) -> Self {
        Self {
            tool: "lagplot".to_string(),
            primary: pair.primary_id.clone(),
            secondary: pair.secondary_id.clone(),
            offset: pair.offset,
            trimmed: pair.trimmed,
            rows: pair
                .dates
                .iter()
                .zip(pair.primary.iter().zip(pair.secondary.iter()))
                .map(|(date, (p, s))| PairRow {
                    date: *date,
                    primary: *p,
                    secondary: *s,
                })
                .collect(),
        }
    }
}

impl From<PairFile> for AlignedPair {
    fn from(file: PairFile) -> Self {
        let mut pair = AlignedPair {
            primary_id: file.primary,
            secondary_id: file.secondary,
            offset: file.offset,
            dates: Vec::with_capacity(file.rows.len()),
            primary: Vec::with_capacity(file.rows.len()),
            secondary: Vec::with_capacity(file.rows.len()),
            trimmed: file.trimmed,
        };
        for row in file.rows {
            pair.dates.push(row.date);
            pair.primary.push(row.primary);
            pair.secondary.push(row.secondary);
        }
        pair
    }
}

/// Write `pair` as pretty-printed JSON.
pub fn write_pair_json(path: &Path, pair: &AlignedPair) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &PairFile::from(pair))
        .map_err(std::io::Error::from)?;
    Ok(())
}

/// Read a pair JSON file written by [`write_pair_json`].
pub fn read_pair_json(path: &Path) -> Result<AlignedPair, AppError> {
    let file = File::open(path)?;
    let parsed: PairFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::Usage(format!("Invalid pair JSON '{}': {e}", path.display())))?;
    Ok(parsed.into())
}
