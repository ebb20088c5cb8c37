//! Export an aligned pair to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per aligned date, columns named after the series.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::transform::AlignedPair;

/// Write `pair` to a CSV file, creating parent directories.
pub fn write_pair_csv(path: &Path, pair: &AlignedPair) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_pair_csv_to(BufWriter::new(file), pair)
}

/// Write `pair` as CSV to any writer.
pub fn write_pair_csv_to(mut out: impl Write, pair: &AlignedPair) -> Result<(), AppError> {
    writeln!(
        out,
        "date,{},{}_shifted_{}{}",
        pair.primary_id,
        pair.secondary_id,
        pair.offset.amount,
        unit_suffix(pair)
    )?;
    for (i, date) in pair.dates.iter().enumerate() {
        writeln!(out, "{},{},{}", date, pair.primary[i], pair.secondary[i])?;
    }
    out.flush()?;
    Ok(())
}

fn unit_suffix(pair: &AlignedPair) -> &'static str {
    match pair.offset.unit {
        crate::domain::OffsetUnit::Months => "m",
        crate::domain::OffsetUnit::Days => "d",
    }
}
