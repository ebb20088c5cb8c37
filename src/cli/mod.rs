//! Command-line parsing for the FRED lag-chart tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/align/render code; `app` turns these structs into pipeline calls.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{OffsetUnit, SeriesId};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lagplot", version, about = "Fetch FRED series and chart them with a lag between them")]
pub struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download series from FRED into the local store, replacing stored copies.
    Refresh(RefreshArgs),
    /// Unemployment rate vs crude oil shifted by a number of months.
    OilUnrate(OilUnrateArgs),
    /// Plot any stored series together on one axis pair.
    Custom(CustomArgs),
    /// Bitcoin price vs an M2 index shifted by a number of days.
    BtcM2(BtcM2Args),
    /// List the series present in the local store.
    List(StoreArgs),
    /// Align two stored series and print, export or preview the result.
    Align(AlignArgs),
    /// Preview a pair JSON file written by `align --export-json`.
    Plot(PlotArgs),
}

/// Store location shared by every subcommand that reads or writes series.
#[derive(Debug, Args, Clone, Default)]
pub struct StoreArgs {
    /// SQLite file (default: $LAGPLOT_DB or data/fred.db).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

/// Canvas and output options for the chart subcommands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Image path (default: <output dir>/<chart>_<timestamp>.svg).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 650)]
    pub height: u32,
}

#[derive(Debug, Args, Clone)]
pub struct RefreshArgs {
    /// FRED series identifiers to fetch, in order.
    #[arg(long, num_args = 1.., default_values = ["UNRATE", "DCOILWTICO"])]
    pub series: Vec<SeriesId>,

    /// First observation date (YYYY-MM-DD).
    #[arg(long, default_value = "1948-01-01")]
    pub start: NaiveDate,

    /// Last observation date (default: today).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args, Clone)]
pub struct OilUnrateArgs {
    /// Months the oil series is shifted forward (negative shifts it back).
    #[arg(long, default_value_t = 18, allow_negative_numbers = true)]
    pub offset: i32,

    #[arg(long, default_value = "1973-01-01")]
    pub start: NaiveDate,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Years of empty x axis drawn past the last date.
    #[arg(long, default_value_t = 3)]
    pub extend_years: u32,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CustomArgs {
    /// Stored series to plot.
    #[arg(long, num_args = 1.., required = true)]
    pub series: Vec<SeriesId>,

    #[arg(long, default_value = "1970-01-01")]
    pub start: NaiveDate,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BtcM2Args {
    #[arg(long, default_value = "CBBTCUSD")]
    pub btc_series: SeriesId,

    #[arg(long, default_value = "M2SL")]
    pub m2_series: SeriesId,

    #[arg(long, default_value = "2010-01-01")]
    pub start: NaiveDate,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Days the M2 series is shifted forward (negative shifts it back).
    #[arg(long, default_value_t = 94, allow_negative_numbers = true)]
    pub offset: i32,

    #[arg(long, default_value_t = 1)]
    pub extend_years: u32,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Args, Clone)]
pub struct AlignArgs {
    /// Series that keeps its dates.
    #[arg(long)]
    pub primary: SeriesId,

    /// Series that is shifted by the offset.
    #[arg(long)]
    pub secondary: SeriesId,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i32,

    /// Offset unit; months resample both series monthly first.
    #[arg(long, value_enum, default_value_t = OffsetUnit::Months)]
    pub unit: OffsetUnit,

    #[arg(long, default_value = "1970-01-01")]
    pub start: NaiveDate,

    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Write the aligned pair to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Write the aligned pair to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Print an ASCII preview of both series.
    #[arg(long)]
    pub plot: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub plot_width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub plot_height: usize,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Options for previewing a saved pair.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Pair JSON file produced by `lagplot align --export-json`.
    #[arg(long, value_name = "JSON")]
    pub pair: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn refresh_defaults() {
        let cli = Cli::try_parse_from(["lagplot", "refresh"]).unwrap();
        let Command::Refresh(args) = cli.command else {
            panic!("expected refresh");
        };
        let ids: Vec<&str> = args.series.iter().map(SeriesId::as_str).collect();
        assert_eq!(ids, ["UNRATE", "DCOILWTICO"]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(1948, 1, 1).unwrap());
        assert!(args.end.is_none());
    }

    #[test]
    fn negative_offset_and_global_quiet() {
        let cli = Cli::try_parse_from(["lagplot", "oil-unrate", "--offset", "-6", "-q"]).unwrap();
        assert!(cli.quiet);
        let Command::OilUnrate(args) = cli.command else {
            panic!("expected oil-unrate");
        };
        assert_eq!(args.offset, -6);
        assert_eq!(args.extend_years, 3);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(Cli::try_parse_from(["lagplot", "refresh", "--start", "2024-13-01"]).is_err());
        assert!(Cli::try_parse_from(["lagplot", "custom", "--series", "BAD;ID"]).is_err());
        assert!(Cli::try_parse_from(["lagplot", "custom"]).is_err());
    }

    #[test]
    fn align_unit_parses() {
        let cli = Cli::try_parse_from([
            "lagplot", "align", "--primary", "CBBTCUSD", "--secondary", "M2SL", "--offset", "94", "--unit", "days",
        ])
        .unwrap();
        let Command::Align(args) = cli.command else {
            panic!("expected align");
        };
        assert_eq!(args.unit, OffsetUnit::Days);
    }

    #[test]
    fn plot_reads_a_pair_file() {
        let cli = Cli::try_parse_from(["lagplot", "plot", "--pair", "out/pair.json", "--width", "60"]).unwrap();
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.pair, PathBuf::from("out/pair.json"));
        assert_eq!((args.width, args.height), (60, 25));
        assert!(Cli::try_parse_from(["lagplot", "plot"]).is_err());
    }
}
