//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging and resolves settings
//! - dispatches to the fetch/align/render pipeline
//! - prints summaries and saved paths

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::cli::{AlignArgs, BtcM2Args, Command, CustomArgs, OilUnrateArgs, PlotArgs, RefreshArgs, StoreArgs};
use crate::config::Settings;
use crate::data::FredClient;
use crate::domain::{AlignConfig, ChartConfig, Offset};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lagplot` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.quiet);
    let settings = Settings::from_env();

    match cli.command {
        Command::Refresh(args) => handle_refresh(args, settings),
        Command::OilUnrate(args) => handle_oil_unrate(args, settings),
        Command::Custom(args) => handle_custom(args, settings),
        Command::BtcM2(args) => handle_btc_m2(args, settings),
        Command::List(args) => handle_list(args, settings),
        Command::Align(args) => handle_align(args, settings),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_refresh(args: RefreshArgs, settings: Settings) -> Result<(), AppError> {
    let end = end_or_today(args.end);
    pipeline::check_window(args.start, end)?;
    let settings = with_store(settings, &args.store);
    let client = FredClient::from_settings(&settings)?;

    let report = pipeline::refresh(&client, &settings.db_path, &args.series, args.start, end)?;
    print!("{}", crate::report::format_refresh_report(&report));
    Ok(())
}

fn handle_oil_unrate(args: OilUnrateArgs, settings: Settings) -> Result<(), AppError> {
    let settings = with_store(settings, &args.store);
    let chart = ChartConfig {
        offset: Offset::months(args.offset),
        start: args.start,
        end: end_or_today(args.end),
        extend_years: args.extend_years,
        width: args.output.width,
        height: args.output.height,
    };
    let path = pipeline::chart_path(args.output.output.as_deref(), &settings.output_dir, "oil_unrate");
    let pair = pipeline::oil_unrate(&settings.db_path, &chart, &path)?;
    print!("{}", crate::report::format_alignment_summary(&pair));
    println!("Saved chart to {}", path.display());
    Ok(())
}

fn handle_custom(args: CustomArgs, settings: Settings) -> Result<(), AppError> {
    let settings = with_store(settings, &args.store);
    let end = end_or_today(args.end);
    let path = pipeline::chart_path(args.output.output.as_deref(), &settings.output_dir, "custom");
    let plotted = pipeline::custom(
        &settings.db_path,
        &args.series,
        args.start,
        end,
        (args.output.width, args.output.height),
        &path,
    )?;
    for s in &plotted {
        println!("{:<12} {} points, {} gap(s)", s.id.as_str(), s.len(), s.null_count());
    }
    println!("Saved chart to {}", path.display());
    Ok(())
}

fn handle_btc_m2(args: BtcM2Args, settings: Settings) -> Result<(), AppError> {
    let settings = with_store(settings, &args.store);
    let chart = ChartConfig {
        offset: Offset::days(args.offset),
        start: args.start,
        end: end_or_today(args.end),
        extend_years: args.extend_years,
        width: args.output.width,
        height: args.output.height,
    };
    let path = pipeline::chart_path(args.output.output.as_deref(), &settings.output_dir, "btc_m2");
    let pair = pipeline::btc_m2(&settings.db_path, &args.btc_series, &args.m2_series, &chart, &path)?;
    print!("{}", crate::report::format_alignment_summary(&pair));
    println!("Saved chart to {}", path.display());
    Ok(())
}

fn handle_list(args: StoreArgs, settings: Settings) -> Result<(), AppError> {
    let settings = with_store(settings, &args);
    let tables = pipeline::list_store(&settings.db_path)?;
    print!("{}", crate::report::format_store_listing(&tables));
    Ok(())
}

fn handle_align(args: AlignArgs, settings: Settings) -> Result<(), AppError> {
    let settings = with_store(settings, &args.store);
    let config = AlignConfig {
        offset: Offset {
            amount: args.offset,
            unit: args.unit,
        },
        granularity: args.unit.granularity(),
        start: args.start,
        end: end_or_today(args.end),
    };
    let pair = pipeline::align_stored(&settings.db_path, &args.primary, &args.secondary, &config)?;
    print!("{}", crate::report::format_alignment_summary(&pair));

    if args.plot {
        print!("{}", crate::plot::render_ascii_pair(&pair, args.plot_width, args.plot_height));
    }
    if let Some(path) = &args.export {
        crate::io::write_pair_csv(path, &pair)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.export_json {
        crate::io::write_pair_json(path, &pair)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let pair = crate::io::read_pair_json(&args.pair)?;
    print!("{}", crate::report::format_alignment_summary(&pair));
    print!("{}", crate::plot::render_ascii_pair(&pair, args.width, args.height));
    Ok(())
}

fn end_or_today(end: Option<NaiveDate>) -> NaiveDate {
    end.unwrap_or_else(|| Local::now().date_naive())
}

fn with_store(settings: Settings, store: &StoreArgs) -> Settings {
    settings.with_db(store.db.clone())
}
