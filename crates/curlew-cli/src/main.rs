//! Curlew CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use curlew::CurlewError;
use curlew_cli::{Args, error_adapter::to_reportables};

/// Exit status for a failed run, following the BSD `sysexits` values.
fn exit_code(err: &CurlewError) -> i32 {
    match err {
        CurlewError::Parse { .. } => 65,
        CurlewError::Io(_) => 74,
        CurlewError::Config(_) => 78,
    }
}

/// Render every reportable part of `err` to stderr.
fn report(err: &CurlewError) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        match reporter.render_report(&mut rendered, &reportable) {
            Ok(()) => eprintln!("{rendered}"),
            Err(_) => eprintln!("{reportable}"),
        }
    }
}

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Curlew");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = curlew_cli::run(&args) {
        warn!(diagnostics = err.diagnostics().len(); "Template processing failed");
        report(&err);
        process::exit(exit_code(&err));
    }

    info!("Completed successfully");
}
