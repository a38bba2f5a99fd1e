//! Entry point of the `atlas` binary.

use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use atlas::AtlasError;
use atlas_cli::{Args, error_adapter::to_reportables};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(args.log_filter());
    debug!(args:?; "Parsed arguments");

    match atlas_cli::run(&args) {
        Ok(report) if report.overflowed() > 0 => {
            warn!(
                placed = report.placed(),
                overflowed = report.overflowed();
                "Layout written with unplaced nodes"
            );
            ExitCode::SUCCESS
        }
        Ok(report) => {
            info!(placed = report.placed(); "Layout written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            render_diagnostics(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn render_diagnostics(err: &AtlasError) {
    let handler = miette::GraphicalReportHandler::new();

    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        if handler.render_report(&mut rendered, &reportable).is_err() {
            error!("{err}");
            continue;
        }
        error!("{rendered}");
    }
}
