//! CLI logic for the Atlas map layout tool.
//!
//! This module contains the core CLI logic: read a map document, lay it
//! out, and write the screen-space report.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use atlas::{AtlasError, LayoutBuilder, export::LayoutReport};

/// Run the Atlas CLI application
///
/// This function processes the input file through the Atlas pipeline
/// and writes the resulting layout report to the output file. The written
/// report is returned so callers can summarize it.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `AtlasError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Invalid nodes or regions
/// - Region cap violations under the `fail` policy
pub fn run(args: &Args) -> Result<LayoutReport, AtlasError> {
    info!(
        input_path:? = args.input,
        output_path:? = args.output;
        "Processing map"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = LayoutBuilder::new(app_config);
    let document = builder.parse(&source)?;
    let layout = builder.layout(&document)?;
    let report = builder.report(&layout)?;

    let rendered = report.to_toml_string()?;
    if args.dry_run {
        info!("Dry run, report not written");
        return Ok(report);
    }
    fs::write(&args.output, rendered)?;

    info!(output_file:? = args.output; "Layout report exported successfully");

    Ok(report)
}
