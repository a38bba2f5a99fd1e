//! Command-line arguments of the `atlas` binary.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use log::LevelFilter;

/// Lay out an isometric map document and write its screen-space report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Map document (TOML) listing nodes and, for manual mode, regions
    pub input: PathBuf,

    /// Where to write the layout report
    #[arg(short, long, default_value = "layout.toml")]
    pub output: PathBuf,

    /// Configuration file; searched for in the usual places when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Lay out and validate without writing the report
    #[arg(long)]
    pub dry_run: bool,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Level filter for the logger.
    ///
    /// An unknown level is reported on stderr and treated as `warn`.
    pub fn log_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            eprintln!(
                "Unknown log level `{}`, falling back to `warn`",
                self.log_level
            );
            LevelFilter::Warn
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["atlas", "map.toml"]).unwrap();

        assert_eq!(args.input, PathBuf::from("map.toml"));
        assert_eq!(args.output, PathBuf::from("layout.toml"));
        assert!(args.config.is_none());
        assert!(!args.dry_run);
        assert_eq!(args.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_known_log_level_is_case_insensitive() {
        let args = Args::try_parse_from(["atlas", "map.toml", "--log-level", "DEBUG"]).unwrap();

        assert_eq!(args.log_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_warn() {
        let args = Args::try_parse_from(["atlas", "map.toml", "--log-level", "verbose"]).unwrap();

        assert_eq!(args.log_level, "verbose");
        assert_eq!(args.log_filter(), LevelFilter::Warn);
    }
}
