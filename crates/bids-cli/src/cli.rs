//! CLI argument definitions for the BIDS transpiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bids-transpiler",
    version,
    about = "Behavioral Survey to BIDS Transpiler - Convert survey data to BIDS format",
    long_about = "Convert tabular behavioral-research data (demographics, per-session\n\
                  item responses, and per-task item definitions) into a BIDS dataset\n\
                  of JSON sidecar documents and TSV tables.\n\
                  Validates definitions and responses against each other before any\n\
                  output is written."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a study folder into a BIDS dataset.
    Convert(ConvertArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Path to the study folder containing demographics, variables, and
    /// session CSV files (task sheets under resources/).
    #[arg(value_name = "STUDY_FOLDER")]
    pub study_folder: PathBuf,

    /// Output directory for the BIDS dataset (default: <STUDY_FOLDER>/bids).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replace item descriptions in task sidecars with a placeholder.
    #[arg(long = "anonymize")]
    pub anonymize: bool,

    /// Sentinel string written to tabular cells for missing values.
    #[arg(long = "missing-value", value_name = "TEXT", default_value = "n/a")]
    pub missing_value: String,

    /// Numeric code marking missing values in source tables.
    #[arg(
        long = "missing-code",
        value_name = "CODE",
        default_value_t = -999,
        allow_hyphen_values = true
    )]
    pub missing_code: i64,

    /// Validate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Skip the external BIDS validator after writing outputs.
    #[arg(long = "skip-bids-validator")]
    pub skip_bids_validator: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
