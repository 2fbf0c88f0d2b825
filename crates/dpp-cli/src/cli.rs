//! CLI argument definitions for the DPP bridge.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dpp-bridge",
    version,
    about = "DPP Bridge - Transform manufacturing data into Digital Product Passports",
    long_about = "Transform manufacturing data into Digital Product Passport documents.\n\n\
                  Reads ISA-95/B2MML XML, CSV, and Excel sources, applies a declarative\n\
                  YAML mapping, validates against registered passport schemas, and\n\
                  exports JSON-LD."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
    /// Transform a source file into passport documents.
    Transform(TransformArgs),

    /// Extract records from a source without mapping them.
    Extract(ExtractArgs),

    /// Check mapping configuration files without running them.
    Check(CheckArgs),

    /// List available source connectors.
    Connectors,

    /// List registered passport schemas.
    Schemas,
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Path to the source data file.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Mapping configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    pub mapping: PathBuf,

    /// Write documents here instead of printing them.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fail when documents do not conform to the target schema.
    ///
    /// By default schema validation is advisory: failures are logged and the
    /// documents are kept. With this flag a non-conforming document makes
    /// the command exit non-zero.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Path to the source data file.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Connector to parse the source with (see `connectors`).
    #[arg(short, long, value_name = "NAME")]
    pub connector: String,

    /// Repeating root element (isa95 connector).
    #[arg(long, value_name = "ELEMENT")]
    pub root: Option<String>,

    /// Field delimiter (csv connector); sniffed when omitted.
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Sheet name (excel connector); the first sheet when omitted.
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// 1-based header row (excel connector).
    #[arg(long, value_name = "ROW")]
    pub header_row: Option<usize>,

    /// Rows to skip: before the header for csv, after it for excel.
    #[arg(long, value_name = "COUNT")]
    pub skip_rows: Option<usize>,

    /// Write records here instead of printing them.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Mapping configuration files to check.
    #[arg(value_name = "MAPPING", required = true)]
    pub mappings: Vec<PathBuf>,
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
