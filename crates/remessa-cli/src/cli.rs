//! CLI argument definitions for the remittance converters.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use remessa_ingest::DEFAULT_SHEET_INDEX;

#[derive(Parser)]
#[command(
    name = "remessa",
    version,
    about = "Build fixed-width remittance files for the clearinghouse",
    long_about = "Convert spreadsheets of commercial notes and deposits into the \
                  fixed-width files accepted by the clearinghouse.\n\n\
                  Deposit records are numbered from a per-day counter shared by \
                  every converter writing into the same directory."
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

    /// Allow row values such as issuer names and CNPJs in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build an NC (commercial note issuance) file.
    Nc(NcArgs),

    /// Build deposit (MDA) files, one per participant role.
    Deposit(DepositArgs),

    /// Inspect or change the daily sequence counter.
    Sequence(SequenceArgs),

    /// Count the data records of one family in a generated file.
    Count(CountArgs),

    /// Turn a sale file into the matching purchase file.
    RewriteSale(RewriteArgs),
}

/// Input options shared by the converters.
#[derive(Args)]
pub struct InputArgs {
    /// Input spreadsheet (.csv, .xlsx, .xls, .ods).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Zero-based worksheet index; falls back to the first sheet when out of range.
    #[arg(long = "sheet", value_name = "N", default_value_t = DEFAULT_SHEET_INDEX)]
    pub sheet: usize,

    /// Operation date written into headers (default: today).
    #[arg(long = "date", value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Line separator (default: crlf for NC, lf for deposit).
    #[arg(long = "line-ending", value_enum)]
    pub line_ending: Option<LineEndingArg>,
}

#[derive(Args)]
pub struct NcArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file (default: NC_<input stem>.txt next to the input).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Record variant.
    #[arg(long = "layout", value_enum, default_value = "extended")]
    pub layout: LayoutArg,

    /// JSON file overriding the issuer profile.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct DepositArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory, also holding the sequence state (default: the input's directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Participant role to build files for.
    #[arg(long = "role", value_enum, default_value = "issuer")]
    pub role: RoleArg,

    /// Seconds to wait for the sequence lock.
    #[arg(long = "lock-timeout", value_name = "SECS", default_value_t = 5)]
    pub lock_timeout: u64,
}

#[derive(Args)]
pub struct SequenceArgs {
    #[command(subcommand)]
    pub action: SequenceAction,

    /// Directory holding the sequence state.
    #[arg(long = "state-dir", value_name = "DIR", default_value = ".", global = true)]
    pub state_dir: PathBuf,

    /// Seconds to wait for the sequence lock.
    #[arg(
        long = "lock-timeout",
        value_name = "SECS",
        default_value_t = 5,
        global = true
    )]
    pub lock_timeout: u64,
}

#[derive(Subcommand)]
pub enum SequenceAction {
    /// Reserve numbers for a day and print them.
    Allocate {
        #[arg(long = "day", value_name = "YYYYMMDD")]
        day: String,
        #[arg(long = "count", default_value_t = 1)]
        count: u64,
    },

    /// Restart a day's counter at zero.
    Reset {
        #[arg(long = "day", value_name = "YYYYMMDD")]
        day: String,
    },

    /// Show the last number issued for a day, or for every day.
    Show {
        #[arg(long = "day", value_name = "YYYYMMDD")]
        day: Option<String>,
    },

    /// Delete the state for every day.
    Clear,
}

#[derive(Args)]
pub struct CountArgs {
    /// Generated remittance file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Record family to count.
    #[arg(long = "family", value_enum)]
    pub family: FamilyArg,
}

#[derive(Args)]
pub struct RewriteArgs {
    /// Sale file to rewrite.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output file (default: *_compra.txt next to the input).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    Legacy,
    Extended,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Issuer,
    Distributor,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LineEndingArg {
    Crlf,
    Lf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FamilyArg {
    Nc,
    Mda,
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

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
