//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use retail_model::{DateOrder, DocumentFormat, Domain};

#[derive(Parser)]
#[command(
    name = "retail-etl",
    version,
    about = "Extract, clean and load retail sales data",
    long_about = "Extract retail datasets from a legacy database, HTTP APIs and object storage,\n\
                  clean them domain by domain and load them into a central database."
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

    /// Allow row values (names, card numbers) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the configured extract, clean and load jobs.
    Run(RunArgs),

    /// Clean one local CSV or JSON file and write the result as CSV.
    Clean(CleanArgs),

    /// List the supported domains and their default tables.
    Domains,

    /// List the tables of the source database.
    ListTables(ListTablesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Pipeline configuration file.
    #[arg(long = "config", short = 'c', value_name = "PATH", default_value = "retail-etl.toml")]
    pub config: PathBuf,

    /// Only run jobs for these domains (repeatable).
    #[arg(long = "domain", short = 'd', value_name = "DOMAIN")]
    pub domains: Vec<Domain>,

    /// Run jobs one after another instead of one thread per job.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Extract and clean without loading.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Domain of the input file (users, cards, stores, products, orders, date-events).
    #[arg(value_name = "DOMAIN")]
    pub domain: Domain,

    /// CSV or JSON file to clean.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV (default: <INPUT stem>_clean.csv next to the input).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Input format when the extension does not tell.
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Rules file merged over the built-in cleaning rules.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Read ambiguous numeric dates as day/month.
    #[arg(long = "day-first")]
    pub day_first: bool,
}

impl CleanArgs {
    pub fn document_format(&self) -> Option<DocumentFormat> {
        self.format.map(|format| match format {
            FormatArg::Csv => DocumentFormat::Csv,
            FormatArg::Json => DocumentFormat::Json,
        })
    }

    pub fn date_order(&self) -> Option<DateOrder> {
        self.day_first.then_some(DateOrder::DayFirst)
    }
}

#[derive(Parser)]
pub struct ListTablesArgs {
    /// Credentials file with the source database.
    #[arg(long = "credentials", value_name = "PATH", default_value = "db_creds.yaml")]
    pub credentials: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
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
