//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, emp::EmpCommands, import::ImportArgs,
    qual::QualCommands, seed::SeedArgs,
};

#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about = "Employee roster and qualification catalog client")]
#[command(long_about = "Manage employees and the qualifications they hold against a roster backend. \
Lists are searched and paginated locally; every change is followed by a full reload.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log filter, e.g. `info` or `roster=debug` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Backend base URL (overrides config and ROSTER_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Employee management
    #[command(subcommand)]
    Emp(EmpCommands),

    /// Qualification catalog management
    #[command(subcommand)]
    Qual(QualCommands),

    /// Import employees from a CSV file
    Import(ImportArgs),

    /// Fill the backend with generated demo data
    Seed(SeedArgs),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Parse a `default_format` config value
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}
