//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::str::FromStr;

use crate::cli::commands::{
    completions::CompletionsArgs, instance::InstanceCommands, variable::VariableCommands,
};
use crate::core::error::CliError;

#[derive(Parser)]
#[command(name = "metalcloud-cli")]
#[command(author, version, about = "Metal Cloud command line client")]
#[command(long_about = "Manage instances, instance arrays and infrastructures through the Metal Cloud API.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Output format (default: human readable text, or `default_format` from config)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Instance operations (power control, credentials)
    #[command(subcommand)]
    #[command(visible_alias = "instances")]
    Instance(InstanceCommands),

    /// Variable management
    #[command(subcommand)]
    #[command(visible_alias = "variables")]
    Variable(VariableCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable fixed-width table
    #[default]
    Text,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// Markdown tables
    Md,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    /// Parse a format name. An empty string means the default text table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "md" | "markdown" => Ok(OutputFormat::Md),
            _ => Err(CliError::UnsupportedFormat(s.to_string())),
        }
    }
}
