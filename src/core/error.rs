//! Error types surfaced by CLI commands

use miette::Diagnostic;
use thiserror::Error;

use crate::core::client::ClientError;

/// Errors that can occur while executing a command
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// A required flag was not supplied
    #[error("{0}")]
    #[diagnostic(code(metalcloud::args::missing))]
    MissingArgument(String),

    #[error("unsupported format: '{0}'")]
    #[diagnostic(
        code(metalcloud::render::format),
        help("supported formats are: text, csv, json, yaml, md")
    )]
    UnsupportedFormat(String),

    /// A row does not line up with its schema. Always a bug in the caller.
    #[error("row {row} does not match the table schema: {reason}")]
    #[diagnostic(code(metalcloud::render::schema))]
    SchemaMismatch { row: usize, reason: String },

    #[error(transparent)]
    #[diagnostic(code(metalcloud::client))]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Serialize(String),
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        CliError::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Serialize(err.to_string())
    }
}

impl From<serde_yml::Error> for CliError {
    fn from(err: serde_yml::Error) -> Self {
        CliError::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
