//! CLI command implementations

pub mod completions;
pub mod instance;
pub mod variable;

use std::io::{BufRead, Write};

use crate::cli::terminal::Terminal;
use crate::cli::{Commands, OutputFormat};
use crate::core::client::MetalCloudClient;
use crate::core::error::Result;

/// Dispatch a parsed command to its implementation.
///
/// Returns the rendered output for the caller to print; errors from the
/// command or the remote client are passed through unchanged.
pub fn run<R: BufRead, W: Write>(
    command: Commands,
    format: OutputFormat,
    client: &dyn MetalCloudClient,
    terminal: &mut Terminal<R, W>,
) -> Result<String> {
    match command {
        Commands::Instance(cmd) => instance::run(cmd, format, client, terminal),
        Commands::Variable(cmd) => variable::run(cmd, format, client),
        Commands::Completions(args) => completions::run(args),
    }
}
