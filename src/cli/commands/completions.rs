//! Shell completion generation
//!
//! Generates shell completion scripts for bash, zsh, fish, and PowerShell.
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(metalcloud-cli completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(metalcloud-cli completions zsh)
//!
//! # Fish
//! metalcloud-cli completions fish > ~/.config/fish/completions/metalcloud-cli.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::core::error::{CliError, Result};

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Produce the completion script as a string
pub fn run(args: CompletionsArgs) -> Result<String> {
    let mut cmd = Cli::command();
    let mut script = Vec::new();
    generate(args.shell, &mut cmd, "metalcloud-cli", &mut script);
    String::from_utf8(script).map_err(|e| CliError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completions_mention_subcommands() {
        let script = run(CompletionsArgs { shell: Shell::Bash }).unwrap();
        assert!(script.contains("metalcloud-cli"));
        assert!(script.contains("instance"));
        assert!(script.contains("credentials"));
    }
}
