//! CLI module - argument parsing, command dispatch and output rendering

pub mod args;
pub mod commands;
pub mod helpers;
pub mod table;
pub mod terminal;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
