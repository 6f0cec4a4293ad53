//! metalcloud: command line client for the Metal Cloud API
//!
//! Controls instance power, shows instance credentials and lists variables,
//! rendering results as text tables, CSV, JSON, YAML or Markdown.

pub mod cli;
pub mod core;
