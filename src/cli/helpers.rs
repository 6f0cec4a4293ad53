//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use crate::core::error::{CliError, Result};
use crate::core::model::IpAddress;

/// Unwrap a required flag value, or fail with a descriptive message
///
/// Required flags are optional at the parser level so that the command can
/// report which value is missing before any remote call is made.
pub fn require_arg<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| CliError::MissingArgument(message.to_string()))
}

/// Join human readable IP addresses with a single space
pub fn join_ip_addresses(ips: &[IpAddress]) -> String {
    ips.iter()
        .map(|ip| ip.ip_human_readable.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
