//! Core module - API client, domain types and configuration

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use client::{ApiClient, ClientError, MetalCloudClient};
pub use config::Config;
pub use error::{CliError, Result};
pub use model::{Infrastructure, Instance, InstanceArray, PowerOperation, Variable};
