//! Domain objects returned by the Metal Cloud API
//!
//! Only the fields the CLI reads are modelled; everything else in the
//! remote payload is ignored during deserialization.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Power control operation accepted by `instance_server_power_set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerOperation {
    /// Power the server on
    On,
    /// Hard power off
    Off,
    /// Hard reset
    Reset,
    /// ACPI soft shutdown
    Soft,
}

impl PowerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerOperation::On => "on",
            PowerOperation::Off => "off",
            PowerOperation::Reset => "reset",
            PowerOperation::Soft => "soft",
        }
    }

    /// Verb phrase used in confirmation messages
    pub fn describe(&self) -> &'static str {
        match self {
            PowerOperation::On => "Turning on",
            PowerOperation::Off => "Turning off (hard)",
            PowerOperation::Reset => "Rebooting",
            PowerOperation::Soft => "Shutting down",
        }
    }
}

impl std::fmt::Display for PowerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single compute unit belonging to an instance array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub instance_id: i64,
    pub instance_label: String,
    pub instance_array_id: i64,
    pub instance_subdomain_permanent: String,
    pub instance_credentials: InstanceCredentials,
}

/// A group of instances sharing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceArray {
    pub instance_array_id: i64,
    pub instance_array_label: String,
    pub infrastructure_id: i64,
}

/// Top-level container of instance arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    pub infrastructure_id: i64,
    pub infrastructure_label: String,
}

/// Access details attached to an instance.
///
/// Every credential block is optional; the API omits (or nulls) the ones
/// that do not apply to the instance's OS and storage setup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceCredentials {
    pub ip_addresses_public: Vec<IpAddress>,
    pub ip_addresses_private: Vec<IpAddress>,
    pub ssh: Option<SshCredentials>,
    pub rdp: Option<RdpCredentials>,
    pub iscsi: Option<IscsiInitiator>,
    /// Keyed by drive label; iteration order is the label order.
    pub shared_drives: Option<BTreeMap<String, SharedDriveCredentials>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAddress {
    pub ip_human_readable: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshCredentials {
    pub username: String,
    pub initial_password: String,
    pub port: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdpCredentials {
    pub username: String,
    pub initial_password: String,
    pub port: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IscsiInitiator {
    pub initiator_iqn: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedDriveCredentials {
    pub storage_ip_address: String,
    pub storage_port: i64,
    pub target_iqn: String,
    pub lun_id: i64,
}

/// A user-defined variable usable in deploy-time templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub variable_id: i64,
    pub variable_name: String,
    pub variable_usage: Option<String>,
    pub variable_json: String,
    pub variable_created_timestamp: String,
    pub variable_updated_timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_operation_wire_names() {
        assert_eq!(PowerOperation::On.to_string(), "on");
        assert_eq!(PowerOperation::Soft.as_str(), "soft");
        assert_eq!(
            serde_json::to_string(&PowerOperation::Reset).unwrap(),
            "\"reset\""
        );
    }

    #[test]
    fn test_power_operation_descriptions() {
        assert_eq!(PowerOperation::On.describe(), "Turning on");
        assert_eq!(PowerOperation::Off.describe(), "Turning off (hard)");
        assert_eq!(PowerOperation::Reset.describe(), "Rebooting");
        assert_eq!(PowerOperation::Soft.describe(), "Shutting down");
    }

    #[test]
    fn test_instance_deserializes_with_missing_credentials() {
        let json = r#"{"instance_id": 12, "instance_label": "web-1", "instance_array_id": 3}"#;
        let instance: Instance = serde_json::from_str(json).unwrap();

        assert_eq!(instance.instance_id, 12);
        assert_eq!(instance.instance_array_id, 3);
        assert!(instance.instance_credentials.ssh.is_none());
        assert!(instance.instance_credentials.shared_drives.is_none());
    }

    #[test]
    fn test_credentials_null_blocks_are_none() {
        let json = r#"{
            "ip_addresses_public": [{"ip_human_readable": "84.40.58.2"}],
            "ssh": {"username": "root", "initial_password": "pw", "port": 22},
            "rdp": null,
            "iscsi": null
        }"#;
        let creds: InstanceCredentials = serde_json::from_str(json).unwrap();

        assert_eq!(creds.ip_addresses_public[0].ip_human_readable, "84.40.58.2");
        assert_eq!(creds.ssh.as_ref().map(|s| s.port), Some(22));
        assert!(creds.rdp.is_none());
        assert!(creds.iscsi.is_none());
    }

    #[test]
    fn test_variable_ignores_unknown_fields() {
        let json = r#"{"variable_id": 7, "variable_name": "ntp", "user_id_owner": 1}"#;
        let variable: Variable = serde_json::from_str(json).unwrap();
        assert_eq!(variable.variable_id, 7);
        assert_eq!(variable.variable_name, "ntp");
        assert!(variable.variable_usage.is_none());
    }
}
