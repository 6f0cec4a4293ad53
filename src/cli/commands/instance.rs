//! `metalcloud-cli instance` command - Instance power control and credentials

use clap::Subcommand;
use std::io::{BufRead, Write};
use tracing::{debug, info};

use crate::cli::helpers::{join_ip_addresses, require_arg};
use crate::cli::table::{RecordBuilder, SchemaField};
use crate::cli::terminal::Terminal;
use crate::cli::OutputFormat;
use crate::core::client::MetalCloudClient;
use crate::core::error::Result;
use crate::core::model::{Infrastructure, Instance, InstanceArray, PowerOperation};

const ID_REQUIRED: &str = "--id is required (instance id)";
const OPERATION_REQUIRED: &str = "--operation is required (one of: on, off, reset, soft)";

#[derive(Subcommand, Debug)]
pub enum InstanceCommands {
    /// Control an instance's power
    #[command(visible_aliases = ["power_control", "pwr"])]
    PowerControl(PowerControlArgs),

    /// Show an instance's credentials
    #[command(visible_alias = "creds")]
    Credentials(CredentialsArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct PowerControlArgs {
    /// (Required) Instance ID
    #[arg(long)]
    pub id: Option<i64>,

    /// (Required) Power control operation
    #[arg(long, value_enum)]
    pub operation: Option<PowerOperation>,

    /// Do not ask for confirmation
    #[arg(long)]
    pub autoconfirm: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct CredentialsArgs {
    /// (Required) Instance ID
    #[arg(long)]
    pub id: Option<i64>,
}

/// Run an instance subcommand
pub fn run<R: BufRead, W: Write>(
    cmd: InstanceCommands,
    format: OutputFormat,
    client: &dyn MetalCloudClient,
    terminal: &mut Terminal<R, W>,
) -> Result<String> {
    match cmd {
        InstanceCommands::PowerControl(args) => run_power_control(args, client, terminal),
        InstanceCommands::Credentials(args) => run_credentials(args, format, client),
    }
}

/// Fetch an instance together with its instance array and infrastructure
fn fetch_with_parents(
    client: &dyn MetalCloudClient,
    instance_id: i64,
) -> Result<(Instance, InstanceArray, Infrastructure)> {
    let instance = client.instance_get(instance_id)?;
    let array = client.instance_array_get(instance.instance_array_id)?;
    let infrastructure = client.infrastructure_get(array.infrastructure_id)?;
    Ok((instance, array, infrastructure))
}

fn power_confirmation_message(
    operation: PowerOperation,
    instance: &Instance,
    array: &InstanceArray,
    infrastructure: &Infrastructure,
) -> String {
    format!(
        "{} instance {} ({}) of instance array {} (#{}) infrastructure {} (#{}).  Are you sure? Type \"yes\" to continue:",
        operation.describe(),
        instance.instance_label,
        instance.instance_id,
        array.instance_array_label,
        array.instance_array_id,
        infrastructure.infrastructure_label,
        infrastructure.infrastructure_id,
    )
}

fn run_power_control<R: BufRead, W: Write>(
    args: PowerControlArgs,
    client: &dyn MetalCloudClient,
    terminal: &mut Terminal<R, W>,
) -> Result<String> {
    let instance_id = require_arg(args.id, ID_REQUIRED)?;
    let operation = require_arg(args.operation, OPERATION_REQUIRED)?;

    let (instance, array, infrastructure) = fetch_with_parents(client, instance_id)?;

    let confirmed = terminal.confirm(args.autoconfirm, || {
        power_confirmation_message(operation, &instance, &array, &infrastructure)
    })?;

    if !confirmed {
        debug!(instance_id, %operation, "power operation declined");
        return Ok(String::new());
    }

    client.instance_server_power_set(instance_id, operation)?;
    info!(instance_id, %operation, "power operation requested");

    Ok(String::new())
}

fn run_credentials(
    args: CredentialsArgs,
    format: OutputFormat,
    client: &dyn MetalCloudClient,
) -> Result<String> {
    let instance_id = require_arg(args.id, ID_REQUIRED)?;
    let (instance, array, infrastructure) = fetch_with_parents(client, instance_id)?;
    let creds = &instance.instance_credentials;

    let mut record = RecordBuilder::new();
    record
        .push(SchemaField::int("ID", 6), instance.instance_id)
        .push(
            SchemaField::string("SUBDOMAIN", 10),
            instance.instance_subdomain_permanent.as_str(),
        )
        .push(
            SchemaField::string("INSTANCE_ARRAY", 10),
            array.instance_array_label.as_str(),
        )
        .push(
            SchemaField::string("INFRASTRUCTURE", 10),
            infrastructure.infrastructure_label.as_str(),
        )
        .push(
            SchemaField::string("PUBLIC_IPs", 6),
            join_ip_addresses(&creds.ip_addresses_public),
        )
        .push(
            SchemaField::string("PRIVATE_IPs", 6),
            join_ip_addresses(&creds.ip_addresses_private),
        );

    if let Some(ref ssh) = creds.ssh {
        record
            .push(SchemaField::string("SSH_USERNAME", 10), ssh.username.as_str())
            .push(SchemaField::string("SSH_PASSWORD", 10), ssh.initial_password.as_str())
            .push(SchemaField::int("SSH_PORT", 10), ssh.port);
    }

    if let Some(ref rdp) = creds.rdp {
        record
            .push(SchemaField::string("RDP_USERNAME", 5), rdp.username.as_str())
            .push(SchemaField::string("RDP_PASSWORD", 5), rdp.initial_password.as_str())
            .push(SchemaField::int("RDP_PORT", 5), rdp.port);
    }

    if let Some(ref iscsi) = creds.iscsi {
        record
            .push(SchemaField::string("INITIATOR_IQN", 5), iscsi.initiator_iqn.as_str())
            .push(SchemaField::string("ISCSI_USERNAME", 5), iscsi.username.as_str())
            .push(SchemaField::string("ISCSI_PASSWORD", 5), iscsi.password.as_str());
    }

    if let Some(ref drives) = creds.shared_drives {
        for (index, drive) in drives.values().enumerate() {
            record
                .push(
                    SchemaField::string(format!("SHARED_DRIVE_{}_TARGET_IP_ADDRESS", index), 5),
                    drive.storage_ip_address.as_str(),
                )
                .push(
                    SchemaField::int(format!("SHARED_DRIVE_{}_TARGET_PORT", index), 5),
                    drive.storage_port,
                )
                .push(
                    SchemaField::string(format!("SHARED_DRIVE_{}_TARGET_IQN", index), 5),
                    drive.target_iqn.as_str(),
                )
                .push(
                    SchemaField::int(format!("SHARED_DRIVE_{}_LUN_ID", index), 5),
                    drive.lun_id,
                );
        }
    }

    let table = record
        .into_table("Records")
        .with_caption(format!("Instance {}", instance.instance_subdomain_permanent));
    debug!(instance_id, columns = table.schema.len(), "rendering credentials");

    table.render_transposed(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::fake::FakeClient;
    use crate::core::model::{
        InstanceCredentials, IpAddress, IscsiInitiator, RdpCredentials, SharedDriveCredentials,
        SshCredentials,
    };
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn terminal(input: &str) -> Terminal<Cursor<Vec<u8>>, Vec<u8>> {
        Terminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn ssh_only_credentials() -> InstanceCredentials {
        InstanceCredentials {
            ip_addresses_public: vec![IpAddress {
                ip_human_readable: "84.40.58.2".to_string(),
            }],
            ip_addresses_private: vec![
                IpAddress {
                    ip_human_readable: "10.0.0.4".to_string(),
                },
                IpAddress {
                    ip_human_readable: "10.0.0.5".to_string(),
                },
            ],
            ssh: Some(SshCredentials {
                username: "root".to_string(),
                initial_password: "s3cret".to_string(),
                port: 22,
            }),
            ..Default::default()
        }
    }

    fn power_args(id: Option<i64>, operation: Option<PowerOperation>, autoconfirm: bool) -> PowerControlArgs {
        PowerControlArgs {
            id,
            operation,
            autoconfirm,
        }
    }

    fn credentials_json(client: &FakeClient) -> serde_json::Map<String, Value> {
        let out = run_credentials(CredentialsArgs { id: Some(12) }, OutputFormat::Json, client).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        parsed[0].as_object().unwrap().clone()
    }

    #[test]
    fn test_power_control_requires_id() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let err = run_power_control(
            power_args(None, Some(PowerOperation::On), true),
            &client,
            &mut terminal(""),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "--id is required (instance id)");
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_power_control_requires_operation() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let err = run_power_control(power_args(Some(12), None, true), &client, &mut terminal(""))
            .unwrap_err();

        assert!(err.to_string().contains("--operation is required"));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_power_control_confirmed() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let mut term = terminal("yes\n");

        let out = run_power_control(
            power_args(Some(12), Some(PowerOperation::Reset), false),
            &client,
            &mut term,
        )
        .unwrap();

        assert_eq!(out, "");
        assert_eq!(client.power_calls(), vec![(12, PowerOperation::Reset)]);

        let prompt = String::from_utf8_lossy(term.output()).to_string();
        assert!(prompt.contains(
            "Rebooting instance web-1 (12) of instance array frontend (#3) infrastructure production (#9).  Are you sure? Type \"yes\" to continue:"
        ));
    }

    #[test]
    fn test_power_control_declined_does_not_mutate() {
        let client = FakeClient::with_instance(ssh_only_credentials());

        for answer in ["no\n", "y\n", ""] {
            let out = run_power_control(
                power_args(Some(12), Some(PowerOperation::Off), false),
                &client,
                &mut terminal(answer),
            )
            .unwrap();
            assert_eq!(out, "");
        }

        assert!(client.power_calls().is_empty());
    }

    #[test]
    fn test_power_control_autoconfirm_never_prompts() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let mut term = terminal("");

        run_power_control(
            power_args(Some(12), Some(PowerOperation::Soft), true),
            &client,
            &mut term,
        )
        .unwrap();

        assert!(term.output().is_empty());
        assert_eq!(client.power_calls(), vec![(12, PowerOperation::Soft)]);
    }

    #[test]
    fn test_power_control_fetches_parents_in_order() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        run_power_control(
            power_args(Some(12), Some(PowerOperation::On), true),
            &client,
            &mut terminal(""),
        )
        .unwrap();

        assert_eq!(
            client.calls(),
            vec![
                "instance_get(12)",
                "instance_array_get(3)",
                "infrastructure_get(9)",
                "instance_server_power_set(12, on)",
            ]
        );
    }

    #[test]
    fn test_power_control_remote_error_short_circuits() {
        let mut client = FakeClient::with_instance(ssh_only_credentials());
        client.arrays.clear();

        let err = run_power_control(
            power_args(Some(12), Some(PowerOperation::On), true),
            &client,
            &mut terminal(""),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Instance array 3 not found.");
        assert_eq!(client.calls(), vec!["instance_get(12)", "instance_array_get(3)"]);
        assert!(client.power_calls().is_empty());
    }

    #[test]
    fn test_power_confirmation_messages() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let (instance, array, infra) = fetch_with_parents(&client, 12).unwrap();

        let on = power_confirmation_message(PowerOperation::On, &instance, &array, &infra);
        assert!(on.starts_with("Turning on instance web-1 (12)"));

        let off = power_confirmation_message(PowerOperation::Off, &instance, &array, &infra);
        assert!(off.starts_with("Turning off (hard) instance"));

        let soft = power_confirmation_message(PowerOperation::Soft, &instance, &array, &infra);
        assert!(soft.starts_with("Shutting down instance"));
    }

    #[test]
    fn test_credentials_requires_id() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let err = run_credentials(CredentialsArgs { id: None }, OutputFormat::Text, &client).unwrap_err();
        assert_eq!(err.to_string(), "--id is required (instance id)");
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_credentials_ssh_only_has_nine_columns() {
        let client = FakeClient::with_instance(ssh_only_credentials());
        let record = credentials_json(&client);

        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "ID",
                "SUBDOMAIN",
                "INSTANCE_ARRAY",
                "INFRASTRUCTURE",
                "PUBLIC_IPs",
                "PRIVATE_IPs",
                "SSH_USERNAME",
                "SSH_PASSWORD",
                "SSH_PORT",
            ]
        );
        assert_eq!(record["ID"].as_i64(), Some(12));
        assert_eq!(record["INSTANCE_ARRAY"], "frontend");
        assert_eq!(record["INFRASTRUCTURE"], "production");
        assert_eq!(record["PRIVATE_IPs"], "10.0.0.4 10.0.0.5");
        assert_eq!(record["SSH_PORT"].as_i64(), Some(22));
    }

    #[test]
    fn test_credentials_all_blocks() {
        let mut drives = BTreeMap::new();
        for (label, ip) in [("backup", "100.64.0.2"), ("shared", "100.64.0.3")] {
            drives.insert(
                label.to_string(),
                SharedDriveCredentials {
                    storage_ip_address: ip.to_string(),
                    storage_port: 3260,
                    target_iqn: format!("iqn.2013-01.com.example:{}", label),
                    lun_id: 4,
                },
            );
        }
        let creds = InstanceCredentials {
            rdp: Some(RdpCredentials {
                username: "Administrator".to_string(),
                initial_password: "pw".to_string(),
                port: 3389,
            }),
            iscsi: Some(IscsiInitiator {
                initiator_iqn: "iqn.2013-01.com.example:initiator".to_string(),
                username: "chap".to_string(),
                password: "chap-pw".to_string(),
            }),
            shared_drives: Some(drives),
            ..ssh_only_credentials()
        };
        let client = FakeClient::with_instance(creds);
        let record = credentials_json(&client);

        assert_eq!(record.len(), 6 + 3 + 3 + 3 + 8);
        assert_eq!(record["RDP_PORT"].as_i64(), Some(3389));
        assert_eq!(record["INITIATOR_IQN"], "iqn.2013-01.com.example:initiator");
        assert_eq!(record["SHARED_DRIVE_0_TARGET_IP_ADDRESS"], "100.64.0.2");
        assert_eq!(record["SHARED_DRIVE_1_TARGET_IQN"], "iqn.2013-01.com.example:shared");
        assert_eq!(record["SHARED_DRIVE_1_TARGET_PORT"].as_i64(), Some(3260));
        assert!(!record.contains_key("SHARED_DRIVE_2_LUN_ID"));
    }

    #[test]
    fn test_credentials_without_optional_blocks() {
        let client = FakeClient::with_instance(InstanceCredentials::default());
        let record = credentials_json(&client);
        assert_eq!(record.len(), 6);
        assert_eq!(record["PUBLIC_IPs"], "");
    }

    #[test]
    fn test_credentials_text_and_csv() {
        let client = FakeClient::with_instance(ssh_only_credentials());

        let text = run_credentials(CredentialsArgs { id: Some(12) }, OutputFormat::Text, &client).unwrap();
        assert!(text.starts_with("Records\nInstance instance-12.vanilla.example.net\n"));
        assert!(text.contains("SSH_PASSWORD"));
        assert!(text.contains("s3cret"));

        let csv = run_credentials(CredentialsArgs { id: Some(12) }, OutputFormat::Csv, &client).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID,SUBDOMAIN,INSTANCE_ARRAY"));
        assert!(lines[1].starts_with("12,instance-12.vanilla.example.net,frontend,production"));
    }
}
