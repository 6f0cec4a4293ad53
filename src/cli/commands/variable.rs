//! `metalcloud-cli variable` command - Variable listing

use clap::Subcommand;
use tracing::debug;

use crate::cli::table::{CellValue, SchemaField, Table};
use crate::cli::OutputFormat;
use crate::core::client::MetalCloudClient;
use crate::core::error::Result;

#[derive(Subcommand, Debug)]
pub enum VariableCommands {
    /// List variables
    #[command(visible_alias = "ls")]
    List(ListArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Only show variables with this usage
    #[arg(long)]
    pub usage: Option<String>,
}

/// Run a variable subcommand
pub fn run(cmd: VariableCommands, format: OutputFormat, client: &dyn MetalCloudClient) -> Result<String> {
    match cmd {
        VariableCommands::List(args) => run_list(args, format, client),
    }
}

fn run_list(args: ListArgs, format: OutputFormat, client: &dyn MetalCloudClient) -> Result<String> {
    let usage = args.usage.as_deref().filter(|u| !u.is_empty());
    let variables = client.variables(usage)?;
    debug!(count = variables.len(), "fetched variables");

    let mut table = Table::new(
        "Variables",
        vec![
            SchemaField::int("ID", 6),
            SchemaField::string("NAME", 15),
            SchemaField::string("USAGE", 5),
            SchemaField::string("JSON", 30),
            SchemaField::string("CREATED", 5),
            SchemaField::string("UPDATED", 5),
        ],
    );

    // BTreeMap iteration keeps the listing sorted by name
    for variable in variables.into_values() {
        table.push_row(vec![
            CellValue::Int(variable.variable_id),
            CellValue::Text(variable.variable_name),
            CellValue::Text(variable.variable_usage.unwrap_or_default()),
            CellValue::Text(variable.variable_json),
            CellValue::Text(variable.variable_created_timestamp),
            CellValue::Text(variable.variable_updated_timestamp),
        ]);
    }

    table.render(format)
}
