//! Record commands, shared by contracts and health certificates
//!
//! Usage: ajeer <contracts|certificates> <list|get|delete|disable|enable> [ID]

use ajeer_core::{Entity, RecordManager};
use clap::{Args, Subcommand};
use log::info;

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// Print every record as JSON
    List,
    /// Print one record as JSON
    Get { id: String },
    /// Delete a record
    Delete { id: String },
    /// Block a contract or disable a certificate
    Disable { id: String },
    /// Unblock a contract or re-enable a certificate
    Enable { id: String },
}

/// Execute a record command against `manager`
pub async fn execute<E: Entity>(
    manager: &RecordManager<E>,
    args: RecordArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RecordCommand::List => {
            let records = manager.list_all().await;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        RecordCommand::Get { id } => match manager.get_by_id(&id).await {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => return Err(format!("no {} with id `{id}`", E::SCHEMA.name).into()),
        },
        RecordCommand::Delete { id } => {
            manager.delete(&id).await?;
            info!("event=cli_delete module=cli entity={} id={}", E::SCHEMA.name, id);
            println!("deleted {id}");
        }
        RecordCommand::Disable { id } => set_status(manager, &id, true).await?,
        RecordCommand::Enable { id } => set_status(manager, &id, false).await?,
    }
    Ok(())
}

async fn set_status<E: Entity>(
    manager: &RecordManager<E>,
    id: &str,
    disabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match manager.toggle_status(id, disabled).await? {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        None => Err(format!("no {} with id `{id}`", E::SCHEMA.name).into()),
    }
}
