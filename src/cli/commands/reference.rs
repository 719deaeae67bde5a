use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_store, output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::ReferenceKind;
use crate::services::ReferenceService;

#[derive(Subcommand)]
pub enum ReferenceCommands {
    #[command(about = "Add a reference entry")]
    Add {
        #[arg(long, help = "field, qualification or region")]
        kind: ReferenceKind,
        #[arg(long)]
        name: String,
    },

    #[command(about = "List reference entries")]
    List {
        #[arg(long, help = "field, qualification or region")]
        kind: ReferenceKind,
    },

    #[command(about = "Remove a reference entry")]
    Remove {
        #[arg(long, help = "field, qualification or region")]
        kind: ReferenceKind,
        #[arg(long)]
        id: i64,
    },
}

pub async fn handle(cmd: ReferenceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = ReferenceService::new(connect_store(config::config()).await?);

    match cmd {
        ReferenceCommands::Add { kind, name } => {
            let reference = service.add(kind, &name).await?;
            output_success(
                output_format,
                &format!("Added {} '{}' with id {}", kind, reference.name, reference.id),
                Some(json!(reference)),
            )
        }
        ReferenceCommands::List { kind } => {
            let rows = service.list(kind).await?;
            if rows.is_empty() {
                return output_empty_collection(
                    output_format,
                    kind.plural(),
                    &format!("No {} entries", kind),
                );
            }
            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ kind.plural(): rows }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{:<8} {}", "ID", "NAME");
                    println!("{}", "-".repeat(40));
                    for row in rows {
                        println!("{:<8} {}", row.id, row.name);
                    }
                }
            }
            Ok(())
        }
        ReferenceCommands::Remove { kind, id } => {
            service.remove(kind, id).await?;
            output_success(output_format, &format!("Removed {} {}", kind, id), None)
        }
    }
}
