use anyhow::Context;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{schema, DatabaseManager, PgStore};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ collection_name: [] }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Connect to `DATABASE_URL` and bring the schema up to date.
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<PgStore>> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    schema::migrate(&pool)
        .await
        .context("failed to apply database schema")?;
    Ok(Arc::new(PgStore::new(pool)))
}
