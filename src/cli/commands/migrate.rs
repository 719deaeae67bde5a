use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config;

/// Schema creation is idempotent, so this is safe to run on every deploy.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    connect_store(config::config()).await?;
    output_success(output_format, "Database schema is up to date", None)
}
