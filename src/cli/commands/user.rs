use clap::Subcommand;

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::Store;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Delete a user together with profile and additional info")]
    Remove {
        #[arg(long)]
        mobile_number: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store(config::config()).await?;

    match cmd {
        UserCommands::Remove { mobile_number } => {
            let user = store
                .find_user_by_mobile(mobile_number.trim())
                .await?
                .ok_or_else(|| anyhow::anyhow!("No user with mobile number {}", mobile_number))?;
            store.delete_user(user.id).await?;
            output_success(output_format, &format!("Removed user {}", user), None)
        }
    }
}
