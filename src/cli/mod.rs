pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "profreg")]
#[command(about = "Professional registration API server and administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
        in_memory: bool,
    },

    #[command(about = "Create or update the database schema")]
    Migrate,

    #[command(about = "Create a staff superuser")]
    CreateSuperuser(commands::superuser::SuperuserArgs),

    #[command(about = "Manage profession fields, qualifications and regions")]
    Reference {
        #[command(subcommand)]
        cmd: commands::reference::ReferenceCommands,
    },

    #[command(about = "User administration")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { in_memory } => commands::serve::handle(in_memory).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateSuperuser(args) => commands::superuser::handle(args, output_format).await,
        Commands::Reference { cmd } => commands::reference::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}
