use anyhow::Context;
use clap::Args;
use serde_json::json;
use std::sync::Arc;

use crate::auth::Argon2Hasher;
use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::services::{UserFields, UserManager};
use crate::validation::{parse_birth_date, validate_name, Gender};

#[derive(Args, Debug)]
pub struct SuperuserArgs {
    #[arg(long, help = "Nine-digit mobile number, e.g. 501234567")]
    pub mobile_number: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, help = "DD.MM.YYYY or YYYY-MM-DD")]
    pub birth_date: String,

    #[arg(long, help = "M or F")]
    pub gender: String,
}

pub async fn handle(args: SuperuserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    validate_name(&args.first_name).context("invalid first name")?;
    validate_name(&args.last_name).context("invalid last name")?;
    let birth_date = parse_birth_date(&args.birth_date).context("invalid birth date")?;
    let gender = Gender::parse(&args.gender).context("invalid gender")?;

    let config = config::config();
    let store = connect_store(config).await?;
    let hasher = Arc::new(Argon2Hasher::from_config(&config.security)?);
    let users = UserManager::new(store, hasher);

    let user = users
        .create_superuser(
            &args.mobile_number,
            Some(&args.password),
            UserFields::new(args.first_name, args.last_name, birth_date, gender),
        )
        .await?;

    output_success(
        output_format,
        &format!("Superuser {} created", user),
        Some(json!(user.summary())),
    )
}
