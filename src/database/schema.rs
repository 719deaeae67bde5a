use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::store::StoreError;

/// Idempotent DDL, applied in order inside one transaction.
const STATEMENTS: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            first_name VARCHAR(20) NOT NULL,
            last_name VARCHAR(20) NOT NULL,
            birth_date DATE NOT NULL,
            mobile_number VARCHAR(9) NOT NULL UNIQUE,
            password_hash TEXT,
            gender VARCHAR(1) NOT NULL CHECK (gender IN ('M', 'F')),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            is_staff BOOLEAN NOT NULL DEFAULT FALSE,
            is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
            date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    ),
    (
        "professional_fields",
        "CREATE TABLE IF NOT EXISTS professional_fields (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL UNIQUE
        )",
    ),
    (
        "professional_qualifications",
        "CREATE TABLE IF NOT EXISTS professional_qualifications (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL UNIQUE
        )",
    ),
    (
        "regions",
        "CREATE TABLE IF NOT EXISTS regions (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL UNIQUE
        )",
    ),
    (
        "professional_profiles",
        "CREATE TABLE IF NOT EXISTS professional_profiles (
            user_id BIGINT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            profession_id BIGINT NOT NULL REFERENCES professional_fields(id) ON DELETE RESTRICT,
            qualification_id BIGINT NOT NULL REFERENCES professional_qualifications(id) ON DELETE RESTRICT,
            work_experience INTEGER NOT NULL CHECK (work_experience >= 0)
        )",
    ),
    (
        "professional_profile_regions",
        "CREATE TABLE IF NOT EXISTS professional_profile_regions (
            user_id BIGINT NOT NULL REFERENCES professional_profiles(user_id) ON DELETE CASCADE,
            region_id BIGINT NOT NULL REFERENCES regions(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, region_id)
        )",
    ),
    (
        "additional_info",
        "CREATE TABLE IF NOT EXISTS additional_info (
            user_id BIGINT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            education VARCHAR(32) NOT NULL,
            education_major VARCHAR(50),
            languages TEXT[] NOT NULL,
            profile_photo TEXT,
            facebook TEXT,
            instagram TEXT,
            tiktok TEXT,
            linkedin TEXT,
            portfolio_images TEXT[] NOT NULL DEFAULT '{}',
            note VARCHAR(1500)
        )",
    ),
];

/// Create any missing tables.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    for (table, ddl) in STATEMENTS {
        debug!("Ensuring table {}", table);
        sqlx::query(ddl).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Database schema is up to date ({} tables)", STATEMENTS.len());
    Ok(())
}
