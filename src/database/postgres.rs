use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::database::models::{
    AdditionalInfo, NewRegistration, NewUser, ProfessionalProfile, Reference, ReferenceKind, User,
};
use crate::database::store::{Store, StoreError};
use crate::validation::{Education, Gender, Language};

const USER_COLUMNS: &str = "id, first_name, last_name, birth_date, mobile_number, password_hash, \
                            gender, is_active, is_staff, is_superuser, date_joined";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    mobile_number: String,
    password_hash: Option<String>,
    gender: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            mobile_number: row.mobile_number,
            password_hash: row.password_hash,
            gender: Gender::parse(&row.gender).map_err(decode_error)?,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
        })
    }
}

#[derive(FromRow)]
struct ProfileRow {
    user_id: i64,
    profession_id: i64,
    qualification_id: i64,
    work_experience: i32,
}

#[derive(FromRow)]
struct AdditionalInfoRow {
    education: String,
    education_major: Option<String>,
    languages: Vec<String>,
    profile_photo: Option<String>,
    facebook: Option<String>,
    instagram: Option<String>,
    tiktok: Option<String>,
    linkedin: Option<String>,
    portfolio_images: Vec<String>,
    note: Option<String>,
}

impl TryFrom<AdditionalInfoRow> for AdditionalInfo {
    type Error = StoreError;

    fn try_from(row: AdditionalInfoRow) -> Result<Self, Self::Error> {
        let languages = row
            .languages
            .iter()
            .map(|l| Language::parse(l))
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)?;

        Ok(AdditionalInfo {
            education: Education::parse(&row.education).map_err(decode_error)?,
            education_major: row.education_major,
            languages,
            profile_photo: row.profile_photo,
            facebook: row.facebook,
            instagram: row.instagram,
            tiktok: row.tiktok,
            linkedin: row.linkedin,
            portfolio_images: row.portfolio_images,
            note: row.note,
        })
    }
}

fn decode_error(err: crate::validation::FieldError) -> StoreError {
    StoreError::Sqlx(sqlx::Error::Decode(Box::new(err)))
}

/// Constraint violation reported by PostgreSQL, if `err` is one.
fn violation(err: &sqlx::Error) -> Option<(&'static str, String)> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    let constraint = db.constraint().unwrap_or_default().to_string();
    match db.code().as_deref() {
        Some(UNIQUE_VIOLATION) => Some((UNIQUE_VIOLATION, constraint)),
        Some(FOREIGN_KEY_VIOLATION) => Some((FOREIGN_KEY_VIOLATION, constraint)),
        _ => None,
    }
}

/// Which reference table a profile foreign key points at.
fn reference_kind_for(constraint: &str) -> Option<ReferenceKind> {
    if constraint.contains("profession_id") {
        Some(ReferenceKind::Field)
    } else if constraint.contains("qualification_id") {
        Some(ReferenceKind::Qualification)
    } else if constraint.contains("region_id") {
        Some(ReferenceKind::Region)
    } else {
        None
    }
}

async fn missing_in<'e, E>(
    executor: E,
    kind: ReferenceKind,
    ids: &[i64],
) -> Result<Vec<i64>, StoreError>
where
    E: PgExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let query = format!("SELECT id FROM {} WHERE id = ANY($1)", kind.table());
    let found: HashSet<i64> = sqlx::query_scalar::<_, i64>(&query)
        .bind(ids)
        .fetch_all(executor)
        .await?
        .into_iter()
        .collect();
    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

async fn insert_user_in<'e, E>(executor: E, user: &NewUser) -> Result<User, StoreError>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "INSERT INTO users (first_name, last_name, birth_date, mobile_number, password_hash,
                            gender, is_active, is_staff, is_superuser)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        USER_COLUMNS
    );
    let row = sqlx::query_as::<_, UserRow>(&query)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(&user.mobile_number)
        .bind(&user.password_hash)
        .bind(user.gender.as_str())
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(executor)
        .await
        .map_err(|e| match violation(&e) {
            Some((UNIQUE_VIOLATION, _)) => {
                StoreError::DuplicateIdentifier(user.mobile_number.clone())
            }
            _ => StoreError::Sqlx(e),
        })?;
    row.try_into()
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        insert_user_in(&self.pool, &user).await
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE mobile_number = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(mobile_number)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_registration(&self, registration: NewRegistration) -> Result<User, StoreError> {
        let NewRegistration {
            user,
            profile,
            additional,
        } = registration;

        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        for (kind, ids) in [
            (ReferenceKind::Field, vec![profile.profession_id]),
            (ReferenceKind::Qualification, vec![profile.qualification_id]),
            (ReferenceKind::Region, profile.areas.clone()),
        ] {
            let missing = missing_in(&mut *tx, kind, &ids).await?;
            if !missing.is_empty() {
                return Err(StoreError::UnknownReference { kind, ids: missing });
            }
        }

        let created = insert_user_in(&mut *tx, &user).await?;

        let reference_error = |e: sqlx::Error| match violation(&e) {
            Some((FOREIGN_KEY_VIOLATION, constraint)) => match reference_kind_for(&constraint) {
                Some(kind) => {
                    let ids = match kind {
                        ReferenceKind::Field => vec![profile.profession_id],
                        ReferenceKind::Qualification => vec![profile.qualification_id],
                        ReferenceKind::Region => profile.areas.clone(),
                    };
                    StoreError::UnknownReference { kind, ids }
                }
                None => StoreError::Sqlx(e),
            },
            _ => StoreError::Sqlx(e),
        };

        sqlx::query(
            "INSERT INTO professional_profiles (user_id, profession_id, qualification_id, work_experience)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(created.id)
        .bind(profile.profession_id)
        .bind(profile.qualification_id)
        .bind(profile.work_experience)
        .execute(&mut *tx)
        .await
        .map_err(reference_error)?;

        sqlx::query(
            "INSERT INTO professional_profile_regions (user_id, region_id)
             SELECT $1, region_id FROM UNNEST($2::BIGINT[]) AS region_id",
        )
        .bind(created.id)
        .bind(&profile.areas)
        .execute(&mut *tx)
        .await
        .map_err(reference_error)?;

        let languages: Vec<String> = additional
            .languages
            .iter()
            .map(|l| l.as_str().to_string())
            .collect();
        sqlx::query(
            "INSERT INTO additional_info (user_id, education, education_major, languages,
                                          profile_photo, facebook, instagram, tiktok, linkedin,
                                          portfolio_images, note)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(created.id)
        .bind(additional.education.as_str())
        .bind(&additional.education_major)
        .bind(&languages)
        .bind(&additional.profile_photo)
        .bind(&additional.facebook)
        .bind(&additional.instagram)
        .bind(&additional.tiktok)
        .bind(&additional.linkedin)
        .bind(&additional.portfolio_images)
        .bind(&additional.note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Registration committed for user {}", created.id);
        Ok(created)
    }

    async fn find_profile(&self, user_id: i64) -> Result<Option<ProfessionalProfile>, StoreError> {
        let Some(row) = sqlx::query_as::<_, ProfileRow>(
            "SELECT user_id, profession_id, qualification_id, work_experience
             FROM professional_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let areas = sqlx::query_scalar::<_, i64>(
            "SELECT region_id FROM professional_profile_regions WHERE user_id = $1 ORDER BY region_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProfessionalProfile {
            user_id: row.user_id,
            profession_id: row.profession_id,
            qualification_id: row.qualification_id,
            work_experience: row.work_experience,
            areas,
        }))
    }

    async fn find_additional_info(
        &self,
        user_id: i64,
    ) -> Result<Option<AdditionalInfo>, StoreError> {
        sqlx::query_as::<_, AdditionalInfoRow>(
            "SELECT education, education_major, languages, profile_photo, facebook, instagram,
                    tiktok, linkedin, portfolio_images, note
             FROM additional_info WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(AdditionalInfo::try_from)
        .transpose()
    }

    async fn insert_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Reference, StoreError> {
        let query = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
            kind.table()
        );
        let reference = sqlx::query_as::<_, Reference>(&query)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some((UNIQUE_VIOLATION, _)) => StoreError::DuplicateReference {
                    kind,
                    name: name.to_string(),
                },
                _ => StoreError::Sqlx(e),
            })?;
        info!("Created {} '{}' ({})", kind, reference.name, reference.id);
        Ok(reference)
    }

    async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<Reference>, StoreError> {
        let query = format!("SELECT id, name FROM {} ORDER BY name", kind.table());
        Ok(sqlx::query_as::<_, Reference>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn missing_references(
        &self,
        kind: ReferenceKind,
        ids: &[i64],
    ) -> Result<Vec<i64>, StoreError> {
        missing_in(&self.pool, kind, ids).await
    }

    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        if kind == ReferenceKind::Region {
            // Serialize with registrations that attach this region.
            sqlx::query("SELECT id FROM regions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let strands_profile = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (
                    SELECT 1 FROM professional_profile_regions r
                    WHERE r.region_id = $1
                      AND NOT EXISTS (
                        SELECT 1 FROM professional_profile_regions o
                        WHERE o.user_id = r.user_id AND o.region_id <> $1
                      )
                )",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            if strands_profile {
                return Err(StoreError::ReferenceInUse { kind, id });
            }
        }

        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match violation(&e) {
                Some((FOREIGN_KEY_VIOLATION, _)) => StoreError::ReferenceInUse { kind, id },
                _ => StoreError::Sqlx(e),
            })?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
