use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::hash_blocking;
use crate::auth::{AuthError, CredentialHasher};
use crate::database::models::{NewUser, User};
use crate::database::{Store, StoreError};
use crate::validation::{validate_mobile_number, validate_password, FieldError, Gender};

#[derive(Debug, Error)]
pub enum UserManagerError {
    #[error("Mobile number must be provided")]
    MissingIdentifier,

    #[error("{0}")]
    InvalidFormat(FieldError),

    #[error("{0}")]
    WeakPassword(FieldError),

    #[error("A user with mobile number {0} already exists")]
    DuplicateIdentifier(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for UserManagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentifier(mobile) => UserManagerError::DuplicateIdentifier(mobile),
            other => UserManagerError::Store(other),
        }
    }
}

/// Non-identifier attributes of a new user.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl UserFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
        gender: Gender,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            gender,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Creates users keyed by mobile number, never storing raw passwords.
pub struct UserManager {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserManager {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// Check the identifier and password, then hash. Nothing is written.
    ///
    /// Without a password the account has no usable credential.
    pub async fn prepare(
        &self,
        mobile_number: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> Result<NewUser, UserManagerError> {
        let mobile_number = mobile_number.trim();
        if mobile_number.is_empty() {
            return Err(UserManagerError::MissingIdentifier);
        }
        validate_mobile_number(mobile_number).map_err(UserManagerError::InvalidFormat)?;

        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(raw) => {
                validate_password(raw).map_err(UserManagerError::WeakPassword)?;
                Some(hash_blocking(self.hasher.clone(), raw.to_string()).await?)
            }
            None => None,
        };

        Ok(NewUser {
            first_name: fields.first_name,
            last_name: fields.last_name,
            birth_date: fields.birth_date,
            mobile_number: mobile_number.to_string(),
            password_hash,
            gender: fields.gender,
            is_active: fields.is_active,
            is_staff: fields.is_staff,
            is_superuser: fields.is_superuser,
        })
    }

    pub async fn create_user(
        &self,
        mobile_number: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> Result<User, UserManagerError> {
        let new_user = self.prepare(mobile_number, password, fields).await?;
        let user = self.store.insert_user(new_user).await?;
        info!("Created user {} ({})", user.id, user.mobile_number);
        Ok(user)
    }

    pub async fn create_superuser(
        &self,
        mobile_number: &str,
        password: Option<&str>,
        mut fields: UserFields,
    ) -> Result<User, UserManagerError> {
        fields.is_staff = true;
        fields.is_superuser = true;
        self.create_user(mobile_number, password, fields).await
    }
}
