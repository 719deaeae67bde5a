use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::verify_blocking;
use crate::auth::{AuthError, CredentialHasher, TokenIssuer, TokenPair};
use crate::database::models::User;
use crate::database::{Store, StoreError};
use crate::validation::{require, FieldError, FieldErrors};

/// Verified against when the mobile number is unknown, so a miss costs the
/// same as a wrong password.
const DUMMY_PASSWORD: &str = "Dummy-Passw0rd!";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub mobile_number: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid login data: {0}")]
    Invalid(FieldErrors),

    /// Unknown number and wrong password are indistinguishable.
    #[error("Mobile number or password is incorrect.")]
    InvalidCredentials,

    #[error("This account is disabled.")]
    AccountDisabled,

    #[error("Token is invalid or expired.")]
    InvalidToken,

    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for LoginError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) | AuthError::WrongTokenType { .. } => {
                LoginError::InvalidToken
            }
            other => LoginError::Auth(other),
        }
    }
}

pub struct LoginService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
    dummy_hash: String,
}

impl LoginService {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    /// Unauthenticated -> Authenticated: lookup, verify, active check, issue.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, LoginError> {
        let (mobile_number, password) = validate_request(&request)?;

        let user = self.store.find_user_by_mobile(mobile_number).await?;

        let stored_hash = user
            .as_ref()
            .and_then(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let matches =
            verify_blocking(self.hasher.clone(), password.to_string(), stored_hash).await?;

        let user = match user {
            Some(user) if matches && user.password_hash.is_some() => user,
            _ => {
                warn!("Failed login attempt for mobile number {}", mobile_number);
                return Err(LoginError::InvalidCredentials);
            }
        };

        if !user.is_active {
            warn!("Login refused for disabled user {}", user.id);
            return Err(LoginError::AccountDisabled);
        }

        let tokens = self.tokens.issue_pair(&user)?;
        info!("User {} logged in", user.id);
        Ok(LoginOutcome { user, tokens })
    }

    /// Mint a new access token. The user must still exist and be active.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, LoginError> {
        let (claims, access) = self.tokens.refresh_access(refresh_token)?;
        let user = self
            .store
            .find_user(claims.user_id()?)
            .await?
            .ok_or(LoginError::InvalidToken)?;
        if !user.is_active {
            return Err(LoginError::AccountDisabled);
        }
        Ok(access)
    }

    /// Resolve a bearer access token to its user.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, LoginError> {
        let claims = self.tokens.decode_access(access_token)?;
        let user = self
            .store
            .find_user(claims.user_id()?)
            .await?
            .ok_or(LoginError::InvalidToken)?;
        if !user.is_active {
            return Err(LoginError::AccountDisabled);
        }
        Ok(user)
    }
}

fn validate_request(request: &LoginRequest) -> Result<(&str, &str), LoginError> {
    let mut errors = FieldErrors::new();
    // Format is not checked here; a malformed number simply finds no user.
    let mobile_number = errors.take("mobile_number", require(request.mobile_number.as_deref()));
    let password = match request.password.as_deref() {
        Some(p) if !p.is_empty() => Some(p),
        _ => {
            errors.add("password", FieldError::required());
            None
        }
    };

    match (mobile_number, password) {
        (Some(mobile), Some(password)) if errors.is_empty() => Ok((mobile, password)),
        _ => Err(LoginError::Invalid(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Hasher, JwtIssuer};
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use crate::validation::{ErrorKind, Gender};
    use chrono::{Duration, NaiveDate};

    async fn setup(is_active: bool) -> LoginService {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new(1024, 1).unwrap());
        let store = Arc::new(MemoryStore::new());
        store
            .insert_user(NewUser {
                first_name: "Kamran".to_string(),
                last_name: "Məmmədov".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
                mobile_number: "501234567".to_string(),
                password_hash: Some(hasher.hash("Passw0rd!").unwrap()),
                gender: Gender::Male,
                is_active,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        let tokens = Arc::new(
            JwtIssuer::new("test-secret", "profreg-api", Duration::minutes(5), Duration::days(1))
                .unwrap(),
        );
        LoginService::new(store, hasher, tokens).unwrap()
    }

    fn login(mobile: &str, password: &str) -> LoginRequest {
        LoginRequest {
            mobile_number: Some(mobile.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn valid_credentials_issue_token_pair() {
        let service = setup(true).await;
        let outcome = service.login(login("501234567", "Passw0rd!")).await.unwrap();
        assert_eq!(outcome.user.mobile_number, "501234567");
        assert_ne!(outcome.tokens.access, outcome.tokens.refresh);

        let user = service.authenticate(&outcome.tokens.access).await.unwrap();
        assert_eq!(user.id, outcome.user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_number_look_the_same() {
        let service = setup(true).await;
        let wrong = service
            .login(login("501234567", "Wr0ngPass!"))
            .await
            .unwrap_err();
        let unknown = service
            .login(login("509999999", "Passw0rd!"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, LoginError::InvalidCredentials));
        assert!(matches!(unknown, LoginError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn malformed_number_is_a_credential_failure() {
        let service = setup(true).await;
        for mobile in ["50-123-4567", "+994501234567", "abc"] {
            let err = service.login(login(mobile, "Passw0rd!")).await.unwrap_err();
            assert!(
                matches!(err, LoginError::InvalidCredentials),
                "{mobile}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn disabled_account_is_refused() {
        let service = setup(false).await;
        let err = service
            .login(login("501234567", "Passw0rd!"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::AccountDisabled));
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let service = setup(true).await;
        let err = service.login(LoginRequest::default()).await.unwrap_err();
        match err {
            LoginError::Invalid(errors) => {
                assert_eq!(errors.get("mobile_number").unwrap()[0].kind(), ErrorKind::Required);
                assert_eq!(errors.get("password").unwrap()[0].kind(), ErrorKind::Required);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_mints_new_access_token() {
        let service = setup(true).await;
        let outcome = service.login(login("501234567", "Passw0rd!")).await.unwrap();
        let access = service.refresh(&outcome.tokens.refresh).await.unwrap();
        assert!(service.authenticate(&access).await.is_ok());

        assert!(matches!(
            service.refresh(&outcome.tokens.access).await,
            Err(LoginError::InvalidToken)
        ));
        assert!(matches!(
            service.refresh("not-a-token").await,
            Err(LoginError::InvalidToken)
        ));
    }
}
