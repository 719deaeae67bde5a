pub mod login;
pub mod profile;
pub mod reference;
pub mod registration;
pub mod user_manager;

pub use login::{LoginError, LoginOutcome, LoginRequest, LoginService};
pub use profile::load_user_profile;
pub use reference::{ReferenceError, ReferenceService};
pub use registration::{RegistrationError, RegistrationRequest, RegistrationService};
pub use user_manager::{UserFields, UserManager, UserManagerError};

use std::sync::Arc;

use crate::auth::{AuthError, CredentialHasher};

/// Hash off the async executor; Argon2 is deliberately slow.
pub(crate) async fn hash_blocking(
    hasher: Arc<dyn CredentialHasher>,
    raw: String,
) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hasher.hash(&raw))
        .await
        .map_err(|e| AuthError::Hashing(format!("hashing task failed: {}", e)))?
}

pub(crate) async fn verify_blocking(
    hasher: Arc<dyn CredentialHasher>,
    raw: String,
    hash: String,
) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || hasher.verify(&raw, &hash))
        .await
        .map_err(|e| AuthError::Hashing(format!("verification task failed: {}", e)))?
}
