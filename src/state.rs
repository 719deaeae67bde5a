use std::sync::Arc;

use crate::auth::{Argon2Hasher, AuthError, CredentialHasher, JwtIssuer, TokenIssuer};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{LoginService, ReferenceService, RegistrationService, UserManager};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub users: Arc<UserManager>,
    pub registration: Arc<RegistrationService>,
    pub login: Arc<LoginService>,
    pub references: Arc<ReferenceService>,
}

impl AppState {
    /// Wire the services over `store`. Fails on an empty JWT secret or
    /// unusable Argon2 parameters.
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, AuthError> {
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::from_config(&config.security)?);
        let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtIssuer::from_config(&config.security)?);

        let users = Arc::new(UserManager::new(store.clone(), hasher.clone()));
        let registration = Arc::new(RegistrationService::new(store.clone(), users.clone()));
        let login = Arc::new(LoginService::new(store.clone(), hasher, tokens)?);
        let references = Arc::new(ReferenceService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            users,
            registration,
            login,
            references,
        })
    }
}
