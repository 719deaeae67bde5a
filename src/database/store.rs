use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    AdditionalInfo, NewRegistration, NewUser, ProfessionalProfile, Reference, ReferenceKind, User,
};

/// Errors surfaced by a `Store`. Constraint violations are translated into
/// the domain variants; anything else is opaque.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A user with mobile number {0} already exists")]
    DuplicateIdentifier(String),

    #[error("A {kind} named '{name}' already exists")]
    DuplicateReference { kind: ReferenceKind, name: String },

    #[error("Unknown {kind} identifiers: {ids:?}")]
    UnknownReference { kind: ReferenceKind, ids: Vec<i64> },

    #[error("{kind} {id} is still referenced by professional profiles")]
    ReferenceInUse { kind: ReferenceKind, id: i64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence capability consumed by the services.
///
/// Implementations must enforce mobile-number uniqueness themselves so that
/// concurrent registrations cannot both succeed.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError>;

    /// Removes the user along with profile, additional info and region links.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    /// Creates user, profile, region links and additional info as one unit.
    /// Nothing is persisted when any step fails.
    async fn create_registration(&self, registration: NewRegistration) -> Result<User, StoreError>;

    async fn find_profile(&self, user_id: i64) -> Result<Option<ProfessionalProfile>, StoreError>;

    async fn find_additional_info(&self, user_id: i64)
        -> Result<Option<AdditionalInfo>, StoreError>;

    async fn insert_reference(&self, kind: ReferenceKind, name: &str)
        -> Result<Reference, StoreError>;

    async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<Reference>, StoreError>;

    /// Identifiers among `ids` with no matching row, in input order.
    async fn missing_references(
        &self,
        kind: ReferenceKind,
        ids: &[i64],
    ) -> Result<Vec<i64>, StoreError>;

    /// Fields and qualifications in use fail with `ReferenceInUse`. Deleting
    /// a region drops its profile associations, but fails with
    /// `ReferenceInUse` when a profile would be left with no region.
    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError>;
}
