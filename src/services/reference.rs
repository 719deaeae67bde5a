use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::database::models::{Reference, ReferenceKind};
use crate::database::{Store, StoreError};
use crate::validation::{require, validate_max_length, FieldError};

/// Reference names share the column width of the storage schema.
pub const MAX_REFERENCE_NAME_LENGTH: usize = 100;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Invalid name: {0}")]
    InvalidName(FieldError),

    #[error("A {kind} named '{name}' already exists")]
    Duplicate { kind: ReferenceKind, name: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: ReferenceKind, id: i64 },

    #[error("{kind} {id} is still used by professional profiles")]
    InUse { kind: ReferenceKind, id: i64 },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ReferenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateReference { kind, name } => ReferenceError::Duplicate { kind, name },
            StoreError::ReferenceInUse { kind, id } => ReferenceError::InUse { kind, id },
            other => ReferenceError::Store(other),
        }
    }
}

/// Maintenance of the field, qualification and region lookup tables.
pub struct ReferenceService {
    store: Arc<dyn Store>,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn add(&self, kind: ReferenceKind, name: &str) -> Result<Reference, ReferenceError> {
        let name = require(Some(name)).map_err(ReferenceError::InvalidName)?;
        validate_max_length(name, MAX_REFERENCE_NAME_LENGTH).map_err(ReferenceError::InvalidName)?;

        let reference = self.store.insert_reference(kind, name).await?;
        info!("Added {} '{}' ({})", kind, reference.name, reference.id);
        Ok(reference)
    }

    pub async fn list(&self, kind: ReferenceKind) -> Result<Vec<Reference>, ReferenceError> {
        Ok(self.store.list_references(kind).await?)
    }

    /// Fields and qualifications in use cannot be removed. A region is
    /// detached from profiles unless it is some profile's only region.
    pub async fn remove(&self, kind: ReferenceKind, id: i64) -> Result<(), ReferenceError> {
        if !self.store.delete_reference(kind, id).await? {
            return Err(ReferenceError::NotFound { kind, id });
        }
        info!("Removed {} {}", kind, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn service() -> ReferenceService {
        ReferenceService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn add_trims_and_lists_by_name() {
        let service = service();
        service.add(ReferenceKind::Region, "  Şəki ").await.unwrap();
        service.add(ReferenceKind::Region, "Bakı").await.unwrap();

        let names: Vec<String> = service
            .list(ReferenceKind::Region)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Bakı", "Şəki"]);
        assert!(service.list(ReferenceKind::Field).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_and_duplicate_names_are_rejected() {
        let service = service();
        assert!(matches!(
            service.add(ReferenceKind::Field, "   ").await,
            Err(ReferenceError::InvalidName(_))
        ));
        service.add(ReferenceKind::Field, "Santexnik").await.unwrap();
        assert!(matches!(
            service.add(ReferenceKind::Field, "Santexnik").await,
            Err(ReferenceError::Duplicate { .. })
        ));
        // same name under another kind is fine
        assert!(service.add(ReferenceKind::Qualification, "Santexnik").await.is_ok());
    }

    #[tokio::test]
    async fn removing_unknown_id_is_not_found() {
        let service = service();
        let region = service.add(ReferenceKind::Region, "Gəncə").await.unwrap();
        service.remove(ReferenceKind::Region, region.id).await.unwrap();
        assert!(matches!(
            service.remove(ReferenceKind::Region, region.id).await,
            Err(ReferenceError::NotFound { .. })
        ));
    }
}
