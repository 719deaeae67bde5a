use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::models::{
    AdditionalInfo, NewRegistration, NewUser, ProfessionalProfile, Reference, ReferenceKind, User,
};
use crate::database::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    mobile_index: HashMap<String, i64>,
    profiles: HashMap<i64, ProfessionalProfile>,
    additional: HashMap<i64, AdditionalInfo>,
    references: HashMap<ReferenceKind, BTreeMap<i64, Reference>>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn references(&self, kind: ReferenceKind) -> impl Iterator<Item = &Reference> {
        self.references.get(&kind).into_iter().flat_map(|m| m.values())
    }

    fn missing(&self, kind: ReferenceKind, ids: &[i64]) -> Vec<i64> {
        let rows = self.references.get(&kind);
        ids.iter()
            .copied()
            .filter(|id| !rows.is_some_and(|m| m.contains_key(id)))
            .collect()
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        if self.mobile_index.contains_key(&user.mobile_number) {
            return Err(StoreError::DuplicateIdentifier(user.mobile_number));
        }
        let id = self.next_id();
        let user = user.into_user(id, Utc::now());
        self.mobile_index.insert(user.mobile_number.clone(), id);
        self.users.insert(id, user.clone());
        Ok(user)
    }
}

/// Process-local store guarded by a single lock. Each registration runs
/// entirely under the write lock, so it is atomic with respect to readers
/// and other writers.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.tables.write().await.insert_user(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .mobile_index
            .get(mobile_number)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.remove(&id) else {
            return Ok(false);
        };
        tables.mobile_index.remove(&user.mobile_number);
        tables.profiles.remove(&id);
        tables.additional.remove(&id);
        Ok(true)
    }

    async fn create_registration(&self, registration: NewRegistration) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        // Check every constraint before the first mutation.
        if tables
            .mobile_index
            .contains_key(&registration.user.mobile_number)
        {
            return Err(StoreError::DuplicateIdentifier(
                registration.user.mobile_number,
            ));
        }
        let profile = &registration.profile;
        for (kind, ids) in [
            (ReferenceKind::Field, vec![profile.profession_id]),
            (ReferenceKind::Qualification, vec![profile.qualification_id]),
            (ReferenceKind::Region, profile.areas.clone()),
        ] {
            let missing = tables.missing(kind, &ids);
            if !missing.is_empty() {
                return Err(StoreError::UnknownReference { kind, ids: missing });
            }
        }

        let user = tables.insert_user(registration.user)?;
        tables
            .profiles
            .insert(user.id, registration.profile.into_profile(user.id));
        tables.additional.insert(user.id, registration.additional);
        Ok(user)
    }

    async fn find_profile(&self, user_id: i64) -> Result<Option<ProfessionalProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn find_additional_info(
        &self,
        user_id: i64,
    ) -> Result<Option<AdditionalInfo>, StoreError> {
        Ok(self.tables.read().await.additional.get(&user_id).cloned())
    }

    async fn insert_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Reference, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.references(kind).any(|r| r.name == name) {
            return Err(StoreError::DuplicateReference {
                kind,
                name: name.to_string(),
            });
        }
        let reference = Reference {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables
            .references
            .entry(kind)
            .or_default()
            .insert(reference.id, reference.clone());
        Ok(reference)
    }

    async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<Reference>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Reference> = tables.references(kind).cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn missing_references(
        &self,
        kind: ReferenceKind,
        ids: &[i64],
    ) -> Result<Vec<i64>, StoreError> {
        Ok(self.tables.read().await.missing(kind, ids))
    }

    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .references
            .get(&kind)
            .is_some_and(|m| m.contains_key(&id));
        if !exists {
            return Ok(false);
        }

        match kind {
            ReferenceKind::Field | ReferenceKind::Qualification => {
                let in_use = tables.profiles.values().any(|p| match kind {
                    ReferenceKind::Field => p.profession_id == id,
                    _ => p.qualification_id == id,
                });
                if in_use {
                    return Err(StoreError::ReferenceInUse { kind, id });
                }
            }
            ReferenceKind::Region => {
                // A profile must keep at least one region.
                let strands_profile = tables
                    .profiles
                    .values()
                    .any(|p| !p.areas.is_empty() && p.areas.iter().all(|area| *area == id));
                if strands_profile {
                    return Err(StoreError::ReferenceInUse { kind, id });
                }
                for profile in tables.profiles.values_mut() {
                    profile.areas.retain(|area| *area != id);
                }
            }
        }

        if let Some(rows) = tables.references.get_mut(&kind) {
            rows.remove(&id);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewProfile;
    use crate::validation::{Education, Gender, Language};
    use chrono::NaiveDate;

    fn new_user(mobile: &str) -> NewUser {
        NewUser {
            first_name: "Əli".to_string(),
            last_name: "Məmmədov".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            mobile_number: mobile.to_string(),
            password_hash: Some("hash".to_string()),
            gender: Gender::Male,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    fn additional() -> AdditionalInfo {
        AdditionalInfo {
            education: Education::None,
            education_major: None,
            languages: vec![Language::Azerbaijani],
            profile_photo: None,
            facebook: None,
            instagram: None,
            tiktok: None,
            linkedin: None,
            portfolio_images: vec![],
            note: None,
        }
    }

    async fn seeded() -> (MemoryStore, i64, i64, i64) {
        let store = MemoryStore::new();
        let field = store
            .insert_reference(ReferenceKind::Field, "Plumbing")
            .await
            .unwrap();
        let qualification = store
            .insert_reference(ReferenceKind::Qualification, "Master")
            .await
            .unwrap();
        let region = store
            .insert_reference(ReferenceKind::Region, "Bakı")
            .await
            .unwrap();
        (store, field.id, qualification.id, region.id)
    }

    fn registration(mobile: &str, field: i64, qualification: i64, areas: Vec<i64>) -> NewRegistration {
        NewRegistration {
            user: new_user(mobile),
            profile: NewProfile {
                profession_id: field,
                qualification_id: qualification,
                work_experience: 3,
                areas,
            },
            additional: additional(),
        }
    }

    #[tokio::test]
    async fn duplicate_mobile_number_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("501234567")).await.unwrap();
        let err = store.insert_user(new_user("501234567")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentifier(m) if m == "501234567"));
    }

    #[tokio::test]
    async fn registration_with_unknown_region_leaves_nothing_behind() {
        let (store, field, qualification, region) = seeded().await;
        let err = store
            .create_registration(registration("501234567", field, qualification, vec![region, 999]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownReference { kind: ReferenceKind::Region, ref ids } if ids == &vec![999]
        ));
        assert!(store.find_user_by_mobile("501234567").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn registration_persists_profile_and_additional_info() {
        let (store, field, qualification, region) = seeded().await;
        let user = store
            .create_registration(registration("501234567", field, qualification, vec![region]))
            .await
            .unwrap();

        let profile = store.find_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.profession_id, field);
        assert_eq!(profile.areas, vec![region]);
        assert!(store.find_additional_info(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let (store, field, qualification, region) = seeded().await;
        let user = store
            .create_registration(registration("501234567", field, qualification, vec![region]))
            .await
            .unwrap();

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.find_profile(user.id).await.unwrap().is_none());
        assert!(store.find_additional_info(user.id).await.unwrap().is_none());
        // number is free again
        store.insert_user(new_user("501234567")).await.unwrap();
    }

    #[tokio::test]
    async fn referenced_field_cannot_be_deleted() {
        let (store, field, qualification, region) = seeded().await;
        let user = store
            .create_registration(registration("501234567", field, qualification, vec![region]))
            .await
            .unwrap();

        let err = store
            .delete_reference(ReferenceKind::Field, field)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReferenceInUse { .. }));
        assert!(store
            .delete_reference(ReferenceKind::Qualification, qualification)
            .await
            .is_err());

        let profile = store.find_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.areas, vec![region]);
    }

    #[tokio::test]
    async fn last_region_of_a_profile_cannot_be_deleted() {
        let (store, field, qualification, region) = seeded().await;
        let other = store
            .insert_reference(ReferenceKind::Region, "Şəki")
            .await
            .unwrap()
            .id;
        let sole = store
            .create_registration(registration("501234567", field, qualification, vec![region]))
            .await
            .unwrap();
        let both = store
            .create_registration(registration(
                "701234567",
                field,
                qualification,
                vec![region, other],
            ))
            .await
            .unwrap();

        let err = store
            .delete_reference(ReferenceKind::Region, region)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReferenceInUse { kind: ReferenceKind::Region, id } if id == region));
        let profile = store.find_profile(sole.id).await.unwrap().unwrap();
        assert_eq!(profile.areas, vec![region]);

        // a region that is never the only one detaches
        assert!(store
            .delete_reference(ReferenceKind::Region, other)
            .await
            .unwrap());
        let profile = store.find_profile(both.id).await.unwrap().unwrap();
        assert_eq!(profile.areas, vec![region]);
        assert!(store
            .list_references(ReferenceKind::Region)
            .await
            .unwrap()
            .iter()
            .all(|r| r.id != other));
    }

    #[tokio::test]
    async fn reference_names_are_unique_per_kind() {
        let store = MemoryStore::new();
        store
            .insert_reference(ReferenceKind::Region, "Gəncə")
            .await
            .unwrap();
        assert!(matches!(
            store.insert_reference(ReferenceKind::Region, "Gəncə").await,
            Err(StoreError::DuplicateReference { .. })
        ));
        // same name under another kind is fine
        store
            .insert_reference(ReferenceKind::Field, "Gəncə")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_references_preserves_input_order() {
        let (store, _, _, region) = seeded().await;
        let missing = store
            .missing_references(ReferenceKind::Region, &[42, region, 7])
            .await
            .unwrap();
        assert_eq!(missing, vec![42, 7]);
    }
}
