use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::user_manager::{UserFields, UserManager, UserManagerError};
use crate::auth::AuthError;
use crate::database::models::{
    AdditionalInfo, NewProfile, NewRegistration, ReferenceKind, User,
};
use crate::database::{Store, StoreError};
use crate::validation::{
    parse_birth_date, parse_selection, require, validate_education_major,
    validate_id_selection, validate_image_filename, validate_max_length, validate_mobile_number,
    validate_name, validate_password, validate_portfolio_images, validate_url,
    validate_work_experience, Education, ErrorKind, FieldError, FieldErrors, Gender, Language,
    MAX_NOTE_LENGTH,
};

/// Registration form as submitted. Every field is optional at the wire
/// level so that absence is reported per field rather than as a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationRequest {
    // identity
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub mobile_number: Option<String>,
    pub gender: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,

    // professional
    pub profession: Option<i64>,
    pub qualification: Option<i64>,
    pub work_experience: Option<i32>,
    pub areas: Vec<i64>,

    // additional
    pub education: Option<String>,
    pub education_major: Option<String>,
    pub languages: Vec<String>,
    pub profile_photo: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio_images: Vec<String>,
    pub note: Option<String>,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Invalid registration data: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentifier(_) => {
                RegistrationError::Invalid(FieldErrors::single("mobile_number", FieldError::duplicate_mobile_number()))
            }
            StoreError::UnknownReference { kind, ids } => RegistrationError::Invalid(
                FieldErrors::single(kind.request_field(), FieldError::unknown_reference(&ids)),
            ),
            other => RegistrationError::Store(other),
        }
    }
}

impl From<UserManagerError> for RegistrationError {
    fn from(err: UserManagerError) -> Self {
        match err {
            UserManagerError::MissingIdentifier => {
                RegistrationError::Invalid(FieldErrors::single("mobile_number", FieldError::required()))
            }
            UserManagerError::InvalidFormat(e) => {
                RegistrationError::Invalid(FieldErrors::single("mobile_number", e))
            }
            UserManagerError::WeakPassword(e) => {
                RegistrationError::Invalid(FieldErrors::single("password", e))
            }
            UserManagerError::DuplicateIdentifier(_) => {
                RegistrationError::Invalid(FieldErrors::single("mobile_number", FieldError::duplicate_mobile_number()))
            }
            UserManagerError::Auth(e) => RegistrationError::Auth(e),
            UserManagerError::Store(e) => e.into(),
        }
    }
}

/// Blank optional strings count as absent.
fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

struct Identity {
    mobile_number: String,
    password: String,
    fields: UserFields,
}

/// Validates the whole form, resolves reference identifiers and persists
/// user, profile and additional info as one unit.
pub struct RegistrationService {
    store: Arc<dyn Store>,
    users: Arc<UserManager>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Store>, users: Arc<UserManager>) -> Self {
        Self { store, users }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<User, RegistrationError> {
        let mut errors = FieldErrors::new();

        let identity = validate_identity(&request, &mut errors);
        let profile = validate_professional(&request, &mut errors);
        let additional = validate_additional(&request, &mut errors);

        let (Some(identity), Some(profile), Some(additional)) = (identity, profile, additional)
        else {
            return Err(RegistrationError::Invalid(errors));
        };
        if !errors.is_empty() {
            return Err(RegistrationError::Invalid(errors));
        }

        self.resolve_references(&profile).await?;

        let user = self
            .users
            .prepare(
                &identity.mobile_number,
                Some(&identity.password),
                identity.fields,
            )
            .await?;

        let created = self
            .store
            .create_registration(NewRegistration {
                user,
                profile,
                additional,
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::DuplicateIdentifier(_)) {
                    warn!("Registration rejected: mobile number already registered");
                }
                RegistrationError::from(e)
            })?;

        info!("Registered user {} ({})", created.id, created.mobile_number);
        Ok(created)
    }

    /// Every supplied identifier must name an existing reference row.
    async fn resolve_references(&self, profile: &NewProfile) -> Result<(), RegistrationError> {
        let mut errors = FieldErrors::new();
        for (kind, ids) in [
            (ReferenceKind::Field, vec![profile.profession_id]),
            (ReferenceKind::Qualification, vec![profile.qualification_id]),
            (ReferenceKind::Region, profile.areas.clone()),
        ] {
            let missing = self.store.missing_references(kind, &ids).await?;
            if !missing.is_empty() {
                errors.add(kind.request_field(), FieldError::unknown_reference(&missing));
            }
        }
        errors.into_result().map_err(RegistrationError::Invalid)
    }
}

/// Required text field passed through `check`; failures land under `field`.
fn checked<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
    check: fn(&str) -> Result<(), FieldError>,
) -> Option<&'a str> {
    let value = errors.take(field, require(value))?;
    errors.take(field, check(value)).map(|_| value)
}

fn validate_identity(request: &RegistrationRequest, errors: &mut FieldErrors) -> Option<Identity> {
    let first_name = checked(errors, "first_name", request.first_name.as_deref(), validate_name);
    let last_name = checked(errors, "last_name", request.last_name.as_deref(), validate_name);
    let birth_date = errors.take(
        "birth_date",
        require(request.birth_date.as_deref()).and_then(parse_birth_date),
    );
    let mobile_number = checked(
        errors,
        "mobile_number",
        request.mobile_number.as_deref(),
        validate_mobile_number,
    );
    let gender = errors.take(
        "gender",
        require(request.gender.as_deref()).and_then(Gender::parse),
    );

    let password = match request.password.as_deref().filter(|p| !p.is_empty()) {
        None => {
            errors.add("password", FieldError::required());
            None
        }
        Some(raw) => match validate_password(raw) {
            Ok(()) => Some(raw),
            Err(e) => {
                errors.add("password", e);
                None
            }
        },
    };
    if let Some(raw) = password {
        if request.password_confirm.as_deref() != Some(raw) {
            errors.add(
                "password_confirm",
                FieldError::new(ErrorKind::Mismatch, "Passwords do not match."),
            );
        }
    }

    Some(Identity {
        mobile_number: mobile_number?.to_string(),
        password: password?.to_string(),
        fields: UserFields::new(first_name?, last_name?, birth_date?, gender?),
    })
}

fn validate_professional(
    request: &RegistrationRequest,
    errors: &mut FieldErrors,
) -> Option<NewProfile> {
    let profession_id = request.profession;
    if profession_id.is_none() {
        errors.add("profession", FieldError::required());
    }
    let qualification_id = request.qualification;
    if qualification_id.is_none() {
        errors.add("qualification", FieldError::required());
    }
    let work_experience = match request.work_experience {
        None => {
            errors.add("work_experience", FieldError::required());
            None
        }
        Some(years) => errors
            .take("work_experience", validate_work_experience(years))
            .map(|_| years),
    };
    let areas = errors.take("areas", validate_id_selection(&request.areas));

    Some(NewProfile {
        profession_id: profession_id?,
        qualification_id: qualification_id?,
        work_experience: work_experience?,
        areas: areas?,
    })
}

fn validate_additional(
    request: &RegistrationRequest,
    errors: &mut FieldErrors,
) -> Option<AdditionalInfo> {
    let education = errors.take(
        "education",
        require(request.education.as_deref()).and_then(Education::parse),
    );
    let languages = errors.take(
        "languages",
        parse_selection(&request.languages, Language::parse),
    );

    let profile_photo = optional(&request.profile_photo);
    if let Some(photo) = profile_photo {
        errors.check("profile_photo", validate_image_filename(photo));
    }

    let links = [
        ("facebook", optional(&request.facebook)),
        ("instagram", optional(&request.instagram)),
        ("tiktok", optional(&request.tiktok)),
        ("linkedin", optional(&request.linkedin)),
    ];
    for (field, value) in links {
        if let Some(url) = value {
            errors.check(field, validate_url(url));
        }
    }
    let [facebook, instagram, tiktok, linkedin] = links.map(|(_, v)| v.map(str::to_string));

    errors.check(
        "portfolio_images",
        validate_portfolio_images(&request.portfolio_images),
    );

    let note = optional(&request.note);
    if let Some(note) = note {
        errors.check("note", validate_max_length(note, MAX_NOTE_LENGTH));
    }

    // Cross-field: the major depends on the education level.
    let education = education?;
    let education_major = errors.take(
        "education_major",
        validate_education_major(education, request.education_major.as_deref()),
    )?;

    Some(AdditionalInfo {
        education,
        education_major,
        languages: languages?,
        profile_photo: profile_photo.map(str::to_string),
        facebook,
        instagram,
        tiktok,
        linkedin,
        portfolio_images: request
            .portfolio_images
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        note: note.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::database::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: RegistrationService,
        field: i64,
        qualification: i64,
        region: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let field = store
            .insert_reference(ReferenceKind::Field, "Elektrik")
            .await
            .unwrap()
            .id;
        let qualification = store
            .insert_reference(ReferenceKind::Qualification, "Usta")
            .await
            .unwrap()
            .id;
        let region = store
            .insert_reference(ReferenceKind::Region, "Sumqayıt")
            .await
            .unwrap()
            .id;
        let dyn_store: Arc<dyn Store> = store.clone();
        let users = Arc::new(UserManager::new(
            dyn_store.clone(),
            Arc::new(Argon2Hasher::new(1024, 1).unwrap()),
        ));
        Fixture {
            store,
            service: RegistrationService::new(dyn_store, users),
            field,
            qualification,
            region,
        }
    }

    fn request(f: &Fixture) -> RegistrationRequest {
        RegistrationRequest {
            first_name: Some("Günel".to_string()),
            last_name: Some("Həsənova".to_string()),
            birth_date: Some("12.04.1993".to_string()),
            mobile_number: Some("701234567".to_string()),
            gender: Some("F".to_string()),
            password: Some("Passw0rd!".to_string()),
            password_confirm: Some("Passw0rd!".to_string()),
            profession: Some(f.field),
            qualification: Some(f.qualification),
            work_experience: Some(4),
            areas: vec![f.region],
            education: Some("bachelor".to_string()),
            education_major: Some("Fizika".to_string()),
            languages: vec!["azerbaijani".to_string(), "english".to_string()],
            profile_photo: Some("me.PNG".to_string()),
            instagram: Some("https://instagram.com/gunel".to_string()),
            portfolio_images: vec!["a.jpg".to_string(), "b.png".to_string()],
            note: Some("Evlərə çağırış".to_string()),
            ..Default::default()
        }
    }

    fn invalid(err: RegistrationError) -> FieldErrors {
        match err {
            RegistrationError::Invalid(errors) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn registers_user_with_profile() {
        let f = fixture().await;
        let user = f.service.register(request(&f)).await.unwrap();

        assert_eq!(user.full_name(), "Günel Həsənova");
        assert_eq!(user.gender, Gender::Female);
        let profile = f.store.find_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.areas, vec![f.region]);
        let info = f.store.find_additional_info(user.id).await.unwrap().unwrap();
        assert_eq!(info.education_major.as_deref(), Some("Fizika"));
        assert_eq!(info.languages, vec![Language::Azerbaijani, Language::English]);
    }

    #[tokio::test]
    async fn second_registration_is_duplicate() {
        let f = fixture().await;
        f.service.register(request(&f)).await.unwrap();
        let errors = invalid(f.service.register(request(&f)).await.unwrap_err());
        assert_eq!(
            errors.get("mobile_number").unwrap()[0].kind(),
            ErrorKind::DuplicateIdentifier
        );
    }

    #[tokio::test]
    async fn unknown_references_are_reported_per_field() {
        let f = fixture().await;
        let mut req = request(&f);
        req.profession = Some(9999);
        req.areas = vec![f.region, 8888];
        let errors = invalid(f.service.register(req).await.unwrap_err());
        assert_eq!(
            errors.get("profession").unwrap()[0].kind(),
            ErrorKind::UnknownReference
        );
        assert!(errors.get("areas").unwrap()[0].message.contains("8888"));
        assert!(!errors.contains("qualification"));
        assert!(f.store.find_user_by_mobile("701234567").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collects_errors_across_pages() {
        let f = fixture().await;
        let req = RegistrationRequest {
            first_name: Some("Ali1".to_string()),
            mobile_number: Some("50-123-4567".to_string()),
            password: Some("password".to_string()),
            gender: Some("X".to_string()),
            work_experience: Some(-1),
            education: Some("bachelor".to_string()),
            languages: vec![],
            portfolio_images: vec!["photo.gif".to_string()],
            ..Default::default()
        };
        let errors = invalid(f.service.register(req).await.unwrap_err());

        let kind = |field: &str| errors.get(field).unwrap()[0].kind();
        assert_eq!(kind("first_name"), ErrorKind::InvalidFormat);
        assert_eq!(kind("last_name"), ErrorKind::Required);
        assert_eq!(kind("mobile_number"), ErrorKind::InvalidFormat);
        assert_eq!(kind("password"), ErrorKind::WeakPassword);
        assert_eq!(kind("gender"), ErrorKind::InvalidChoice);
        assert_eq!(kind("work_experience"), ErrorKind::InvalidFormat);
        assert_eq!(kind("areas"), ErrorKind::EmptySelection);
        assert_eq!(kind("languages"), ErrorKind::EmptySelection);
        assert_eq!(kind("portfolio_images"), ErrorKind::UnsupportedFormat);
        assert_eq!(kind("education_major"), ErrorKind::Required);
        assert_eq!(kind("profession"), ErrorKind::Required);
    }

    #[tokio::test]
    async fn education_none_skips_major() {
        let f = fixture().await;
        let mut req = request(&f);
        req.education = Some("none".to_string());
        req.education_major = Some("!!! 123".to_string());
        let user = f.service.register(req).await.unwrap();
        let info = f.store.find_additional_info(user.id).await.unwrap().unwrap();
        assert_eq!(info.education, Education::None);
        assert!(info.education_major.is_none());
    }

    #[tokio::test]
    async fn password_confirmation_must_match() {
        let f = fixture().await;
        let mut req = request(&f);
        req.password_confirm = Some("Passw0rd?".to_string());
        let errors = invalid(f.service.register(req).await.unwrap_err());
        assert_eq!(
            errors.get("password_confirm").unwrap()[0].kind(),
            ErrorKind::Mismatch
        );
    }

    #[tokio::test]
    async fn portfolio_limits_apply() {
        let f = fixture().await;
        let mut req = request(&f);
        req.portfolio_images = (0..11).map(|i| format!("w{i}.jpg")).collect();
        let errors = invalid(f.service.register(req).await.unwrap_err());
        assert_eq!(
            errors.get("portfolio_images").unwrap()[0].kind(),
            ErrorKind::TooMany
        );

        let mut req = request(&f);
        req.portfolio_images = (0..10).map(|i| format!("w{i}.png")).collect();
        assert!(f.service.register(req).await.is_ok());
    }

    #[tokio::test]
    async fn social_links_must_be_urls() {
        let f = fixture().await;
        let mut req = request(&f);
        req.linkedin = Some("linkedin".to_string());
        req.note = Some("x".repeat(1501));
        let errors = invalid(f.service.register(req).await.unwrap_err());
        assert_eq!(errors.get("linkedin").unwrap()[0].kind(), ErrorKind::InvalidFormat);
        assert_eq!(errors.get("note").unwrap()[0].kind(), ErrorKind::TooLong);
    }
}
