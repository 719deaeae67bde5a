// Field validators
//
// Pure predicates over submitted values. Each returns `Result<(), FieldError>`
// so handlers can collect failures per field into a `FieldErrors` map.

pub mod choices;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::hash::Hash;

pub use choices::{Education, Gender, Language};

/// Longest first/last name accepted.
pub const MAX_NAME_LENGTH: usize = 20;
/// Longest education major accepted.
pub const MAX_EDUCATION_MAJOR_LENGTH: usize = 50;
/// Longest free-form note accepted.
pub const MAX_NOTE_LENGTH: usize = 1500;
/// Maximum number of portfolio images on a profile.
pub const MAX_PORTFOLIO_IMAGES: usize = 10;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 15;

/// Symbols that satisfy the password "special character" rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Image extensions accepted for profile and portfolio uploads.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Key used for errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

static AZERBAIJANI_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zƏəÖöĞğÜüÇçŞşİı]+$").expect("letters pattern"));

static MOBILE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("mobile number pattern"));

/// Failure category, serialized as the `code` of a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidFormat,
    InvalidChoice,
    WeakPassword,
    EmptySelection,
    UnsupportedFormat,
    TooMany,
    MissingIdentifier,
    DuplicateIdentifier,
    UnknownReference,
    InvalidCredentials,
    AccountDisabled,
    Required,
    TooLong,
    Mismatch,
    ReferenceInUse,
}

impl ErrorKind {
    /// Wire code, identical to the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::InvalidChoice => "INVALID_CHOICE",
            ErrorKind::WeakPassword => "WEAK_PASSWORD",
            ErrorKind::EmptySelection => "EMPTY_SELECTION",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::TooMany => "TOO_MANY",
            ErrorKind::MissingIdentifier => "MISSING_IDENTIFIER",
            ErrorKind::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            ErrorKind::UnknownReference => "UNKNOWN_REFERENCE",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::AccountDisabled => "ACCOUNT_DISABLED",
            ErrorKind::Required => "REQUIRED",
            ErrorKind::TooLong => "TOO_LONG",
            ErrorKind::Mismatch => "MISMATCH",
            ErrorKind::ReferenceInUse => "REFERENCE_IN_USE",
        }
    }
}

/// A single validation failure with a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub code: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn required() -> Self {
        Self::new(ErrorKind::Required, "This field is required.")
    }

    pub fn duplicate_mobile_number() -> Self {
        Self::new(
            ErrorKind::DuplicateIdentifier,
            "A user with this mobile number already exists.",
        )
    }

    /// Identifiers that name no existing reference row.
    pub fn unknown_reference(ids: &[i64]) -> Self {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        Self::new(
            ErrorKind::UnknownReference,
            format!("Invalid pk \"{}\" - object does not exist.", ids.join(", ")),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.code
    }
}

/// Field-keyed collection of validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry map, mostly for non-field failures.
    pub fn single(field: impl Into<String>, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.entry(field.into()).or_default().push(error);
    }

    /// Record the failure of `result`, if any, under `field`.
    pub fn check(&mut self, field: &str, result: Result<(), FieldError>) {
        if let Err(error) = result {
            self.add(field, error);
        }
    }

    /// Unwrap a parsed value, recording the failure under `field`.
    pub fn take<T>(&mut self, field: &str, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.add(field, error);
                None
            }
        }
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, errors) in other.0 {
            self.0.entry(field).or_default().extend(errors);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, errors)| {
                let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                format!("{}: {}", field, messages.join("; "))
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Present and non-blank, returning the trimmed value.
pub fn require(value: Option<&str>) -> Result<&str, FieldError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FieldError::required()),
    }
}

/// Letters of the Azerbaijani alphabet (plus basic Latin) only.
pub fn validate_letters(value: &str) -> Result<(), FieldError> {
    if AZERBAIJANI_LETTERS.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(
            ErrorKind::InvalidFormat,
            "Only letters of the Azerbaijani alphabet are allowed.",
        ))
    }
}

pub fn validate_max_length(value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        Err(FieldError::new(
            ErrorKind::TooLong,
            format!("Ensure this field has no more than {} characters.", max),
        ))
    } else {
        Ok(())
    }
}

/// First and last names: letters only, bounded length.
pub fn validate_name(value: &str) -> Result<(), FieldError> {
    validate_max_length(value, MAX_NAME_LENGTH)?;
    validate_letters(value)
}

/// Exactly nine decimal digits, e.g. `501234567`.
pub fn validate_mobile_number(value: &str) -> Result<(), FieldError> {
    if MOBILE_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(
            ErrorKind::InvalidFormat,
            "Mobile number is invalid. Use the 501234567 format.",
        ))
    }
}

/// Reports the first unmet rule.
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    let weak = |message: &str| Err(FieldError::new(ErrorKind::WeakPassword, message));

    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return weak("Password must be between 8 and 15 characters.");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return weak("Password must contain at least one uppercase letter.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return weak("Password must contain at least one digit.");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return weak("Password must contain at least one symbol (!@#$... etc).");
    }
    Ok(())
}

/// Accepts `DD.MM.YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_birth_date(value: &str) -> Result<chrono::NaiveDate, FieldError> {
    chrono::NaiveDate::parse_from_str(value, "%d.%m.%Y")
        .or_else(|_| chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| {
            FieldError::new(
                ErrorKind::InvalidFormat,
                "Date has wrong format. Use DD.MM.YYYY (e.g. 29.05.2025).",
            )
        })
}

/// Parse a set of enum values, rejecting an empty selection.
///
/// Duplicates collapse; first-seen order is kept.
pub fn parse_selection<T, F>(values: &[String], parse: F) -> Result<Vec<T>, FieldError>
where
    T: Eq + Hash + Copy,
    F: Fn(&str) -> Result<T, FieldError>,
{
    if values.is_empty() {
        return Err(FieldError::new(
            ErrorKind::EmptySelection,
            "Select at least one option.",
        ));
    }
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        let item = parse(value.trim())?;
        if seen.insert(item) {
            parsed.push(item);
        }
    }
    Ok(parsed)
}

/// Non-empty list of reference identifiers, deduplicated in order.
pub fn validate_id_selection(ids: &[i64]) -> Result<Vec<i64>, FieldError> {
    if ids.is_empty() {
        return Err(FieldError::new(
            ErrorKind::EmptySelection,
            "Select at least one option.",
        ));
    }
    let mut seen = HashSet::new();
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}

/// `education_major` is required unless education is the `none` sentinel.
///
/// Runs after per-field checks; returns the value to store.
pub fn validate_education_major(
    education: Education,
    major: Option<&str>,
) -> Result<Option<String>, FieldError> {
    if education == Education::None {
        return Ok(None);
    }
    let major = require(major)?;
    validate_max_length(major, MAX_EDUCATION_MAJOR_LENGTH)?;
    validate_letters(major)?;
    Ok(Some(major.to_string()))
}

/// Extension must be `.jpg` or `.png`, case-insensitive.
pub fn validate_image_filename(filename: &str) -> Result<(), FieldError> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(FieldError::new(
            ErrorKind::UnsupportedFormat,
            format!(
                "Unsupported file format: {}. Allowed: .jpg, .png.",
                filename
            ),
        )),
    }
}

pub fn validate_portfolio_count(count: usize) -> Result<(), FieldError> {
    if count > MAX_PORTFOLIO_IMAGES {
        Err(FieldError::new(
            ErrorKind::TooMany,
            format!(
                "No more than {} portfolio images are allowed.",
                MAX_PORTFOLIO_IMAGES
            ),
        ))
    } else {
        Ok(())
    }
}

/// Count first, then every filename.
pub fn validate_portfolio_images(filenames: &[String]) -> Result<(), FieldError> {
    validate_portfolio_count(filenames.len())?;
    filenames
        .iter()
        .try_for_each(|name| validate_image_filename(name))
}

/// Absolute http(s) URL with a host.
pub fn validate_url(value: &str) -> Result<(), FieldError> {
    let invalid = || FieldError::new(ErrorKind::InvalidFormat, "Enter a valid URL.");
    let parsed = url::Url::parse(value).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn validate_work_experience(years: i32) -> Result<(), FieldError> {
    if years < 0 {
        Err(FieldError::new(
            ErrorKind::InvalidFormat,
            "Work experience cannot be negative.",
        ))
    } else {
        Ok(())
    }
}
