// Fixed enumerations accepted from clients.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ErrorKind, FieldError};

fn invalid_choice(value: &str) -> FieldError {
    FieldError::new(
        ErrorKind::InvalidChoice,
        format!("\"{}\" is not a valid choice.", value),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// `M`/`F`, plus the legacy `K` (kişi) and `Q` (qadın) codes.
    pub fn parse(value: &str) -> Result<Self, FieldError> {
        match value {
            "M" | "K" => Ok(Gender::Male),
            "F" | "Q" => Ok(Gender::Female),
            other => Err(invalid_choice(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Gender {
    type Error = FieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Gender::parse(value)
    }
}

/// Highest completed education. `None` means no formal education and
/// waives the education major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    None,
    Secondary,
    Vocational,
    IncompleteHigher,
    Bachelor,
    Master,
    Doctorate,
}

impl Education {
    pub const ALL: [Education; 7] = [
        Education::None,
        Education::Secondary,
        Education::Vocational,
        Education::IncompleteHigher,
        Education::Bachelor,
        Education::Master,
        Education::Doctorate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Education::None => "none",
            Education::Secondary => "secondary",
            Education::Vocational => "vocational",
            Education::IncompleteHigher => "incomplete_higher",
            Education::Bachelor => "bachelor",
            Education::Master => "master",
            Education::Doctorate => "doctorate",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FieldError> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == value)
            .ok_or_else(|| invalid_choice(value))
    }
}

impl TryFrom<&str> for Education {
    type Error = FieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Education::parse(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Azerbaijani,
    English,
    Russian,
    Turkish,
    German,
    French,
    Arabic,
    Persian,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Azerbaijani,
        Language::English,
        Language::Russian,
        Language::Turkish,
        Language::German,
        Language::French,
        Language::Arabic,
        Language::Persian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Azerbaijani => "azerbaijani",
            Language::English => "english",
            Language::Russian => "russian",
            Language::Turkish => "turkish",
            Language::German => "german",
            Language::French => "french",
            Language::Arabic => "arabic",
            Language::Persian => "persian",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FieldError> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == value)
            .ok_or_else(|| invalid_choice(value))
    }
}

impl TryFrom<&str> for Language {
    type Error = FieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Language::parse(value)
    }
}
