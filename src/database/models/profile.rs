use serde::{Deserialize, Serialize};

use super::user::{NewUser, User};
use crate::validation::{Education, Language};

/// Professional data owned 1:1 by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub user_id: i64,
    pub profession_id: i64,
    pub qualification_id: i64,
    /// Years.
    pub work_experience: i32,
    pub areas: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub profession_id: i64,
    pub qualification_id: i64,
    pub work_experience: i32,
    pub areas: Vec<i64>,
}

impl NewProfile {
    pub fn into_profile(self, user_id: i64) -> ProfessionalProfile {
        ProfessionalProfile {
            user_id,
            profession_id: self.profession_id,
            qualification_id: self.qualification_id,
            work_experience: self.work_experience,
            areas: self.areas,
        }
    }
}

/// Optional profile attributes collected on the last registration page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub education: Education,
    pub education_major: Option<String>,
    pub languages: Vec<Language>,
    pub profile_photo: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio_images: Vec<String>,
    pub note: Option<String>,
}

/// Everything the registration assembly writes in one unit.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user: NewUser,
    pub profile: NewProfile,
    pub additional: AdditionalInfo,
}

/// A user together with the records it owns.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<ProfessionalProfile>,
    pub additional: Option<AdditionalInfo>,
}
