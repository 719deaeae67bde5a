pub mod profile;
pub mod reference;
pub mod user;

pub use profile::{AdditionalInfo, NewProfile, NewRegistration, ProfessionalProfile, UserProfile};
pub use reference::{Reference, ReferenceKind};
pub use user::{NewUser, User, UserSummary};
