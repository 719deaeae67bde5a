use crate::database::models::{User, UserProfile};
use crate::database::{Store, StoreError};

/// Attach the professional profile and additional info owned by `user`.
/// Users created outside registration have neither.
pub async fn load_user_profile(store: &dyn Store, user: User) -> Result<UserProfile, StoreError> {
    let profile = store.find_profile(user.id).await?;
    let additional = store.find_additional_info(user.id).await?;
    Ok(UserProfile {
        user,
        profile,
        additional,
    })
}
