use async_trait::async_trait;

use crate::application::app_error::AppResult;
use crate::domain::entities::id::Id;
use crate::domain::entities::profile::{Profile, ProfilePatch, ProfileSummary};

#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn find_by_id(&self, profile_id: &Id<Profile>) -> AppResult<Option<Profile>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Profile>>;
    async fn find_many(&self, profile_ids: &[Id<Profile>]) -> AppResult<Vec<ProfileSummary>>;
    /// Case-insensitive substring match on username, first name or last name.
    async fn search(&self, query: &str, limit: i64) -> AppResult<Vec<ProfileSummary>>;
}

#[async_trait]
pub trait ProfileWriter: Send + Sync {
    /// Fails with `ProfileAlreadyExists` or `UsernameTaken` when a unique key is already claimed.
    async fn insert(&self, profile: Profile) -> AppResult<Profile>;
    async fn update(&self, profile_id: &Id<Profile>, patch: ProfilePatch) -> AppResult<Profile>;
}
