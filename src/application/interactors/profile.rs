use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::profile::{
    AvatarDTO, CreateProfileDTO, GetProfileDTO, GetProfilesBatchDTO, ProfileDTO, ProfileSummaryDTO,
    ReplaceAvatarDTO, SearchProfilesDTO, UpdateProfileDTO,
};
use crate::application::interface::avatar::AvatarGenerator;
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::application::interface::storage::StorageBackend;
use crate::domain::entities::id::Id;
use crate::domain::entities::profile::{Profile, ProfilePatch};

pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 100;

// Blank strings coming from forms mean "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn caller_id(value: String) -> AppResult<Id<Profile>> {
    Id::try_from(value).map_err(|_| AppError::MissingCredentials)
}

async fn discard_blob(storage: &dyn StorageBackend, url: &str) {
    if let Err(e) = storage.delete(url).await {
        warn!(url = %url, error = %e, "Failed to delete avatar blob");
    }
}

#[derive(Clone)]
pub struct GetProfileInteractor {
    profile_reader: Arc<dyn ProfileReader>,
}

impl GetProfileInteractor {
    pub fn new(profile_reader: Arc<dyn ProfileReader>) -> Self {
        Self { profile_reader }
    }

    pub async fn execute(&self, dto: GetProfileDTO) -> AppResult<ProfileDTO> {
        let profile_id: Id<Profile> = dto.id.try_into()?;
        let profile = self
            .profile_reader
            .find_by_id(&profile_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        Ok(profile.into())
    }
}

#[derive(Clone)]
pub struct CreateProfileInteractor {
    db_session: Arc<dyn DBSession>,
    profile_reader: Arc<dyn ProfileReader>,
    profile_writer: Arc<dyn ProfileWriter>,
    storage: Arc<dyn StorageBackend>,
    avatar_generator: Arc<dyn AvatarGenerator>,
}

impl CreateProfileInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        profile_reader: Arc<dyn ProfileReader>,
        profile_writer: Arc<dyn ProfileWriter>,
        storage: Arc<dyn StorageBackend>,
        avatar_generator: Arc<dyn AvatarGenerator>,
    ) -> Self {
        Self {
            db_session,
            profile_reader,
            profile_writer,
            storage,
            avatar_generator,
        }
    }

    pub async fn execute(&self, dto: CreateProfileDTO) -> AppResult<ProfileDTO> {
        let profile_id = caller_id(dto.caller_id)?;

        if dto.username.trim().is_empty() {
            return Err(AppError::UsernameRequired);
        }

        if self.profile_reader.find_by_id(&profile_id).await?.is_some() {
            return Err(AppError::ProfileAlreadyExists);
        }

        if self.profile_reader.find_by_username(&dto.username).await?.is_some() {
            return Err(AppError::UsernameTaken);
        }

        let avatar = self.avatar_generator.generate(&dto.username)?;
        let avatar_name = format!("{}_{}.{}", dto.username, Utc::now().timestamp_millis(), avatar.ext);
        let avatar_url = self
            .storage
            .put(avatar.data, &avatar_name, avatar.content_type)
            .await?;

        let profile = Profile::new(
            profile_id,
            dto.username,
            provided(dto.first_name),
            provided(dto.last_name),
            provided(dto.description),
            avatar_url.clone(),
        );

        let created = match self.profile_writer.insert(profile).await {
            Ok(created) => created,
            Err(e) => {
                discard_blob(self.storage.as_ref(), &avatar_url).await;
                return Err(e);
            }
        };
        if let Err(e) = self.db_session.commit().await {
            discard_blob(self.storage.as_ref(), &avatar_url).await;
            return Err(e);
        }

        info!(profile_id = %created.id, username = %created.username, "Profile created");
        Ok(created.into())
    }
}

#[derive(Clone)]
pub struct UpdateProfileInteractor {
    db_session: Arc<dyn DBSession>,
    profile_reader: Arc<dyn ProfileReader>,
    profile_writer: Arc<dyn ProfileWriter>,
}

impl UpdateProfileInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        profile_reader: Arc<dyn ProfileReader>,
        profile_writer: Arc<dyn ProfileWriter>,
    ) -> Self {
        Self {
            db_session,
            profile_reader,
            profile_writer,
        }
    }

    pub async fn execute(&self, dto: UpdateProfileDTO) -> AppResult<ProfileDTO> {
        let caller_id = caller_id(dto.caller_id)?;
        let target_id: Id<Profile> = dto.target_id.try_into()?;

        if caller_id != target_id {
            return Err(AppError::AccessDenied);
        }

        let existing = self
            .profile_reader
            .find_by_id(&target_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let patch = ProfilePatch {
            username: provided(dto.username),
            first_name: provided(dto.first_name),
            last_name: provided(dto.last_name),
            description: provided(dto.description),
            avatar_url: None,
        };

        if let Some(username) = &patch.username {
            if let Some(owner) = self.profile_reader.find_by_username(username).await? {
                if owner.id != target_id {
                    return Err(AppError::UsernameTaken);
                }
            }
        }

        if patch.is_empty() {
            return Ok(existing.into());
        }

        let updated = self.profile_writer.update(&target_id, patch).await?;
        self.db_session.commit().await?;

        info!(profile_id = %updated.id, "Profile updated");
        Ok(updated.into())
    }
}

#[derive(Clone)]
pub struct ReplaceAvatarInteractor {
    db_session: Arc<dyn DBSession>,
    profile_reader: Arc<dyn ProfileReader>,
    profile_writer: Arc<dyn ProfileWriter>,
    storage: Arc<dyn StorageBackend>,
}

impl ReplaceAvatarInteractor {
    pub fn new(
        db_session: Arc<dyn DBSession>,
        profile_reader: Arc<dyn ProfileReader>,
        profile_writer: Arc<dyn ProfileWriter>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            db_session,
            profile_reader,
            profile_writer,
            storage,
        }
    }

    /// Upload, then point the record at the new blob, then drop the old one.
    /// The profile never references a deleted blob; a crash may orphan the old one.
    pub async fn execute(&self, dto: ReplaceAvatarDTO) -> AppResult<AvatarDTO> {
        let caller_id = caller_id(dto.caller_id)?;
        let target_id: Id<Profile> = dto.target_id.try_into()?;

        if caller_id != target_id {
            return Err(AppError::AccessDenied);
        }

        let file = dto
            .file
            .filter(|f| !f.is_empty())
            .ok_or(AppError::AvatarFileRequired)?;

        if !dto.content_type.starts_with("image/") {
            return Err(AppError::UnsupportedImageFormat);
        }

        let existing = self
            .profile_reader
            .find_by_id(&target_id)
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let new_url = self
            .storage
            .put(file, &dto.original_name, &dto.content_type)
            .await?;

        let updated = match self
            .profile_writer
            .update(&target_id, ProfilePatch::avatar(new_url.clone()))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                discard_blob(self.storage.as_ref(), &new_url).await;
                return Err(e);
            }
        };
        if let Err(e) = self.db_session.commit().await {
            discard_blob(self.storage.as_ref(), &new_url).await;
            return Err(e);
        }

        if !existing.avatar_url.is_empty() && existing.avatar_url != updated.avatar_url {
            discard_blob(self.storage.as_ref(), &existing.avatar_url).await;
        }

        info!(profile_id = %updated.id, "Avatar replaced");
        Ok(AvatarDTO {
            avatar_url: updated.avatar_url,
        })
    }
}

#[derive(Clone)]
pub struct SearchProfilesInteractor {
    profile_reader: Arc<dyn ProfileReader>,
}

impl SearchProfilesInteractor {
    pub fn new(profile_reader: Arc<dyn ProfileReader>) -> Self {
        Self { profile_reader }
    }

    pub async fn execute(&self, dto: SearchProfilesDTO) -> AppResult<Vec<ProfileSummaryDTO>> {
        let query = dto.query.trim();
        if query.is_empty() {
            return Err(AppError::SearchQueryRequired);
        }
        let limit = dto.limit.clamp(1, MAX_SEARCH_LIMIT);

        let profiles = self.profile_reader.search(query, limit).await?;
        Ok(profiles.into_iter().map(ProfileSummaryDTO::from).collect())
    }
}

#[derive(Clone)]
pub struct GetProfilesBatchInteractor {
    profile_reader: Arc<dyn ProfileReader>,
}

impl GetProfilesBatchInteractor {
    pub fn new(profile_reader: Arc<dyn ProfileReader>) -> Self {
        Self { profile_reader }
    }

    /// Unknown ids are dropped silently.
    pub async fn execute(&self, dto: GetProfilesBatchDTO) -> AppResult<Vec<ProfileSummaryDTO>> {
        let ids: Vec<Id<Profile>> = dto
            .ids
            .into_iter()
            .filter_map(|id| Id::try_from(id).ok())
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = self.profile_reader.find_many(&ids).await?;
        Ok(profiles.into_iter().map(ProfileSummaryDTO::from).collect())
    }
}
