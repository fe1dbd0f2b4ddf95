use chrono::{DateTime, Utc};

use crate::domain::entities::id::Id;

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Id<Profile>,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        id: Id<Profile>,
        username: String,
        first_name: Option<String>,
        last_name: Option<String>,
        description: Option<String>,
        avatar_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            first_name,
            last_name,
            description,
            avatar_url,
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    /// Applies every field present in `patch`, leaving the rest untouched.
    #[cfg(test)]
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = avatar_url.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Public projection returned by search and batch lookups. Never carries the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub id: Id<Profile>,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: String,
}

/// Field-level partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn avatar(avatar_url: String) -> Self {
        Self {
            avatar_url: Some(avatar_url),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.description.is_none()
            && self.avatar_url.is_none()
    }
}
