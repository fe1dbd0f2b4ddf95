use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::entities::profile::{Profile, ProfileSummary};

#[derive(Debug, Clone)]
pub struct GetProfileDTO {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct CreateProfileDTO {
    pub caller_id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProfileDTO {
    pub caller_id: String,
    pub target_id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReplaceAvatarDTO {
    pub caller_id: String,
    pub target_id: String,
    pub file: Option<Bytes>,
    pub content_type: String,
    pub original_name: String,
}

#[derive(Debug, Clone)]
pub struct SearchProfilesDTO {
    pub query: String,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct GetProfilesBatchDTO {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDTO {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileDTO {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.value,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            description: profile.description,
            avatar_url: profile.avatar_url,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummaryDTO {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: String,
}

impl From<ProfileSummary> for ProfileSummaryDTO {
    fn from(summary: ProfileSummary) -> Self {
        Self {
            id: summary.id.value,
            username: summary.username,
            first_name: summary.first_name,
            last_name: summary.last_name,
            avatar_url: summary.avatar_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarDTO {
    pub avatar_url: String,
}
