use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::dto::profile::{AvatarDTO, ProfileDTO, ProfileSummaryDTO};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "username": "fox",
    "firstName": "Fyodor",
    "lastName": "Lisitsyn",
    "description": "Runs in the woods"
}))]
pub struct CreateProfileRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    #[schema(example = "fox")]
    pub username: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Omitted or empty fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "firstName": "Fedya" }))]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct AvatarUploadRequest {
    #[schema(value_type = String, format = Binary)]
    pub avatar: Vec<u8>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched case-insensitively against username, first name and last name.
    #[serde(default)]
    pub query: String,
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "userIds": ["u1", "u2"] }))]
pub struct BatchProfilesRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "u1",
    "username": "fox",
    "firstName": "Fyodor",
    "lastName": "Lisitsyn",
    "description": "Runs in the woods",
    "avatarUrl": "/uploads/fox_0192f1c7a8b47c33a1c3d6e2f0b4a5c6.png",
    "createdAt": "2026-01-01T00:00:00Z",
    "updatedAt": "2026-01-01T00:00:00Z"
}))]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileDTO> for ProfileResponse {
    fn from(dto: ProfileDTO) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
            first_name: dto.first_name,
            last_name: dto.last_name,
            description: dto.description,
            avatar_url: dto.avatar_url,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummaryResponse {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: String,
}

impl From<ProfileSummaryDTO> for ProfileSummaryResponse {
    fn from(dto: ProfileSummaryDTO) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
            first_name: dto.first_name,
            last_name: dto.last_name,
            avatar_url: dto.avatar_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    #[schema(example = "http://127.0.0.1:9000/public-bucket/avatars/0192f1c7-a8b4-7c33-a1c3-d6e2f0b4a5c6.png")]
    pub avatar_url: String,
}

impl From<AvatarDTO> for AvatarResponse {
    fn from(dto: AvatarDTO) -> Self {
        Self {
            avatar_url: dto.avatar_url,
        }
    }
}
