use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;

use crate::adapter::http::app_error_impl::ErrorResponse;
use crate::adapter::http::middleware::extractor::AuthUser;
use crate::adapter::http::schema::profile::{
    AvatarResponse, AvatarUploadRequest, BatchProfilesRequest, CreateProfileRequest, ProfileResponse,
    ProfileSummaryResponse, SearchQuery, UpdateProfileRequest,
};
use crate::adapter::http::validation::{ValidJson, ValidQuery};
use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::profile::{
    CreateProfileDTO, GetProfileDTO, GetProfilesBatchDTO, ReplaceAvatarDTO, SearchProfilesDTO, UpdateProfileDTO,
};
use crate::application::interactors::profile::{
    CreateProfileInteractor, DEFAULT_SEARCH_LIMIT, GetProfileInteractor, GetProfilesBatchInteractor,
    ReplaceAvatarInteractor, SearchProfilesInteractor, UpdateProfileInteractor,
};

pub const AVATAR_FIELD: &str = "avatar";

struct AvatarUpload {
    file: Option<Bytes>,
    content_type: String,
    original_name: String,
}

async fn read_avatar_upload(mut multipart: Multipart) -> AppResult<AvatarUpload> {
    let mut upload = AvatarUpload {
        file: None,
        content_type: String::new(),
        original_name: String::new(),
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        upload.content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        upload.original_name = field.file_name().unwrap_or(AVATAR_FIELD).to_string();
        upload.file = Some(field.bytes().await?);
    }

    Ok(upload)
}

async fn replace_avatar_for(
    caller_id: String,
    target_id: String,
    interactor: ReplaceAvatarInteractor,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let upload = read_avatar_upload(multipart?).await?;
    let dto = ReplaceAvatarDTO {
        caller_id,
        target_id,
        file: upload.file,
        content_type: upload.content_type,
        original_name: upload.original_name,
    };
    let avatar = interactor.execute(dto).await?;
    Ok((StatusCode::OK, Json(AvatarResponse::from(avatar))))
}

fn update_dto(caller_id: String, target_id: String, payload: UpdateProfileRequest) -> UpdateProfileDTO {
    UpdateProfileDTO {
        caller_id,
        target_id,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        description: payload.description,
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/search",
    tag = "Profiles",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching profiles", body = [ProfileSummaryResponse]),
        (
            status = 400,
            description = "Missing query",
            body = ErrorResponse,
            example = json!({ "error": "Search query is required" })
        )
    )
)]
pub async fn search_profiles(
    interactor: SearchProfilesInteractor,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let dto = SearchProfilesDTO {
        query: query.query,
        limit: query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    };
    let profiles = interactor.execute(dto).await?;
    let response: Vec<ProfileSummaryResponse> = profiles.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/profiles/batch",
    tag = "Profiles",
    request_body = BatchProfilesRequest,
    responses(
        (status = 200, description = "Profiles found; unknown ids are omitted", body = [ProfileSummaryResponse]),
        (status = 400, description = "`userIds` missing or not an array", body = ErrorResponse)
    )
)]
pub async fn get_profiles_batch(
    interactor: GetProfilesBatchInteractor,
    ValidJson(payload): ValidJson<BatchProfilesRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = GetProfilesBatchDTO { ids: payload.user_ids };
    let profiles = interactor.execute(dto).await?;
    let response: Vec<ProfileSummaryResponse> = profiles.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    tag = "Profiles",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (
            status = 404,
            description = "Profile not found",
            body = ErrorResponse,
            example = json!({ "error": "Profile not found" })
        )
    )
)]
pub async fn get_profile(interactor: GetProfileInteractor, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    let profile = interactor.execute(GetProfileDTO { id }).await?;
    Ok((StatusCode::OK, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "Profiles",
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not created yet", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_my_profile(auth_user: AuthUser, interactor: GetProfileInteractor) -> AppResult<impl IntoResponse> {
    let profile = interactor
        .execute(GetProfileDTO {
            id: auth_user.user_id,
        })
        .await?;
    Ok((StatusCode::OK, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    post,
    path = "/api/profiles/me",
    tag = "Profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created with a generated avatar", body = ProfileResponse),
        (
            status = 400,
            description = "Username missing or profile already exists",
            body = ErrorResponse,
            example = json!({ "error": "Profile already exists" })
        ),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (
            status = 409,
            description = "Username taken",
            body = ErrorResponse,
            example = json!({ "error": "Username is already taken" })
        ),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_my_profile(
    auth_user: AuthUser,
    interactor: CreateProfileInteractor,
    ValidJson(payload): ValidJson<CreateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = CreateProfileDTO {
        caller_id: auth_user.user_id,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        description: payload.description,
    };
    let profile = interactor.execute(dto).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    patch,
    path = "/api/profiles/me",
    tag = "Profiles",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_my_profile(
    auth_user: AuthUser,
    interactor: UpdateProfileInteractor,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let caller_id = auth_user.user_id;
    let profile = interactor
        .execute(update_dto(caller_id.clone(), caller_id, payload))
        .await?;
    Ok((StatusCode::OK, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    patch,
    path = "/api/profiles/{id}",
    tag = "Profiles",
    params(("id" = String, Path, description = "Profile id; must be the caller's own")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (
            status = 403,
            description = "Not the owner",
            body = ErrorResponse,
            example = json!({ "error": "Access denied" })
        ),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile(
    auth_user: AuthUser,
    interactor: UpdateProfileInteractor,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let profile = interactor
        .execute(update_dto(auth_user.user_id, id, payload))
        .await?;
    Ok((StatusCode::OK, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    post,
    path = "/api/profiles/me/avatar",
    tag = "Profiles",
    request_body(content_type = "multipart/form-data", content = AvatarUploadRequest),
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarResponse),
        (
            status = 400,
            description = "No file or not an image",
            body = ErrorResponse,
            example = json!({ "error": "Avatar file is required" })
        ),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn replace_my_avatar(
    auth_user: AuthUser,
    interactor: ReplaceAvatarInteractor,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let caller_id = auth_user.user_id;
    replace_avatar_for(caller_id.clone(), caller_id, interactor, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/profiles/{id}/avatar",
    tag = "Profiles",
    params(("id" = String, Path, description = "Profile id; must be the caller's own")),
    request_body(content_type = "multipart/form-data", content = AvatarUploadRequest),
    responses(
        (status = 200, description = "Avatar replaced", body = AvatarResponse),
        (status = 400, description = "No file or not an image", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn replace_avatar(
    auth_user: AuthUser,
    interactor: ReplaceAvatarInteractor,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    // Refuse before buffering someone else's upload.
    if auth_user.user_id != id {
        return Err(AppError::AccessDenied);
    }
    replace_avatar_for(auth_user.user_id, id, interactor, multipart).await
}
