use crate::application::app_error::AppError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Profile not found")]
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_)
            | AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidQuery(_)
            | AppError::InvalidMultipart(_)
            | AppError::MultipartRejected(_)
            | AppError::UsernameRequired
            | AppError::SearchQueryRequired
            | AppError::AvatarFileRequired
            | AppError::UnsupportedImageFormat
            | AppError::ProfileAlreadyExists => StatusCode::BAD_REQUEST,
            AppError::MissingCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::ProfileNotFound => StatusCode::NOT_FOUND,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::AuthMisconfigured
            | AppError::AvatarGenerationError(_)
            | AppError::StorageError(_)
            | AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            match self {
                AppError::AuthMisconfigured => self.to_string(),
                _ => status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use rstest::rstest;

    use crate::adapter::http::app_error_impl::ErrorResponse;
    use crate::application::app_error::AppError;

    #[rstest]
    #[case(AppError::UsernameRequired, StatusCode::BAD_REQUEST)]
    #[case(AppError::SearchQueryRequired, StatusCode::BAD_REQUEST)]
    #[case(AppError::AvatarFileRequired, StatusCode::BAD_REQUEST)]
    #[case(AppError::ProfileAlreadyExists, StatusCode::BAD_REQUEST)]
    #[case(AppError::MissingCredentials, StatusCode::UNAUTHORIZED)]
    #[case(AppError::InvalidToken, StatusCode::UNAUTHORIZED)]
    #[case(AppError::AccessDenied, StatusCode::FORBIDDEN)]
    #[case(AppError::ProfileNotFound, StatusCode::NOT_FOUND)]
    #[case(AppError::UsernameTaken, StatusCode::CONFLICT)]
    #[case(AppError::AuthMisconfigured, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::StorageError("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(AppError::DatabaseError(sqlx::Error::PoolClosed), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_code_mapping(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = AppError::StorageError("secret bucket path".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let response = AppError::UsernameTaken.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Username is already taken");
    }

    #[tokio::test]
    async fn test_misconfigured_body() {
        let response = AppError::AuthMisconfigured.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Server configuration error");
    }
}
