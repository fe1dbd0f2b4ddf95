use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),
    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),
    #[error("Invalid multipart payload: {0}")]
    InvalidMultipart(#[from] MultipartError),
    #[error("Invalid multipart request: {0}")]
    MultipartRejected(#[from] MultipartRejection),
    #[error("Username is required")]
    UsernameRequired,
    #[error("Search query is required")]
    SearchQueryRequired,
    #[error("Avatar file is required")]
    AvatarFileRequired,
    #[error("Unsupported image format")]
    UnsupportedImageFormat,
    #[error("Unauthorized")]
    MissingCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Server configuration error")]
    AuthMisconfigured,
    #[error("Access denied")]
    AccessDenied,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Profile already exists")]
    ProfileAlreadyExists,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Avatar generation failed: {0}")]
    AvatarGenerationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;
