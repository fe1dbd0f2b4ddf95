use crate::application::app_error::AppError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no bearer token presented")]
    Missing,
    #[error("token verifier has no key material")]
    Misconfigured,
    #[error("token rejected: {0}")]
    Invalid(String),
}

pub trait TokenVerifier: Send + Sync {
    /// Returns the caller identity carried by `token`.
    fn verify(&self, token: Option<&str>) -> Result<String, TokenError>;
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => AppError::MissingCredentials,
            TokenError::Misconfigured => AppError::AuthMisconfigured,
            TokenError::Invalid(_) => AppError::InvalidToken,
        }
    }
}
