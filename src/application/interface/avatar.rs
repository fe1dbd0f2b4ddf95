use bytes::Bytes;

use crate::application::app_error::AppResult;

#[derive(Debug)]
pub struct GeneratedAvatar {
    pub data: Bytes,
    pub content_type: &'static str,
    pub ext: &'static str,
}

pub trait AvatarGenerator: Send + Sync {
    /// Same seed, same image.
    fn generate(&self, seed: &str) -> AppResult<GeneratedAvatar>;
}
