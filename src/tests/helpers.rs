#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::application::interface::storage::StorageBackend;
use crate::domain::entities::id::Id;
use crate::domain::entities::profile::{Profile, ProfilePatch, ProfileSummary};
use crate::tests::fixtures::TEST_SECRET;

pub fn unique_identity() -> (String, String) {
    let id = Uuid::now_v7().as_simple().to_string();
    let user_id = format!("user-{}", &id[..20]);
    let username = format!("t_{}", &id[..16]);

    (user_id, username)
}

pub fn bearer(user_id: &str) -> String {
    let token = encode(
        &Header::default(),
        &json!({ "userId": user_id }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("sign token");
    format!("Bearer {}", token)
}

pub async fn delete_profile(pool: &PgPool, user_id: &str) {
    sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("delete profile");
}

pub async fn insert_profile(pool: &PgPool, user_id: &str, username: &str, first_name: Option<&str>) {
    sqlx::query("INSERT INTO profiles (id, username, first_name, avatar_url) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(username)
        .bind(first_name)
        .bind(format!("/uploads/{}.png", username))
        .execute(pool)
        .await
        .expect("insert profile");
}

pub struct NoopSession;

#[async_trait]
impl DBSession for NoopSession {
    async fn commit(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Profile table kept in memory with the same unique keys as the real one.
#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<HashMap<String, Profile>>,
}

impl InMemoryProfiles {
    pub fn get(&self, user_id: &str) -> Option<Profile> {
        self.rows.lock().unwrap().get(user_id).cloned()
    }
}

fn matches_query(profile: &Profile, needle: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&profile.username)
        || profile.first_name.as_deref().is_some_and(hit)
        || profile.last_name.as_deref().is_some_and(hit)
}

#[async_trait]
impl ProfileReader for InMemoryProfiles {
    async fn find_by_id(&self, profile_id: &Id<Profile>) -> AppResult<Option<Profile>> {
        Ok(self.get(profile_id.as_str()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|p| p.username == username).cloned())
    }

    async fn find_many(&self, profile_ids: &[Id<Profile>]) -> AppResult<Vec<ProfileSummary>> {
        let rows = self.rows.lock().unwrap();
        Ok(profile_ids
            .iter()
            .filter_map(|id| rows.get(id.as_str()))
            .map(Profile::summary)
            .collect())
    }

    async fn search(&self, query: &str, limit: i64) -> AppResult<Vec<ProfileSummary>> {
        let needle = query.to_lowercase();
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<ProfileSummary> = rows
            .values()
            .filter(|p| matches_query(p, &needle))
            .map(Profile::summary)
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit as usize);
        Ok(found)
    }
}

#[async_trait]
impl ProfileWriter for InMemoryProfiles {
    async fn insert(&self, profile: Profile) -> AppResult<Profile> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(profile.id.as_str()) {
            return Err(AppError::ProfileAlreadyExists);
        }
        if rows.values().any(|p| p.username == profile.username) {
            return Err(AppError::UsernameTaken);
        }
        rows.insert(profile.id.value.clone(), profile.clone());
        Ok(profile)
    }

    async fn update(&self, profile_id: &Id<Profile>, patch: ProfilePatch) -> AppResult<Profile> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(username) = &patch.username {
            if rows
                .values()
                .any(|p| &p.username == username && p.id != *profile_id)
            {
                return Err(AppError::UsernameTaken);
            }
        }
        let profile = rows
            .get_mut(profile_id.as_str())
            .ok_or(AppError::ProfileNotFound)?;
        profile.apply(&patch);
        Ok(profile.clone())
    }
}

/// Blob store that remembers what is live and what was deleted.
#[derive(Default)]
pub struct InMemoryStorage {
    blobs: Mutex<HashMap<String, Bytes>>,
    deleted: Mutex<Vec<String>>,
}

impl InMemoryStorage {
    pub fn blob(&self, url: &str) -> Option<Bytes> {
        self.blobs.lock().unwrap().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(url)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn put(&self, data: Bytes, suggested_name: &str, _content_type: &str) -> AppResult<String> {
        let url = format!("mem://{}/{}", Uuid::now_v7().as_simple(), suggested_name);
        self.blobs.lock().unwrap().insert(url.clone(), data);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> AppResult<()> {
        self.blobs.lock().unwrap().remove(url);
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
