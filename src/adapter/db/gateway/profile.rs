use async_trait::async_trait;
use futures::FutureExt;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::adapter::db::session::SqlxSession;
use crate::application::app_error::{AppError, AppResult};
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::domain::entities::id::Id;
use crate::domain::entities::profile::{Profile, ProfilePatch, ProfileSummary};

const PRIMARY_KEY_CONSTRAINT: &str = "profiles_pkey";
const USERNAME_CONSTRAINT: &str = "profiles_username_key";

#[derive(Clone)]
pub struct ProfileGateway {
    session: SqlxSession,
}

impl ProfileGateway {
    pub fn new(session: SqlxSession) -> Self {
        Self { session }
    }

    fn get_profile(row: &PgRow) -> AppResult<Profile> {
        Ok(Profile {
            id: Id::new(row.try_get::<String, _>("id")?),
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            description: row.try_get("description")?,
            avatar_url: row.try_get("avatar_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn get_summary(row: &PgRow) -> AppResult<ProfileSummary> {
        Ok(ProfileSummary {
            id: Id::new(row.try_get::<String, _>("id")?),
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            avatar_url: row.try_get("avatar_url")?,
        })
    }
}

/// Turns unique-key violations into the domain errors the interactors already
/// check for, so a lost race reports the same way as a detected one.
fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => return AppError::UsernameTaken,
                Some(PRIMARY_KEY_CONSTRAINT) => return AppError::ProfileAlreadyExists,
                _ => {}
            }
        }
    }
    AppError::DatabaseError(err)
}

fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProfileReader for ProfileGateway {
    async fn find_by_id(&self, profile_id: &Id<Profile>) -> AppResult<Option<Profile>> {
        let profile_id = profile_id.value.clone();
        self.session
            .with_tx(move |tx| {
                async move {
                    let row = sqlx::query(
                        r#"
                            SELECT
                                id,
                                username,
                                first_name,
                                last_name,
                                description,
                                avatar_url,
                                created_at,
                                updated_at
                            FROM profiles
                            WHERE id = $1
                        "#,
                    )
                    .bind(profile_id)
                    .fetch_optional(tx.as_mut())
                    .await?;

                    row.as_ref().map(Self::get_profile).transpose()
                }
                .boxed()
            })
            .await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let username = username.to_owned();
        self.session
            .with_tx(move |tx| {
                async move {
                    let row = sqlx::query(
                        r#"
                            SELECT
                                id,
                                username,
                                first_name,
                                last_name,
                                description,
                                avatar_url,
                                created_at,
                                updated_at
                            FROM profiles
                            WHERE username = $1
                        "#,
                    )
                    .bind(username)
                    .fetch_optional(tx.as_mut())
                    .await?;

                    row.as_ref().map(Self::get_profile).transpose()
                }
                .boxed()
            })
            .await
    }

    async fn find_many(&self, profile_ids: &[Id<Profile>]) -> AppResult<Vec<ProfileSummary>> {
        let profile_ids: Vec<String> = profile_ids.iter().map(|id| id.value.clone()).collect();
        self.session
            .with_tx(move |tx| {
                async move {
                    let rows = sqlx::query(
                        r#"
                            SELECT id, username, first_name, last_name, avatar_url
                            FROM profiles
                            WHERE id = ANY($1)
                        "#,
                    )
                    .bind(profile_ids)
                    .fetch_all(tx.as_mut())
                    .await?;

                    rows.iter().map(Self::get_summary).collect()
                }
                .boxed()
            })
            .await
    }

    async fn search(&self, query: &str, limit: i64) -> AppResult<Vec<ProfileSummary>> {
        let pattern = like_pattern(query);
        self.session
            .with_tx(move |tx| {
                async move {
                    let rows = sqlx::query(
                        r#"
                            SELECT id, username, first_name, last_name, avatar_url
                            FROM profiles
                            WHERE username ILIKE $1 ESCAPE '\'
                               OR first_name ILIKE $1 ESCAPE '\'
                               OR last_name ILIKE $1 ESCAPE '\'
                            ORDER BY username
                            LIMIT $2
                        "#,
                    )
                    .bind(pattern)
                    .bind(limit)
                    .fetch_all(tx.as_mut())
                    .await?;

                    rows.iter().map(Self::get_summary).collect()
                }
                .boxed()
            })
            .await
    }
}

#[async_trait]
impl ProfileWriter for ProfileGateway {
    async fn insert(&self, profile: Profile) -> AppResult<Profile> {
        self.session
            .with_tx(move |tx| {
                async move {
                    let row = sqlx::query(
                        r#"
                            INSERT INTO profiles
                                (
                                    id,
                                    username,
                                    first_name,
                                    last_name,
                                    description,
                                    avatar_url,
                                    created_at,
                                    updated_at
                                )
                            VALUES
                                ($1, $2, $3, $4, $5, $6, $7, $8)
                            RETURNING *
                        "#,
                    )
                    .bind(profile.id.value)
                    .bind(profile.username)
                    .bind(profile.first_name)
                    .bind(profile.last_name)
                    .bind(profile.description)
                    .bind(profile.avatar_url)
                    .bind(profile.created_at)
                    .bind(profile.updated_at)
                    .fetch_one(tx.as_mut())
                    .await
                    .map_err(map_write_error)?;

                    Self::get_profile(&row)
                }
                .boxed()
            })
            .await
    }

    async fn update(&self, profile_id: &Id<Profile>, patch: ProfilePatch) -> AppResult<Profile> {
        let profile_id = profile_id.value.clone();
        self.session
            .with_tx(move |tx| {
                async move {
                    let row = sqlx::query(
                        r#"
                            UPDATE profiles
                            SET
                                username = COALESCE($2, username),
                                first_name = COALESCE($3, first_name),
                                last_name = COALESCE($4, last_name),
                                description = COALESCE($5, description),
                                avatar_url = COALESCE($6, avatar_url),
                                updated_at = now()
                            WHERE id = $1
                            RETURNING *
                        "#,
                    )
                    .bind(profile_id)
                    .bind(patch.username)
                    .bind(patch.first_name)
                    .bind(patch.last_name)
                    .bind(patch.description)
                    .bind(patch.avatar_url)
                    .fetch_optional(tx.as_mut())
                    .await
                    .map_err(map_write_error)?;

                    match row {
                        Some(row) => Self::get_profile(&row),
                        None => Err(AppError::ProfileNotFound),
                    }
                }
                .boxed()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serial_test::serial;

    use super::{ProfileGateway, like_pattern, map_write_error};
    use crate::adapter::db::session::SqlxSession;
    use crate::application::app_error::AppError;
    use crate::application::interface::gateway::profile::ProfileWriter;
    use crate::domain::entities::id::Id;
    use crate::domain::entities::profile::Profile;
    use crate::infra::state::AppState;
    use crate::tests::fixtures::init_test_app_state;
    use crate::tests::helpers::{delete_profile, insert_profile, unique_identity};

    fn new_profile(id: &str, username: &str) -> Profile {
        Profile::new(
            Id::new(id),
            username.to_string(),
            None,
            None,
            None,
            format!("/uploads/{}.png", username),
        )
    }

    #[rstest]
    #[case("al", "%al%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn test_like_pattern_escapes_wildcards(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(query), expected);
    }

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            AppError::DatabaseError(sqlx::Error::RowNotFound)
        ));
    }

    // Inserts that slip past the interactor pre-checks still report domain errors
    // Verifies:
    // - A duplicate username maps to UsernameTaken
    // - A duplicate id maps to ProfileAlreadyExists
    #[rstest]
    #[tokio::test]
    #[serial]
    #[ignore = "requires TEST_DATABASE_URL"]
    async fn test_unique_violations_map_to_domain_errors(#[future] init_test_app_state: anyhow::Result<AppState>) {
        let state = init_test_app_state.await.expect("init app state");
        let (fox_id, fox_name) = unique_identity();
        let (other_id, other_name) = unique_identity();
        insert_profile(&state.pool, &fox_id, &fox_name, None).await;

        let same_username = ProfileGateway::new(SqlxSession::new_lazy(state.pool.clone()))
            .insert(new_profile(&other_id, &fox_name))
            .await;
        let same_id = ProfileGateway::new(SqlxSession::new_lazy(state.pool.clone()))
            .insert(new_profile(&fox_id, &other_name))
            .await;

        delete_profile(&state.pool, &fox_id).await;
        delete_profile(&state.pool, &other_id).await;

        assert!(matches!(same_username, Err(AppError::UsernameTaken)));
        assert!(matches!(same_id, Err(AppError::ProfileAlreadyExists)));
    }
}
