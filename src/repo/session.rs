use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::hash_token;
use crate::error::Result;
use crate::models::Session;

const SESSION_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SessionRepository {
    pool: Arc<SqlitePool>,
}

impl SessionRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, token: &str) -> Result<Session> {
        let id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    /// Looks up a session by its raw token, ignoring expired ones.
    pub async fn find_active(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = $1")
            .bind(hash_token(token))
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(session.filter(|s| s.expires_at > Utc::now()))
    }

    pub async fn delete_by_token(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_token(token))
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
