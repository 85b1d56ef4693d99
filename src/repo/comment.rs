use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::pagination::{self, Page, PageFilter, PageRequest};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentFilter, CommentWithAuthor};

/// Comment columns plus the author's public profile. Never selects the full user row.
const WITH_AUTHOR: &str = r#"
    SELECT c.id, c.article_id, c.user_uuid, c.parent_id, c.content, c.created_at,
           u.id AS uuid, u.username, u.avatar, u.address, u.signature
    FROM comments c
    INNER JOIN users u ON c.user_uuid = u.id
"#;

const NEWEST_FIRST: &str = "ORDER BY c.created_at DESC, c.id DESC";

#[derive(Clone)]
pub struct CommentRepository {
    pool: Arc<SqlitePool>,
}

impl CommentRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }

    /// Insert a comment. Parent validation happens in the service layer.
    pub async fn create(
        &self,
        article_id: &str,
        user_uuid: Uuid,
        content: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_uuid, parent_id, content, created_at)
            VALUES ($1, $2, $3, $4, datetime('now'))
            RETURNING *
            "#,
        )
        .bind(article_id)
        .bind(user_uuid)
        .bind(parent_id)
        .bind(content)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(comment)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(comment)
    }

    /// Get a comment by ID or return NotFound error
    pub async fn get_by_id(&self, id: i64) -> Result<Comment> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get_with_author(&self, id: i64) -> Result<CommentWithAuthor> {
        sqlx::query_as::<_, CommentWithAuthor>(&format!("{} WHERE c.id = $1", WITH_AUTHOR))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Top-level comments of an article, newest first
    pub async fn list_roots(&self, article_id: &str) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.article_id = $1 AND c.parent_id IS NULL {}",
            WITH_AUTHOR, NEWEST_FIRST
        ))
        .bind(article_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(comments)
    }

    /// Direct replies to a comment, newest first
    pub async fn list_children(&self, parent_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.parent_id = $1 {}",
            WITH_AUTHOR, NEWEST_FIRST
        ))
        .bind(parent_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(comments)
    }

    pub async fn list_by_user(&self, user_uuid: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.user_uuid = $1 {}",
            WITH_AUTHOR, NEWEST_FIRST
        ))
        .bind(user_uuid)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(comments)
    }

    pub async fn list_recent(&self, limit: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} {} LIMIT $1",
            WITH_AUTHOR, NEWEST_FIRST
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(comments)
    }

    /// Flat, filtered page of comments without author joins or children.
    pub async fn list_page(&self, filter: &CommentFilter, page: PageRequest) -> Result<Page<Comment>> {
        pagination::paginate(
            self.pool.as_ref(),
            "comments",
            filter,
            "created_at DESC, id DESC",
            page,
        )
        .await
    }

    /// Number of ancestors above `id`; roots are at depth 0. Stops with a
    /// validation error once `limit` ancestors have been walked.
    pub async fn depth_of(&self, id: i64, limit: usize) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.get_by_id(id).await?.parent_id;

        while let Some(parent_id) = current {
            depth += 1;
            if depth > limit {
                return Err(AppError::Validation(
                    "Comment thread is nested too deeply".to_string(),
                ));
            }
            current = sqlx::query_scalar::<_, Option<i64>>(
                "SELECT parent_id FROM comments WHERE id = $1",
            )
            .bind(parent_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .flatten();
        }

        Ok(depth)
    }

    pub async fn exists_by_id(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE id = $1")
            .bind(id)
            .fetch_one(conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(comment)
    }

    pub async fn child_ids(conn: &mut SqliteConnection, parent_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM comments WHERE parent_id = $1 ORDER BY id ASC",
        )
        .bind(parent_id)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    pub async fn root_ids_for_article(conn: &mut SqliteConnection, article_id: &str) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM comments WHERE article_id = $1 AND parent_id IS NULL ORDER BY id ASC",
        )
        .bind(article_id)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    /// Delete exactly one row. Replies are not touched; a row that still has
    /// replies fails on the parent_id foreign key.
    pub async fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

impl PageFilter for CommentFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(article_id) = &self.article_id {
            builder.push(" AND article_id = ").push_bind(article_id.clone());
        }
        if let Some(user_uuid) = self.user_uuid {
            builder.push(" AND user_uuid = ").push_bind(user_uuid);
        }
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            builder
                .push(" AND content LIKE ")
                .push_bind(format!("%{}%", escape_like(content)))
                .push(" ESCAPE '\\'");
        }
    }
}

/// Makes `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
