use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::repo::{CommentRepository, SessionRepository, UserRepository};
use crate::services::CommentService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub sessions: SessionRepository,
    pub comments: CommentService,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let pool = Arc::new(pool);
        let comment_repo = CommentRepository::new(pool.clone());
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            comments: CommentService::new(
                comment_repo,
                config.max_comment_depth,
                config.recent_comments_limit,
            ),
            pool,
        }
    }
}
