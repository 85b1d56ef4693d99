use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthorSummary;

pub const MAX_CONTENT_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub article_id: String,
    pub user_uuid: Uuid,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with the author's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub article_id: String,
    pub user_uuid: Uuid,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub author: AuthorSummary,
}

/// A comment with its replies expanded to full depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentWithAuthor,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> i64 {
        self.comment.id
    }

    /// Ids of every descendant, depth-first, not including this node.
    pub fn descendant_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack: Vec<&CommentNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id());
            stack.extend(node.children.iter());
        }
        ids
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub article_id: String,
    pub content: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteComments {
    pub ids: Vec<i64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentFilter {
    pub article_id: Option<String>,
    pub user_uuid: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
