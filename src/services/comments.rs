use std::collections::HashSet;
use uuid::Uuid;

use super::dedupe::dedupe;
use super::deletion::delete_subtree;
use super::tree::TreeLoader;
use crate::auth::{assert_can_delete, Actor};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentFilter, CommentNode, CommentWithAuthor, CreateComment, MAX_CONTENT_LEN,
};
use crate::repo::{CommentRepository, Page, PageRequest};

/// Entry point for everything the API does with comments.
#[derive(Clone)]
pub struct CommentService {
    comments: CommentRepository,
    tree: TreeLoader,
    max_depth: usize,
    recent_limit: i64,
}

impl CommentService {
    pub fn new(comments: CommentRepository, max_depth: usize, recent_limit: i64) -> Self {
        Self {
            tree: TreeLoader::new(comments.clone(), max_depth),
            comments,
            max_depth,
            recent_limit,
        }
    }

    pub fn tree_loader(&self) -> &TreeLoader {
        &self.tree
    }

    /// All threads of an article, root comments newest first.
    pub async fn tree_by_article(&self, article_id: &str) -> Result<Vec<CommentNode>> {
        let roots = self.comments.list_roots(article_id).await?;
        self.tree.expand_all(roots).await
    }

    pub async fn recent(&self) -> Result<Vec<CommentWithAuthor>> {
        self.comments.list_recent(self.recent_limit).await
    }

    /// Every comment a user wrote, expanded, with each thread shown once.
    pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<CommentNode>> {
        let comments = self.comments.list_by_user(user_id).await?;
        let expanded = self.tree.expand_all(comments).await?;
        Ok(dedupe(expanded))
    }

    pub async fn get(&self, id: i64) -> Result<CommentWithAuthor> {
        self.comments.get_with_author(id).await
    }

    pub async fn list_page(&self, filter: &CommentFilter, page: PageRequest) -> Result<Page<Comment>> {
        self.comments.list_page(filter, page).await
    }

    pub async fn create(&self, actor: &Actor, input: CreateComment) -> Result<CommentWithAuthor> {
        let article_id = input.article_id.trim();
        if article_id.is_empty() {
            return Err(AppError::Validation("Article id is required".to_string()));
        }

        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment content is required".to_string()));
        }
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(AppError::Validation(format!(
                "Comment must be at most {} characters",
                MAX_CONTENT_LEN
            )));
        }

        // Non-positive parent ids are treated as "no parent"
        let parent_id = input.parent_id.filter(|id| *id > 0);
        if let Some(parent_id) = parent_id {
            self.validate_parent(parent_id, article_id).await?;
        }

        let comment = self
            .comments
            .create(article_id, actor.user_id, content, parent_id)
            .await?;

        tracing::info!(
            comment_id = comment.id,
            article_id = %comment.article_id,
            parent_id = ?comment.parent_id,
            "Created comment"
        );

        self.comments.get_with_author(comment.id).await
    }

    async fn validate_parent(&self, parent_id: i64, article_id: &str) -> Result<()> {
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::Validation("Parent comment does not exist".to_string()))?;

        if parent.article_id != article_id {
            return Err(AppError::Validation(
                "Parent comment belongs to a different article".to_string(),
            ));
        }

        let depth = self.comments.depth_of(parent_id, self.max_depth).await? + 1;
        if depth > self.max_depth {
            return Err(AppError::Validation(format!(
                "Replies cannot be nested deeper than {} levels",
                self.max_depth
            )));
        }

        Ok(())
    }

    /// Delete comments and all of their replies, all or nothing.
    ///
    /// Every id is checked for existence and permission before the first row
    /// is removed. Ids that disappear because an earlier id in the same batch
    /// was their ancestor are skipped.
    pub async fn delete_batch(&self, actor: &Actor, ids: &[i64]) -> Result<u64> {
        let mut seen = HashSet::new();
        let ids: Vec<i64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.comments.pool().begin().await?;

        for &id in &ids {
            let comment = CommentRepository::find_in(&mut *tx, id)
                .await?
                .ok_or(AppError::NotFound)?;
            assert_can_delete(actor, &comment)?;
        }

        let mut removed = 0;
        for &id in &ids {
            if !CommentRepository::exists_by_id(&mut *tx, id).await? {
                continue;
            }
            removed += delete_subtree(&mut *tx, id, self.max_depth).await?;
        }

        tx.commit().await?;

        tracing::info!(
            user_id = %actor.user_id,
            requested = ids.len(),
            removed,
            "Deleted comments"
        );
        Ok(removed)
    }

    /// Remove every comment on an article, e.g. when the article itself is deleted.
    pub async fn delete_for_article(&self, article_id: &str) -> Result<u64> {
        let mut tx = self.comments.pool().begin().await?;

        let mut removed = 0;
        for root_id in CommentRepository::root_ids_for_article(&mut *tx, article_id).await? {
            removed += delete_subtree(&mut *tx, root_id, self.max_depth).await?;
        }

        tx.commit().await?;

        tracing::info!(article_id, removed, "Deleted article comments");
        Ok(removed)
    }
}
