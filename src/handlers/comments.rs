use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentFilter, CommentNode, CommentWithAuthor, CreateComment, DeleteComments,
    DeletedResponse,
};
use crate::repo::{Page, PageRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub article_id: Option<String>,
    pub user_uuid: Option<Uuid>,
    pub content: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn require_admin(auth: &AuthUser) -> Result<()> {
    if auth.user.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Reply trees for an article
pub async fn article_comments(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<Vec<CommentNode>>> {
    let trees = state.comments.tree_by_article(&article_id).await?;
    Ok(Json(trees))
}

/// Remove all comments of an article (admin only)
pub async fn delete_article_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(article_id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    require_admin(&auth)?;

    let deleted = state.comments.delete_for_article(&article_id).await?;
    Ok(Json(DeletedResponse { deleted }))
}

pub async fn recent_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(state.comments.recent().await?))
}

/// The caller's own comments, one entry per thread
pub async fn my_comments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<CommentNode>>> {
    Ok(Json(state.comments.by_user(auth.user.id).await?))
}

pub async fn user_comments(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CommentNode>>> {
    state.users.get_by_id(user_id).await?;
    Ok(Json(state.comments.by_user(user_id).await?))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<CommentWithAuthor>> {
    Ok(Json(state.comments.get(comment_id).await?))
}

/// Flat, filtered listing for the admin dashboard
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<Page<Comment>>> {
    require_admin(&auth)?;

    let filter = CommentFilter {
        article_id: query.article_id,
        user_uuid: query.user_uuid,
        content: query.content,
    };
    let page = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };

    Ok(Json(state.comments.list_page(&filter, page).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateComment>,
) -> Result<Json<CommentWithAuthor>> {
    let comment = state.comments.create(&auth.actor(), input).await?;
    Ok(Json(comment))
}

/// Delete comments with all their replies (author or admin)
pub async fn delete_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<DeleteComments>,
) -> Result<Json<DeletedResponse>> {
    let deleted = state.comments.delete_batch(&auth.actor(), &input.ids).await?;
    Ok(Json(DeletedResponse { deleted }))
}
