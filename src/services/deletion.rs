use sqlx::SqliteConnection;

use crate::error::{AppError, Result};
use crate::repo::CommentRepository;

/// Deletes `id` and everything below it, children strictly before parents,
/// returning the number of removed rows.
///
/// Runs on the caller's transaction connection and never commits; the caller
/// owns the transaction so a failure anywhere in the batch rolls back every
/// subtree it touched.
pub async fn delete_subtree(conn: &mut SqliteConnection, id: i64, max_depth: usize) -> Result<u64> {
    // (comment id, depth below `id`, replies already scheduled)
    let mut stack = vec![(id, 0usize, false)];
    let mut removed = 0;

    while let Some((current, depth, expanded)) = stack.pop() {
        if expanded {
            CommentRepository::delete_by_id(&mut *conn, current).await?;
            tracing::debug!(comment_id = current, depth, "Deleted comment");
            removed += 1;
            continue;
        }

        if depth > max_depth {
            return Err(AppError::Validation(format!(
                "Comment {} has replies nested deeper than {} levels",
                id, max_depth
            )));
        }

        stack.push((current, depth, true));
        let child_ids = CommentRepository::child_ids(&mut *conn, current).await?;
        // Reversed so the lowest child id is deleted first.
        for child_id in child_ids.into_iter().rev() {
            stack.push((child_id, depth + 1, false));
        }
    }

    Ok(removed)
}
