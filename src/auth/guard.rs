use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, User, UserRole};

/// The identity a comment operation is performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Only the author of a comment or an administrator may delete it.
pub fn assert_can_delete(actor: &Actor, comment: &Comment) -> Result<()> {
    if actor.user_id == comment.user_uuid || actor.role.is_admin() {
        return Ok(());
    }

    tracing::warn!(
        user_id = %actor.user_id,
        role = %actor.role,
        comment_id = comment.id,
        "Rejected comment deletion by non-author"
    );
    Err(AppError::Forbidden)
}
