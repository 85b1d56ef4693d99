use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use super::Actor;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

pub struct AuthUser {
    pub user: User,
    pub session_token: String,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.user)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let cookies = CookieJar::from_headers(&parts.headers);

        // Session cookie first, then a bearer header carrying the same token
        let token = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => parts
                .headers
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or(AppError::Unauthorized)?,
        };

        let session = state
            .sessions
            .find_active(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = state
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            user,
            session_token: token,
        })
    }
}
