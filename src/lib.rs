pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod services;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/auth/me",
            get(handlers::auth::me).put(handlers::auth::update_me),
        )
        // Article-scoped comment routes
        .route(
            "/articles/{article_id}/comments",
            get(handlers::comments::article_comments)
                .delete(handlers::comments::delete_article_comments),
        )
        // Comment routes
        .route(
            "/comments",
            get(handlers::comments::list_comments)
                .post(handlers::comments::create_comment)
                .delete(handlers::comments::delete_comments),
        )
        .route("/comments/recent", get(handlers::comments::recent_comments))
        .route("/comments/mine", get(handlers::comments::my_comments))
        .route("/comments/{comment_id}", get(handlers::comments::get_comment))
        .route(
            "/users/{user_id}/comments",
            get(handlers::comments::user_comments),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub mod test_utils {
    use crate::auth::hash_password;
    use crate::config::Config;
    use crate::models::UserRole;
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        create_test_state_with(Config::default()).await
    }

    pub async fn create_test_state_with(config: Config) -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool, &config)
    }

    pub async fn create_test_user(state: &AppState, email: &str, name: &str) -> Uuid {
        create_user_with_role(state, email, name, UserRole::User).await
    }

    pub async fn create_test_admin(state: &AppState, email: &str, name: &str) -> Uuid {
        create_user_with_role(state, email, name, UserRole::Admin).await
    }

    async fn create_user_with_role(
        state: &AppState,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let password_hash = hash_password("testpassword123").unwrap();
        state
            .users
            .create(id, email, &password_hash, name, role)
            .await
            .unwrap();
        id
    }

    pub async fn create_test_session(state: &AppState, user_id: Uuid) -> String {
        let token = format!("test_token_{}", Uuid::new_v4());
        state.sessions.create(user_id, &token).await.unwrap();
        token
    }
}
