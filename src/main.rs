use blog_comments::{
    auth::hash_password, config::Config, create_router, models::UserRole, state::AppState,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_comments=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool, &config);

    if let Err(e) = seed_admin_user(&state).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    let app = create_router(state);

    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates an administrator from `ADMIN_EMAIL` / `ADMIN_PASSWORD` when both
/// are set and the account does not exist yet.
async fn seed_admin_user(state: &AppState) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        return Ok(());
    };

    if state.users.email_exists(&email).await? {
        return Ok(());
    }

    let password_hash = hash_password(&password)?;
    state
        .users
        .create(Uuid::new_v4(), &email, &password_hash, "admin", UserRole::Admin)
        .await?;

    tracing::info!("Seeded admin user {}", email);
    Ok(())
}
