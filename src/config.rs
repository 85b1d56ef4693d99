use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_MAX_COMMENT_DEPTH: usize = 64;
pub const DEFAULT_RECENT_COMMENTS_LIMIT: i64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Deepest reply level accepted below a root comment.
    pub max_comment_depth: usize,
    pub recent_comments_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:blog.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: 5,
            max_comment_depth: DEFAULT_MAX_COMMENT_DEPTH,
            recent_comments_limit: DEFAULT_RECENT_COMMENTS_LIMIT,
        }
    }
}

impl Config {
    /// Reads configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            max_comment_depth: parse_var("MAX_COMMENT_DEPTH", defaults.max_comment_depth),
            recent_comments_limit: parse_var(
                "RECENT_COMMENTS_LIMIT",
                defaults.recent_comments_limit,
            ),
        }
    }
}

fn parse_var<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using {}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}
