use std::net::SocketAddr;

use clap::{Args, Parser};
use tracing::level_filters::LevelFilter;

use crate::serializers::recipe::IngredientWriteMode;

/// Connection settings shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DATABASE_URL", default_value = "recipes.sqlite3")]
    pub database_url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 4)]
    pub pool_size: u32,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "recipe-api", about = "HTTP API for recipes and their ingredients")]
pub struct ServerConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8000")]
    pub bind_address: SocketAddr,

    /// How recipe payloads carry their ingredients
    #[arg(
        long,
        env = "INGREDIENT_WRITE_MODE",
        value_enum,
        default_value_t = IngredientWriteMode::Nested
    )]
    pub ingredient_write_mode: IngredientWriteMode,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl ServerConfig {
    /// Reads flags and environment, after loading `.env` when there is one.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}
