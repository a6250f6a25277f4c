use anyhow::Result;
use std::env;
use crate::constants::{DEFAULT_MATCH_TTL_HOURS, DEFAULT_SERVER_PORT};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared secret guarding the /api/admin surface
    pub admin_password: String,
    /// Active matches older than this are released on the next pass
    pub match_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set"))?,
            match_ttl_hours: env::var("MATCH_TTL_HOURS")
                .unwrap_or_else(|_| DEFAULT_MATCH_TTL_HOURS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MATCH_TTL_HOURS),
        })
    }
}
