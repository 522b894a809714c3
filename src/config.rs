use std::env;
use std::net::SocketAddr;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/vitrin.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
}

impl Config {
    /// Reads `DATABASE_URL`, `BIND_ADDR` and `SECURE_COOKIES`, falling back to
    /// local defaults. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()?;
        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            secure_cookies,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
