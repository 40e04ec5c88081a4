use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub admin_password: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub hn_base_url: String,
    pub public_rps: u32,
    pub news_cache_dir: String,
    pub generated_dir: String,
    pub news_ttl_seconds: i64,
    pub news_refresh_seconds: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            admin_password: get_env_opt("ADMIN_PASSWORD"),
            openai_api_key: get_env_opt("OPENAI_API_KEY"),
            openai_base_url: get_env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            hn_base_url: get_env_or("HN_BASE_URL", "https://hacker-news.firebaseio.com/v0"),
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            news_cache_dir: get_env_or("NEWS_CACHE_DIR", ".cache"),
            generated_dir: get_env_or("GENERATED_DIR", "static/generated"),
            news_ttl_seconds: get_env_parse_or("NEWS_TTL_SECONDS", 86_400)?,
            news_refresh_seconds: get_env_parse_or("NEWS_REFRESH_SECONDS", 3_600)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

/// Unset and blank values are both treated as absent.
fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
