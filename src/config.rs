/*
 * Responsibility
 * - read settings from the environment (DATABASE_URL, AUTH_SECRET, ...)
 * - validate them; anything missing or malformed fails startup
 */
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub app_env: AppEnv,

    // HS256 key shared by issuance and local verification
    pub auth_secret: Vec<u8>,
    pub token_ttl_seconds: u64,

    pub auth_cache_ttl: Duration,
    pub auth_cache_capacity: usize,

    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("auth_cache_ttl", &self.auth_cache_ttl)
            .field("auth_cache_capacity", &self.auth_cache_capacity)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&var, "PORT", 3000)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let auth_secret = var("AUTH_SECRET").ok_or(ConfigError::Missing("AUTH_SECRET"))?;
        if auth_secret.is_empty() {
            return Err(ConfigError::Invalid("AUTH_SECRET"));
        }

        let token_ttl_seconds: u64 = parse_or(&var, "TOKEN_TTL_SECONDS", 3600)?;
        if token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }

        let auth_cache_ttl = Duration::from_secs(parse_or(&var, "AUTH_CACHE_TTL_SECONDS", 0)?);
        let auth_cache_capacity = parse_or(&var, "AUTH_CACHE_CAPACITY", 1024)?;

        let request_timeout = Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECONDS", 30)?);
        if request_timeout.is_zero() {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        Ok(Self {
            addr,
            database_url,
            app_env,
            auth_secret: auth_secret.into_bytes(),
            token_ttl_seconds,
            auth_cache_ttl,
            auth_cache_capacity,
            request_timeout,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
