/*
 * Responsibility
 * - read settings from the environment (DATABASE_URL, AUTH_VERIFY_URL, ...)
 * - validate them; anything missing or malformed fails startup
 * - this service holds no signing secret
 */
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

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

    // customers' verification endpoint, e.g. http://customers:3000/api/v1/auth
    pub auth_verify_url: Url,
    pub auth_verify_timeout: Duration,

    pub auth_cache_ttl: Duration,
    pub auth_cache_capacity: usize,

    pub request_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("auth_verify_url", &self.auth_verify_url.as_str())
            .field("auth_verify_timeout", &self.auth_verify_timeout)
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
        let port: u16 = parse_or(&var, "PORT", 3001)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let auth_verify_url = var("AUTH_VERIFY_URL")
            .ok_or(ConfigError::Missing("AUTH_VERIFY_URL"))
            .and_then(|raw| {
                Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_VERIFY_URL"))
            })?;
        if !matches!(auth_verify_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("AUTH_VERIFY_URL"));
        }

        let timeout_ms: u64 = parse_or(&var, "AUTH_VERIFY_TIMEOUT_MS", 3000)?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid("AUTH_VERIFY_TIMEOUT_MS"));
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
            auth_verify_url,
            auth_verify_timeout: Duration::from_millis(timeout_ms),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/orders"),
        ("AUTH_VERIFY_URL", "http://customers:3000/api/v1/auth"),
    ];

    #[test]
    fn defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.addr.port(), 3001);
        assert_eq!(
            config.auth_verify_url.as_str(),
            "http://customers:3000/api/v1/auth"
        );
        assert_eq!(config.auth_verify_timeout, Duration::from_secs(3));
        assert!(config.auth_cache_ttl.is_zero());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn verify_url_must_be_absolute_http() {
        assert_eq!(
            load(&[("DATABASE_URL", "postgres://x")]).unwrap_err(),
            ConfigError::Missing("AUTH_VERIFY_URL")
        );
        for bad in ["/api/v1/auth", "customers:3000", "ftp://customers/auth"] {
            let err = load(&[("DATABASE_URL", "postgres://x"), ("AUTH_VERIFY_URL", bad)]);
            assert_eq!(
                err.unwrap_err(),
                ConfigError::Invalid("AUTH_VERIFY_URL"),
                "{bad}"
            );
        }
    }

    #[test]
    fn verify_timeout() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AUTH_VERIFY_TIMEOUT_MS", "250"));
        assert_eq!(
            load(&pairs).unwrap().auth_verify_timeout,
            Duration::from_millis(250)
        );

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AUTH_VERIFY_TIMEOUT_MS", "0"));
        assert_eq!(
            load(&pairs).unwrap_err(),
            ConfigError::Invalid("AUTH_VERIFY_TIMEOUT_MS")
        );
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("REQUEST_TIMEOUT_SECONDS", "0"));
        assert_eq!(
            load(&pairs).unwrap_err(),
            ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS")
        );
    }
}
