use std::{env, fmt::Display};

/// Server settings read from the environment (a `.env` file is honoured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub token_secret: String,
    /// Sends the token cookie with `Secure; SameSite=None` when set.
    pub cookie_secure: bool,
    pub token_ttl_secs: u64,
    /// Empty means any origin is accepted.
    pub cors_origins: Vec<String>,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: String::new(),
            token_secret: String::new(),
            cookie_secure: false,
            token_ttl_secs: 3600,
            cors_origins: Vec::new(),
            pool_size: 10,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Environment variable '{}' not set", key),
            ConfigError::Invalid(key, value) => {
                write!(f, "Environment variable '{}' has invalid value '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Loads `.env` and reads the process environment.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let token_secret =
            get("ACCESS_TOKEN_SECRET").ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT", v))?,
            None => defaults.port,
        };
        let token_ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("TOKEN_TTL_SECS", v))?,
            None => defaults.token_ttl_secs,
        };
        let pool_size = match get("DATABASE_POOL_SIZE") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("DATABASE_POOL_SIZE", v))?,
            None => defaults.pool_size,
        };
        let cookie_secure = match get("COOKIE_SECURE") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid("COOKIE_SECURE", v))?,
            None => defaults.cookie_secure,
        };
        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url,
            token_secret,
            cookie_secure,
            token_ttl_secs,
            cors_origins,
            pool_size,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
