use std::env;
use std::fmt;

use crate::mail::SmtpConfig;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Origin of the web client; added to the CORS allow-list and used for mail links.
    pub frontend_url: Option<String>,
    /// Validity window of confirmation and reset tokens.
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    /// `None` when the SMTP block is incomplete; mail is then logged instead of sent.
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key, value) => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw.clone())),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parsed_or("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parsed_or("JWT_EXPIRATION_HOURS", 24)?,
            frontend_url: env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
            token_ttl_minutes: parsed_or("TOKEN_TTL_MINUTES", 10)?,
            bcrypt_cost: parsed_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            smtp: SmtpConfig::from_env()?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    /// Base URL used in email links.
    pub fn frontend_base(&self) -> &str {
        self.frontend_url
            .as_deref()
            .unwrap_or(crate::cors::LOCAL_FRONTEND_ORIGIN)
    }
}
