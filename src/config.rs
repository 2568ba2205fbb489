use dotenv::dotenv;
use std::env;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Reads the settings shared by both applications.
    pub fn from_env(default_port: u16) -> AppResult<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: optional("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: required("JWT_SECRET")?,
            session_ttl_hours: optional("SESSION_TTL_HOURS", 24)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: optional("SERVER_PORT", default_port)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Clone, Debug)]
pub struct PaystackConfig {
    pub public_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Public origin used to build the callback URL; derived from the
    /// request when unset.
    pub app_base_url: Option<String>,
}

impl PaystackConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();

        Ok(Self {
            public_key: required("PAYSTACK_PUBLIC_KEY")?,
            secret_key: required("PAYSTACK_SECRET_KEY")?,
            base_url: env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
            timeout_secs: optional("GATEWAY_TIMEOUT_SECS", 15)?,
            app_base_url: env::var("APP_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        })
    }
}

fn required(key: &str) -> AppResult<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{key} must be set"))),
    }
}

fn optional<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a valid number"))),
        Err(_) => Ok(default),
    }
}
