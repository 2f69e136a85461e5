use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::info;

use crate::error::AppError;

pub const DEFAULT_SQUIDLER_BASE_URL: &str = "https://api.dev.squidler.io";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_address: String,
    pub squidler_api_key: Option<String>,
    pub squidler_base_url: String,
    pub auth: AuthConfig,
}

/// Password hashing cost and session lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub session_minutes: i64,
    pub remember_me_days: i64,
}

impl AuthConfig {
    pub fn session_lifetime(&self, remember_me: bool) -> Duration {
        if remember_me {
            Duration::days(self.remember_me_days)
        } else {
            Duration::minutes(self.session_minutes)
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            session_minutes: 30,
            remember_me_days: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let defaults = AuthConfig::default();

        Ok(Self {
            database_url: load_or("DATABASE_URL", "sqlite://taskboard.db".to_string())?,
            server_address: load_or("SERVER_ADDRESS", "0.0.0.0:8080".to_string())?,
            squidler_api_key: secret("SQUIDLER_API_KEY"),
            squidler_base_url: load_or("SQUIDLER_BASE_URL", DEFAULT_SQUIDLER_BASE_URL.to_string())?,
            auth: AuthConfig {
                bcrypt_cost: load_or("BCRYPT_COST", defaults.bcrypt_cost)?,
                session_minutes: load_or("SESSION_MINUTES", defaults.session_minutes)?,
                remember_me_days: load_or("REMEMBER_ME_DAYS", defaults.remember_me_days)?,
            },
        })
    }
}

fn load_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid {key} value {raw:?}: {e}"))),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

// Blank secrets count as unset.
fn secret(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => {
            info!("{key} not set, proxy endpoints will report a configuration error");
            None
        }
    }
}
