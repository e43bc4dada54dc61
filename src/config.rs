// src/config.rs

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// SMTP credentials; mail is only sent when all of these are present.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub upload_dir: PathBuf,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parsed("PORT", 8000)?;
        let token_ttl_days = parsed("TOKEN_TTL_DAYS", 30)?;
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let smtp = match (
            env::var("SMTP_HOST").ok(),
            env::var("SMTP_USERNAME").ok(),
            env::var("SMTP_PASSWORD").ok(),
        ) {
            (Some(host), Some(username), Some(password)) => {
                let from = env::var("MAIL_FROM").unwrap_or_else(|_| username.clone());
                Some(SmtpConfig {
                    host,
                    username,
                    password,
                    from,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            bind_addr,
            port,
            jwt_secret,
            token_ttl_days,
            upload_dir,
            smtp,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
