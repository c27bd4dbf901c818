use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::codeforces::DEFAULT_BASE_URL;
use crate::mailer::SmtpConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub codeforces_api_url: String,
    /// `None` when `SMTP_PASS` is unset; mail is only logged then.
    pub smtp: Option<SmtpConfig>,
    pub sync_api_key: Option<String>,
    /// 0 disables the in-process scheduler.
    pub sync_interval_secs: u64,
    pub sync_queue_capacity: usize,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://progress.db".to_string());
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let codeforces_api_url = env::var("CODEFORCES_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let smtp = match non_empty_var("SMTP_PASS") {
            Some(password) => Some(SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.sendgrid.net".to_string()),
                port: parse_var("SMTP_PORT", 587)?,
                username: env::var("SMTP_USER").unwrap_or_else(|_| "apikey".to_string()),
                password,
                from_address: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "noreply@yourapp.com".to_string()),
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            codeforces_api_url,
            smtp,
            sync_api_key: non_empty_var("SYNC_API_KEY"),
            sync_interval_secs: parse_var("SYNC_INTERVAL_SECS", 0)?,
            sync_queue_capacity: parse_var("SYNC_QUEUE_CAPACITY", 64)?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
