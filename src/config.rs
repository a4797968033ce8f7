//! Configuration management for the playlist manager.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/playmgr/.env`)
//! 4. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use chrono::NaiveTime;
use thiserror::Error;

use crate::utils;

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUTO_SORT_AT: &str = "12:00";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Loads `.env` files into the process environment.
///
/// Both files are optional; variables already present in the environment are
/// never overwritten.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playmgr/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::dotenv().ok();
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn server_addr() -> Result<SocketAddr, ConfigError> {
    let raw = optional("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());
    SocketAddr::from_str(&raw).map_err(|_| ConfigError::Invalid {
        name: "SERVER_ADDRESS",
        value: raw,
    })
}

/// Base URL of the Spotify Web API, without trailing slash.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL")
        .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string())
}

/// Client id registered with Spotify; needed to refresh access tokens.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    optional("SPOTIFY_API_AUTH_CLIENT_ID").ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))
}

/// Client secret, sent along with refresh requests when configured.
///
/// Keep it out of logs.
pub fn spotify_client_secret() -> Option<String> {
    optional("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Timeout applied to every remote call.
pub fn http_timeout() -> Result<Duration, ConfigError> {
    match optional("HTTP_TIMEOUT_SECS") {
        None => Ok(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                value: raw,
            }),
        },
    }
}

/// Local time of day the auto-sort driver fires.
pub fn auto_sort_at() -> Result<NaiveTime, ConfigError> {
    let raw = optional("AUTO_SORT_AT").unwrap_or_else(|| DEFAULT_AUTO_SORT_AT.to_string());
    utils::parse_time_of_day(&raw).ok_or(ConfigError::Invalid {
        name: "AUTO_SORT_AT",
        value: raw,
    })
}

/// Whether inserts into the liked-list are issued in reverse target order.
pub fn reverse_liked_inserts() -> Result<bool, ConfigError> {
    match optional("REVERSE_LIKED_INSERTS") {
        None => Ok(true),
        Some(raw) => utils::parse_bool(&raw).ok_or(ConfigError::Invalid {
            name: "REVERSE_LIKED_INSERTS",
            value: raw,
        }),
    }
}

pub fn users_path() -> PathBuf {
    if let Some(path) = optional("PLAYMGR_USERS_FILE") {
        return PathBuf::from(path);
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playmgr/users.json");
    path
}

pub fn log_format() -> LogFormat {
    match optional("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
        Some(f) if f == "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}
