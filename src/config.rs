//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.
//! LinkedIn credentials are NOT read from here once configured: the encrypted
//! credential store is their only source of truth, and the env vars only
//! seed the OAuth login before anything has been saved.

use crate::models::CredentialRecord;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default cache window (hours).
pub const DEFAULT_CACHE_WINDOW_HOURS: i64 = 24;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Directory holding the key file and encrypted credentials
    pub config_dir: PathBuf,
    /// Directory holding the cache documents
    pub data_dir: PathBuf,
    /// How long cached data is served before refetching
    pub cache_window_hours: i64,
    pub linkedin_api_base_url: String,
    pub linkedin_oauth_base_url: String,
    /// OAuth redirect URI registered with the LinkedIn app
    pub linkedin_redirect_uri: String,
    pub linkedin_scopes: Vec<String>,

    // --- Bootstrap only, see module docs ---
    pub linkedin_client_id: Option<String>,
    pub linkedin_client_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let cache_window_hours = parse_var("CACHE_WINDOW_HOURS", DEFAULT_CACHE_WINDOW_HOURS)?;
        if cache_window_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "CACHE_WINDOW_HOURS",
                value: cache_window_hours.to_string(),
            });
        }

        Ok(Self {
            port: parse_var("PORT", 8000)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            config_dir: env::var("CONFIG_DIR")
                .unwrap_or_else(|_| "config".to_string())
                .into(),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            cache_window_hours,
            linkedin_api_base_url: env::var("LINKEDIN_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.linkedin.com/v2".to_string()),
            linkedin_oauth_base_url: env::var("LINKEDIN_OAUTH_BASE_URL")
                .unwrap_or_else(|_| "https://www.linkedin.com/oauth/v2".to_string()),
            linkedin_redirect_uri: env::var("LINKEDIN_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8000/api/auth/callback".to_string()),
            linkedin_scopes: env::var("LINKEDIN_SCOPES")
                .unwrap_or_else(|_| "r_liteprofile r_emailaddress w_member_social".to_string())
                .split_whitespace()
                .map(String::from)
                .collect(),
            linkedin_client_id: non_empty_var("LINKEDIN_CLIENT_ID"),
            linkedin_client_secret: non_empty_var("LINKEDIN_CLIENT_SECRET"),
        })
    }

    /// Config for tests: local directories, unreachable LinkedIn endpoints.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            config_dir: PathBuf::from("config"),
            data_dir: PathBuf::from("data"),
            cache_window_hours: DEFAULT_CACHE_WINDOW_HOURS,
            linkedin_api_base_url: "http://127.0.0.1:9/v2".to_string(),
            linkedin_oauth_base_url: "http://127.0.0.1:9/oauth/v2".to_string(),
            linkedin_redirect_uri: "http://localhost:8000/api/auth/callback".to_string(),
            linkedin_scopes: vec!["r_liteprofile".to_string(), "r_emailaddress".to_string()],
            linkedin_client_id: None,
            linkedin_client_secret: None,
        }
    }

    pub fn cache_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_window_hours)
    }

    /// Client credentials from the environment, used before any are stored.
    pub fn bootstrap_credentials(&self) -> Option<CredentialRecord> {
        Some(CredentialRecord {
            client_id: self.linkedin_client_id.clone()?,
            client_secret: self.linkedin_client_secret.clone()?,
            access_token: None,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
