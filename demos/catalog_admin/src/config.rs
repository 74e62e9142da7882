// catalog_admin/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  /// Base URL of the remote catalog API, e.g. `http://localhost:5000/api`.
  pub catalog_api_url: String,
  /// When both are set the server signs in at startup.
  pub catalog_api_user: Option<String>,
  pub catalog_api_password: Option<String>,

  pub page_size: u32,
  pub bulk_page_size: u32,
  pub http_timeout: Option<Duration>,
  pub import_submit_timeout: Option<Duration>,
  pub max_upload_bytes: usize,
}

// Keep secrets out of logs.
impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("catalog_api_url", &self.catalog_api_url)
      .field("catalog_api_user", &self.catalog_api_user)
      .field("catalog_api_password", &self.catalog_api_password.as_ref().map(|_| "[REDACTED]"))
      .field("page_size", &self.page_size)
      .field("bulk_page_size", &self.bulk_page_size)
      .field("http_timeout", &self.http_timeout)
      .field("import_submit_timeout", &self.import_submit_timeout)
      .field("max_upload_bytes", &self.max_upload_bytes)
      .finish()
  }
}

/// `0` disables the timeout.
fn seconds(value: u64) -> Option<Duration> {
  (value > 0).then(|| Duration::from_secs(value))
}

/// Parses straight into the target type, so out-of-range values are rejected.
fn parse_setting<T>(var_name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e)))
}

fn env_setting<T>(var_name: &str, default: &str) -> Result<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  let raw = env::var(var_name).unwrap_or_else(|_| default.to_string());
  parse_setting(var_name, &raw)
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let optional = |var_name: &str| get_env(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port: u16 = env_setting("SERVER_PORT", "8080")?;
    let catalog_api_url = get_env("CATALOG_API_URL")?;

    let page_size: u32 = env_setting("CATALOG_PAGE_SIZE", "12")?;
    let bulk_page_size: u32 = env_setting("CATALOG_BULK_PAGE_SIZE", "10000")?;
    let http_timeout = seconds(env_setting("CATALOG_HTTP_TIMEOUT_SECS", "0")?);
    let import_submit_timeout = seconds(env_setting("IMPORT_SUBMIT_TIMEOUT_SECS", "300")?);
    let max_upload_bytes: usize = env_setting("IMPORT_MAX_UPLOAD_BYTES", "16777216")?;

    if page_size == 0 || bulk_page_size == 0 {
      return Err(AppError::Config("Page sizes must be greater than zero".to_string()));
    }

    let config = Self {
      server_host,
      server_port,
      catalog_api_url,
      catalog_api_user: optional("CATALOG_API_USER"),
      catalog_api_password: optional("CATALOG_API_PASSWORD"),
      page_size,
      bulk_page_size,
      http_timeout,
      import_submit_timeout,
      max_upload_bytes,
    };

    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(config = ?config, "Loaded config details");
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_sizes_beyond_u32_are_rejected() {
    let err = parse_setting::<u32>("CATALOG_PAGE_SIZE", "4294967308").unwrap_err();
    assert!(matches!(err, AppError::Config(ref msg) if msg.contains("CATALOG_PAGE_SIZE")));
    assert_eq!(parse_setting::<u32>("CATALOG_PAGE_SIZE", " 12 ").unwrap(), 12);
    assert!(parse_setting::<u16>("SERVER_PORT", "70000").is_err());
  }
}
