//! # Configuration
//!
//! Environment-based configuration shared by the webhook server and the
//! scheduler daemon.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Parse the timezone into a `chrono_tz::Tz` at load time
//! - 1.0.0: Initial creation

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Default data directory for the JSON reminder files
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default IANA timezone identifier
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Default bind address for the webhook server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Runtime configuration loaded from environment variables.
///
/// Both binaries call [`Config::from_env`] once at startup, after
/// `dotenvy::dotenv()` has had a chance to populate the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE Messaging API channel access token (push + reply)
    pub channel_access_token: String,
    /// LINE channel secret used for webhook signature verification
    pub channel_secret: String,
    /// Directory holding reminders.json / archive.json
    pub data_dir: String,
    /// The single civil timezone all schedule arithmetic runs in
    pub timezone: Tz,
    /// Log filter passed to env_logger (e.g. "info", "remindkun=debug")
    pub log_level: String,
    /// Listen address for the webhook server
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `LINE_CHANNEL_ACCESS_TOKEN` and `LINE_CHANNEL_SECRET` are required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self> {
        let channel_access_token = std::env::var("LINE_CHANNEL_ACCESS_TOKEN")
            .map_err(|_| anyhow!("LINE_CHANNEL_ACCESS_TOKEN must be set"))?;
        let channel_secret = std::env::var("LINE_CHANNEL_SECRET")
            .map_err(|_| anyhow!("LINE_CHANNEL_SECRET must be set"))?;

        let data_dir =
            std::env::var("REMINDKUN_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let timezone_name =
            std::env::var("REMINDKUN_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name.parse().map_err(|e| {
            anyhow!("invalid REMINDKUN_TIMEZONE '{timezone_name}' (want an IANA identifier like Asia/Tokyo): {e}")
        })?;
        let log_level =
            std::env::var("REMINDKUN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let bind_addr =
            std::env::var("REMINDKUN_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Config {
            channel_access_token,
            channel_secret,
            data_dir,
            timezone,
            log_level,
            bind_addr,
        })
    }

    /// Current instant in the configured civil timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}
