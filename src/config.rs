//! # Bot Configuration Module
//!
//! This module reads the runtime configuration from the environment:
//! the Telegram token, the contact store backend and its settings,
//! an optional menu table path and the log output format.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ConfigError;

// Constants for configuration defaults
pub const DEFAULT_SHEET_NAME: &str = "Contacts";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

static SPREADSHEET_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("valid spreadsheet id regex"));

/// Log output format selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Google Sheets backend settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    /// Spreadsheet identifier taken from the sheet URL
    pub spreadsheet_id: String,
    /// Sheet (tab) receiving contact rows
    pub sheet_name: String,
    /// Service-account access token sent as a bearer credential
    pub access_token: String,
    /// API base URL, overridable for tests and proxies
    pub api_base: String,
}

/// Which contact store backend the bot writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sheets(SheetsConfig),
    Postgres { database_url: String },
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub store: StoreConfig,
    /// JSON menu table replacing the built-in venue table
    pub menu_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram_token = require("TELEGRAM_BOT_TOKEN")?;

        let backend = get("CONTACT_STORE").unwrap_or_else(|| "sheets".to_string());
        let store = match backend.to_ascii_lowercase().as_str() {
            "sheets" => {
                let spreadsheet_id = require("SPREADSHEET_ID")?;
                if !SPREADSHEET_ID_PATTERN.is_match(&spreadsheet_id) {
                    return Err(ConfigError::Invalid {
                        key: "SPREADSHEET_ID",
                        reason: "expected the id segment of a spreadsheet URL".to_string(),
                    });
                }
                StoreConfig::Sheets(SheetsConfig {
                    spreadsheet_id,
                    sheet_name: get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                    access_token: require("GOOGLE_SHEETS_TOKEN")?,
                    api_base: get("SHEETS_API_BASE")
                        .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string()),
                })
            }
            "postgres" => StoreConfig::Postgres {
                database_url: require("DATABASE_URL")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "CONTACT_STORE",
                    reason: format!("unknown backend '{other}', expected 'sheets' or 'postgres'"),
                })
            }
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            telegram_token,
            store,
            menu_path: get("MENU_CONFIG_PATH").map(PathBuf::from),
            log_format,
        })
    }
}
