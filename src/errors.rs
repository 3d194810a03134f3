//! # Error Types Module
//!
//! Structured error types for configuration loading, menu table validation
//! and contact store operations.

use thiserror::Error;

/// Errors raised while reading the bot configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
    /// A variable is present but its value cannot be used
    #[error("invalid configuration for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors raised while loading or validating the menu table
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("failed to read menu table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse menu table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("menu table has no entries")]
    Empty,
    #[error("menu label is blank")]
    BlankLabel,
    #[error("menu label has surrounding whitespace: {0:?}")]
    PaddedLabel(String),
    #[error("duplicate menu label: {0}")]
    DuplicateLabel(String),
    #[error("menu label collides with the back label: {0}")]
    BackLabelCollision(String),
    #[error("invalid link for {label}: {reason}")]
    InvalidLink { label: String, reason: String },
    #[error("menu columns must be at least 1")]
    ZeroColumns,
}

/// Errors raised by a contact store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure talking to the spreadsheet API
    #[error("spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The spreadsheet API answered with a non-success status
    #[error("spreadsheet API rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// The configured API base URL cannot be used
    #[error("invalid spreadsheet API endpoint: {0}")]
    InvalidEndpoint(String),
    /// Database failure in the PostgreSQL backend
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
