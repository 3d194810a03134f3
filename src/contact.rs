//! Contact payloads and the rows written to the contact ledger.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical column order of every contact store
pub const CONTACT_HEADER: [&str; 6] = [
    "timestamp",
    "first_name",
    "last_name",
    "phone_number",
    "username",
    "user_id",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static PHONE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-().]").expect("valid phone separator regex"));

/// Contact shared through the Telegram contact button
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactShare {
    pub phone_number: String,
    /// Telegram user owning the contact, absent for address-book contacts
    pub user_id: Option<u64>,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Sender's username, contacts carry none of their own
    pub username: Option<String>,
}

impl ContactShare {
    /// Whether the contact belongs to the user who sent it
    pub fn is_owned_by(&self, sender_id: u64) -> bool {
        self.user_id == Some(sender_id)
    }
}

/// One row of the append-only contact ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub timestamp: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub username: String,
    pub user_id: u64,
}

impl ContactRecord {
    /// Build the ledger row for a share sent by `sender_id`
    pub fn from_share(share: &ContactShare, sender_id: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            first_name: share.first_name.trim().to_string(),
            last_name: share.last_name.as_deref().unwrap_or("").trim().to_string(),
            phone_number: normalize_phone(&share.phone_number),
            username: share.username.clone().unwrap_or_default(),
            user_id: sender_id,
        }
    }

    /// Values in `CONTACT_HEADER` order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.phone_number.clone(),
            self.username.clone(),
            self.user_id.to_string(),
        ]
    }
}

/// Strip separators and add the international prefix to bare digits
///
/// Telegram clients differ on whether the leading `+` is sent.
pub fn normalize_phone(raw: &str) -> String {
    let compact = PHONE_SEPARATORS.replace_all(raw.trim(), "");
    if !compact.is_empty() && compact.chars().all(|c| c.is_ascii_digit()) {
        format!("+{compact}")
    } else {
        compact.into_owned()
    }
}
