//! # Menu Table Module
//!
//! The venue's menu is one declarative table: button labels mapped to a reply
//! text and an optional external link. The dispatcher only ever reads it, so
//! swapping venue content means swapping the table.

use std::collections::HashSet;
use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::errors::MenuError;

/// Built-in venue table shipped with the binary
const DEFAULT_MENU_JSON: &str = include_str!("../config/menu.json");

fn default_columns() -> usize {
    2
}

/// External link attached to a menu reply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    /// Button caption
    pub caption: String,
    pub url: String,
}

/// One button of the main menu
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    pub reply: String,
    #[serde(default)]
    pub link: Option<MenuLink>,
}

/// The full venue menu table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub venue: String,
    pub back_label: String,
    /// Buttons per main-menu keyboard row
    #[serde(default = "default_columns")]
    pub columns: usize,
    pub entries: Vec<MenuEntry>,
}

impl MenuConfig {
    /// Parse and validate a table from JSON text
    pub fn from_json(json: &str) -> Result<Self, MenuError> {
        let config: MenuConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The built-in Echo & Pool table
    pub fn venue_default() -> Result<Self, MenuError> {
        Self::from_json(DEFAULT_MENU_JSON)
    }

    /// Find the entry whose label matches exactly
    pub fn entry(&self, label: &str) -> Option<&MenuEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    /// Labels grouped into keyboard rows of `columns` buttons
    pub fn rows(&self) -> Vec<Vec<&str>> {
        self.entries
            .chunks(self.columns.max(1))
            .map(|chunk| chunk.iter().map(|entry| entry.label.as_str()).collect())
            .collect()
    }

    /// Check the invariants the dispatcher relies on
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.entries.is_empty() {
            return Err(MenuError::Empty);
        }
        if self.columns == 0 {
            return Err(MenuError::ZeroColumns);
        }
        check_label(&self.back_label)?;

        let mut seen = HashSet::new();
        for entry in &self.entries {
            check_label(&entry.label)?;
            if entry.label == self.back_label {
                return Err(MenuError::BackLabelCollision(entry.label.clone()));
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(MenuError::DuplicateLabel(entry.label.clone()));
            }
            if let Some(link) = &entry.link {
                let url = Url::parse(&link.url).map_err(|e| MenuError::InvalidLink {
                    label: entry.label.clone(),
                    reason: e.to_string(),
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(MenuError::InvalidLink {
                        label: entry.label.clone(),
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Labels are compared against trimmed user text, so they must already be trimmed
fn check_label(label: &str) -> Result<(), MenuError> {
    if label.trim().is_empty() {
        return Err(MenuError::BlankLabel);
    }
    if label.trim() != label {
        return Err(MenuError::PaddedLabel(label.to_string()));
    }
    Ok(())
}
