//! Menu Dispatcher module: maps a button label to what the bot answers

use crate::menu::{MenuConfig, MenuEntry};

/// What a verified user's text selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// Back label: redraw the main menu
    MainMenu,
    /// A configured entry: its reply, optional link, then a back-only prompt
    Entry(&'a MenuEntry),
    /// Anything else: ask the user to pick from the menu
    Fallback,
}

/// Resolve a label against the menu table
///
/// Only meaningful for verified sessions. Surrounding whitespace is ignored,
/// otherwise labels must match exactly.
pub fn resolve<'a>(label: &str, menu: &'a MenuConfig) -> Action<'a> {
    let label = label.trim();
    if label == menu.back_label.trim() {
        return Action::MainMenu;
    }
    match menu.entry(label) {
        Some(entry) => Action::Entry(entry),
        None => Action::Fallback,
    }
}
