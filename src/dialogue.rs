//! Session state kept per chat while the user moves through the contact gate and menu.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Which part of the menu a verified user is looking at
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuView {
    #[default]
    Main,
    Section {
        label: String,
    },
}

/// Conversation state of one chat
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No verified contact since the last `/start`
    #[default]
    AwaitingContact,
    Verified {
        view: MenuView,
    },
}

impl SessionState {
    pub fn is_verified(&self) -> bool {
        matches!(self, SessionState::Verified { .. })
    }
}

/// Type alias for the per-chat session dialogue
pub type SessionDialogue = Dialogue<SessionState, InMemStorage<SessionState>>;
