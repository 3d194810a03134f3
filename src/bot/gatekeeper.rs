//! Gatekeeper module: the contact requirement guarding the main menu

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::contact::{ContactRecord, ContactShare};
use crate::dialogue::{MenuView, SessionDialogue, SessionState};
use crate::errors::StoreError;
use crate::store::ContactStore;

/// Result of handling a shared contact
#[derive(Debug)]
pub enum ContactOutcome {
    /// Stored and the session is now verified
    Verified(ContactRecord),
    /// The contact belongs to someone else; nothing stored
    NotOwnContact,
    /// The store rejected the record; the session stays unverified
    StoreFailed(StoreError),
}

/// Whether the chat has passed the contact gate since its last `/start`
///
/// Read-only: an unknown chat is reported as unverified without storing a state.
pub async fn is_verified(dialogue: &SessionDialogue) -> Result<bool> {
    Ok(dialogue.get().await?.unwrap_or_default().is_verified())
}

/// Open the gate, landing on the main menu
pub async fn mark_verified(dialogue: &SessionDialogue) -> Result<()> {
    dialogue
        .update(SessionState::Verified {
            view: MenuView::Main,
        })
        .await?;
    Ok(())
}

/// Close the gate
pub async fn reset(dialogue: &SessionDialogue) -> Result<()> {
    dialogue.update(SessionState::AwaitingContact).await?;
    Ok(())
}

/// Verify ownership, append the record and open the gate
///
/// The store is only called for contacts owned by the sender, and the
/// session is only verified after the append succeeds.
pub async fn handle_contact(
    share: &ContactShare,
    sender_id: u64,
    store: &dyn ContactStore,
    dialogue: &SessionDialogue,
) -> Result<ContactOutcome> {
    if !share.is_owned_by(sender_id) {
        warn!(
            user_id = sender_id,
            contact_user_id = ?share.user_id,
            "Rejected contact not owned by sender"
        );
        return Ok(ContactOutcome::NotOwnContact);
    }

    let record = ContactRecord::from_share(share, sender_id, Utc::now());
    match store.append(&record).await {
        Ok(()) => {
            mark_verified(dialogue).await?;
            info!(user_id = sender_id, "Contact stored, session verified");
            Ok(ContactOutcome::Verified(record))
        }
        Err(e) => {
            error!(user_id = sender_id, error = %e, "Failed to store shared contact");
            Ok(ContactOutcome::StoreFailed(e))
        }
    }
}
