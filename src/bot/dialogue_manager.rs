//! Dialogue Manager module for turning one inbound event into the bot's replies
//!
//! This is the transport-independent core of the bot: it drives the
//! gatekeeper, the menu dispatcher and the contact store, and describes
//! the answer as plain `Reply` values that the Telegram layer renders.

use anyhow::Result;
use tracing::{debug, info};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::contact::ContactShare;
use crate::dialogue::{MenuView, SessionDialogue, SessionState};
use crate::menu::{MenuConfig, MenuLink};
use crate::store::ContactStore;

use super::gatekeeper::{self, ContactOutcome};
use super::menu_dispatcher::{resolve, Action};

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// `/start`, with or without a deep-link payload
    Start,
    Text(String),
    Contact(ContactShare),
    /// Stickers, photos and anything else without text
    Other,
}

/// One inbound event from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub sender_id: u64,
    pub language_code: Option<String>,
    pub kind: InboundKind,
}

/// Keyboard redrawn together with a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    MainMenu,
    BackOnly,
    ContactRequest,
}

/// One outbound message
///
/// A reply carries at most one of `link` and `keyboard`, since a Telegram
/// message holds a single markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub link: Option<MenuLink>,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_link(mut self, link: Option<MenuLink>) -> Self {
        self.link = link;
        self
    }
}

fn contact_prompt(language_code: Option<&str>) -> Reply {
    Reply::text(t_lang("contact-prompt", language_code)).with_keyboard(Keyboard::ContactRequest)
}

fn main_menu(text: String) -> Reply {
    Reply::text(text).with_keyboard(Keyboard::MainMenu)
}

/// Handle one inbound event and return the replies to send, in order
pub async fn handle_inbound(
    inbound: &Inbound,
    dialogue: &SessionDialogue,
    store: &dyn ContactStore,
    menu: &MenuConfig,
) -> Result<Vec<Reply>> {
    let language_code = inbound.language_code.as_deref();

    match &inbound.kind {
        InboundKind::Start => {
            gatekeeper::reset(dialogue).await?;
            info!(user_id = inbound.sender_id, "Session started, awaiting contact");
            Ok(vec![
                Reply::text(t_args_lang(
                    "welcome",
                    &[("venue", menu.venue.as_str())],
                    language_code,
                )),
                contact_prompt(language_code),
            ])
        }
        InboundKind::Contact(share) => {
            handle_contact_share(share, inbound.sender_id, dialogue, store, language_code).await
        }
        InboundKind::Text(text) => {
            if !gatekeeper::is_verified(dialogue).await? {
                debug!(user_id = inbound.sender_id, "Text ignored before contact share");
                return Ok(vec![contact_prompt(language_code)]);
            }
            handle_menu_selection(text, inbound.sender_id, dialogue, menu, language_code).await
        }
        InboundKind::Other => {
            if !gatekeeper::is_verified(dialogue).await? {
                return Ok(vec![contact_prompt(language_code)]);
            }
            show_main_menu(dialogue, t_lang("menu-fallback", language_code)).await
        }
    }
}

async fn handle_contact_share(
    share: &ContactShare,
    sender_id: u64,
    dialogue: &SessionDialogue,
    store: &dyn ContactStore,
    language_code: Option<&str>,
) -> Result<Vec<Reply>> {
    // A failed repeat share leaves an open menu open
    let retry_keyboard = if gatekeeper::is_verified(dialogue).await? {
        Keyboard::MainMenu
    } else {
        Keyboard::ContactRequest
    };

    let replies = match gatekeeper::handle_contact(share, sender_id, store, dialogue).await? {
        ContactOutcome::Verified(record) => {
            let saved = t_args_lang(
                "contact-saved",
                &[("first_name", record.first_name.as_str())],
                language_code,
            );
            let text = format!("{}\n\n{}", saved, t_lang("main-menu-prompt", language_code));
            vec![main_menu(text)]
        }
        ContactOutcome::NotOwnContact => {
            let text = t_lang("contact-not-own", language_code);
            vec![Reply::text(text).with_keyboard(retry_keyboard)]
        }
        ContactOutcome::StoreFailed(_) => {
            let text = t_lang("contact-store-error", language_code);
            vec![Reply::text(text).with_keyboard(retry_keyboard)]
        }
    };
    Ok(replies)
}

async fn handle_menu_selection(
    text: &str,
    sender_id: u64,
    dialogue: &SessionDialogue,
    menu: &MenuConfig,
    language_code: Option<&str>,
) -> Result<Vec<Reply>> {
    match resolve(text, menu) {
        Action::MainMenu => {
            debug!(user_id = sender_id, "Back to main menu");
            show_main_menu(dialogue, t_lang("main-menu-prompt", language_code)).await
        }
        Action::Entry(entry) => {
            debug!(user_id = sender_id, label = %entry.label, "Menu entry selected");
            dialogue
                .update(SessionState::Verified {
                    view: MenuView::Section {
                        label: entry.label.clone(),
                    },
                })
                .await?;
            Ok(vec![
                Reply::text(entry.reply.clone()).with_link(entry.link.clone()),
                Reply::text(t_args_lang(
                    "back-prompt",
                    &[("back", menu.back_label.as_str())],
                    language_code,
                ))
                .with_keyboard(Keyboard::BackOnly),
            ])
        }
        Action::Fallback => {
            debug!(user_id = sender_id, "Unrecognized menu label");
            show_main_menu(dialogue, t_lang("menu-fallback", language_code)).await
        }
    }
}

/// Return a verified session to the main view and redraw the main menu
async fn show_main_menu(dialogue: &SessionDialogue, text: String) -> Result<Vec<Reply>> {
    gatekeeper::mark_verified(dialogue).await?;
    Ok(vec![main_menu(text)])
}
