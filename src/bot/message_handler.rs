//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::{debug, error};

use crate::contact::ContactShare;
use crate::dialogue::SessionDialogue;
use crate::menu::MenuConfig;
use crate::store::ContactStore;

use super::dialogue_manager::{handle_inbound, Inbound, InboundKind, Reply};
use super::ui_builder::reply_markup;

/// Whether a text is the `/start` command, optionally with a payload or bot mention
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|command| command.split('@').next())
        .is_some_and(|command| command == "/start")
}

/// Convert a Telegram message into an inbound event
///
/// Returns `None` for messages without a sender, such as channel posts.
pub fn inbound_from_message(msg: &Message) -> Option<Inbound> {
    let sender: &User = msg.from.as_ref()?;

    let kind = if let Some(contact) = msg.contact() {
        InboundKind::Contact(ContactShare {
            phone_number: contact.phone_number.clone(),
            user_id: contact.user_id.map(|id| id.0),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            username: sender.username.clone(),
        })
    } else if let Some(text) = msg.text() {
        if is_start_command(text) {
            InboundKind::Start
        } else {
            InboundKind::Text(text.to_string())
        }
    } else {
        InboundKind::Other
    };

    Some(Inbound {
        sender_id: sender.id.0,
        language_code: sender.language_code.clone(),
        kind,
    })
}

async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply: &Reply,
    menu: &MenuConfig,
    language_code: Option<&str>,
) -> Result<()> {
    let request = bot.send_message(chat_id, reply.text.clone());
    match reply_markup(reply, menu, language_code)? {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: SessionDialogue,
    store: Arc<dyn ContactStore>,
    menu: Arc<MenuConfig>,
) -> Result<()> {
    let Some(inbound) = inbound_from_message(&msg) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without sender");
        return Ok(());
    };

    let replies = handle_inbound(&inbound, &dialogue, store.as_ref(), &menu).await?;

    for reply in &replies {
        let language_code = inbound.language_code.as_deref();
        if let Err(e) = send_reply(&bot, msg.chat.id, reply, &menu, language_code).await {
            error!(user_id = inbound.sender_id, error = %e, "Failed to send reply");
            return Err(e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_command_detection() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("/start promo-summer"));
        assert!(is_start_command("/start@EchoPoolBot"));
        assert!(!is_start_command("/startle"));
        assert!(!is_start_command("start"));
        assert!(!is_start_command(""));
    }
}
