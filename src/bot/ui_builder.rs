//! UI Builder module for creating keyboards

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    ReplyMarkup,
};

// Import localization
use crate::localization::t_lang;

use crate::menu::{MenuConfig, MenuLink};

use super::dialogue_manager::{Keyboard, Reply};

/// Main menu: every configured label, `columns` buttons per row
pub fn create_main_menu_keyboard(menu: &MenuConfig) -> KeyboardMarkup {
    let rows = menu
        .rows()
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect::<Vec<Vec<KeyboardButton>>>();

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// A single back button
pub fn create_back_keyboard(menu: &MenuConfig) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(menu.back_label.clone())]]).resize_keyboard()
}

/// A single button asking Telegram to share the user's own phone number
pub fn create_contact_request_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    let button =
        KeyboardButton::new(t_lang("contact-button", language_code)).request(ButtonRequest::Contact);
    KeyboardMarkup::new(vec![vec![button]])
        .resize_keyboard()
        .one_time_keyboard()
}

/// Inline keyboard holding one external link
pub fn create_link_keyboard(link: &MenuLink) -> Result<InlineKeyboardMarkup> {
    let url = Url::parse(&link.url).with_context(|| format!("Invalid menu link: {}", link.url))?;
    Ok(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        link.caption.clone(),
        url,
    )]]))
}

/// Markup attached to a reply, if any
pub fn reply_markup(
    reply: &Reply,
    menu: &MenuConfig,
    language_code: Option<&str>,
) -> Result<Option<ReplyMarkup>> {
    if let Some(link) = &reply.link {
        return Ok(Some(create_link_keyboard(link)?.into()));
    }

    let markup: ReplyMarkup = match reply.keyboard {
        Some(Keyboard::MainMenu) => create_main_menu_keyboard(menu).into(),
        Some(Keyboard::BackOnly) => create_back_keyboard(menu).into(),
        Some(Keyboard::ContactRequest) => create_contact_request_keyboard(language_code).into(),
        None => return Ok(None),
    };
    Ok(Some(markup))
}
