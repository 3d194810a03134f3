//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `gatekeeper`: The contact requirement guarding the menu
//! - `menu_dispatcher`: Maps button labels to menu actions
//! - `dialogue_manager`: Turns inbound events into replies and session transitions
//! - `message_handler`: Converts Telegram messages and sends the replies
//! - `ui_builder`: Creates keyboards

pub mod dialogue_manager;
pub mod gatekeeper;
pub mod menu_dispatcher;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler function for use in main.rs
pub use message_handler::message_handler;

pub use dialogue_manager::{handle_inbound, Inbound, InboundKind, Keyboard, Reply};
pub use menu_dispatcher::{resolve, Action};
