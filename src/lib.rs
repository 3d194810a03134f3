//! # Echo & Pool Telegram Bot
//!
//! A venue bot that asks users to share their contact, records it in an
//! append-only contact ledger and then serves a fixed reply-keyboard menu.

pub mod bot;
pub mod config;
pub mod contact;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod menu;
pub mod sheets;
pub mod store;
