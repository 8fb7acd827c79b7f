//! Telegram Bot Integration
//!
//! Long-polls Telegram, recognizes `/start`, `/cancel` and `/help`, feeds
//! everything else to the conversation engine and renders its replies with
//! the task keyboard.

mod agent;
mod handler;

pub use agent::{schema, TelegramAgent};
pub use handler::{menu_keyboard, ChatOutbox, Command};
