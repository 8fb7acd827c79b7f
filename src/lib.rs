//! Math Tutor Bot
//!
//! A Telegram front-end that walks each chat through a small menu of school
//! math tasks, turns the user's input into an instruction for the DeepSeek
//! chat API and relays the answer back in message-sized pieces.

pub mod brain;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod telegram;
pub mod tutor;
pub mod utils;

#[cfg(test)]
mod tests;

/// Crate version, reported in startup logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
