//! Conversation State Machine
//!
//! Tracks, per chat, whether the bot is waiting for a menu choice or for task
//! input, and drives each inbound message through the matching step.

mod engine;
mod session;

pub use engine::{
    Conversation, Inbound, Outbox, Reply, CANCELLED, GREETING, HELP, SEARCHING, UNKNOWN_CHOICE,
    WHAT_NEXT,
};
pub use session::{ChatKey, SessionState, SessionStore};
