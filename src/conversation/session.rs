//! Per-chat session records.
//!
//! A chat gets a record on first contact. Records are dropped once idle for
//! longer than the configured TTL; a background sweeper does this on a timer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::tutor::TaskChoice;

/// Identity of one conversation, the Telegram chat id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatKey(pub i64);

impl std::fmt::Display for ChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a chat is in the menu walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    AwaitingChoice,
    AwaitingInput {
        task: TaskChoice,
    },
}

impl SessionState {
    /// The selected task; only present while waiting for input.
    pub fn selected_task(&self) -> Option<TaskChoice> {
        match self {
            SessionState::AwaitingChoice => None,
            SessionState::AwaitingInput { task } => Some(*task),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    state: SessionState,
    last_seen: DateTime<Utc>,
}

/// In-memory map from chat to session record.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<ChatKey, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity for `chat` and return its state before this event.
    ///
    /// Returns `None` when the chat had no record; one is created in
    /// `AwaitingChoice`.
    pub async fn touch(&self, chat: ChatKey) -> Option<SessionState> {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(&chat) {
            Some(entry) => {
                entry.last_seen = now;
                Some(entry.state)
            }
            None => {
                sessions.insert(
                    chat,
                    SessionEntry {
                        state: SessionState::AwaitingChoice,
                        last_seen: now,
                    },
                );
                tracing::debug!(%chat, "Session created");
                None
            }
        }
    }

    /// Overwrite the state for `chat`, creating the record if needed.
    pub async fn set(&self, chat: ChatKey, state: SessionState) {
        let mut sessions = self.inner.write().await;
        sessions.insert(
            chat,
            SessionEntry {
                state,
                last_seen: Utc::now(),
            },
        );
    }

    /// Back to the menu.
    pub async fn reset(&self, chat: ChatKey) {
        self.set(chat, SessionState::AwaitingChoice).await;
    }

    /// Current state, if the chat has a record.
    pub async fn get(&self, chat: ChatKey) -> Option<SessionState> {
        self.inner.read().await.get(&chat).map(|e| e.state)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop records idle for longer than `ttl`. Returns how many were removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(Utc::now(), ttl).await
    }

    async fn evict_idle_at(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let ttl =
            chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.signed_duration_since(entry.last_seen) <= ttl);
        before - sessions.len()
    }

    /// Spawn a task that evicts idle sessions every `every`.
    pub fn spawn_sweeper(&self, every: Duration, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    tracing::info!(evicted, remaining, "Evicted idle sessions");
                }
            }
        })
    }
}
