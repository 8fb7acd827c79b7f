//! The menu → input → answer walk.
//!
//! [`Conversation::handle`] takes one inbound event for one chat, updates the
//! chat's [`SessionState`] and pushes replies into an [`Outbox`]. The
//! transport decides how each [`Reply`] is rendered.

use std::sync::Arc;

use async_trait::async_trait;

use super::session::{ChatKey, SessionState, SessionStore};
use crate::brain::{self, ModelOutcome, Provider};
use crate::tutor::{self, TaskChoice, DEFAULT_CHUNK_LIMIT};
use crate::utils::truncate_str;

pub const GREETING: &str = "Привет! Выбери действие:";
pub const UNKNOWN_CHOICE: &str = "Не понял выбор. Попробуй ещё раз.";
pub const SEARCHING: &str = "Ищу решение... (запрос к нейросети)";
pub const WHAT_NEXT: &str = "Что ещё хотите сделать?";
pub const CANCELLED: &str = "Разговор завершён. Напишите любое сообщение, чтобы начать заново.";
pub const HELP: &str = "Выберите задачу в меню и отправьте данные для неё.\n\n\
                        /start — показать меню\n\
                        /cancel — прервать текущую задачу\n\
                        /help — эта справка";

/// What arrived from the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    Start,
    Cancel,
    Help,
    Text(&'a str),
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text, keyboard untouched.
    Text(String),
    /// Text with the task menu attached.
    Menu(String),
    /// Status notice sent right before the model call.
    Working(String),
    /// One piece of the model's answer.
    AnswerChunk(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(t) | Reply::Menu(t) | Reply::Working(t) | Reply::AnswerChunk(t) => t,
        }
    }
}

/// Sink for replies to a single chat, in order.
#[async_trait]
pub trait Outbox: Send + Sync {
    type Error: Send;

    async fn deliver(&self, reply: Reply) -> Result<(), Self::Error>;
}

/// Conversation engine shared by every chat.
pub struct Conversation {
    sessions: SessionStore,
    provider: Arc<dyn Provider>,
    chunk_limit: usize,
}

impl Conversation {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            sessions: SessionStore::new(),
            provider,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }

    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.max(1);
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one event for `chat`.
    ///
    /// Only transport errors are returned; bad input and model failures are
    /// answered in the chat.
    pub async fn handle<O: Outbox>(
        &self,
        chat: ChatKey,
        inbound: Inbound<'_>,
        out: &O,
    ) -> Result<(), O::Error> {
        match inbound {
            Inbound::Start => {
                self.sessions.reset(chat).await;
                out.deliver(Reply::Menu(GREETING.to_string())).await
            }
            Inbound::Cancel => {
                let previous = self.sessions.get(chat).await;
                self.sessions.reset(chat).await;
                tracing::info!(%chat, ?previous, "Conversation cancelled");
                out.deliver(Reply::Menu(CANCELLED.to_string())).await
            }
            Inbound::Help => out.deliver(Reply::Text(HELP.to_string())).await,
            Inbound::Text(text) => match self.sessions.touch(chat).await {
                None => self.first_contact(chat, text, out).await,
                Some(SessionState::AwaitingChoice) => self.choose(chat, text, out).await,
                Some(SessionState::AwaitingInput { task }) => {
                    self.solve(chat, task, text, out).await
                }
            },
        }
    }

    /// A chat with no record: a menu label is taken as a choice, anything
    /// else gets the greeting.
    async fn first_contact<O: Outbox>(
        &self,
        chat: ChatKey,
        text: &str,
        out: &O,
    ) -> Result<(), O::Error> {
        if TaskChoice::from_label(text).is_some() {
            return self.choose(chat, text, out).await;
        }
        out.deliver(Reply::Menu(GREETING.to_string())).await
    }

    async fn choose<O: Outbox>(&self, chat: ChatKey, text: &str, out: &O) -> Result<(), O::Error> {
        let Some(task) = TaskChoice::from_label(text) else {
            tracing::debug!(%chat, "Unrecognized menu choice");
            return out.deliver(Reply::Menu(UNKNOWN_CHOICE.to_string())).await;
        };

        self.sessions.set(chat, SessionState::AwaitingInput { task }).await;
        tracing::info!(%chat, task = task.slug(), "Task selected");
        out.deliver(Reply::Text(task.input_prompt().to_string())).await
    }

    async fn solve<O: Outbox>(
        &self,
        chat: ChatKey,
        task: TaskChoice,
        text: &str,
        out: &O,
    ) -> Result<(), O::Error> {
        tracing::debug!(%chat, task = task.slug(), input = %truncate_str(text, 80), "Task input");
        let prompt = match tutor::build_prompt(task, text) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::debug!(%chat, task = task.slug(), error = %e, "Rejected task input");
                return out.deliver(Reply::Text(e.guidance().to_string())).await;
            }
        };

        out.deliver(Reply::Working(SEARCHING.to_string())).await?;

        let message = match brain::ask(self.provider.as_ref(), &prompt).await {
            ModelOutcome::Answer(answer) => answer,
            failure @ ModelOutcome::Failure { .. } => {
                tracing::warn!(%chat, task = task.slug(), "Delivering model failure to chat");
                failure.into_message()
            }
        };

        // Back to the menu before delivery so a send failure can't strand the chat.
        self.sessions.reset(chat).await;

        for piece in tutor::chunks(&message, self.chunk_limit) {
            out.deliver(Reply::AnswerChunk(piece.to_string())).await?;
        }
        out.deliver(Reply::Menu(WHAT_NEXT.to_string())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::provider::MockProvider;
    use crate::tests::Recorder;

    fn idle_conversation() -> Conversation {
        let mut provider = MockProvider::new();
        provider.expect_complete().never();
        Conversation::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_start_greets_with_menu() {
        let conv = idle_conversation();
        let out = Recorder::default();
        let chat = ChatKey(1);

        conv.handle(chat, Inbound::Start, &out).await.expect("infallible");

        assert_eq!(out.take(), vec![Reply::Menu(GREETING.to_string())]);
        assert_eq!(conv.sessions().get(chat).await, Some(SessionState::AwaitingChoice));
    }

    #[tokio::test]
    async fn test_first_free_text_greets() {
        let conv = idle_conversation();
        let out = Recorder::default();
        let chat = ChatKey(1);

        conv.handle(chat, Inbound::Text("привет"), &out).await.expect("infallible");

        assert_eq!(out.take(), vec![Reply::Menu(GREETING.to_string())]);
        assert_eq!(conv.sessions().get(chat).await, Some(SessionState::AwaitingChoice));
    }

    #[tokio::test]
    async fn test_first_contact_with_label_selects_task() {
        let conv = idle_conversation();
        let out = Recorder::default();
        let chat = ChatKey(1);

        conv.handle(chat, Inbound::Text("Своя задача"), &out).await.expect("infallible");

        assert_eq!(
            out.take(),
            vec![Reply::Text(TaskChoice::FreeForm.input_prompt().to_string())]
        );
        assert_eq!(
            conv.sessions().get(chat).await,
            Some(SessionState::AwaitingInput {
                task: TaskChoice::FreeForm
            })
        );
    }

    #[tokio::test]
    async fn test_help_leaves_state_alone() {
        let conv = idle_conversation();
        let out = Recorder::default();
        let chat = ChatKey(3);
        conv.sessions()
            .set(
                chat,
                SessionState::AwaitingInput {
                    task: TaskChoice::Percentage,
                },
            )
            .await;

        conv.handle(chat, Inbound::Help, &out).await.expect("infallible");

        assert_eq!(out.take(), vec![Reply::Text(HELP.to_string())]);
        assert_eq!(
            conv.sessions().get(chat).await.and_then(|s| s.selected_task()),
            Some(TaskChoice::Percentage)
        );
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(Reply::AnswerChunk("abc".into()).text(), "abc");
        assert_eq!(Reply::Menu("m".into()).text(), "m");
    }
}
