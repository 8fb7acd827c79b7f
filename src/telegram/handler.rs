//! Telegram message handlers.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;

use crate::conversation::{ChatKey, Conversation, Inbound, Outbox, Reply};
use crate::tutor::TaskChoice;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Commands recognized in any conversation state.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "показать меню")]
    Start,
    #[command(description = "прервать текущую задачу")]
    Cancel,
    #[command(description = "справка")]
    Help,
}

impl Command {
    fn inbound(&self) -> Inbound<'static> {
        match self {
            Command::Start => Inbound::Start,
            Command::Cancel => Inbound::Cancel,
            Command::Help => Inbound::Help,
        }
    }
}

/// The task menu, one button per row.
pub fn menu_keyboard() -> KeyboardMarkup {
    let rows = TaskChoice::ALL
        .iter()
        .map(|task| vec![KeyboardButton::new(task.label())]);
    KeyboardMarkup::new(rows)
        .resize_keyboard()
        .one_time_keyboard()
}

/// Delivers conversation replies to one Telegram chat.
pub struct ChatOutbox {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatOutbox {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Outbox for ChatOutbox {
    type Error = RequestError;

    async fn deliver(&self, reply: Reply) -> Result<(), RequestError> {
        match reply {
            Reply::Menu(text) => {
                self.bot
                    .send_message(self.chat_id, text)
                    .reply_markup(menu_keyboard())
                    .await?;
            }
            Reply::Working(text) => {
                self.bot.send_message(self.chat_id, text).await?;
                // Shows "typing…" while the model works; cosmetic, so failures are ignored.
                if let Err(e) = self
                    .bot
                    .send_chat_action(self.chat_id, ChatAction::Typing)
                    .await
                {
                    tracing::debug!(chat = %self.chat_id, "Failed to send typing action: {}", e);
                }
            }
            Reply::Text(text) | Reply::AnswerChunk(text) => {
                self.bot.send_message(self.chat_id, text).await?;
            }
        }
        Ok(())
    }
}

/// `/start`, `/cancel`, `/help`.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    conversation: Arc<Conversation>,
) -> HandlerResult {
    tracing::debug!(chat = %msg.chat.id, ?cmd, "Command received");
    let out = ChatOutbox::new(bot, msg.chat.id);
    conversation
        .handle(ChatKey(msg.chat.id.0), cmd.inbound(), &out)
        .await?;
    Ok(())
}

/// Any other text message.
pub async fn handle_text(bot: Bot, msg: Message, conversation: Arc<Conversation>) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Unknown slash commands are not task input.
    if text.starts_with('/') {
        tracing::debug!(chat = %msg.chat.id, command = text, "Ignoring unknown command");
        return Ok(());
    }

    let out = ChatOutbox::new(bot, msg.chat.id);
    conversation
        .handle(ChatKey(msg.chat.id.0), Inbound::Text(text), &out)
        .await?;
    Ok(())
}
