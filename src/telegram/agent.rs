//! Telegram bot runner.

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::handler::{handle_command, handle_text, Command};
use crate::config::{BotConfig, Secret};
use crate::conversation::Conversation;

/// Owns the bot and the conversation engine for the life of the process.
pub struct TelegramAgent {
    bot: Bot,
    conversation: Arc<Conversation>,
    settings: BotConfig,
}

impl TelegramAgent {
    pub fn new(token: &Secret, conversation: Arc<Conversation>, settings: BotConfig) -> Self {
        Self {
            bot: Bot::new(token.expose()),
            conversation,
            settings,
        }
    }

    /// Register commands, start the session sweeper and long-poll until Ctrl-C.
    pub async fn start(self) -> anyhow::Result<()> {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!("Failed to register bot commands: {}", e);
        }

        let sweeper = self
            .conversation
            .sessions()
            .spawn_sweeper(self.settings.sweep_interval(), self.settings.session_ttl());

        tracing::info!(
            chunk_limit = self.settings.chunk_limit,
            session_ttl_secs = self.settings.session_ttl_secs,
            "Telegram bot started, polling for updates"
        );

        Dispatcher::builder(self.bot, schema())
            .dependencies(dptree::deps![self.conversation])
            .default_handler(|upd| async move {
                tracing::debug!("Unhandled update: {:?}", upd.kind);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "Error in Telegram handler",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        sweeper.abort();
        tracing::info!("Telegram bot stopped");
        Ok(())
    }
}

/// Commands first, then plain text.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
}
