//! mathtutor - Telegram math tutor backed by DeepSeek

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use mathtutor::brain::{self, DeepSeekProvider};
use mathtutor::cli::{Cli, Commands};
use mathtutor::config::Config;
use mathtutor::conversation::Conversation;
use mathtutor::logging::{self, LogOptions};
use mathtutor::telegram::TelegramAgent;
use mathtutor::tutor::{self, TaskChoice};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&LogOptions {
        debug: cli.debug,
        json: cli.json_logs,
        log_dir: cli.log_dir.as_deref(),
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config).await,
        Commands::Ask { task, input } => ask_once(&config, task.into(), &input).await,
        Commands::Prompt { task, input } => {
            let prompt = tutor::build_prompt(task.into(), &input)
                .map_err(|e| anyhow::anyhow!("{}", e.guidance()))?;
            println!("{prompt}");
            Ok(())
        }
    }
}

/// Both credentials are checked before any handler is registered.
async fn run_bot(config: Config) -> anyhow::Result<()> {
    let token = config.telegram_token()?.clone();
    let provider = build_provider(&config)?;

    tracing::info!(
        version = mathtutor::VERSION,
        model = provider.model(),
        "Starting math tutor bot"
    );

    let conversation =
        Conversation::new(Arc::new(provider)).with_chunk_limit(config.bot.chunk_limit);
    tracing::info!("Bot is running. Send /start in Telegram to begin.");
    TelegramAgent::new(&token, Arc::new(conversation), config.bot)
        .start()
        .await
}

async fn ask_once(config: &Config, task: TaskChoice, input: &str) -> anyhow::Result<()> {
    let prompt =
        tutor::build_prompt(task, input).map_err(|e| anyhow::anyhow!("{}", e.guidance()))?;
    let provider = build_provider(config)?;

    let outcome = brain::ask(&provider, &prompt).await;
    let failed = outcome.is_failure();
    let message = outcome.into_message();

    for piece in tutor::chunks(&message, config.bot.chunk_limit) {
        println!("{piece}");
        println!();
    }

    if failed {
        anyhow::bail!("model request failed");
    }
    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<DeepSeekProvider> {
    let settings = &config.deepseek;
    let api_key = config.deepseek_api_key()?;

    let provider = DeepSeekProvider::with_timeout(api_key.expose(), settings.timeout())
        .context("Failed to create DeepSeek client")?
        .with_base_url(settings.base_url.clone())
        .with_model(settings.model.clone())
        .with_temperature(settings.temperature);
    Ok(provider)
}
