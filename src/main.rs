use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use celiac_bot::bot::{message_handler, BotContext};
use celiac_bot::config::BotConfig;
use celiac_bot::dialogue::BotDialogueState;
use celiac_bot::localization::init_localization;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG and LOG_FORMAT can come from it
    dotenv::dotenv().ok();
    init_tracing();

    info!("Starting Celiac Telegram Bot");

    let config = BotConfig::from_env()?;
    info!(
        keywords = config.vocabulary.len(),
        ocr_languages = %config.ocr.languages,
        "Configuration loaded"
    );

    init_localization()?;

    let context = Arc::new(BotContext::from_config(&config));
    let bot = Bot::new(config.bot_token);

    let handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<BotDialogueState>, BotDialogueState>()
        .endpoint(message_handler);

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<BotDialogueState>::new(), context])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
