use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use echo_pool_bot::bot;
use echo_pool_bot::config::{BotConfig, LogFormat};
use echo_pool_bot::dialogue::SessionState;
use echo_pool_bot::localization::init_localization;
use echo_pool_bot::menu::MenuConfig;
use echo_pool_bot::store::{build_store, ContactStore};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().context("Invalid bot configuration")?;
    init_tracing(config.log_format);

    info!("Starting Echo & Pool Telegram Bot");

    init_localization().context("Failed to load localization resources")?;

    let menu = match &config.menu_path {
        Some(path) => {
            info!(path = %path.display(), "Loading menu table");
            MenuConfig::from_file(path)
                .with_context(|| format!("Failed to load menu table from {}", path.display()))?
        }
        None => MenuConfig::venue_default().context("Built-in menu table is invalid")?,
    };
    info!(venue = %menu.venue, entries = menu.entries.len(), "Menu table ready");

    let store: Arc<dyn ContactStore> = build_store(&config.store).await?;

    let bot = Bot::new(config.telegram_token);

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry().branch(
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<SessionState>, SessionState>()
            .endpoint(bot::message_handler),
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            InMemStorage::<SessionState>::new(),
            store,
            Arc::new(menu)
        ])
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "Ignoring non-message update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
