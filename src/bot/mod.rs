//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Routes commands, keyboard labels and free text
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::config::{BotSettings, Config};
use crate::dialogue::ChatState;
use crate::localization::LocalizationManager;
use crate::resolver::{AiResolver, ReplyCatalog};

// Re-export main handler functions
pub use callback_handler::callback_handler;
pub use message_handler::{message_handler, route_text, Command, Route};

/// Read-only state shared by all handlers
pub struct BotContext {
    pub resolver: AiResolver,
    pub localization: Arc<LocalizationManager>,
    pub settings: BotSettings,
}

impl BotContext {
    /// Build the handler context from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let localization = Arc::new(LocalizationManager::new(&config.bot.language)?);
        let replies = ReplyCatalog::new(Arc::clone(&localization), &config.bot.language);
        let resolver = AiResolver::new(&config.inference, replies)?;

        Ok(Self {
            resolver,
            localization,
            settings: config.bot.clone(),
        })
    }
}

/// Update routing tree: messages and callback queries, both with chat state
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .enter_dialogue::<Update, InMemStorage<ChatState>, ChatState>()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

/// Run the bot with long polling until interrupted
pub async fn run(config: Config) -> Result<()> {
    let ctx = Arc::new(BotContext::new(&config)?);
    if !ctx.resolver.is_configured() {
        error!("HF_API_TOKEN is not set, AI replies are disabled");
    }

    let bot = Bot::new(config.telegram_token);

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<ChatState>::new(), ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}
