//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, Me, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

use crate::dialogue::ChatDialogue;
use crate::localization::LocalizationManager;

use super::ui_builder::{
    create_main_keyboard, create_order_menu_keyboard, create_web_app_keyboard,
    fit_message_length, format_help_message, format_welcome_message, order_item_label,
};
use super::BotContext;

/// Commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Greeting and app button
    Start,
    /// Command overview
    Help,
    /// Order menu
    Menu,
    /// Last order
    Order,
}

/// What to do with an incoming text
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Start,
    Help,
    Menu,
    LastOrder,
    Ask,
}

/// Decide how to answer `text`
///
/// Commands win over reply keyboard labels; unknown slash commands get the
/// help text; anything else goes to the AI resolver.
pub fn route_text(
    text: &str,
    bot_username: &str,
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Route {
    if let Ok(command) = Command::parse(text, bot_username) {
        return match command {
            Command::Start => Route::Start,
            Command::Help => Route::Help,
            Command::Menu => Route::Menu,
            Command::Order => Route::LastOrder,
        };
    }

    if text.starts_with('/') {
        return Route::Help;
    }

    let trimmed = text.trim();
    let languages = [
        localization.resolve_language(language_code),
        localization.default_language(),
    ];
    let is_label = |key: &str| {
        languages
            .iter()
            .any(|language| localization.get_message_in_language(key, language, None) == trimmed)
    };

    if is_label("keyboard-menu") {
        Route::Menu
    } else if is_label("keyboard-order") {
        Route::LastOrder
    } else if is_label("keyboard-help") {
        Route::Help
    } else {
        Route::Ask
    }
}

/// Entry point for all message updates
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    me: Me,
    dialogue: ChatDialogue,
    ctx: Arc<BotContext>,
) -> Result<()> {
    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Ignoring non-text message");
        bot.send_message(
            msg.chat.id,
            ctx.localization.t_lang("non-text-hint", language_code),
        )
        .await?;
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    match route_text(text, me.username(), &ctx.localization, language_code) {
        Route::Start => handle_start(&bot, &msg, &ctx, language_code).await?,
        Route::Help => handle_help(&bot, msg.chat.id, &ctx, language_code).await?,
        Route::Menu => {
            bot.send_message(msg.chat.id, ctx.localization.t_lang("menu-title", language_code))
                .reply_markup(create_order_menu_keyboard(&ctx.localization, language_code))
                .await?;
        }
        Route::LastOrder => {
            let state = dialogue.get_or_default().await?;
            let reply = match state.last_order() {
                Some(item_id) => {
                    let item = order_item_label(&ctx.localization, item_id, language_code);
                    ctx.localization
                        .t_args_lang("order-last", &[("item", item.as_str())], language_code)
                }
                None => ctx.localization.t_lang("order-none", language_code),
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
        Route::Ask => handle_ai_request(&bot, msg.chat.id, text, &ctx, language_code).await?,
    }

    Ok(())
}

async fn handle_start(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    language_code: Option<&str>,
) -> Result<()> {
    let first_name = msg.from.as_ref().map(|user| user.first_name.as_str());
    let welcome = format_welcome_message(&ctx.localization, first_name, language_code);

    let request = bot
        .send_message(msg.chat.id, welcome)
        .parse_mode(ParseMode::MarkdownV2);
    match &ctx.settings.web_app_url {
        Some(url) => {
            request
                .reply_markup(create_web_app_keyboard(&ctx.localization, url, language_code))
                .await?
        }
        None => request.await?,
    };

    handle_help(bot, msg.chat.id, ctx, language_code).await?;

    info!(user_id = %msg.chat.id, "Sent welcome message");
    Ok(())
}

async fn handle_help(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    language_code: Option<&str>,
) -> Result<()> {
    bot.send_message(chat_id, format_help_message(&ctx.localization, language_code))
        .reply_markup(create_main_keyboard(&ctx.localization, language_code))
        .await?;
    Ok(())
}

async fn handle_ai_request(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    ctx: &BotContext,
    language_code: Option<&str>,
) -> Result<()> {
    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        warn!(user_id = %chat_id, error = %e, "Failed to send typing indicator");
    }

    let reply = ctx.resolver.resolve_in(text, language_code).await;
    bot.send_message(chat_id, fit_message_length(&reply)).await?;

    debug!(user_id = %chat_id, "AI reply sent");
    Ok(())
}
