//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, info};

use crate::dialogue::{parse_order_callback, ChatDialogue, ChatState};

use super::ui_builder::order_item_label;
use super::BotContext;

/// Handle callback queries from inline keyboards
///
/// Every query is answered so the client stops showing a spinner, including
/// queries whose data is not recognized.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: ChatDialogue,
    ctx: Arc<BotContext>,
) -> Result<()> {
    let language_code = q.from.language_code.as_deref();
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id = %q.from.id, data, "Received callback query from user");

    let Some(item_id) = parse_order_callback(data) else {
        debug!(user_id = %q.from.id, data, "Ignoring unknown callback data");
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    dialogue
        .update(ChatState::Ordered {
            item_id: item_id.to_string(),
        })
        .await?;

    let item = order_item_label(&ctx.localization, item_id, language_code);
    let confirmation =
        ctx.localization
            .t_args_lang("order-confirmed", &[("item", item.as_str())], language_code);

    bot.answer_callback_query(q.id.clone())
        .text(confirmation.clone())
        .await?;

    if let Some(message) = &q.message {
        bot.send_message(message.chat().id, confirmation).await?;
    }

    info!(user_id = %q.from.id, item_id, "Order recorded");
    Ok(())
}
