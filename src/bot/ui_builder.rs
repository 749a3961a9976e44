//! UI Builder module for creating keyboards and formatting messages

use reqwest::Url;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, WebAppInfo,
};
use teloxide::utils::markdown;

use crate::dialogue::{menu_item_label_key, MENU_ITEMS, ORDER_CALLBACK_PREFIX};
use crate::localization::LocalizationManager;

/// Reply keyboard label keys, one button per row
pub const REPLY_KEYBOARD_KEYS: &[&str] = &["keyboard-menu", "keyboard-order", "keyboard-help"];

/// Longest text Telegram accepts in one message, in UTF-16 code units
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Shorten `text` to fit a single Telegram message, marking the cut with `…`
pub fn fit_message_length(text: &str) -> String {
    if text.encode_utf16().count() <= TELEGRAM_MESSAGE_LIMIT {
        return text.to_string();
    }

    let budget = TELEGRAM_MESSAGE_LIMIT - '…'.len_utf16();
    let mut used = 0;
    let mut fitted: String = text
        .chars()
        .take_while(|ch| {
            used += ch.len_utf16();
            used <= budget
        })
        .collect();
    fitted.push('…');
    fitted
}

/// Format the `/start` greeting as MarkdownV2
pub fn format_welcome_message(
    localization: &LocalizationManager,
    first_name: Option<&str>,
    language_code: Option<&str>,
) -> String {
    let name = first_name
        .map(str::to_string)
        .unwrap_or_else(|| localization.t_lang("welcome-default-name", language_code));

    let greeting = localization.t_args_lang("welcome-greeting", &[("name", name.as_str())], language_code);

    format!(
        "{}\n\n{}\n\n{}",
        markdown::bold(&markdown::escape(&greeting)),
        markdown::escape(&localization.t_lang("welcome-description", language_code)),
        markdown::italic(&markdown::escape(
            &localization.t_lang("welcome-hint", language_code)
        ))
    )
}

/// Format the command overview sent for `/help` (plain text)
pub fn format_help_message(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> String {
    [
        "help-title",
        "help-start",
        "help-help",
        "help-menu",
        "help-order",
        "help-ask",
    ]
    .iter()
    .map(|key| localization.t_lang(key, language_code))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Inline keyboard with a single Web App button
pub fn create_web_app_keyboard(
    localization: &LocalizationManager,
    url: &Url,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        localization.t_lang("welcome-open-app", language_code),
        WebAppInfo { url: url.clone() },
    )]])
}

/// Persistent reply keyboard with menu, order and help shortcuts
pub fn create_main_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = REPLY_KEYBOARD_KEYS
        .iter()
        .map(|key| vec![KeyboardButton::new(localization.t_lang(key, language_code))])
        .collect();

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Inline keyboard listing the orderable items
pub fn create_order_menu_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = MENU_ITEMS
        .iter()
        .map(|(id, key)| {
            vec![InlineKeyboardButton::callback(
                localization.t_lang(key, language_code),
                format!("{ORDER_CALLBACK_PREFIX}{id}"),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(buttons)
}

/// Display label of a menu item; unknown ids are shown as-is
pub fn order_item_label(
    localization: &LocalizationManager,
    item_id: &str,
    language_code: Option<&str>,
) -> String {
    match menu_item_label_key(item_id) {
        Some(key) => localization.t_lang(key, language_code),
        None => item_id.to_string(),
    }
}
