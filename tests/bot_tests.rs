use replybot::bot::ui_builder::{
    create_main_keyboard, create_order_menu_keyboard, create_web_app_keyboard,
    fit_message_length, format_help_message, format_welcome_message, order_item_label,
    TELEGRAM_MESSAGE_LIMIT,
};
use replybot::bot::{route_text, BotContext, Route};
use replybot::config::{BotSettings, Config, InferenceConfig};
use replybot::dialogue::MENU_ITEMS;
use replybot::localization::LocalizationManager;
use reqwest::Url;
use teloxide::types::{InlineKeyboardButtonKind, KeyboardButton};

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new("ru").expect("Failed to create localization manager")
    }

    fn test_config() -> Config {
        Config {
            telegram_token: "123:test".to_string(),
            inference: InferenceConfig::default(),
            bot: BotSettings::default(),
        }
    }

    /// Test welcome message greets the user and escapes MarkdownV2
    #[test]
    fn test_welcome_message_formatting() {
        let loc = setup_localization();

        let message = format_welcome_message(&loc, Some("Анна"), Some("ru"));
        assert!(message.starts_with('*'));
        assert!(message.contains("Привет, Анна\\!"));

        let message = format_welcome_message(&loc, Some("snake_case"), Some("en"));
        assert!(message.contains("snake\\_case"));
    }

    /// Test welcome message without a first name uses the default
    #[test]
    fn test_welcome_message_default_name() {
        let loc = setup_localization();

        let message = format_welcome_message(&loc, None, Some("en"));
        assert!(message.contains("Hi, friend"));
    }

    /// Test help lists every command
    #[test]
    fn test_help_message_lists_commands() {
        let loc = setup_localization();

        let help = format_help_message(&loc, None);
        for command in ["/start", "/help", "/menu", "/order"] {
            assert!(help.contains(command), "help is missing {command}");
        }
    }

    /// Test the reply keyboard labels route back to their actions
    #[test]
    fn test_reply_keyboard_labels_are_routed() {
        let loc = setup_localization();

        for language in [Some("ru"), Some("en")] {
            let keyboard = create_main_keyboard(&loc, language);
            let labels: Vec<&KeyboardButton> = keyboard.keyboard.iter().flatten().collect();
            assert_eq!(labels.len(), 3);

            let routes: Vec<Route> = labels
                .iter()
                .map(|button| route_text(&button.text, "test_bot", &loc, language))
                .collect();
            assert_eq!(routes, vec![Route::Menu, Route::LastOrder, Route::Help]);
        }
    }

    /// Labels in the default language work for users with another language
    #[test]
    fn test_default_language_labels_are_routed() {
        let loc = setup_localization();

        let russian_menu = loc.t_lang("keyboard-menu", Some("ru"));
        assert_eq!(route_text(&russian_menu, "test_bot", &loc, Some("en")), Route::Menu);
    }

    /// Test order menu has one callback button per item
    #[test]
    fn test_order_menu_keyboard() {
        let loc = setup_localization();

        let keyboard = create_order_menu_keyboard(&loc, Some("en"));
        assert_eq!(keyboard.inline_keyboard.len(), MENU_ITEMS.len());

        let first = &keyboard.inline_keyboard[0][0];
        assert_eq!(first.text, "☕ Coffee");
        match &first.kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "order:coffee"),
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    /// Test web app keyboard points at the configured URL
    #[test]
    fn test_web_app_keyboard() {
        let loc = setup_localization();
        let url = Url::parse("https://example.com/app").unwrap();

        let keyboard = create_web_app_keyboard(&loc, &url, None);
        let button = &keyboard.inline_keyboard[0][0];
        assert_eq!(button.text, "Открыть приложение");
        match &button.kind {
            InlineKeyboardButtonKind::WebApp(info) => assert_eq!(info.url, url),
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    /// Test order labels fall back to the raw id
    #[test]
    fn test_order_item_label() {
        let loc = setup_localization();

        assert_eq!(order_item_label(&loc, "tea", Some("en")), "🍵 Tea");
        assert_eq!(order_item_label(&loc, "pizza", Some("en")), "pizza");
    }

    /// Test long replies are cut to one Telegram message
    #[test]
    fn test_long_reply_fits_message_limit() {
        let fitted = fit_message_length(&"a".repeat(5000));
        assert_eq!(fitted.encode_utf16().count(), TELEGRAM_MESSAGE_LIMIT);
        assert!(fitted.ends_with('…'));
        assert!(fitted.starts_with("aaaa"));

        // Emoji take two UTF-16 units each
        let fitted = fit_message_length(&"🙂".repeat(3000));
        assert!(fitted.encode_utf16().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(fitted.ends_with('…'));
    }

    /// Test replies within the limit are sent unchanged
    #[test]
    fn test_short_reply_is_unchanged() {
        assert_eq!(fit_message_length("Привет!"), "Привет!");

        let exact = "я".repeat(TELEGRAM_MESSAGE_LIMIT);
        assert_eq!(fit_message_length(&exact), exact);
    }

    /// Test the handler context builds from default configuration
    #[test]
    fn test_bot_context_from_config() {
        let ctx = BotContext::new(&test_config()).expect("context should build");

        assert!(!ctx.resolver.is_configured());
        assert_eq!(ctx.localization.default_language(), "ru");
        assert!(ctx.settings.web_app_url.is_none());
    }

    /// Test an unsupported bot language is rejected at startup
    #[test]
    fn test_bot_context_rejects_unknown_language() {
        let mut config = test_config();
        config.bot.language = "xx".to_string();

        assert!(BotContext::new(&config).is_err());
    }

    /// Test the not-configured reply comes straight from the catalog
    #[tokio::test]
    async fn test_unconfigured_resolver_reply() {
        let ctx = BotContext::new(&test_config()).unwrap();

        let reply = ctx.resolver.resolve("привет").await;
        assert_eq!(reply, ctx.resolver.replies().not_configured(None));

        let reply = ctx.resolver.resolve_in("привет", Some("en")).await;
        assert_eq!(reply, ctx.resolver.replies().not_configured(Some("en")));
        assert!(reply.contains("AI is not configured"));
    }
}
