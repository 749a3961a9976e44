use anyhow::Result;
use teloxide::dispatching::dialogue::{InMemStorage, Storage};
use teloxide::types::ChatId;

use replybot::dialogue::{parse_order_callback, ChatState, MENU_ITEMS, ORDER_CALLBACK_PREFIX};

/// Orders are remembered per chat and replaced by newer ones
#[tokio::test]
async fn test_last_order_is_kept_per_chat() -> Result<()> {
    let storage = InMemStorage::<ChatState>::new();
    let first_chat = ChatId(1);
    let second_chat = ChatId(2);

    storage
        .clone()
        .update_dialogue(
            first_chat,
            ChatState::Ordered {
                item_id: "coffee".to_string(),
            },
        )
        .await?;
    storage
        .clone()
        .update_dialogue(
            first_chat,
            ChatState::Ordered {
                item_id: "tea".to_string(),
            },
        )
        .await?;

    let first = storage.clone().get_dialogue(first_chat).await?;
    let second = storage.clone().get_dialogue(second_chat).await?;

    assert_eq!(first.as_ref().and_then(ChatState::last_order), Some("tea"));
    assert_eq!(second, None);

    Ok(())
}

/// Test that chat states can be serialized/deserialized with serde_json
#[test]
fn test_chat_state_serialization() -> Result<()> {
    let state = ChatState::Ordered {
        item_id: "croissant".to_string(),
    };

    let json = serde_json::to_string(&state)?;
    let restored: ChatState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);

    Ok(())
}

/// Test default state
#[test]
fn test_default_state_has_no_order() {
    let state = ChatState::default();
    assert!(matches!(state, ChatState::NoOrder));
    assert_eq!(state.last_order(), None);
}

/// Every menu item produces callback data that parses back to it
#[test]
fn test_menu_callbacks_parse() {
    for (id, _) in MENU_ITEMS {
        let data = format!("{ORDER_CALLBACK_PREFIX}{id}");
        assert_eq!(parse_order_callback(&data), Some(*id));
        // Telegram limits callback data to 64 bytes
        assert!(data.len() <= 64);
    }
}
