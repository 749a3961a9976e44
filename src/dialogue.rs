//! Per-chat state: the last order placed from the menu.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Items offered in the order menu as `(id, label key)`
pub const MENU_ITEMS: &[(&str, &str)] = &[
    ("coffee", "menu-coffee"),
    ("tea", "menu-tea"),
    ("croissant", "menu-croissant"),
];

/// Callback data prefix for order buttons
pub const ORDER_CALLBACK_PREFIX: &str = "order:";

/// Represents what the bot remembers about a chat
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    #[default]
    NoOrder,
    Ordered {
        item_id: String,
    },
}

impl ChatState {
    /// The id of the last ordered item, if any
    pub fn last_order(&self) -> Option<&str> {
        match self {
            ChatState::NoOrder => None,
            ChatState::Ordered { item_id } => Some(item_id),
        }
    }
}

/// Type alias for our chat dialogue
pub type ChatDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;

/// Label key of a menu item
pub fn menu_item_label_key(item_id: &str) -> Option<&'static str> {
    MENU_ITEMS
        .iter()
        .find(|(id, _)| *id == item_id)
        .map(|(_, key)| *key)
}

/// Parses `order:<id>` callback data into a known item id
pub fn parse_order_callback(data: &str) -> Option<&str> {
    let item_id = data.strip_prefix(ORDER_CALLBACK_PREFIX)?;
    menu_item_label_key(item_id).map(|_| item_id)
}
