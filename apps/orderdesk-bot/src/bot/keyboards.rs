use orderdesk_core::{CallbackAction, Keyboard};
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    KeyboardRemove, ReplyMarkup,
};

pub fn main_menu(store_enabled: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![vec![InlineKeyboardButton::callback(
        "🛒 Place order",
        CallbackAction::StartOrder.data(),
    )]];
    if store_enabled {
        rows.push(vec![InlineKeyboardButton::callback(
            "📦 Digital store",
            CallbackAction::Shop.data(),
        )]);
    }
    rows.push(vec![InlineKeyboardButton::callback("❓ Help", CallbackAction::Help.data())]);
    InlineKeyboardMarkup::new(rows)
}

pub fn request_contact() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new("📱 Share phone number").request(ButtonRequest::Contact),
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}

pub fn catalog(buttons: &[(String, String)]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .iter()
            .map(|(label, data)| vec![InlineKeyboardButton::callback(label.clone(), data.clone())]),
    )
}

/// Turn a transport-neutral keyboard into Telegram markup.
pub fn render(keyboard: &Keyboard, store_enabled: bool) -> ReplyMarkup {
    match keyboard {
        Keyboard::MainMenu => main_menu(store_enabled).into(),
        Keyboard::RequestContact => request_contact().into(),
        Keyboard::Remove => KeyboardRemove::new().into(),
        Keyboard::Catalog(buttons) => catalog(buttons).into(),
    }
}
