use orderdesk_core::CallbackAction;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{info, warn};

use crate::AppState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let user_id = q.from.id.0 as i64;
    info!(user_id, data = ?q.data, "Received callback");

    // Stop the button spinner before anything slow happens.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id, "Failed to answer callback query: {}", e);
    }

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        warn!(user_id, data = ?q.data, "Unknown callback data");
        return Ok(());
    };

    let conversations = &state.conversations;
    match action {
        CallbackAction::StartOrder => conversations.begin_order(user_id).await,
        CallbackAction::Help => conversations.help(user_id).await,
        CallbackAction::Shop => conversations.show_catalog(user_id).await,
        CallbackAction::Buy(product_id) => conversations.begin_checkout(user_id, &product_id).await,
    }
    Ok(())
}
