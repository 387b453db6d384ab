use axum::{body::Bytes, extract::State, http::HeaderMap};
use teloxide::types::Update;
use tracing::{error, warn};

use crate::bot::route_update;
use crate::AppState;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram pushes updates here. The answer is always `200 ok` so Telegram
/// never retries; failures only show up in the logs.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> &'static str {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            warn!("Dropping Telegram update with a wrong secret token");
            return "ok";
        }
    }

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => route_update(state.bot.clone(), update, state).await,
        Err(e) => error!("Failed to parse Telegram update: {}", e),
    }
    "ok"
}
