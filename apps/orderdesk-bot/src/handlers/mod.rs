use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod health;
pub mod telegram;
pub mod yookassa;

pub const TELEGRAM_PATH: &str = "/webhook";
pub const YOOKASSA_PATH: &str = "/yookassa-webhook";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_check))
        .route(TELEGRAM_PATH, post(telegram::telegram_webhook))
        .route(YOOKASSA_PATH, post(yookassa::yookassa_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
