use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "bot running",
        "version": env!("CARGO_PKG_VERSION"),
        "store_enabled": state.conversations.store_enabled()
    }))
}
