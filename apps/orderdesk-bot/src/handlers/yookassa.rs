use axum::{body::Bytes, extract::State};
use orderdesk_core::services::CallbackOutcome;
use tracing::{error, info};

use crate::AppState;

/// Gateway notifications. Acknowledged with `200 ok` whatever happens.
pub async fn yookassa_webhook(State(state): State<AppState>, body: Bytes) -> &'static str {
    match state.payments.handle_raw(&body).await {
        outcome @ (CallbackOutcome::Delivered { .. }
        | CallbackOutcome::DeliveredDegraded { .. }) => {
            info!(?outcome, "Payment notification processed");
        }
        CallbackOutcome::Ignored | CallbackOutcome::AlreadySettled => {}
        outcome => error!(?outcome, "Payment notification not delivered"),
    }
    "ok"
}
