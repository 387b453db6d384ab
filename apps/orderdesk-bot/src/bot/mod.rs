use teloxide::{dptree, prelude::*, types::{Update, UpdateKind}};
use tracing::{debug, error, info};

use crate::AppState;

pub mod handlers;
pub mod keyboards;

/// Long-polling mode, used when no public webhook URL is configured.
pub async fn run_bot(
    bot: Bot,
    mut shutdown_signal: tokio::sync::broadcast::Receiver<()>,
    state: AppState,
) {
    info!("Starting long-polling dispatcher...");

    let message_handler = Update::filter_message().endpoint(handlers::command::message_handler);
    let callback_handler =
        Update::filter_callback_query().endpoint(handlers::callback::callback_handler);

    let mut dispatcher = Dispatcher::builder(
        bot,
        dptree::entry()
            .branch(message_handler)
            .branch(callback_handler),
    )
    .dependencies(dptree::deps![state])
    .default_handler(|upd: std::sync::Arc<Update>| async move {
        debug!("Unhandled update: {:?}", upd.kind);
    })
    .build();

    tokio::select! {
        _ = dispatcher.dispatch() => {
            info!("Bot dispatcher exited naturally");
        }
        _ = shutdown_signal.recv() => {
            info!("Bot received shutdown signal, stopping...");
        }
    }
}

/// Webhook mode: route one update to the same handlers the dispatcher uses.
pub async fn route_update(bot: Bot, update: Update, state: AppState) {
    let update_id = update.id.0;
    let result = match update.kind {
        UpdateKind::Message(msg) => handlers::command::message_handler(bot, msg, state).await,
        UpdateKind::CallbackQuery(q) => handlers::callback::callback_handler(bot, q, state).await,
        other => {
            debug!(update_id, "Ignoring update: {:?}", other);
            Ok(())
        }
    };
    if let Err(e) = result {
        error!(update_id, "Failed to handle update: {}", e);
    }
}
