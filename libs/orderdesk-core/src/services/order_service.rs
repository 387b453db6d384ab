use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::messenger::Messenger;
use crate::models::{CompletedOrder, Keyboard, OutgoingMessage, Sender};
use crate::store::AdminStore;
use crate::texts;
use crate::validation::escape_html;

/// Outcome of fanning one order out to the admin set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Sends completed orders to every administrator.
#[derive(Clone)]
pub struct OrderService {
    admins: Arc<AdminStore>,
    messenger: Arc<dyn Messenger>,
}

impl OrderService {
    pub fn new(admins: Arc<AdminStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self { admins, messenger }
    }

    pub fn format_order(
        sender: &Sender,
        order: &CompletedOrder,
        received_at: DateTime<Utc>,
    ) -> String {
        format!(
            "📬 <b>New order</b>\n\n\
            👤 Customer: {} ({})\n\
            🆔 UserID: <code>{}</code>\n\
            📱 Phone: {}\n\
            📍 Address: {}\n\
            🛍 Items:\n{}\n\n\
            🕒 {}\n\
            ↩ Reply to the customer directly in Telegram (tap the name or number).",
            escape_html(sender.display_name()),
            escape_html(&sender.handle()),
            order.user_id,
            escape_html(&order.phone),
            escape_html(&order.address),
            escape_html(&order.items),
            received_at.format("%Y-%m-%d %H:%M UTC"),
        )
    }

    /// One attempt per admin, no retry. The customer is told how it went.
    pub async fn dispatch(&self, sender: &Sender, order: &CompletedOrder) -> DispatchReport {
        let admins = self.admins.list().await;
        let mut report = DispatchReport {
            attempted: 0,
            failed: 0,
        };

        let reply = if admins.is_empty() {
            warn!(user_id = order.user_id, "Order accepted but the admin set is empty");
            texts::NO_ADMINS
        } else {
            let summary = Self::format_order(sender, order, Utc::now());
            for admin_id in admins {
                report.attempted += 1;
                if let Err(e) = self
                    .messenger
                    .send(admin_id, OutgoingMessage::text(summary.clone()))
                    .await
                {
                    error!(admin_id, user_id = order.user_id, "Failed to deliver order: {}", e);
                    report.failed += 1;
                }
            }
            if report.failed > 0 {
                texts::ORDER_DEGRADED
            } else {
                texts::ORDER_SENT
            }
        };

        info!(
            user_id = order.user_id,
            attempted = report.attempted,
            failed = report.failed,
            "Order dispatched"
        );

        if let Err(e) = self
            .messenger
            .send(
                order.user_id,
                OutgoingMessage::text(reply).with_keyboard(Keyboard::MainMenu),
            )
            .await
        {
            warn!(user_id = order.user_id, "Failed to confirm order to customer: {}", e);
        }

        report
    }
}
