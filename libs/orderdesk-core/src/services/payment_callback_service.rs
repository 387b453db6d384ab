use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::CorrelationError;
use crate::messenger::Messenger;
use crate::models::{
    Artifact, Catalog, CorrelationToken, Keyboard, OutgoingMessage, PaymentEvent, Session, UserId,
};
use crate::store::{PaymentLedger, SessionStore};
use crate::texts;

/// What happened to one gateway notification. The HTTP layer acknowledges
/// every outcome alike; this is for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Malformed,
    Ignored,
    AlreadySettled,
    Unresolved(CorrelationError),
    UnknownProduct(String),
    Delivered { user_id: UserId, product_id: String },
    /// Paid, but the product file is missing on disk.
    DeliveredDegraded { user_id: UserId, product_id: String },
    DeliveryFailed { user_id: UserId, product_id: String },
}

pub struct PaymentCallbackService {
    catalog: Arc<Catalog>,
    ledger: PaymentLedger,
    sessions: SessionStore,
    messenger: Arc<dyn Messenger>,
}

impl PaymentCallbackService {
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: PaymentLedger,
        sessions: SessionStore,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            sessions,
            messenger,
        }
    }

    pub async fn handle_raw(&self, body: &[u8]) -> CallbackOutcome {
        match serde_json::from_slice::<PaymentEvent>(body) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                warn!("Dropping malformed payment notification: {}", e);
                CallbackOutcome::Malformed
            }
        }
    }

    pub async fn handle(&self, event: PaymentEvent) -> CallbackOutcome {
        let payment = &event.object;
        if !event.is_success() {
            debug!(
                payment_id = %payment.id,
                event = %event.event,
                status = %payment.status,
                "Ignoring payment notification"
            );
            return CallbackOutcome::Ignored;
        }

        if !payment.id.is_empty() && self.ledger.is_settled(&payment.id).await {
            info!(payment_id = %payment.id, "Payment already delivered");
            return CallbackOutcome::AlreadySettled;
        }

        let nonce = CorrelationToken::nonce_from_metadata(&payment.metadata);
        let description = payment.description.as_deref();
        let (user_id, product_id) = match self.resolve(nonce, description).await {
            Ok(found) => found,
            Err(e) => {
                warn!(payment_id = %payment.id, "Dropping unresolvable payment: {}", e);
                return CallbackOutcome::Unresolved(e);
            }
        };

        let Some(product) = self.catalog.get(&product_id) else {
            warn!(
                payment_id = %payment.id,
                user_id,
                product_id = %product_id,
                "Dropping payment for unknown product"
            );
            return CallbackOutcome::UnknownProduct(product_id);
        };

        if !self.ledger.settle(&payment.id, nonce).await {
            info!(payment_id = %payment.id, user_id, "Payment already delivered");
            return CallbackOutcome::AlreadySettled;
        }

        self.sessions
            .remove_if(user_id, |session| is_same_checkout(session, &product_id, nonce))
            .await;

        info!(
            payment_id = %payment.id,
            user_id,
            product_id = %product_id,
            "Payment succeeded, delivering"
        );

        let (sent, degraded) = match &product.artifact {
            Artifact::Link(url) => {
                let message = OutgoingMessage::text(texts::delivery_link(product, url))
                    .with_keyboard(Keyboard::MainMenu);
                (self.messenger.send(user_id, message).await, false)
            }
            Artifact::File(path) => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    let caption = texts::delivery_caption(product);
                    (self.messenger.send_file(user_id, path, &caption).await, false)
                } else {
                    error!(user_id, path = %path.display(), "Product file is missing");
                    let message = OutgoingMessage::text(texts::delivery_file_missing(product))
                        .with_keyboard(Keyboard::MainMenu);
                    (self.messenger.send(user_id, message).await, true)
                }
            }
        };

        match sent {
            Ok(()) if degraded => CallbackOutcome::DeliveredDegraded { user_id, product_id },
            Ok(()) => CallbackOutcome::Delivered { user_id, product_id },
            Err(e) => {
                error!(payment_id = %payment.id, "Failed to deliver purchase: {}", e);
                CallbackOutcome::DeliveryFailed { user_id, product_id }
            }
        }
    }

    /// Ledger lookup by token first, description parsing as fallback.
    async fn resolve(
        &self,
        nonce: Option<Uuid>,
        description: Option<&str>,
    ) -> Result<(UserId, String), CorrelationError> {
        if let Some(nonce) = nonce {
            if let Some(token) = self.ledger.lookup(&nonce).await {
                return Ok((token.user_id, token.product_id));
            }
        }
        let description = description.ok_or(CorrelationError::MissingDescription)?;
        CorrelationToken::parse_description(description)
    }
}

/// A callback carrying a token only clears the checkout holding that token.
fn is_same_checkout(session: &Session, product_id: &str, nonce: Option<Uuid>) -> bool {
    let Session::Checkout(checkout) = session else {
        return false;
    };
    if checkout.product_id != product_id {
        return false;
    }
    match nonce {
        Some(nonce) => checkout.token.as_ref().is_some_and(|t| t.nonce == nonce),
        None => true,
    }
}
