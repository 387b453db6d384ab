use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::payment::{Receipt, ReceiptItem};
use crate::models::{CorrelationToken, CreatedPayment, PaymentRequest, Product, UserId};
use crate::payment::PaymentAdapter;
use crate::store::PaymentLedger;
use crate::validation::Contact;

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Where the gateway sends the buyer after paying.
    pub return_url: String,
    /// Attach a fiscal receipt block with the buyer contact.
    pub receipts: bool,
}

/// Turns a product selection into a gateway payment.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn PaymentAdapter>,
    ledger: PaymentLedger,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(
        gateway: Arc<dyn PaymentAdapter>,
        ledger: PaymentLedger,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            gateway,
            ledger,
            settings,
        }
    }

    pub fn build_request(
        &self,
        token: &CorrelationToken,
        product: &Product,
        contact: &Contact,
    ) -> PaymentRequest {
        let receipt = self.settings.receipts.then(|| Receipt {
            customer: contact.clone(),
            items: vec![ReceiptItem {
                description: product.name.clone(),
                quantity: 1,
                amount: product.price,
                currency: product.currency.clone(),
            }],
        });

        PaymentRequest {
            idempotency_key: Uuid::new_v4(),
            amount: product.price,
            currency: product.currency.clone(),
            return_url: self.settings.return_url.clone(),
            description: token.description(),
            metadata: token.metadata(),
            receipt,
        }
    }

    /// Submit one payment attempt. The token is registered for callback
    /// lookup only when the gateway accepted the request.
    pub async fn create(
        &self,
        user_id: UserId,
        product: &Product,
        contact: &Contact,
    ) -> Result<(CorrelationToken, CreatedPayment), GatewayError> {
        let token = CorrelationToken::new(user_id, &product.id);
        let request = self.build_request(&token, product, contact);
        info!(
            user_id,
            product_id = %product.id,
            gateway = self.gateway.name(),
            "Creating payment"
        );

        match self.gateway.create_payment(&request).await {
            Ok(payment) => {
                info!(user_id, payment_id = %payment.id, "Payment created");
                self.ledger.register(token.clone()).await;
                Ok((token, payment))
            }
            Err(e) => {
                warn!(user_id, product_id = %product.id, "Payment creation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Stop resolving callbacks through a token whose checkout was dropped.
    pub async fn forget(&self, nonce: &Uuid) {
        if self.ledger.forget(nonce).await {
            debug!(%nonce, "Checkout token released");
        }
    }
}
