use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{CreatedPayment, PaymentRequest};

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Create a payment and return the page the buyer is redirected to.
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError>;

    /// Get the adapter name
    fn name(&self) -> &str;
}
