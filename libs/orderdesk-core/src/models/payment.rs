use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CorrelationError;
use crate::models::UserId;
use crate::validation::Contact;

pub const METADATA_TOKEN: &str = "order_token";
pub const METADATA_USER: &str = "user_id";
pub const METADATA_PRODUCT: &str = "product_id";

/// Links a checkout to the gateway's later payment notification.
///
/// The token travels with the payment twice: as structured metadata, which
/// is looked up in the ledger, and as the `<user_id>:<product_id>`
/// description, which is only parsed when the ledger has no entry (for
/// example after a restart).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationToken {
    pub user_id: UserId,
    pub product_id: String,
    pub nonce: Uuid,
}

impl CorrelationToken {
    pub fn new(user_id: UserId, product_id: impl Into<String>) -> Self {
        Self {
            user_id,
            product_id: product_id.into(),
            nonce: Uuid::new_v4(),
        }
    }

    pub fn description(&self) -> String {
        format!("{}:{}", self.user_id, self.product_id)
    }

    pub fn metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (METADATA_TOKEN.to_string(), self.nonce.to_string()),
            (METADATA_USER.to_string(), self.user_id.to_string()),
            (METADATA_PRODUCT.to_string(), self.product_id.clone()),
        ])
    }

    pub fn nonce_from_metadata(metadata: &BTreeMap<String, String>) -> Option<Uuid> {
        metadata
            .get(METADATA_TOKEN)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    /// Split a description into user id and product id. Exactly one `:` is
    /// accepted.
    pub fn parse_description(description: &str) -> Result<(UserId, String), CorrelationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(CorrelationError::MissingDescription);
        }
        let mut parts = description.split(':');
        let (Some(user), Some(product), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CorrelationError::Malformed(description.to_string()));
        };
        if product.is_empty() {
            return Err(CorrelationError::Malformed(description.to_string()));
        }
        let user_id = user
            .parse::<UserId>()
            .map_err(|_| CorrelationError::InvalidUser(description.to_string()))?;
        Ok((user_id, product.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptItem {
    pub description: String,
    pub quantity: u32,
    /// Minor units per item.
    pub amount: i64,
    pub currency: String,
}

/// Fiscal receipt data attached to a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub customer: Contact,
    pub items: Vec<ReceiptItem>,
}

/// Provider-neutral payment creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Fresh for every attempt.
    pub idempotency_key: Uuid,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub return_url: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub receipt: Option<Receipt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPayment {
    pub id: String,
    pub confirmation_url: String,
}

/// Payment object inside a gateway notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Asynchronous gateway notification, e.g.
/// `{"type":"notification","event":"payment.succeeded","object":{...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    pub object: PaymentObject,
}

impl PaymentEvent {
    pub const SUCCEEDED_EVENT: &'static str = "payment.succeeded";
    pub const SUCCEEDED_STATUS: &'static str = "succeeded";

    pub fn is_success(&self) -> bool {
        self.event == Self::SUCCEEDED_EVENT && self.object.status == Self::SUCCEEDED_STATUS
    }
}
