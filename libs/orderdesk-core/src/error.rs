use thiserror::Error;

use crate::models::UserId;

/// A message could not be handed to the chat platform.
#[derive(Debug, Error)]
#[error("delivery to {to} failed: {reason}")]
pub struct DeliveryError {
    pub to: UserId,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(to: UserId, reason: impl Into<String>) -> Self {
        Self {
            to,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider answered with a non-success status. `description` is
    /// the provider's own wording and is shown to the user as is.
    #[error("{description}")]
    Rejected { status: u16, description: String },

    #[error("payment gateway unreachable: {0}")]
    Transport(String),

    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Text that may be surfaced to the buyer.
    pub fn user_description(&self) -> String {
        match self {
            GatewayError::Rejected { description, .. } => description.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("admin file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("admin file is not a JSON array of integers: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate product id `{0}`")]
    DuplicateProduct(String),

    #[error("product id `{0}` must not be empty or contain ':'")]
    InvalidProductId(String),

    #[error("catalog has no products")]
    Empty,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("payment has no description")]
    MissingDescription,

    #[error("description `{0}` is not of the form <user_id>:<product_id>")]
    Malformed(String),

    #[error("description `{0}` carries a non-numeric user id")]
    InvalidUser(String),
}
