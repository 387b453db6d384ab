use std::path::Path;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::models::{OutgoingMessage, UserId};

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, to: UserId, message: OutgoingMessage) -> Result<(), DeliveryError>;

    async fn send_file(&self, to: UserId, path: &Path, caption: &str) -> Result<(), DeliveryError>;
}
