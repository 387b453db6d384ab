//! Transport-independent core of the order desk bot: conversation state,
//! order fan-out, checkout and payment callbacks, admin management.

pub mod commands;
pub mod error;
pub mod messenger;
pub mod models;
pub mod payment;
pub mod services;
pub mod store;
pub mod texts;
pub mod validation;

pub use commands::{BotCommand, CallbackAction};
pub use error::{CatalogError, CorrelationError, DeliveryError, GatewayError, StoreError};
pub use messenger::Messenger;
pub use models::{Input, Keyboard, OutgoingMessage, Sender, UserId};
pub use payment::PaymentAdapter;
