pub mod admin_service;
pub mod checkout_service;
pub mod conversation_service;
pub mod order_service;
pub mod payment_callback_service;

pub use admin_service::{AdminCommand, AdminService};
pub use checkout_service::{CheckoutService, CheckoutSettings};
pub use conversation_service::{ConversationService, Reaction};
pub use order_service::{DispatchReport, OrderService};
pub use payment_callback_service::{CallbackOutcome, PaymentCallbackService};
