pub mod admin_store;
pub mod payment_ledger;
pub mod session_store;

pub use admin_store::{AddOutcome, AdminStore, RemoveOutcome};
pub use payment_ledger::PaymentLedger;
pub use session_store::SessionStore;
