pub mod catalog;
pub mod conversation;
pub mod payment;

pub use catalog::{Artifact, Catalog, Product};
pub use conversation::{Advance, CompletedOrder, ConversationRecord, PendingCheckout, Session, Step};
pub use payment::{CorrelationToken, CreatedPayment, PaymentEvent, PaymentRequest};

/// Telegram user identifier. Private chats share the same id, so it is
/// also the chat a reply goes to.
pub type UserId = i64;

/// The author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

impl Sender {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            full_name: None,
            username: None,
        }
    }

    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Customer",
        }
    }

    pub fn handle(&self) -> String {
        match self.username.as_deref() {
            Some(u) if !u.is_empty() => format!("@{}", u),
            _ => "—".to_string(),
        }
    }
}

/// What the state machine gets out of one inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    pub text: Option<String>,
    /// Phone number from a shared contact card.
    pub contact_phone: Option<String>,
}

impl Input {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            contact_phone: None,
        }
    }

    pub fn contact(phone: impl Into<String>) -> Self {
        Self {
            text: None,
            contact_phone: Some(phone.into()),
        }
    }

    /// Trimmed text, `""` when the message carried none.
    pub fn trimmed_text(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Keyboard to attach to an outgoing message. Rendering is left to the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    MainMenu,
    RequestContact,
    Remove,
    /// One button per product: `(label, callback data)`.
    Catalog(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// HTML formatted text.
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
