use crate::models::payment::CorrelationToken;
use crate::models::{Input, UserId};
use crate::validation::is_valid_phone;

/// Position within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingContact,
    AwaitingAddress,
    AwaitingItems,
    AwaitingContactInfo,
}

/// Order collection progress for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub user_id: UserId,
    pub step: Step,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub items: Option<String>,
}

/// The three values a finished order carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedOrder {
    pub user_id: UserId,
    pub phone: String,
    pub address: String,
    pub items: String,
}

/// Result of feeding one message into a [`ConversationRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Input did not fit the current step; the record is untouched.
    Rejected(Step),
    /// Input stored, the record now waits at the given step.
    Next(Step),
    /// Last step accepted. The record must be dropped.
    Completed(CompletedOrder),
}

impl ConversationRecord {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            step: Step::AwaitingContact,
            phone: None,
            address: None,
            items: None,
        }
    }

    pub fn advance(&mut self, input: &Input) -> Advance {
        match self.step {
            Step::AwaitingContact => {
                let phone = match input.contact_phone.as_deref() {
                    Some(p) if !p.trim().is_empty() => p.trim().to_string(),
                    _ => {
                        let text = input.trimmed_text();
                        if text.is_empty() || !is_valid_phone(text) {
                            return Advance::Rejected(self.step);
                        }
                        text.to_string()
                    }
                };
                self.phone = Some(phone);
                self.step = Step::AwaitingAddress;
                Advance::Next(self.step)
            }
            Step::AwaitingAddress => {
                let text = input.trimmed_text();
                if text.is_empty() {
                    return Advance::Rejected(self.step);
                }
                self.address = Some(text.to_string());
                self.step = Step::AwaitingItems;
                Advance::Next(self.step)
            }
            Step::AwaitingItems => {
                let text = input.trimmed_text();
                if text.is_empty() {
                    return Advance::Rejected(self.step);
                }
                self.items = Some(text.to_string());
                Advance::Completed(CompletedOrder {
                    user_id: self.user_id,
                    phone: self.phone.clone().unwrap_or_default(),
                    address: self.address.clone().unwrap_or_default(),
                    items: text.to_string(),
                })
            }
            // Order records never sit at the checkout step.
            Step::AwaitingContactInfo => Advance::Rejected(self.step),
        }
    }
}

/// Store checkout in progress for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheckout {
    pub user_id: UserId,
    pub product_id: String,
    pub contact: Option<String>,
    pub token: Option<CorrelationToken>,
}

impl PendingCheckout {
    pub fn new(user_id: UserId, product_id: impl Into<String>) -> Self {
        Self {
            user_id,
            product_id: product_id.into(),
            contact: None,
            token: None,
        }
    }

    pub fn step(&self) -> Option<Step> {
        self.contact.is_none().then_some(Step::AwaitingContactInfo)
    }
}

/// The single per-user state slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Order(ConversationRecord),
    Checkout(PendingCheckout),
}

impl Session {
    pub fn user_id(&self) -> UserId {
        match self {
            Session::Order(r) => r.user_id,
            Session::Checkout(c) => c.user_id,
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            Session::Order(r) => Some(r.step),
            Session::Checkout(c) => c.step(),
        }
    }
}
