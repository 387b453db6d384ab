use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::commands::CallbackAction;
use crate::messenger::Messenger;
use crate::models::{
    Advance, Catalog, CompletedOrder, ConversationRecord, Input, Keyboard, OutgoingMessage,
    PendingCheckout, Product, Sender, Session, Step, UserId,
};
use crate::services::checkout_service::CheckoutService;
use crate::services::order_service::{DispatchReport, OrderService};
use crate::store::SessionStore;
use crate::texts;
use crate::validation::Contact;

/// What a message did to the sender's conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    NoSession,
    Rejected(Step),
    Advanced(Step),
    OrderDispatched(DispatchReport),
    PaymentLinkSent,
    PaymentFailed,
    Ignored,
}

/// Decided under the session lock, carried out after it is released.
enum Plan {
    NoSession,
    Rejected(Step),
    Advanced(Step),
    Dispatch(CompletedOrder),
    Checkout(Product, Contact),
    Abandon,
    Ignore,
}

/// Drives both conversation flows for every user.
pub struct ConversationService {
    sessions: SessionStore,
    messenger: Arc<dyn Messenger>,
    orders: OrderService,
    checkout: Option<CheckoutService>,
    catalog: Arc<Catalog>,
}

impl ConversationService {
    pub fn new(
        sessions: SessionStore,
        messenger: Arc<dyn Messenger>,
        orders: OrderService,
        checkout: Option<CheckoutService>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            sessions,
            messenger,
            orders,
            checkout,
            catalog,
        }
    }

    pub fn store_enabled(&self) -> bool {
        self.checkout.is_some()
    }

    pub async fn welcome(&self, user_id: UserId) {
        self.reply(user_id, texts::WELCOME, Some(Keyboard::MainMenu)).await;
    }

    pub async fn help(&self, user_id: UserId) {
        self.reply(user_id, texts::HELP, None).await;
    }

    /// Start (or restart) order collection. Any previous session is
    /// discarded.
    pub async fn begin_order(&self, user_id: UserId) {
        if let Some(old) = self
            .sessions
            .replace(Session::Order(ConversationRecord::new(user_id)))
            .await
        {
            debug!(user_id, ?old, "Replaced previous session");
            self.release(old).await;
        }
        info!(user_id, "Order started");
        self.reply(user_id, texts::ASK_CONTACT, Some(Keyboard::RequestContact))
            .await;
    }

    pub async fn show_catalog(&self, user_id: UserId) {
        if self.checkout.is_none() {
            self.reply(user_id, texts::STORE_DISABLED, None).await;
            return;
        }
        let buttons = self
            .catalog
            .products()
            .iter()
            .map(|p| (texts::catalog_button(p), CallbackAction::Buy(p.id.clone()).data()))
            .collect();
        self.reply(user_id, texts::CATALOG_HEADER, Some(Keyboard::Catalog(buttons)))
            .await;
    }

    pub async fn begin_checkout(&self, user_id: UserId, product_id: &str) {
        if self.checkout.is_none() {
            self.reply(user_id, texts::STORE_DISABLED, None).await;
            return;
        }
        let Some(product) = self.catalog.get(product_id) else {
            warn!(user_id, product_id, "Checkout requested for unknown product");
            self.reply(user_id, texts::UNKNOWN_PRODUCT, None).await;
            return;
        };
        let session = Session::Checkout(PendingCheckout::new(user_id, &product.id));
        if let Some(old) = self.sessions.replace(session).await {
            self.release(old).await;
        }
        info!(user_id, product_id, "Checkout started");
        let prompt = texts::ask_checkout_contact(product);
        self.reply(user_id, &prompt, None).await;
    }

    pub async fn cancel(&self, user_id: UserId) {
        if let Some(old) = self.sessions.remove(user_id).await {
            info!(user_id, "Session cancelled");
            self.release(old).await;
            self.reply(user_id, texts::CANCELLED, Some(Keyboard::Remove)).await;
        } else {
            self.reply(user_id, texts::NOTHING_TO_CANCEL, None).await;
        }
    }

    /// Feed a non-command message into the sender's conversation.
    pub async fn handle_message(&self, sender: &Sender, input: &Input) -> Reaction {
        let user_id = sender.id;
        let plan = self
            .sessions
            .update(user_id, |slot| {
                let plan = match slot.as_mut() {
                    None => Plan::NoSession,
                    Some(Session::Order(record)) => match record.advance(input) {
                        Advance::Rejected(step) => Plan::Rejected(step),
                        Advance::Next(step) => Plan::Advanced(step),
                        Advance::Completed(order) => Plan::Dispatch(order),
                    },
                    Some(Session::Checkout(checkout)) => {
                        plan_checkout(&self.catalog, checkout, input)
                    }
                };
                if matches!(plan, Plan::Dispatch(_) | Plan::Abandon) {
                    *slot = None;
                }
                plan
            })
            .await;

        match plan {
            Plan::NoSession => {
                self.reply(user_id, texts::NO_SESSION, Some(Keyboard::MainMenu)).await;
                Reaction::NoSession
            }
            Plan::Rejected(step) => {
                let (text, keyboard) = match step {
                    Step::AwaitingContact => {
                        (texts::BAD_CONTACT, Some(Keyboard::RequestContact))
                    }
                    Step::AwaitingAddress => (texts::BAD_ADDRESS, None),
                    Step::AwaitingItems => (texts::BAD_ITEMS, None),
                    Step::AwaitingContactInfo => (texts::BAD_CHECKOUT_CONTACT, None),
                };
                self.reply(user_id, text, keyboard).await;
                Reaction::Rejected(step)
            }
            Plan::Advanced(step) => {
                let (text, keyboard) = match step {
                    Step::AwaitingAddress => (texts::ASK_ADDRESS, Some(Keyboard::Remove)),
                    Step::AwaitingItems => (texts::ASK_ITEMS, None),
                    Step::AwaitingContact => {
                        (texts::ASK_CONTACT, Some(Keyboard::RequestContact))
                    }
                    Step::AwaitingContactInfo => (texts::BAD_CHECKOUT_CONTACT, None),
                };
                self.reply(user_id, text, keyboard).await;
                Reaction::Advanced(step)
            }
            Plan::Dispatch(order) => {
                Reaction::OrderDispatched(self.orders.dispatch(sender, &order).await)
            }
            Plan::Checkout(product, contact) => {
                self.run_checkout(user_id, &product, &contact).await
            }
            Plan::Abandon => {
                self.reply(user_id, texts::UNKNOWN_PRODUCT, Some(Keyboard::MainMenu)).await;
                Reaction::Ignored
            }
            Plan::Ignore => {
                debug!(user_id, "Checkout already in flight, ignoring message");
                Reaction::Ignored
            }
        }
    }

    async fn run_checkout(
        &self,
        user_id: UserId,
        product: &Product,
        contact: &Contact,
    ) -> Reaction {
        let Some(checkout) = &self.checkout else {
            self.sessions.remove(user_id).await;
            self.reply(user_id, texts::STORE_DISABLED, None).await;
            return Reaction::PaymentFailed;
        };

        match checkout.create(user_id, product, contact).await {
            Ok((token, payment)) => {
                let nonce = token.nonce;
                let attached = self
                    .sessions
                    .update(user_id, |slot| match slot {
                        Some(Session::Checkout(pending))
                            if pending.product_id == product.id && pending.token.is_none() =>
                        {
                            pending.token = Some(token);
                            true
                        }
                        _ => false,
                    })
                    .await;
                if !attached {
                    debug!(user_id, "Checkout replaced while the payment was created");
                    checkout.forget(&nonce).await;
                }
                let text = texts::payment_link(product, &payment.confirmation_url);
                self.reply(user_id, &text, None).await;
                Reaction::PaymentLinkSent
            }
            Err(e) => {
                self.sessions
                    .remove_if(user_id, |s| {
                        matches!(
                            s,
                            Session::Checkout(c) if c.product_id == product.id && c.token.is_none()
                        )
                    })
                    .await;
                let text = texts::payment_failed(&e.user_description());
                self.reply(user_id, &text, Some(Keyboard::MainMenu)).await;
                Reaction::PaymentFailed
            }
        }
    }

    /// Drop the payment token of a checkout that is no longer pending.
    async fn release(&self, old: Session) {
        let (Session::Checkout(PendingCheckout { token: Some(token), .. }), Some(checkout)) =
            (old, &self.checkout)
        else {
            return;
        };
        checkout.forget(&token.nonce).await;
    }

    async fn reply(&self, user_id: UserId, text: &str, keyboard: Option<Keyboard>) {
        let mut message = OutgoingMessage::text(text);
        message.keyboard = keyboard;
        if let Err(e) = self.messenger.send(user_id, message).await {
            warn!(user_id, "Failed to reply: {}", e);
        }
    }
}

fn plan_checkout(catalog: &Catalog, checkout: &mut PendingCheckout, input: &Input) -> Plan {
    if checkout.contact.is_some() {
        return Plan::Ignore;
    }
    let raw = input
        .contact_phone
        .as_deref()
        .unwrap_or_else(|| input.trimmed_text());
    let Some(contact) = Contact::parse(raw) else {
        return Plan::Rejected(Step::AwaitingContactInfo);
    };
    let Some(product) = catalog.get(&checkout.product_id) else {
        return Plan::Abandon;
    };
    checkout.contact = Some(contact.as_str().to_string());
    Plan::Checkout(product.clone(), contact)
}
