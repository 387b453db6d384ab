#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use orderdesk_core::models::{Artifact, Catalog, CreatedPayment, PaymentRequest, Product};
use orderdesk_core::services::{
    CheckoutService, CheckoutSettings, ConversationService, OrderService, PaymentCallbackService,
};
use orderdesk_core::store::{AdminStore, PaymentLedger, SessionStore};
use orderdesk_core::{
    DeliveryError, GatewayError, Messenger, OutgoingMessage, PaymentAdapter, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message(UserId, OutgoingMessage),
    File(UserId, PathBuf, String),
}

/// Records every outbound message; recipients in `failing` error out.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    pub failing: Mutex<HashSet<UserId>>,
}

impl RecordingMessenger {
    pub fn fail_for(&self, user_id: UserId) {
        self.failing.lock().unwrap().insert(user_id);
    }

    pub fn all(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, user_id: UserId) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message(to, m) if to == user_id => Some(m.text),
                Sent::File(to, _, caption) if to == user_id => Some(caption),
                _ => None,
            })
            .collect()
    }

    pub fn last_text_to(&self, user_id: UserId) -> Option<String> {
        self.texts_to(user_id).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, to: UserId, message: OutgoingMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(Sent::Message(to, message));
        if self.failing.lock().unwrap().contains(&to) {
            return Err(DeliveryError::new(to, "chat not found"));
        }
        Ok(())
    }

    async fn send_file(&self, to: UserId, path: &Path, caption: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::File(to, path.to_path_buf(), caption.to_string()));
        if self.failing.lock().unwrap().contains(&to) {
            return Err(DeliveryError::new(to, "chat not found"));
        }
        Ok(())
    }
}

/// Gateway fake: records requests and answers with a canned result.
pub struct StubGateway {
    pub requests: Mutex<Vec<PaymentRequest>>,
    pub reject_with: Mutex<Option<String>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
        }
    }

    pub fn reject(&self, description: &str) {
        *self.reject_with.lock().unwrap() = Some(description.to_string());
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentAdapter for StubGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(description) = self.reject_with.lock().unwrap().clone() {
            return Err(GatewayError::Rejected {
                status: 400,
                description,
            });
        }
        let n = self.requests.lock().unwrap().len();
        Ok(CreatedPayment {
            id: format!("pay-{n}"),
            confirmation_url: format!("https://pay.example.com/checkout?id=pay-{n}&step=1"),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn catalog_with(artifact_for_guide: Artifact) -> Catalog {
    Catalog::new(vec![
        Product {
            id: "pdf_guide".into(),
            name: "PDF guide".into(),
            price: 9900,
            currency: "RUB".into(),
            artifact: artifact_for_guide,
        },
        Product {
            id: "bot_course".into(),
            name: "Course".into(),
            price: 19900,
            currency: "RUB".into(),
            artifact: Artifact::Link("https://example.com/course".into()),
        },
    ])
    .unwrap()
}

/// Everything a test needs, wired the way the binary wires it.
pub struct Harness {
    pub messenger: Arc<RecordingMessenger>,
    pub gateway: Arc<StubGateway>,
    pub admins: Arc<AdminStore>,
    pub sessions: SessionStore,
    pub ledger: PaymentLedger,
    pub conversations: ConversationService,
    pub callbacks: PaymentCallbackService,
}

impl Harness {
    pub fn new(admins: Vec<UserId>) -> Self {
        let guide = Artifact::Link("https://example.com/guide.pdf".into());
        Self::with_catalog(admins, catalog_with(guide))
    }

    pub fn with_catalog(admins: Vec<UserId>, catalog: Catalog) -> Self {
        let messenger = Arc::new(RecordingMessenger::default());
        let gateway = Arc::new(StubGateway::new());
        let admins = Arc::new(AdminStore::ephemeral(admins));
        let sessions = SessionStore::new();
        let ledger = PaymentLedger::new();
        let catalog = Arc::new(catalog);

        let orders = OrderService::new(admins.clone(), messenger.clone());
        let checkout = CheckoutService::new(
            gateway.clone(),
            ledger.clone(),
            CheckoutSettings {
                return_url: "https://t.me/orderdesk_bot".into(),
                receipts: true,
            },
        );
        let conversations = ConversationService::new(
            sessions.clone(),
            messenger.clone(),
            orders,
            Some(checkout),
            catalog.clone(),
        );
        let callbacks = PaymentCallbackService::new(
            catalog,
            ledger.clone(),
            sessions.clone(),
            messenger.clone(),
        );

        Self {
            messenger,
            gateway,
            admins,
            sessions,
            ledger,
            conversations,
            callbacks,
        }
    }
}

pub fn succeeded_event(payment_id: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "notification",
        "event": "payment.succeeded",
        "object": {
            "id": payment_id,
            "status": "succeeded",
            "paid": true,
            "amount": {"value": "99.00", "currency": "RUB"},
            "description": description
        }
    })
}
