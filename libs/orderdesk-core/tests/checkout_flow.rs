mod common;

use std::sync::Arc;

use common::{catalog_with, succeeded_event, Harness, Sent};
use orderdesk_core::models::{Artifact, Session, Step};
use orderdesk_core::services::{CallbackOutcome, Reaction};
use orderdesk_core::validation::Contact;
use orderdesk_core::{texts, CorrelationError, Input, Sender};

async fn checkout_to_link(h: &Harness, user_id: i64, product_id: &str) {
    h.conversations.begin_checkout(user_id, product_id).await;
    let reaction = h
        .conversations
        .handle_message(&Sender::new(user_id), &Input::text("buyer@example.com"))
        .await;
    assert_eq!(reaction, Reaction::PaymentLinkSent);
}

fn callback_body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[tokio::test]
async fn payment_request_carries_correlation_and_receipt() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.description, "42:pdf_guide");
    assert_eq!(request.amount, 9900);
    assert_eq!(request.currency, "RUB");
    assert_eq!(request.return_url, "https://t.me/orderdesk_bot");
    assert_eq!(request.metadata.get("user_id").map(String::as_str), Some("42"));
    let receipt = request.receipt.as_ref().expect("receipt attached");
    assert_eq!(receipt.customer, Contact::Email("buyer@example.com".into()));
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].amount, 9900);

    let link = h.messenger.last_text_to(42).unwrap();
    assert!(link.contains("https://pay.example.com/checkout?id=pay-1&amp;step=1"));

    match h.sessions.get(42).await {
        Some(Session::Checkout(pending)) => {
            assert_eq!(pending.contact.as_deref(), Some("buyer@example.com"));
            assert!(pending.token.is_some());
        }
        other => panic!("expected a pending checkout, got {other:?}"),
    }
    assert_eq!(h.ledger.pending_count().await, 1);
}

#[tokio::test]
async fn each_attempt_gets_a_fresh_idempotency_key() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    checkout_to_link(&h, 42, "pdf_guide").await;

    let requests = h.gateway.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].idempotency_key, requests[1].idempotency_key);
}

#[tokio::test]
async fn invalid_receipt_contact_is_rejected() {
    let h = Harness::new(vec![100]);
    h.conversations.begin_checkout(42, "pdf_guide").await;
    let reaction = h
        .conversations
        .handle_message(&Sender::new(42), &Input::text("not a contact"))
        .await;

    assert_eq!(reaction, Reaction::Rejected(Step::AwaitingContactInfo));
    assert!(h.gateway.requests().is_empty());
    assert_eq!(
        h.sessions.get(42).await.and_then(|s| s.step()),
        Some(Step::AwaitingContactInfo)
    );
}

#[tokio::test]
async fn second_message_after_contact_is_ignored() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    let reaction = h
        .conversations
        .handle_message(&Sender::new(42), &Input::text("other@example.com"))
        .await;

    assert_eq!(reaction, Reaction::Ignored);
    assert_eq!(h.gateway.requests().len(), 1);
}

#[tokio::test]
async fn gateway_rejection_is_reported_and_clears_checkout() {
    let h = Harness::new(vec![100]);
    h.gateway.reject("Invalid receipt: customer contact is required");
    h.conversations.begin_checkout(42, "pdf_guide").await;
    let reaction = h
        .conversations
        .handle_message(&Sender::new(42), &Input::text("+79991234567"))
        .await;

    assert_eq!(reaction, Reaction::PaymentFailed);
    let reply = h.messenger.last_text_to(42).unwrap();
    assert!(reply.contains("Invalid receipt: customer contact is required"));
    assert!(h.sessions.get(42).await.is_none());
    assert_eq!(h.ledger.pending_count().await, 0);
}

#[tokio::test]
async fn unknown_product_is_refused() {
    let h = Harness::new(vec![100]);
    h.conversations.begin_checkout(42, "nope").await;
    assert_eq!(h.messenger.last_text_to(42).as_deref(), Some(texts::UNKNOWN_PRODUCT));
    assert!(h.sessions.is_empty().await);
}

#[tokio::test]
async fn successful_payment_delivers_link() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    h.messenger.clear();

    let outcome = h
        .callbacks
        .handle_raw(&callback_body(succeeded_event("pay-1", "42:pdf_guide")))
        .await;

    assert_eq!(
        outcome,
        CallbackOutcome::Delivered {
            user_id: 42,
            product_id: "pdf_guide".into()
        }
    );
    let delivered = h.messenger.texts_to(42);
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].contains("https://example.com/guide.pdf"));
    assert!(h.sessions.get(42).await.is_none());
}

#[tokio::test]
async fn duplicate_notification_is_delivered_once() {
    let h = Harness::new(vec![100]);
    let body = callback_body(succeeded_event("pay-7", "42:bot_course"));

    assert!(matches!(
        h.callbacks.handle_raw(&body).await,
        CallbackOutcome::Delivered { .. }
    ));
    assert_eq!(h.callbacks.handle_raw(&body).await, CallbackOutcome::AlreadySettled);
    assert_eq!(h.messenger.texts_to(42).len(), 1);
}

#[tokio::test]
async fn metadata_token_wins_over_description() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    let request = h.gateway.requests().remove(0);

    let mut event = succeeded_event("pay-1", "edited by merchant");
    event["object"]["metadata"] = serde_json::to_value(&request.metadata).unwrap();
    let outcome = h.callbacks.handle_raw(&callback_body(event)).await;

    assert_eq!(
        outcome,
        CallbackOutcome::Delivered {
            user_id: 42,
            product_id: "pdf_guide".into()
        }
    );
    assert_eq!(h.ledger.pending_count().await, 0);
}

#[tokio::test]
async fn malformed_descriptions_deliver_nothing() {
    let h = Harness::new(vec![100]);
    for (id, description) in [("a", "42"), ("b", "42:pdf:guide"), ("c", "abc:pdf_guide")] {
        let outcome = h
            .callbacks
            .handle_raw(&callback_body(succeeded_event(id, description)))
            .await;
        assert!(matches!(outcome, CallbackOutcome::Unresolved(_)), "{description}");
    }

    let mut no_description = succeeded_event("d", "");
    no_description["object"]
        .as_object_mut()
        .unwrap()
        .remove("description");
    assert_eq!(
        h.callbacks.handle_raw(&callback_body(no_description)).await,
        CallbackOutcome::Unresolved(CorrelationError::MissingDescription)
    );
    assert!(h.messenger.all().is_empty());
}

#[tokio::test]
async fn unknown_product_and_other_events_are_dropped() {
    let h = Harness::new(vec![100]);
    assert_eq!(
        h.callbacks
            .handle_raw(&callback_body(succeeded_event("p1", "42:gone")))
            .await,
        CallbackOutcome::UnknownProduct("gone".into())
    );

    let mut pending = succeeded_event("p2", "42:pdf_guide");
    pending["event"] = "payment.waiting_for_capture".into();
    pending["object"]["status"] = "waiting_for_capture".into();
    assert_eq!(
        h.callbacks.handle_raw(&callback_body(pending)).await,
        CallbackOutcome::Ignored
    );

    assert_eq!(h.callbacks.handle_raw(b"not json").await, CallbackOutcome::Malformed);
    assert_eq!(h.callbacks.handle_raw(b"{}").await, CallbackOutcome::Malformed);
    assert!(h.messenger.all().is_empty());
}

#[tokio::test]
async fn missing_file_is_reported_as_degraded_delivery() {
    let h = Harness::with_catalog(
        vec![100],
        catalog_with(Artifact::File("/nonexistent/orderdesk/guide.pdf".into())),
    );
    let outcome = h
        .callbacks
        .handle_raw(&callback_body(succeeded_event("pay-1", "42:pdf_guide")))
        .await;

    assert_eq!(
        outcome,
        CallbackOutcome::DeliveredDegraded {
            user_id: 42,
            product_id: "pdf_guide".into()
        }
    );
    assert!(h.messenger.last_text_to(42).unwrap().contains("temporarily unavailable"));
}

#[tokio::test]
async fn existing_file_is_sent_as_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    let h = Harness::with_catalog(vec![100], catalog_with(Artifact::File(path.clone())));

    let outcome = h
        .callbacks
        .handle_raw(&callback_body(succeeded_event("pay-1", "42:pdf_guide")))
        .await;

    assert!(matches!(outcome, CallbackOutcome::Delivered { user_id: 42, .. }));
    let sent = h.messenger.all();
    assert!(matches!(&sent[..], [Sent::File(42, p, _)] if *p == path));
}

#[tokio::test]
async fn failed_delivery_is_reported() {
    let h = Harness::new(vec![100]);
    h.messenger.fail_for(42);
    let outcome = h
        .callbacks
        .handle_raw(&callback_body(succeeded_event("pay-1", "42:bot_course")))
        .await;
    assert_eq!(
        outcome,
        CallbackOutcome::DeliveryFailed {
            user_id: 42,
            product_id: "bot_course".into()
        }
    );
}

fn checkout_nonce(session: Option<Session>) -> Option<uuid::Uuid> {
    match session {
        Some(Session::Checkout(pending)) => pending.token.map(|t| t.nonce),
        _ => None,
    }
}

#[tokio::test]
async fn unresolved_outcome_is_cloneable() {
    let h = Harness::new(vec![100]);
    let outcome = h
        .callbacks
        .handle_raw(&callback_body(succeeded_event("pay-1", "42")))
        .await;

    let copy = outcome.clone();
    assert_eq!(copy, outcome);
    assert_eq!(
        copy,
        CallbackOutcome::Unresolved(CorrelationError::Malformed("42".into()))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_contact_messages_create_one_payment() {
    let h = Arc::new(Harness::new(vec![100]));
    h.conversations.begin_checkout(42, "pdf_guide").await;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let h = h.clone();
            tokio::spawn(async move {
                let input = Input::text(format!("buyer{i}@example.com"));
                h.conversations.handle_message(&Sender::new(42), &input).await
            })
        })
        .collect();
    let mut reactions = Vec::new();
    for task in tasks {
        reactions.push(task.await.unwrap());
    }

    assert_eq!(h.gateway.requests().len(), 1);
    let sent = reactions
        .iter()
        .filter(|r| **r == Reaction::PaymentLinkSent)
        .count();
    let ignored = reactions.iter().filter(|r| **r == Reaction::Ignored).count();
    assert_eq!(sent, 1);
    assert_eq!(ignored, 15);
    assert_eq!(h.ledger.pending_count().await, 1);
}

#[tokio::test]
async fn dropped_checkouts_release_their_tokens() {
    let h = Harness::new(vec![100]);

    checkout_to_link(&h, 42, "pdf_guide").await;
    assert_eq!(h.ledger.pending_count().await, 1);
    h.conversations.begin_checkout(42, "bot_course").await;
    assert_eq!(h.ledger.pending_count().await, 0);

    checkout_to_link(&h, 42, "pdf_guide").await;
    h.conversations.begin_order(42).await;
    assert_eq!(h.ledger.pending_count().await, 0);

    checkout_to_link(&h, 42, "pdf_guide").await;
    h.conversations.cancel(42).await;
    assert_eq!(h.ledger.pending_count().await, 0);
    assert!(h.sessions.get(42).await.is_none());
}

#[tokio::test]
async fn late_payment_for_replaced_checkout_keeps_the_new_one() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    checkout_to_link(&h, 42, "pdf_guide").await;
    let requests = h.gateway.requests();
    let current = checkout_nonce(h.sessions.get(42).await);
    assert!(current.is_some());

    let mut late = succeeded_event("pay-1", "42:pdf_guide");
    late["object"]["metadata"] = serde_json::to_value(&requests[0].metadata).unwrap();
    assert_eq!(
        h.callbacks.handle_raw(&callback_body(late)).await,
        CallbackOutcome::Delivered {
            user_id: 42,
            product_id: "pdf_guide".into()
        }
    );
    assert_eq!(checkout_nonce(h.sessions.get(42).await), current);

    let mut fresh = succeeded_event("pay-2", "42:pdf_guide");
    fresh["object"]["metadata"] = serde_json::to_value(&requests[1].metadata).unwrap();
    assert!(matches!(
        h.callbacks.handle_raw(&callback_body(fresh)).await,
        CallbackOutcome::Delivered { .. }
    ));
    assert!(h.sessions.get(42).await.is_none());
}

#[tokio::test]
async fn tokenised_payment_leaves_checkout_without_token_alone() {
    let h = Harness::new(vec![100]);
    checkout_to_link(&h, 42, "pdf_guide").await;
    let request = h.gateway.requests().remove(0);
    h.conversations.begin_checkout(42, "pdf_guide").await;

    let mut late = succeeded_event("pay-1", "42:pdf_guide");
    late["object"]["metadata"] = serde_json::to_value(&request.metadata).unwrap();
    h.callbacks.handle_raw(&callback_body(late)).await;

    assert_eq!(
        h.sessions.get(42).await.and_then(|s| s.step()),
        Some(Step::AwaitingContactInfo)
    );
}
