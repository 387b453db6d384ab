use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::CorrelationToken;

/// Settled payment ids remembered for deduplication, oldest evicted first.
const SETTLED_CAPACITY: usize = 10_000;

struct LedgerState {
    pending: HashMap<Uuid, CorrelationToken>,
    settled: HashSet<String>,
    settled_order: VecDeque<String>,
    capacity: usize,
}

/// Checkout tokens awaiting payment and gateway payment ids already
/// delivered. Lives in memory only.
#[derive(Clone)]
pub struct PaymentLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl Default for PaymentLedger {
    fn default() -> Self {
        Self::with_capacity(SETTLED_CAPACITY)
    }
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                pending: HashMap::new(),
                settled: HashSet::new(),
                settled_order: VecDeque::new(),
                capacity,
            })),
        }
    }

    pub async fn register(&self, token: CorrelationToken) {
        self.inner.lock().await.pending.insert(token.nonce, token);
    }

    pub async fn lookup(&self, nonce: &Uuid) -> Option<CorrelationToken> {
        self.inner.lock().await.pending.get(nonce).cloned()
    }

    /// Drop a token whose checkout was replaced or cancelled. A late
    /// payment for it still resolves through its description.
    pub async fn forget(&self, nonce: &Uuid) -> bool {
        self.inner.lock().await.pending.remove(nonce).is_some()
    }

    pub async fn is_settled(&self, payment_id: &str) -> bool {
        self.inner.lock().await.settled.contains(payment_id)
    }

    /// Claim `payment_id` for delivery and drop the pending token. Returns
    /// `false` when the payment was claimed before. Payments without an id
    /// can not be deduplicated and are always claimable.
    pub async fn settle(&self, payment_id: &str, nonce: Option<Uuid>) -> bool {
        let mut state = self.inner.lock().await;
        if !payment_id.is_empty() {
            if !state.settled.insert(payment_id.to_string()) {
                return false;
            }
            state.settled_order.push_back(payment_id.to_string());
            while state.settled_order.len() > state.capacity {
                if let Some(oldest) = state.settled_order.pop_front() {
                    state.settled.remove(&oldest);
                }
            }
        }
        if let Some(nonce) = nonce {
            state.pending.remove(&nonce);
        }
        true
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settle_is_at_most_once() {
        let ledger = PaymentLedger::new();
        let token = CorrelationToken::new(42, "pdf_guide");
        ledger.register(token.clone()).await;
        assert_eq!(ledger.lookup(&token.nonce).await, Some(token.clone()));

        assert!(ledger.settle("pay-1", Some(token.nonce)).await);
        assert!(!ledger.settle("pay-1", Some(token.nonce)).await);
        assert!(ledger.is_settled("pay-1").await);
        assert_eq!(ledger.pending_count().await, 0);
    }

    #[tokio::test]
    async fn anonymous_payments_are_not_deduplicated() {
        let ledger = PaymentLedger::new();
        assert!(ledger.settle("", None).await);
        assert!(ledger.settle("", None).await);
    }

    #[tokio::test]
    async fn forgotten_tokens_no_longer_resolve() {
        let ledger = PaymentLedger::new();
        let token = CorrelationToken::new(42, "pdf_guide");
        ledger.register(token.clone()).await;

        assert!(ledger.forget(&token.nonce).await);
        assert!(!ledger.forget(&token.nonce).await);
        assert_eq!(ledger.lookup(&token.nonce).await, None);
        assert_eq!(ledger.pending_count().await, 0);
    }

    #[tokio::test]
    async fn settled_ids_are_bounded() {
        let ledger = PaymentLedger::with_capacity(2);
        assert!(ledger.settle("pay-1", None).await);
        assert!(ledger.settle("pay-2", None).await);
        assert!(ledger.settle("pay-3", None).await);

        assert!(!ledger.is_settled("pay-1").await);
        assert!(ledger.is_settled("pay-2").await);
        assert!(ledger.is_settled("pay-3").await);
        assert!(!ledger.settle("pay-3", None).await);

        let state = ledger.inner.lock().await;
        assert_eq!(state.settled.len(), 2);
        assert_eq!(state.settled_order.len(), 2);
    }
}
