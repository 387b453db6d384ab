use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{Session, UserId};

/// Owner of every in-flight conversation.
///
/// All reads and transitions go through one lock, so two updates for the
/// same user can never interleave. Callers must not hold the closure open
/// across network calls.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` for its user, returning whatever it replaced.
    pub async fn replace(&self, session: Session) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.user_id(), session)
    }

    pub async fn get(&self, user_id: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user_id).cloned()
    }

    pub async fn remove(&self, user_id: UserId) -> Option<Session> {
        self.sessions.lock().await.remove(&user_id)
    }

    /// Remove the user's session only if `predicate` holds for it.
    pub async fn remove_if<F>(&self, user_id: UserId, predicate: F) -> bool
    where
        F: FnOnce(&Session) -> bool,
    {
        let mut sessions = self.sessions.lock().await;
        let matched = sessions.get(&user_id).is_some_and(predicate);
        if matched {
            sessions.remove(&user_id);
        }
        matched
    }

    /// Run `f` against the user's slot under the lock. Setting the slot to
    /// `None` deletes the session.
    pub async fn update<F, T>(&self, user_id: UserId, f: F) -> T
    where
        F: FnOnce(&mut Option<Session>) -> T,
    {
        let mut sessions = self.sessions.lock().await;
        let mut slot = sessions.remove(&user_id);
        let out = f(&mut slot);
        if let Some(session) = slot {
            sessions.insert(user_id, session);
        }
        out
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
