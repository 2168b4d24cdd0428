//! Real-Time Event Hub (§4.5): a single-process registry of `user_id ->
//! set<Session>`. Modeled on the teacher's `ConnectionManager`
//! (`Arc<RwLock<HashMap<Uuid, Vec<Sender>>>>`), with the unbounded channel
//! swapped for a bounded one so a slow consumer drops events instead of
//! ever blocking the sender (§4.5, §9 "any concurrency" dispatch policy).

use super::envelope::Envelope;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Per-session outbound queue capacity (§4.5 "e.g., 64 envelopes").
pub const SESSION_QUEUE_CAPACITY: usize = 64;

pub type SessionSender = mpsc::Sender<Envelope>;
pub type SessionReceiver = mpsc::Receiver<Envelope>;

/// Opaque handle identifying one registered duplex session, returned from
/// [`RealtimeHub::register`] so the caller can unregister on disconnect.
pub type SessionId = Uuid;

#[derive(Clone)]
pub struct RealtimeHub {
    sessions: Arc<RwLock<HashMap<Uuid, HashMap<SessionId, SessionSender>>>>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a new duplex session for `user_id` and returns both its id
    /// (for unregistering) and the receiving half of its bounded channel.
    pub async fn register(&self, user_id: Uuid) -> (SessionId, SessionReceiver) {
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        let session_id = Uuid::new_v4();

        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_default().insert(session_id, tx);

        (session_id, rx)
    }

    pub async fn unregister(&self, user_id: Uuid, session_id: SessionId) {
        let mut sessions = self.sessions.write().await;
        if let Some(user_sessions) = sessions.get_mut(&user_id) {
            user_sessions.remove(&session_id);
            if user_sessions.is_empty() {
                sessions.remove(&user_id);
            }
        }
    }

    /// Best-effort delivery to every session of `user_id` (§4.5 contract):
    /// returns immediately, never blocks, drops on a full queue instead of
    /// backing up. Dead senders (closed receivers) are pruned.
    pub async fn send_to_user(&self, user_id: Uuid, envelope: Envelope) {
        let sessions = self.sessions.read().await;
        let Some(user_sessions) = sessions.get(&user_id) else {
            return;
        };

        for sender in user_sessions.values() {
            match sender.try_send(envelope.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(%user_id, "realtime session queue full, dropping envelope");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Pruned lazily on next unregister; a closed sender here
                    // means the session's reader has already dropped its rx.
                }
            }
        }
    }

    pub async fn session_count(&self, user_id: Uuid) -> usize {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub async fn total_sessions(&self) -> usize {
        self.sessions.read().await.values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_all_registered_sessions() {
        let hub = RealtimeHub::new();
        let user_id = Uuid::new_v4();
        let (_id_a, mut rx_a) = hub.register(user_id).await;
        let (_id_b, mut rx_b) = hub.register(user_id).await;

        hub.send_to_user(
            user_id,
            Envelope::TypingStart {
                match_id: Uuid::nil(),
                user_id,
            },
        )
        .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn send_to_unregistered_user_is_a_silent_noop() {
        let hub = RealtimeHub::new();
        hub.send_to_user(
            Uuid::new_v4(),
            Envelope::TypingStop {
                match_id: Uuid::nil(),
                user_id: Uuid::nil(),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn unregister_removes_the_session() {
        let hub = RealtimeHub::new();
        let user_id = Uuid::new_v4();
        let (session_id, _rx) = hub.register(user_id).await;
        assert_eq!(hub.session_count(user_id).await, 1);

        hub.unregister(user_id, session_id).await;
        assert_eq!(hub.session_count(user_id).await, 0);
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let hub = RealtimeHub::new();
        let user_id = Uuid::new_v4();
        let (_session_id, _rx) = hub.register(user_id).await;

        for _ in 0..(SESSION_QUEUE_CAPACITY + 10) {
            hub.send_to_user(
                user_id,
                Envelope::TypingStart {
                    match_id: Uuid::nil(),
                    user_id,
                },
            )
            .await;
        }
    }
}
