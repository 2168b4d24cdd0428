//! Bounded-queue worker pool backing the Notification Dispatcher (§4.6, §9
//! "any concurrency" dispatch policy): fire-and-forget from the caller's
//! perspective, a fixed number of background workers drain the queue, and a
//! full queue sheds load by dropping the oldest pending notification rather
//! than blocking the transactional path that enqueued it.

use super::email::EmailClient;
use super::push::PushClient;
use crate::db::Store;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

pub const QUEUE_CAPACITY: usize = 512;
pub const WORKER_COUNT: usize = 4;

#[derive(Debug, Clone)]
enum Job {
    MatchCreated {
        user_id: Uuid,
        other_user_id: Uuid,
    },
    NewMessage {
        user_id: Uuid,
        sender_name: String,
        preview: String,
    },
    NewLike {
        user_id: Uuid,
    },
    MagicLinkEmail {
        to: String,
        token: String,
    },
}

struct Inner {
    queue: Mutex<VecDeque<Job>>,
    notify: Notify,
    dropped: AtomicU64,
}

/// Async side-effect sink for push and email (§4.6). Cheap to `Clone`;
/// every clone shares the same queue and worker pool.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

impl NotificationDispatcher {
    /// Starts `WORKER_COUNT` background workers draining a shared queue of
    /// capacity `QUEUE_CAPACITY` and returns the handle callers enqueue onto.
    pub fn spawn(store: Store, push: PushClient, email: EmailClient) -> Self {
        let inner = Arc::new(Inner {
            queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        });

        for _ in 0..WORKER_COUNT {
            let inner = inner.clone();
            let store = store.clone();
            let push = push.clone();
            let email = email.clone();
            tokio::spawn(worker_loop(inner, store, push, email));
        }

        Self { inner }
    }

    /// Number of notifications dropped so far for a full queue; exposed for
    /// the `/metrics` gauge (§10.2).
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    fn enqueue(&self, job: Job) {
        let mut queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if queue.len() >= QUEUE_CAPACITY {
            queue.pop_front();
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("notification queue full, dropping oldest pending notification");
        }
        queue.push_back(job);
        drop(queue);

        self.inner.notify.notify_one();
    }

    pub fn dispatch_match(&self, _match_id: Uuid, user_a: Uuid, user_b: Uuid) {
        self.enqueue(Job::MatchCreated {
            user_id: user_a,
            other_user_id: user_b,
        });
        self.enqueue(Job::MatchCreated {
            user_id: user_b,
            other_user_id: user_a,
        });
    }

    /// §4.3 "push notification with the other user's `sender_name` and a
    /// 100-char content preview" — `preview` is already truncated by the
    /// caller.
    pub fn dispatch_message(&self, recipient_id: Uuid, sender_name: String, preview: String) {
        self.enqueue(Job::NewMessage {
            user_id: recipient_id,
            sender_name,
            preview,
        });
    }

    pub fn dispatch_like(&self, liked_user_id: Uuid) {
        self.enqueue(Job::NewLike {
            user_id: liked_user_id,
        });
    }

    pub fn dispatch_magic_link(&self, to: String, token: String) {
        self.enqueue(Job::MagicLinkEmail { to, token });
    }
}

async fn worker_loop(inner: Arc<Inner>, store: Store, push: PushClient, email: EmailClient) {
    loop {
        let job = {
            let mut queue = inner
                .queue
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            queue.pop_front()
        };

        let Some(job) = job else {
            inner.notify.notified().await;
            continue;
        };

        process(job, &store, &push, &email).await;
    }
}

async fn process(job: Job, store: &Store, push: &PushClient, email: &EmailClient) {
    match job {
        Job::MatchCreated {
            user_id,
            other_user_id,
        } => {
            if !category_enabled(store, user_id, Category::Match).await {
                return;
            }
            let name = other_display_name(store, other_user_id).await;
            push.send_to_user(
                store,
                user_id,
                "It's a match!",
                &format!("You and {name} liked each other."),
                None,
            )
            .await;
        }
        Job::NewMessage {
            user_id,
            sender_name,
            preview,
        } => {
            if !category_enabled(store, user_id, Category::Message).await {
                return;
            }
            push.send_to_user(
                store,
                user_id,
                &format!("New message from {sender_name}"),
                &preview,
                None,
            )
            .await;
        }
        Job::NewLike { user_id } => {
            if !category_enabled(store, user_id, Category::Like).await {
                return;
            }
            push.send_to_user(
                store,
                user_id,
                "Someone likes you",
                "You have a new like waiting in your feed.",
                None,
            )
            .await;
        }
        Job::MagicLinkEmail { to, token } => {
            email
                .send(
                    &to,
                    "Your sign-in link",
                    &format!(
                        "Use this code to finish signing in: {token}\n\nThis code expires in 15 minutes."
                    ),
                )
                .await;
        }
    }
}

enum Category {
    Match,
    Message,
    Like,
}

async fn category_enabled(store: &Store, user_id: Uuid, category: Category) -> bool {
    let settings = match store.notification_settings.find_or_default(user_id).await {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(%user_id, error = %err, "failed to load notification settings");
            return false;
        }
    };

    if !settings.globally_enabled {
        return false;
    }

    match category {
        Category::Match => settings.new_match_enabled,
        Category::Message => settings.new_message_enabled,
        Category::Like => settings.new_like_enabled,
    }
}

async fn other_display_name(store: &Store, user_id: Uuid) -> String {
    store
        .profiles
        .find(user_id)
        .await
        .map(|p| p.display_name)
        .unwrap_or_else(|_| "someone new".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_oldest_keeps_queue_at_capacity() {
        let mut queue: VecDeque<Job> = VecDeque::new();
        for i in 0..(QUEUE_CAPACITY + 5) {
            if queue.len() >= QUEUE_CAPACITY {
                queue.pop_front();
            }
            queue.push_back(Job::NewLike {
                user_id: Uuid::from_u128(i as u128),
            });
        }
        assert_eq!(queue.len(), QUEUE_CAPACITY);
    }
}
