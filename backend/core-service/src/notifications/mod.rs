//! Notification Dispatcher (§4.6): async sink for push and email, consulted
//! by the Swipe Coordinator and Conversation Service after a transaction
//! commits.

pub mod dispatcher;
pub mod email;
pub mod push;

pub use dispatcher::{NotificationDispatcher, QUEUE_CAPACITY, WORKER_COUNT};
pub use email::EmailClient;
pub use push::PushClient;
