//! Real-Time Event Hub (§4.5).

pub mod envelope;
pub mod hub;

pub use envelope::Envelope;
pub use hub::{RealtimeHub, SessionId, SessionReceiver, SESSION_QUEUE_CAPACITY};
