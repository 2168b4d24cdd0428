//! Conversation Service (§4.3).

pub mod moderation;
pub mod service;

pub use moderation::{ModerationClient, Verdict};
pub use service::ConversationService;
