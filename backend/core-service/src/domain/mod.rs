//! Core data model (spec §3): the user-owned aggregate (User/Profile/
//! Preferences) plus the swipe, match, conversation, and credit entities.

pub mod models;

pub use models::*;
