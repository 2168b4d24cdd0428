//! Swipe Coordinator (§4.2): the atomic transaction that turns a Like,
//! Superlike, Pass, or Rewind into committed rows and, on a mutual like, a
//! Match plus an asynchronous `match_created` event.

pub mod coordinator;
pub mod reconciler;

pub use coordinator::{like, pass, rewind, LikeOutcome, SwipeCoordinator};
pub use reconciler::run_reconciler;
