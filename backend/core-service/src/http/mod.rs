//! HTTP edge (§6): one actix-web `App` fronting every domain module behind
//! `/api/v1`, plus the `/ws` duplex upgrade and unauthenticated health
//! routes. Handlers are thin: extract, delegate to a domain/service method,
//! map `CoreResult` straight to a response via `?` (error-to-JSON mapping
//! already lives on `CoreError`'s `ResponseError` impl).

pub mod auth;
pub mod feed;
pub mod health;
pub mod keys;
pub mod matches;
pub mod profile;
pub mod share;
pub mod social;
pub mod swipe;
pub mod ws;

use crate::auth::{MagicAuthService, SessionService};
use crate::conversation::ConversationService;
use crate::db::Store;
use crate::notifications::NotificationDispatcher;
use crate::realtime::RealtimeHub;
use crate::swipe::SwipeCoordinator;
use actix_web::{web, Scope};

/// Collaborators every handler needs, cloned into `web::Data` once at boot.
/// Every field is itself a cheap `Clone` (an `Arc`-backed handle or a
/// `PgPool`), so cloning `AppState` is cheap too.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub hub: RealtimeHub,
    pub notifications: NotificationDispatcher,
    pub session: SessionService,
    pub magic: MagicAuthService,
    pub swipe: SwipeCoordinator,
    pub conversation: ConversationService,
}

/// Builds the `/api/v1` scope (§6). Returned rather than registered
/// directly so `main.rs` can `.wrap()` the auth/rate-limit middleware stack
/// onto it before handing it to the `App`. `/health`, `/ready`, `/live`, and
/// the `/p/{share_code}` public share link are mounted separately, outside
/// this scope — see [`share::configure`] and [`health::configure`].
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .configure(auth::configure)
        .configure(profile::configure)
        .configure(feed::configure)
        .configure(swipe::configure)
        .configure(matches::configure)
        .configure(social::configure)
        .configure(keys::configure)
        .service(ws::ws_handler)
}
