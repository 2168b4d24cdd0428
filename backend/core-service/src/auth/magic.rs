//! Passwordless magic-token flow (§4.4).

use super::session::{SessionService, TokenPair};
use crate::db::Store;
use crate::domain::MAGIC_TOKEN_TTL_SECONDS;
use crate::error::CoreResult;
use crate::notifications::NotificationDispatcher;
use chrono::{Duration, Utc};

#[derive(Clone)]
pub struct MagicAuthService {
    store: Store,
    session: SessionService,
    notifications: NotificationDispatcher,
}

impl MagicAuthService {
    pub fn new(store: Store, session: SessionService, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            session,
            notifications,
        }
    }

    /// Mints a 15-minute single-use token and hands the raw value to the
    /// notification dispatcher for delivery by email; the hash is the only
    /// thing that touches the database (§4.4).
    pub async fn issue(&self, email: &str) -> CoreResult<()> {
        let email = email.trim().to_lowercase();
        let raw_token = crypto_core::random_token(32);
        let token_hash = crypto_core::token_hash(&raw_token);
        let expires_at = Utc::now() + Duration::seconds(MAGIC_TOKEN_TTL_SECONDS);

        self.store
            .auth_tokens
            .create_magic_token(&email, &token_hash, expires_at)
            .await?;

        self.notifications.dispatch_magic_link(email, raw_token);
        Ok(())
    }

    /// Redeems a raw magic token: marks it used (atomically, so a replay
    /// fails), provisioning a verified, passwordless account on first
    /// redemption if the email is new (§4.4), then issues a session exactly
    /// as login would.
    pub async fn redeem(&self, raw_token: &str) -> CoreResult<TokenPair> {
        let token_hash = crypto_core::token_hash(raw_token);
        let magic = self.store.auth_tokens.redeem_magic_token(&token_hash).await?;

        let user_id = match self.store.users.find_by_email(&magic.email).await? {
            Some(user) => user.id,
            None => {
                let created = self.store.users.create(&magic.email, None, None).await?;
                self.store.users.mark_email_verified(created.id).await?;
                created.id
            }
        };

        self.session.issue_pair(user_id).await
    }
}
