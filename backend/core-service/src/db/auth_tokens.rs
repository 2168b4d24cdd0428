use crate::domain::{MagicToken, RefreshHandle};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Refresh handles and magic (passwordless login) tokens (§4.4). Both are
/// stored hashed (`crypto_core::token_hash`); the plaintext only ever exists
/// in the response payload or outbound email.
#[derive(Clone)]
pub struct AuthTokenRepository {
    pool: PgPool,
}

impl AuthTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_refresh_handle(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<RefreshHandle> {
        let handle = sqlx::query_as::<_, RefreshHandle>(
            r#"
            INSERT INTO refresh_handles (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(handle)
    }

    pub async fn find_refresh_handle(&self, token_hash: &str) -> CoreResult<RefreshHandle> {
        sqlx::query_as::<_, RefreshHandle>(
            r#"
            SELECT id, user_id, token_hash, expires_at
            FROM refresh_handles WHERE token_hash = $1 AND expires_at > now()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::Unauthenticated)
    }

    pub async fn revoke_refresh_handle(&self, id: Uuid) -> CoreResult<()> {
        sqlx::query("DELETE FROM refresh_handles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> CoreResult<()> {
        sqlx::query("DELETE FROM refresh_handles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn create_magic_token(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<MagicToken> {
        let token = sqlx::query_as::<_, MagicToken>(
            r#"
            INSERT INTO magic_tokens (email, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, email, token_hash, expires_at, used_at
            "#,
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Atomically redeems a magic token: fails if already used or expired
    /// (§4.4 one-time redemption).
    pub async fn redeem_magic_token(&self, token_hash: &str) -> CoreResult<MagicToken> {
        sqlx::query_as::<_, MagicToken>(
            r#"
            UPDATE magic_tokens
            SET used_at = now()
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > now()
            RETURNING id, email, token_hash, expires_at, used_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::Unauthenticated)
    }
}
