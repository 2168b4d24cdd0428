use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

/// One opaque base64 public key blob per user, for client-side E2E encryption
/// (`POST/GET /keys/public`, §6). The core never inspects the blob contents.
#[derive(Clone)]
pub struct PublicKeyRepository {
    pool: PgPool,
}

impl PublicKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, user_id: Uuid, public_key: &str) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO public_keys (user_id, public_key, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id) DO UPDATE SET public_key = $2, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(public_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, user_id: Uuid) -> CoreResult<Option<String>> {
        let key = sqlx::query_scalar::<_, String>(
            "SELECT public_key FROM public_keys WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }
}
