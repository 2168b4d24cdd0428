use crate::domain::{Platform, PushToken};
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PushTokenRepository {
    pool: PgPool,
}

impl PushTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, user_id: Uuid, token: &str, platform: Platform) -> CoreResult<PushToken> {
        let push_token = sqlx::query_as::<_, PushToken>(
            r#"
            INSERT INTO push_tokens (user_id, token, platform, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, platform) DO UPDATE
            SET token = EXCLUDED.token, updated_at = EXCLUDED.updated_at
            RETURNING user_id, token, platform, updated_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(platform)
        .fetch_one(&self.pool)
        .await?;

        Ok(push_token)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<PushToken>> {
        let tokens = sqlx::query_as::<_, PushToken>(
            "SELECT user_id, token, platform, updated_at FROM push_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    pub async fn remove(&self, user_id: Uuid, token: &str) -> CoreResult<()> {
        sqlx::query("DELETE FROM push_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
