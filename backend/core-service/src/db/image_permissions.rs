use crate::domain::ImagePermission;
use crate::error::CoreResult;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ImagePermissionRepository {
    pool: PgPool,
}

impl ImagePermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, match_id: Uuid, user_id: Uuid) -> CoreResult<ImagePermission> {
        let existing = sqlx::query_as::<_, ImagePermission>(
            r#"
            SELECT match_id, user_id, enabled, enabled_at
            FROM image_permissions WHERE match_id = $1 AND user_id = $2
            "#,
        )
        .bind(match_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(perm) = existing {
            return Ok(perm);
        }

        let created = sqlx::query_as::<_, ImagePermission>(
            r#"
            INSERT INTO image_permissions (match_id, user_id, enabled)
            VALUES ($1, $2, false)
            ON CONFLICT (match_id, user_id) DO UPDATE SET match_id = EXCLUDED.match_id
            RETURNING match_id, user_id, enabled, enabled_at
            "#,
        )
        .bind(match_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn set_enabled(
        &self,
        match_id: Uuid,
        user_id: Uuid,
        enabled: bool,
    ) -> CoreResult<ImagePermission> {
        let enabled_at = if enabled { Some(Utc::now()) } else { None };

        let perm = sqlx::query_as::<_, ImagePermission>(
            r#"
            INSERT INTO image_permissions (match_id, user_id, enabled, enabled_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (match_id, user_id) DO UPDATE
            SET enabled = EXCLUDED.enabled, enabled_at = EXCLUDED.enabled_at
            RETURNING match_id, user_id, enabled, enabled_at
            "#,
        )
        .bind(match_id)
        .bind(user_id)
        .bind(enabled)
        .bind(enabled_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(perm)
    }

    pub async fn both_enabled(&self, match_id: Uuid, user_a: Uuid, user_b: Uuid) -> CoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM image_permissions
            WHERE match_id = $1 AND user_id IN ($2, $3) AND enabled = true
            "#,
        )
        .bind(match_id)
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(count == 2)
    }
}
