use crate::domain::Pass;
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PassRepository {
    pool: PgPool,
}

impl PassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, passer_id: Uuid, passed_id: Uuid) -> CoreResult<Pass> {
        let pass = sqlx::query_as::<_, Pass>(
            r#"
            INSERT INTO passes (passer_id, passed_id)
            VALUES ($1, $2)
            ON CONFLICT (passer_id, passed_id) DO UPDATE SET passer_id = EXCLUDED.passer_id
            RETURNING passer_id, passed_id, created_at
            "#,
        )
        .bind(passer_id)
        .bind(passed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(pass)
    }

    pub async fn delete(&self, passer_id: Uuid, passed_id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM passes WHERE passer_id = $1 AND passed_id = $2")
            .bind(passer_id)
            .bind(passed_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn last_pass_by(&self, passer_id: Uuid) -> CoreResult<Option<Pass>> {
        let pass = sqlx::query_as::<_, Pass>(
            r#"
            SELECT passer_id, passed_id, created_at
            FROM passes WHERE passer_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(passer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pass)
    }
}
