use crate::domain::Block;
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct BlockRepository {
    pool: PgPool,
}

impl BlockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, blocker: Uuid, blocked: Uuid) -> CoreResult<Block> {
        let block = sqlx::query_as::<_, Block>(
            r#"
            INSERT INTO blocks (blocker, blocked)
            VALUES ($1, $2)
            ON CONFLICT (blocker, blocked) DO UPDATE SET blocker = EXCLUDED.blocker
            RETURNING blocker, blocked, created_at
            "#,
        )
        .bind(blocker)
        .bind(blocked)
        .fetch_one(&self.pool)
        .await?;

        Ok(block)
    }

    pub async fn remove(&self, blocker: Uuid, blocked: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM blocks WHERE blocker = $1 AND blocked = $2")
            .bind(blocker)
            .bind(blocked)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a block in either direction inside the caller's transaction
    /// (§4.2 step 3d mutual-interest override).
    pub async fn delete_either_direction<'c, E>(
        executor: E,
        user_a: Uuid,
        user_b: Uuid,
    ) -> CoreResult<()>
    where
        E: sqlx::PgExecutor<'c>,
    {
        sqlx::query(
            "DELETE FROM blocks WHERE (blocker = $1 AND blocked = $2) OR (blocker = $2 AND blocked = $1)",
        )
        .bind(user_a)
        .bind(user_b)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn exists_either_direction<'c, E>(
        executor: E,
        user_a: Uuid,
        user_b: Uuid,
    ) -> CoreResult<bool>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let blocked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocks
                WHERE (blocker = $1 AND blocked = $2) OR (blocker = $2 AND blocked = $1)
            )
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(executor)
        .await?;

        Ok(blocked)
    }

    pub async fn list_blocked_by(&self, blocker: Uuid) -> CoreResult<Vec<Uuid>> {
        let blocked: Vec<Uuid> =
            sqlx::query_scalar("SELECT blocked FROM blocks WHERE blocker = $1")
                .bind(blocker)
                .fetch_all(&self.pool)
                .await?;

        Ok(blocked)
    }
}
