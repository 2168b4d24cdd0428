use crate::domain::Like;
use crate::error::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a like inside the caller's transaction (§4.2 step 2). A unique
    /// violation on `(liker_id, liked_id)` surfaces as `DuplicateLike` so the
    /// swipe coordinator can reject the swipe without touching credits twice.
    pub async fn insert<'c, E>(
        executor: E,
        liker_id: Uuid,
        liked_id: Uuid,
        is_superlike: bool,
        attached_message: Option<&str>,
    ) -> CoreResult<Like>
    where
        E: sqlx::PgExecutor<'c>,
    {
        sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (liker_id, liked_id, is_superlike, attached_message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, liker_id, liked_id, is_superlike, attached_message, created_at
            "#,
        )
        .bind(liker_id)
        .bind(liked_id)
        .bind(is_superlike)
        .bind(attached_message)
        .fetch_one(executor)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CoreError::DuplicateLike
            }
            _ => CoreError::from(err),
        })
    }

    /// Reverse-like probe for match detection (§4.2 step 3): has `liked_id`
    /// already liked `liker_id`?
    pub async fn find_reverse<'c, E>(
        executor: E,
        liker_id: Uuid,
        liked_id: Uuid,
    ) -> CoreResult<Option<Like>>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, liker_id, liked_id, is_superlike, attached_message, created_at
            FROM likes WHERE liker_id = $1 AND liked_id = $2
            "#,
        )
        .bind(liked_id)
        .bind(liker_id)
        .fetch_optional(executor)
        .await?;

        Ok(like)
    }

    pub async fn delete<'c, E>(executor: E, liker_id: Uuid, liked_id: Uuid) -> CoreResult<bool>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let result = sqlx::query("DELETE FROM likes WHERE liker_id = $1 AND liked_id = $2")
            .bind(liker_id)
            .bind(liked_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Most recent like from `liker_id` to `liked_id`, used by rewind (§4.2).
    pub async fn find(&self, liker_id: Uuid, liked_id: Uuid) -> CoreResult<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, liker_id, liked_id, is_superlike, attached_message, created_at
            FROM likes WHERE liker_id = $1 AND liked_id = $2
            "#,
        )
        .bind(liker_id)
        .bind(liked_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(like)
    }

    pub async fn last_swipe_by(&self, liker_id: Uuid) -> CoreResult<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, liker_id, liked_id, is_superlike, attached_message, created_at
            FROM likes WHERE liker_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(liker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(like)
    }

    /// Likes received, used both by the feed engine's "who liked me" queue
    /// backpressure rule (§4.1) and the likes-received inbox.
    pub async fn received_since<'c, E>(
        executor: E,
        liked_id: Uuid,
        since: chrono::DateTime<chrono::Utc>,
    ) -> CoreResult<Vec<Like>>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let likes = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, liker_id, liked_id, is_superlike, attached_message, created_at
            FROM likes
            WHERE liked_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(liked_id)
        .bind(since)
        .fetch_all(executor)
        .await?;

        Ok(likes)
    }

    /// Pairs with a Like in both directions but no Match row yet (§4.2
    /// commit-order race note; swept by `swipe::reconciler`).
    pub async fn find_unresolved_mutual_pairs(&self, limit: i64) -> CoreResult<Vec<(Uuid, Uuid)>> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT l1.liker_id, l1.liked_id
            FROM likes l1
            JOIN likes l2 ON l2.liker_id = l1.liked_id AND l2.liked_id = l1.liker_id
            WHERE l1.liker_id < l1.liked_id
              AND NOT EXISTS (
                  SELECT 1 FROM matches m
                  WHERE m.user_a = l1.liker_id AND m.user_b = l1.liked_id
              )
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_qualified_unswiped(&self, user_id: Uuid) -> CoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes l
            WHERE l.liked_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM likes r WHERE r.liker_id = $1 AND r.liked_id = l.liker_id
              )
              AND NOT EXISTS (
                  SELECT 1 FROM passes p WHERE p.passer_id = $1 AND p.passed_id = l.liker_id
              )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
