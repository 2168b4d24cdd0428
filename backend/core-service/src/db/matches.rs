use crate::domain::Match;
use crate::error::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the match row inside the caller's transaction (§4.2 step 4),
    /// keyed on the canonical `(user_a, user_b)` ordering so a concurrent
    /// double-insert from both sides' swipe requests is idempotent.
    pub async fn insert<'c, E>(executor: E, user_a: Uuid, user_b: Uuid) -> CoreResult<Match>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let (lo, hi) = Match::canonical_pair(user_a, user_b);
        sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT (user_a, user_b) DO UPDATE SET user_a = EXCLUDED.user_a
            RETURNING id, user_a, user_b, created_at
            "#,
        )
        .bind(lo)
        .bind(hi)
        .fetch_one(executor)
        .await
        .map_err(CoreError::from)
    }

    pub async fn find_by_pair(&self, user_a: Uuid, user_b: Uuid) -> CoreResult<Option<Match>> {
        let (lo, hi) = Match::canonical_pair(user_a, user_b);
        let found = sqlx::query_as::<_, Match>(
            "SELECT id, user_a, user_b, created_at FROM matches WHERE user_a = $1 AND user_b = $2",
        )
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    pub async fn find_by_id(&self, match_id: Uuid) -> CoreResult<Match> {
        sqlx::query_as::<_, Match>(
            "SELECT id, user_a, user_b, created_at FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("match"))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Match>> {
        let matches = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, user_a, user_b, created_at FROM matches
            WHERE user_a = $1 OR user_b = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(matches)
    }

    pub async fn delete<'c, E>(executor: E, match_id: Uuid) -> CoreResult<()>
    where
        E: sqlx::PgExecutor<'c>,
    {
        sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(match_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
