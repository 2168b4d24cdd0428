use crate::domain::{Credits, DAILY_FREE_LIKES};
use crate::error::CoreResult;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CreditRepository {
    pool: PgPool,
}

impl CreditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_or_create(&self, user_id: Uuid) -> CoreResult<Credits> {
        let credits = sqlx::query_as::<_, Credits>(
            r#"
            INSERT INTO credits (user_id, balance, bonus_likes, last_daily_reset)
            VALUES ($1, $2, 0, CURRENT_DATE)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, balance, bonus_likes, last_daily_reset
            "#,
        )
        .bind(user_id)
        .bind(DAILY_FREE_LIKES)
        .fetch_one(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Atomically rolls the daily free-like allotment forward if
    /// `last_daily_reset` is stale, then debits `cost` from bonus likes
    /// first and the free balance second (§4.2, §11 lazy reset). Returns
    /// `None` (without mutating anything) if the post-reset total is
    /// insufficient, so the caller can read the balance back for the
    /// `NoCredit` error's `available` field.
    pub async fn debit<'c, E>(executor: E, user_id: Uuid, cost: i32) -> CoreResult<Option<Credits>>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let today = Utc::now().date_naive();

        let result = sqlx::query_as::<_, Credits>(
            r#"
            WITH reset AS (
                UPDATE credits
                SET balance = CASE WHEN last_daily_reset < $2 THEN $3 ELSE balance END,
                    last_daily_reset = CASE WHEN last_daily_reset < $2 THEN $2 ELSE last_daily_reset END
                WHERE user_id = $1
                RETURNING user_id, balance, bonus_likes, last_daily_reset
            )
            UPDATE credits c
            SET bonus_likes = reset.bonus_likes - LEAST(reset.bonus_likes, $4),
                balance = reset.balance - GREATEST($4 - LEAST(reset.bonus_likes, $4), 0)
            FROM reset
            WHERE c.user_id = reset.user_id
              AND (reset.bonus_likes + reset.balance) >= $4
            RETURNING c.user_id, c.balance, c.bonus_likes, c.last_daily_reset
            "#,
        )
        .bind(user_id)
        .bind(today)
        .bind(DAILY_FREE_LIKES)
        .bind(cost)
        .fetch_optional(executor)
        .await?;

        Ok(result)
    }

    /// Rolls the daily reset forward (if stale) without debiting, so a
    /// balance read reflects today's allotment.
    pub async fn peek(&self, user_id: Uuid) -> CoreResult<Credits> {
        let today = Utc::now().date_naive();

        let credits = sqlx::query_as::<_, Credits>(
            r#"
            UPDATE credits
            SET balance = CASE WHEN last_daily_reset < $2 THEN $3 ELSE balance END,
                last_daily_reset = CASE WHEN last_daily_reset < $2 THEN $2 ELSE last_daily_reset END
            WHERE user_id = $1
            RETURNING user_id, balance, bonus_likes, last_daily_reset
            "#,
        )
        .bind(user_id)
        .bind(today)
        .bind(DAILY_FREE_LIKES)
        .fetch_optional(&self.pool)
        .await?;

        match credits {
            Some(c) => Ok(c),
            None => self.find_or_create(user_id).await,
        }
    }

    pub async fn add_bonus(&self, user_id: Uuid, amount: i32) -> CoreResult<Credits> {
        self.find_or_create(user_id).await?;
        let credits = sqlx::query_as::<_, Credits>(
            r#"
            UPDATE credits SET bonus_likes = bonus_likes + $2 WHERE user_id = $1
            RETURNING user_id, balance, bonus_likes, last_daily_reset
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(credits)
    }

    pub async fn refund<'c, E>(executor: E, user_id: Uuid, amount: i32) -> CoreResult<()>
    where
        E: sqlx::PgExecutor<'c>,
    {
        sqlx::query("UPDATE credits SET balance = balance + $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(executor)
            .await?;
        Ok(())
    }
}
