use crate::domain::Report;
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        reporter_id: Uuid,
        reported_id: Uuid,
        reason: &str,
    ) -> CoreResult<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (id, reporter_id, reported_id, reason, created_at)
            VALUES (gen_random_uuid(), $1, $2, $3, now())
            RETURNING id, reporter_id, reported_id, reason, created_at
            "#,
        )
        .bind(reporter_id)
        .bind(reported_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(report)
    }
}
