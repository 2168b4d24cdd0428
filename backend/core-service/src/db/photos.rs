use crate::domain::{Photo, MAX_PHOTOS};
use crate::error::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, user_id, url, position FROM photos WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    pub async fn add(&self, user_id: Uuid, url: &str) -> CoreResult<Photo> {
        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        if existing as usize >= MAX_PHOTOS {
            return Err(CoreError::Validation(format!(
                "cannot exceed {} photos",
                MAX_PHOTOS
            )));
        }

        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (user_id, url, position)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, url, position
            "#,
        )
        .bind(user_id)
        .bind(url)
        .bind(existing as i16)
        .fetch_one(&self.pool)
        .await?;

        Ok(photo)
    }

    pub async fn remove(&self, user_id: Uuid, photo_id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1 AND user_id = $2")
            .bind(photo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("photo"));
        }

        sqlx::query(
            r#"
            UPDATE photos SET position = sub.rn - 1
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY position) AS rn
                FROM photos WHERE user_id = $1
            ) sub
            WHERE photos.id = sub.id
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn reorder(&self, user_id: Uuid, ordered_ids: &[Uuid]) -> CoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for (position, photo_id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE photos SET position = $1 WHERE id = $2 AND user_id = $3")
                .bind(position as i16)
                .bind(photo_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
