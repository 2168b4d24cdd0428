use crate::domain::Message;
use crate::error::{CoreError, CoreResult};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        match_id: Uuid,
        sender_id: Uuid,
        content: Option<&str>,
        encrypted_content: Option<&str>,
        image_url: Option<&str>,
    ) -> CoreResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (match_id, sender_id, content, encrypted_content, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, match_id, sender_id, content, encrypted_content, image_url, created_at, read_at
            "#,
        )
        .bind(match_id)
        .bind(sender_id)
        .bind(content)
        .bind(encrypted_content)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn list_for_match(
        &self,
        match_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> CoreResult<Vec<Message>> {
        let messages = match before {
            Some(cursor_id) => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT id, match_id, sender_id, content, encrypted_content, image_url, created_at, read_at
                    FROM messages
                    WHERE match_id = $1 AND created_at < (SELECT created_at FROM messages WHERE id = $2)
                    ORDER BY created_at DESC
                    LIMIT $3
                    "#,
                )
                .bind(match_id)
                .bind(cursor_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT id, match_id, sender_id, content, encrypted_content, image_url, created_at, read_at
                    FROM messages
                    WHERE match_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#,
                )
                .bind(match_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(messages)
    }

    pub async fn find(&self, message_id: Uuid) -> CoreResult<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, match_id, sender_id, content, encrypted_content, image_url, created_at, read_at
            FROM messages WHERE id = $1
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("message"))
    }

    /// Marks every unread message in the match not sent by `reader_id` as
    /// read, returning the message IDs flipped (§4.3 read receipts).
    pub async fn mark_read(&self, match_id: Uuid, reader_id: Uuid) -> CoreResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE match_id = $1 AND sender_id != $2 AND read_at IS NULL
            RETURNING id
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn count_for_match(&self, match_id: Uuid) -> CoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE match_id = $1")
            .bind(match_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
