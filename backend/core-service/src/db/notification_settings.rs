use crate::domain::NotificationSettings;
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

/// Per-user push/email toggles consulted by the notification dispatcher
/// (§4.6). Rows are created lazily with all-enabled defaults so a user who
/// never visited settings still receives notifications.
#[derive(Clone)]
pub struct NotificationSettingsRepository {
    pool: PgPool,
}

impl NotificationSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_or_default(&self, user_id: Uuid) -> CoreResult<NotificationSettings> {
        let existing = sqlx::query_as::<_, NotificationSettings>(
            r#"
            SELECT user_id, globally_enabled, new_message_enabled, new_match_enabled, new_like_enabled
            FROM notification_settings WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(settings) = existing {
            return Ok(settings);
        }

        let defaults = sqlx::query_as::<_, NotificationSettings>(
            r#"
            INSERT INTO notification_settings (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, globally_enabled, new_message_enabled, new_match_enabled, new_like_enabled
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(defaults)
    }

    pub async fn upsert(
        &self,
        user_id: Uuid,
        globally_enabled: bool,
        new_message_enabled: bool,
        new_match_enabled: bool,
        new_like_enabled: bool,
    ) -> CoreResult<NotificationSettings> {
        let settings = sqlx::query_as::<_, NotificationSettings>(
            r#"
            INSERT INTO notification_settings
                (user_id, globally_enabled, new_message_enabled, new_match_enabled, new_like_enabled)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                globally_enabled = EXCLUDED.globally_enabled,
                new_message_enabled = EXCLUDED.new_message_enabled,
                new_match_enabled = EXCLUDED.new_match_enabled,
                new_like_enabled = EXCLUDED.new_like_enabled
            RETURNING user_id, globally_enabled, new_message_enabled, new_match_enabled, new_like_enabled
            "#,
        )
        .bind(user_id)
        .bind(globally_enabled)
        .bind(new_message_enabled)
        .bind(new_match_enabled)
        .bind(new_like_enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
