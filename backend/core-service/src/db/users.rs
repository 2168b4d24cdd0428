use crate::domain::User;
use crate::error::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: Option<&str>,
        phone: Option<&str>,
    ) -> CoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, phone)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, phone, email_verified,
                      is_admin, moderation_state, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> CoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, phone, email_verified,
                   is_admin, moderation_state, created_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("user"))
    }

    pub async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, phone, email_verified,
                   is_admin, moderation_state, created_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn mark_email_verified(&self, user_id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE users SET email_verified = true WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_moderation_state(
        &self,
        user_id: Uuid,
        state: crate::domain::ModerationState,
    ) -> CoreResult<()> {
        sqlx::query("UPDATE users SET moderation_state = $1 WHERE id = $2")
            .bind(state)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
