use crate::domain::{Gender, LookingFor, Profile};
use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: Uuid,
        display_name: &str,
        dob: NaiveDate,
        gender: Gender,
        zip: &str,
        bio: &str,
        looking_for: &[LookingFor],
    ) -> CoreResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, display_name, dob, gender, zip, bio, looking_for, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            RETURNING user_id, display_name, dob, gender, zip, neighborhood, bio,
                      prompts, kink_level, looking_for, lat, lng, is_verified,
                      last_active, share_code
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(dob)
        .bind(gender)
        .bind(zip)
        .bind(bio)
        .bind(looking_for)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn find(&self, user_id: Uuid) -> CoreResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, display_name, dob, gender, zip, neighborhood, bio,
                   prompts, kink_level, looking_for, lat, lng, is_verified,
                   last_active, share_code
            FROM profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("profile"))
    }

    pub async fn find_by_share_code(&self, share_code: &str) -> CoreResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, display_name, dob, gender, zip, neighborhood, bio,
                   prompts, kink_level, looking_for, lat, lng, is_verified,
                   last_active, share_code
            FROM profiles WHERE share_code = $1
            "#,
        )
        .bind(share_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Lazily mints a share code the first time a profile's card is shared
    /// (§11): an 8-character base62 token, retried on unique collision.
    pub async fn ensure_share_code(&self, user_id: Uuid) -> CoreResult<String> {
        if let Some(code) = sqlx::query_scalar::<_, Option<String>>(
            "SELECT share_code FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .flatten()
        {
            return Ok(code);
        }

        for _ in 0..5 {
            let candidate = crypto_core::random_token(8);
            let result = sqlx::query(
                "UPDATE profiles SET share_code = $1 WHERE user_id = $2 AND share_code IS NULL",
            )
            .bind(&candidate)
            .bind(user_id)
            .execute(&self.pool)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => return Ok(candidate),
                Ok(_) => {
                    // Someone else set it concurrently; re-read.
                    if let Some(code) = sqlx::query_scalar::<_, Option<String>>(
                        "SELECT share_code FROM profiles WHERE user_id = $1",
                    )
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .flatten()
                    {
                        return Ok(code);
                    }
                }
                Err(e) if e.as_database_error().map(|d| d.is_unique_violation()) == Some(true) => {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CoreError::Internal(anyhow::anyhow!(
            "exhausted share code retries"
        )))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        user_id: Uuid,
        display_name: &str,
        neighborhood: Option<&str>,
        bio: &str,
        prompts: &[String],
        looking_for: &[LookingFor],
    ) -> CoreResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET display_name = $2, neighborhood = $3, bio = $4, prompts = $5, looking_for = $6
            WHERE user_id = $1
            RETURNING user_id, display_name, dob, gender, zip, neighborhood, bio,
                      prompts, kink_level, looking_for, lat, lng, is_verified,
                      last_active, share_code
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .bind(neighborhood)
        .bind(bio)
        .bind(prompts)
        .bind(looking_for)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("profile"))?;

        Ok(profile)
    }

    /// Updates a profile's last-known coordinates (§4.1). A client report
    /// landing inside the simulator-default rectangle near Mountain View is
    /// silently discarded; the previously stored coordinates are retained
    /// (§9 "preference sanitization").
    pub async fn update_location(&self, user_id: Uuid, lat: f64, lng: f64) -> CoreResult<()> {
        if crate::feed::geo::is_emulator_default(lat, lng) {
            tracing::debug!(%user_id, "discarding emulator-default coordinate update");
            return Ok(());
        }

        sqlx::query("UPDATE profiles SET lat = $2, lng = $3 WHERE user_id = $1")
            .bind(user_id)
            .bind(lat)
            .bind(lng)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_last_active(&self, user_id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE profiles SET last_active = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
