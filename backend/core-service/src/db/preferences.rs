use crate::domain::{Gender, Preferences};
use crate::error::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_or_default(&self, user_id: Uuid) -> CoreResult<Preferences> {
        let existing = sqlx::query_as::<_, Preferences>(
            r#"
            SELECT user_id, genders_seeking, age_min, age_max, distance_miles,
                   visible_to_genders, hard_block_genders, hard_block_age_min,
                   hard_block_age_max
            FROM preferences WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(prefs) = existing {
            return Ok(prefs);
        }

        let defaults = sqlx::query_as::<_, Preferences>(
            r#"
            INSERT INTO preferences (user_id, genders_seeking, age_min, age_max, distance_miles, visible_to_genders, hard_block_genders)
            VALUES ($1, '{}', 18, 99, 50, '{}', '{}')
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, genders_seeking, age_min, age_max, distance_miles,
                      visible_to_genders, hard_block_genders, hard_block_age_min,
                      hard_block_age_max
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(defaults)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        user_id: Uuid,
        genders_seeking: &[Gender],
        age_min: i32,
        age_max: i32,
        distance_miles: i32,
        visible_to_genders: &[Gender],
        hard_block_genders: &[Gender],
        hard_block_age_min: Option<i32>,
        hard_block_age_max: Option<i32>,
    ) -> CoreResult<Preferences> {
        let prefs = sqlx::query_as::<_, Preferences>(
            r#"
            INSERT INTO preferences (
                user_id, genders_seeking, age_min, age_max, distance_miles,
                visible_to_genders, hard_block_genders, hard_block_age_min, hard_block_age_max
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                genders_seeking = EXCLUDED.genders_seeking,
                age_min = EXCLUDED.age_min,
                age_max = EXCLUDED.age_max,
                distance_miles = EXCLUDED.distance_miles,
                visible_to_genders = EXCLUDED.visible_to_genders,
                hard_block_genders = EXCLUDED.hard_block_genders,
                hard_block_age_min = EXCLUDED.hard_block_age_min,
                hard_block_age_max = EXCLUDED.hard_block_age_max
            RETURNING user_id, genders_seeking, age_min, age_max, distance_miles,
                      visible_to_genders, hard_block_genders, hard_block_age_min,
                      hard_block_age_max
            "#,
        )
        .bind(user_id)
        .bind(genders_seeking)
        .bind(age_min)
        .bind(age_max)
        .bind(distance_miles)
        .bind(visible_to_genders)
        .bind(hard_block_genders)
        .bind(hard_block_age_min)
        .bind(hard_block_age_max)
        .fetch_one(&self.pool)
        .await?;

        Ok(prefs)
    }
}
