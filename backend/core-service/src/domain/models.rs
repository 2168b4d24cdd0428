//! Core data model (spec §3). Storage representation is sqlx/Postgres; these
//! are the in-process shapes the domain and HTTP layers operate on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Man,
    Woman,
    NonBinary,
    Trans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModerationState {
    Active,
    Warned,
    Suspended,
    Shadowbanned,
}

/// §3 Looking-for spectrum. Ordinal position is the axis §4.1's alignment
/// scoring walks; keep the declaration order in sync with that ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LookingFor {
    Serious,
    Relationship,
    Dating,
    MeetingPeople,
    FriendsAndMore,
}

impl LookingFor {
    pub fn ordinal(self) -> u8 {
        match self {
            LookingFor::Serious => 0,
            LookingFor::Relationship => 1,
            LookingFor::Dating => 2,
            LookingFor::MeetingPeople => 3,
            LookingFor::FriendsAndMore => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub is_admin: bool,
    pub moderation_state: ModerationState,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_shadowbanned(&self) -> bool {
        self.moderation_state == ModerationState::Shadowbanned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: String,
    pub dob: chrono::NaiveDate,
    pub gender: Gender,
    pub zip: String,
    pub neighborhood: Option<String>,
    pub bio: String,
    /// Ordered, at most `MAX_PROMPTS` entries (§3 `prompts:ordered[<=N]`).
    pub prompts: Vec<String>,
    pub kink_level: Option<i16>,
    pub looking_for: Vec<LookingFor>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_verified: bool,
    pub last_active: DateTime<Utc>,
    pub share_code: Option<String>,
}

pub const MAX_PROMPTS: usize = 3;
pub const MAX_PHOTOS: usize = 5;
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 99;

impl Profile {
    /// `age = floor(years(now - dob))` (§3).
    pub fn age_at(&self, now: DateTime<Utc>) -> i32 {
        age_from_dob(self.dob, now)
    }

    pub fn looking_for_set(&self) -> HashSet<LookingFor> {
        self.looking_for.iter().copied().collect()
    }
}

/// Shared by `Profile::age_at` and registration validation so both apply the
/// identical floor-years rule (§3 `age = floor(years(now - dob))`).
pub fn age_from_dob(dob: chrono::NaiveDate, now: DateTime<Utc>) -> i32 {
    let today = now.date_naive();
    let mut age = today.years_since(dob).unwrap_or(0) as i32;
    // `years_since` already floors, but guard against a birthday that hasn't
    // occurred yet this year when the two dates share a year boundary.
    if age < 0 {
        age = 0;
    }
    age
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub position: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preferences {
    pub user_id: Uuid,
    pub genders_seeking: Vec<Gender>,
    pub age_min: i32,
    pub age_max: i32,
    pub distance_miles: i32,
    pub visible_to_genders: Vec<Gender>,
    pub hard_block_genders: Vec<Gender>,
    pub hard_block_age_min: Option<i32>,
    pub hard_block_age_max: Option<i32>,
}

impl Preferences {
    pub fn genders_seeking_set(&self) -> HashSet<Gender> {
        self.genders_seeking.iter().copied().collect()
    }

    pub fn visible_to_set(&self) -> HashSet<Gender> {
        self.visible_to_genders.iter().copied().collect()
    }

    pub fn hard_block_set(&self) -> HashSet<Gender> {
        self.hard_block_genders.iter().copied().collect()
    }

    pub fn hard_blocks_age(&self, age: i32) -> bool {
        match (self.hard_block_age_min, self.hard_block_age_max) {
            (Some(lo), Some(hi)) => age >= lo && age <= hi,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub id: Uuid,
    pub liker_id: Uuid,
    pub liked_id: Uuid,
    pub is_superlike: bool,
    pub attached_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pass {
    pub passer_id: Uuid,
    pub passed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub const REWIND_WINDOW_SECONDS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Canonical ordering `user_a < user_b` (§3).
    pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.user_a == user_id {
            self.user_b
        } else {
            self.user_a
        }
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub encrypted_content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImagePermission {
    pub match_id: Uuid,
    pub user_id: Uuid,
    pub enabled: bool,
    pub enabled_at: Option<DateTime<Utc>>,
}

pub const IMAGE_UNLOCK_MESSAGE_COUNT: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Block {
    pub blocker: Uuid,
    pub blocked: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credits {
    pub user_id: Uuid,
    pub balance: i32,
    pub bonus_likes: i32,
    pub last_daily_reset: chrono::NaiveDate,
}

pub const DAILY_FREE_LIKES: i32 = 10;
pub const LIKE_COST: i32 = 1;
pub const SUPERLIKE_COST: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PushToken {
    pub user_id: Uuid,
    pub token: String,
    pub platform: Platform,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshHandle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MagicToken {
    pub id: Uuid,
    pub email: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

pub const MAGIC_TOKEN_TTL_SECONDS: i64 = 15 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationSettings {
    pub user_id: Uuid,
    pub globally_enabled: bool,
    pub new_message_enabled: bool,
    pub new_match_enabled: bool,
    pub new_like_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            user_id: Uuid::nil(),
            globally_enabled: true,
            new_message_enabled: true,
            new_match_enabled: true,
            new_like_enabled: true,
        }
    }
}

/// A user-filed report against another user (`POST /report/{id}`, §6). The
/// core's only responsibility here is the insert-only record; routing it to
/// a review queue and any resulting moderation action are out-of-core (§4.7
/// "out-of-core management surface").
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn age_from_dob_floors_years() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let just_before_birthday = DateTime::parse_from_rfc3339("2026-06-14T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let just_after_birthday = DateTime::parse_from_rfc3339("2026-06-16T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(age_from_dob(dob, just_before_birthday), 25);
        assert_eq!(age_from_dob(dob, just_after_birthday), 26);
    }

    #[test]
    fn canonical_pair_orders_low_to_high() {
        let a = Uuid::from_u128(5);
        let b = Uuid::from_u128(2);
        let (lo, hi) = Match::canonical_pair(a, b);
        assert_eq!(lo, b);
        assert_eq!(hi, a);
    }

    #[test]
    fn looking_for_ordinal_matches_spectrum_order() {
        assert_eq!(LookingFor::Serious.ordinal(), 0);
        assert_eq!(LookingFor::FriendsAndMore.ordinal(), 4);
    }
}
