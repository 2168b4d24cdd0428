//! Ranked feed engine (§4.1): candidate-set exclusion lives in SQL, priority
//! bucketing and the forced-processing backpressure rule are pure Rust so
//! they're testable without a database.

use crate::db::Store;
use crate::domain::{Gender, LookingFor, Preferences, Profile};
use crate::error::CoreResult;
use crate::feed::alignment::{best_alignment, Alignment};
use crate::feed::geo::distance_miles;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Caps how many excluded-already candidates a single feed request scans to
/// compute `queued_likes` and rank browse candidates. Large enough that no
/// real user hits it before paginating; keeps one request from walking an
/// unbounded table.
const MAX_CANDIDATES_SCANNED: i64 = 2000;

/// Forced-processing threshold (§4.1): once this many qualified likes are
/// outstanding, the feed surfaces only qualified buckets.
const FORCED_PROCESSING_THRESHOLD: i64 = 10;

pub const MIN_FEED_LIMIT: i32 = 1;
pub const MAX_FEED_LIMIT: i32 = 50;
pub const DAILY_PICKS_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Ord derive gives ascending order; buckets are consumed high-to-low
    /// priority, so reverse this when sorting by priority.
    Browse,
    GapSuperlike,
    QualifiedLike,
    QualifiedSuperlike,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub age: i32,
    pub distance_miles: Option<i32>,
    pub priority: Priority,
    pub looking_for_alignment: Option<Alignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedResult {
    pub profiles: Vec<FeedProfile>,
    pub has_more: bool,
    pub queued_likes: i64,
    pub must_process_all: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CandidateRow {
    user_id: Uuid,
    display_name: String,
    dob: NaiveDate,
    gender: Gender,
    zip: String,
    neighborhood: Option<String>,
    bio: String,
    prompts: Vec<String>,
    kink_level: Option<i16>,
    looking_for: Vec<LookingFor>,
    lat: Option<f64>,
    lng: Option<f64>,
    is_verified: bool,
    last_active: DateTime<Utc>,
    share_code: Option<String>,
    incoming_like_is_superlike: Option<bool>,
}

impl From<CandidateRow> for Profile {
    fn from(row: CandidateRow) -> Self {
        Profile {
            user_id: row.user_id,
            display_name: row.display_name,
            dob: row.dob,
            gender: row.gender,
            zip: row.zip,
            neighborhood: row.neighborhood,
            bio: row.bio,
            prompts: row.prompts,
            kink_level: row.kink_level,
            looking_for: row.looking_for,
            lat: row.lat,
            lng: row.lng,
            is_verified: row.is_verified,
            last_active: row.last_active,
            share_code: row.share_code,
        }
    }
}

const CANDIDATE_QUERY: &str = r#"
SELECT
    p.user_id, p.display_name, p.dob, p.gender, p.zip, p.neighborhood, p.bio,
    p.prompts, p.kink_level, p.looking_for, p.lat, p.lng, p.is_verified,
    p.last_active, p.share_code,
    (SELECT l.is_superlike FROM likes l WHERE l.liker_id = p.user_id AND l.liked_id = $1 LIMIT 1)
        AS incoming_like_is_superlike
FROM profiles p
JOIN users u ON u.id = p.user_id
LEFT JOIN preferences cp ON cp.user_id = p.user_id
WHERE p.user_id != $1
  AND u.moderation_state != 'shadowbanned'
  AND NOT EXISTS (
      SELECT 1 FROM blocks b
      WHERE (b.blocker = $1 AND b.blocked = p.user_id) OR (b.blocker = p.user_id AND b.blocked = $1)
  )
  AND NOT EXISTS (SELECT 1 FROM likes l2 WHERE l2.liker_id = $1 AND l2.liked_id = p.user_id)
  AND NOT EXISTS (SELECT 1 FROM passes ps WHERE ps.passer_id = $1 AND ps.passed_id = p.user_id)
  AND NOT EXISTS (
      SELECT 1 FROM matches m
      WHERE (m.user_a = $1 AND m.user_b = p.user_id) OR (m.user_a = p.user_id AND m.user_b = $1)
  )
  AND (
      cp.visible_to_genders IS NULL OR cardinality(cp.visible_to_genders) = 0
      OR $2 = ANY(cp.visible_to_genders)
  )
  AND (cp.hard_block_genders IS NULL OR NOT ($2 = ANY(cp.hard_block_genders)))
  AND (
      cp.hard_block_age_min IS NULL OR cp.hard_block_age_max IS NULL
      OR NOT ($3 BETWEEN cp.hard_block_age_min AND cp.hard_block_age_max)
  )
ORDER BY p.last_active DESC, p.user_id ASC
LIMIT $4
"#;

/// Whether a candidate satisfies the viewer's own browse preferences:
/// gender, age range, and distance (bypassed when either side lacks
/// coordinates) (§4.1 priority bucket 1/2/4 gate).
fn qualifies_viewer_preferences(
    viewer_prefs: &Preferences,
    candidate_gender: Gender,
    candidate_age: i32,
    distance: Option<i32>,
) -> bool {
    let gender_ok = viewer_prefs.genders_seeking.is_empty()
        || viewer_prefs.genders_seeking.contains(&candidate_gender);
    let age_ok = candidate_age >= viewer_prefs.age_min && candidate_age <= viewer_prefs.age_max;
    let distance_ok = match distance {
        Some(miles) => miles <= viewer_prefs.distance_miles,
        None => true,
    };

    gender_ok && age_ok && distance_ok
}

/// Priority bucket assignment (§4.1). `None` means the candidate belongs to
/// no bucket — a non-superlike incoming like that fails the viewer's
/// preferences doesn't surface (only a superlike pierces the gap).
fn classify_priority(incoming_like_is_superlike: Option<bool>, qualifies: bool) -> Option<Priority> {
    match (incoming_like_is_superlike, qualifies) {
        (Some(true), true) => Some(Priority::QualifiedSuperlike),
        (Some(false), true) => Some(Priority::QualifiedLike),
        (Some(true), false) => Some(Priority::GapSuperlike),
        (None, true) => Some(Priority::Browse),
        (Some(false), false) | (None, false) => None,
    }
}

async fn build_feed_profiles(
    store: &Store,
    viewer_id: Uuid,
    viewer_profile: &Profile,
    viewer_prefs: &Preferences,
    now: DateTime<Utc>,
) -> CoreResult<Vec<FeedProfile>> {
    let rows = sqlx::query_as::<_, CandidateRow>(CANDIDATE_QUERY)
        .bind(viewer_id)
        .bind(viewer_profile.gender)
        .bind(viewer_profile.age_at(now))
        .bind(MAX_CANDIDATES_SCANNED)
        .fetch_all(&store.pool)
        .await?;

    let viewer_looking_for = viewer_profile.looking_for_set();
    let viewer_coords = match (viewer_profile.lat, viewer_profile.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    };

    let mut profiles = Vec::with_capacity(rows.len());
    for row in rows {
        let incoming_like_is_superlike = row.incoming_like_is_superlike;
        let age = crate::domain::age_from_dob(row.dob, now);
        let candidate_coords = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        };
        let distance = distance_miles(viewer_coords, candidate_coords);
        let gender = row.gender;
        let candidate_looking_for: std::collections::HashSet<LookingFor> =
            row.looking_for.iter().copied().collect();

        let qualifies = qualifies_viewer_preferences(viewer_prefs, gender, age, distance);
        let Some(priority) = classify_priority(incoming_like_is_superlike, qualifies) else {
            continue;
        };

        let profile: Profile = row.into();
        let looking_for_alignment = best_alignment(&viewer_looking_for, &candidate_looking_for);

        profiles.push(FeedProfile {
            profile,
            age,
            distance_miles: distance,
            priority,
            looking_for_alignment,
        });
    }

    Ok(profiles)
}

/// `GetFeed(viewer, limit)` (§4.1). `limit` must already be clamped to
/// `[MIN_FEED_LIMIT, MAX_FEED_LIMIT]` by the HTTP layer.
pub async fn get_feed(
    store: &Store,
    viewer_id: Uuid,
    limit: i32,
    now: DateTime<Utc>,
) -> CoreResult<FeedResult> {
    let viewer_profile = store.profiles.find(viewer_id).await?;
    let viewer_prefs = store.preferences.find_or_default(viewer_id).await?;

    let mut profiles =
        build_feed_profiles(store, viewer_id, &viewer_profile, &viewer_prefs, now).await?;

    // Stable sort: priority descending, then last_active descending, then id
    // ascending — SQL already sorted by (last_active desc, id asc), so a
    // stable sort by priority alone preserves that as the tiebreaker.
    profiles.sort_by(|a, b| b.priority.cmp(&a.priority));

    let queued_likes = profiles
        .iter()
        .filter(|p| matches!(p.priority, Priority::QualifiedLike | Priority::QualifiedSuperlike))
        .count() as i64;
    let must_process_all = queued_likes >= FORCED_PROCESSING_THRESHOLD;

    if must_process_all {
        profiles.retain(|p| {
            matches!(p.priority, Priority::QualifiedLike | Priority::QualifiedSuperlike)
        });
    }

    let has_more = profiles.len() > limit as usize;
    profiles.truncate(limit as usize);

    Ok(FeedResult {
        profiles,
        has_more,
        queued_likes,
        must_process_all,
    })
}

/// Daily Picks (§4.1): up to `DAILY_PICKS_COUNT` profiles, qualified
/// likes/superlikes first, filled out with top-ranked browse candidates.
pub async fn get_daily_picks(
    store: &Store,
    viewer_id: Uuid,
    now: DateTime<Utc>,
) -> CoreResult<Vec<FeedProfile>> {
    let viewer_profile = store.profiles.find(viewer_id).await?;
    let viewer_prefs = store.preferences.find_or_default(viewer_id).await?;

    let mut profiles =
        build_feed_profiles(store, viewer_id, &viewer_profile, &viewer_prefs, now).await?;
    // Already priority-ordered (qualified first); truncating to the picks
    // count naturally fills remaining slots with the top browse candidates.
    profiles.sort_by(|a, b| b.priority.cmp(&a.priority));
    profiles.truncate(DAILY_PICKS_COUNT);

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(genders_seeking: Vec<Gender>, age_min: i32, age_max: i32, distance: i32) -> Preferences {
        Preferences {
            user_id: Uuid::nil(),
            genders_seeking,
            age_min,
            age_max,
            distance_miles: distance,
            visible_to_genders: vec![],
            hard_block_genders: vec![],
            hard_block_age_min: None,
            hard_block_age_max: None,
        }
    }

    #[test]
    fn qualifies_requires_gender_age_and_distance() {
        let p = prefs(vec![Gender::Woman], 25, 35, 25);
        assert!(qualifies_viewer_preferences(&p, Gender::Woman, 30, Some(10)));
        assert!(!qualifies_viewer_preferences(&p, Gender::Man, 30, Some(10)));
        assert!(!qualifies_viewer_preferences(&p, Gender::Woman, 40, Some(10)));
        assert!(!qualifies_viewer_preferences(&p, Gender::Woman, 30, Some(50)));
    }

    #[test]
    fn missing_distance_bypasses_distance_filter() {
        let p = prefs(vec![Gender::Woman], 25, 35, 5);
        assert!(qualifies_viewer_preferences(&p, Gender::Woman, 30, None));
    }

    #[test]
    fn empty_genders_seeking_matches_anyone() {
        let p = prefs(vec![], 18, 99, 100);
        assert!(qualifies_viewer_preferences(&p, Gender::NonBinary, 20, None));
    }

    #[test]
    fn classify_priority_matches_bucket_table() {
        assert_eq!(classify_priority(Some(true), true), Some(Priority::QualifiedSuperlike));
        assert_eq!(classify_priority(Some(false), true), Some(Priority::QualifiedLike));
        assert_eq!(classify_priority(Some(true), false), Some(Priority::GapSuperlike));
        assert_eq!(classify_priority(None, true), Some(Priority::Browse));
        assert_eq!(classify_priority(None, false), None);
        assert_eq!(classify_priority(Some(false), false), None);
    }

    #[test]
    fn priority_ordering_ranks_qualified_superlike_highest() {
        assert!(Priority::QualifiedSuperlike > Priority::QualifiedLike);
        assert!(Priority::QualifiedLike > Priority::GapSuperlike);
        assert!(Priority::GapSuperlike > Priority::Browse);
    }
}
