//! Integration coverage for pure logic reachable without a database or
//! Redis connection: feed alignment/distance math, domain invariants, and
//! the `CoreError` -> HTTP status mapping. `db::Store` wraps a concrete
//! `PgPool` rather than a trait, so there is no in-memory fake to stand in
//! for it here; anything that needs a live connection stays covered by the
//! colocated `#[cfg(test)]` modules instead.

use chrono::{DateTime, NaiveDate, Utc};
use core_service::domain::{age_from_dob, LookingFor, Match};
use core_service::error::CoreError;
use core_service::feed::alignment::{best_alignment, Alignment};
use core_service::feed::geo::{distance_miles, is_emulator_default};
use error_types::ServiceError;
use std::collections::HashSet;
use uuid::Uuid;

fn looking_for_set(values: &[LookingFor]) -> HashSet<LookingFor> {
    values.iter().copied().collect()
}

#[test]
fn alignment_picks_best_pair_not_first_pair() {
    // Viewer's first-listed intent is far from the candidate's, but both
    // sets contain an exact match further down the list.
    let viewer = looking_for_set(&[LookingFor::FriendsAndMore, LookingFor::Dating]);
    let candidate = looking_for_set(&[LookingFor::Dating, LookingFor::Serious]);

    assert_eq!(best_alignment(&viewer, &candidate), Some(Alignment::Perfect));
}

#[test]
fn alignment_is_none_when_every_pair_is_distant() {
    let viewer = looking_for_set(&[LookingFor::Serious]);
    let candidate = looking_for_set(&[LookingFor::MeetingPeople, LookingFor::FriendsAndMore]);

    assert_eq!(best_alignment(&viewer, &candidate), None);
}

#[test]
fn distance_zero_for_identical_coordinates() {
    let d = distance_miles(Some((37.7749, -122.4194)), Some((37.7749, -122.4194))).unwrap();
    assert_eq!(d, 0);
}

#[test]
fn distance_roughly_matches_known_city_pair() {
    // San Francisco to Los Angeles is approximately 347 miles as the crow flies.
    let d = distance_miles(Some((37.7749, -122.4194)), Some((34.0522, -118.2437))).unwrap();
    assert!((340..355).contains(&d), "expected ~347 miles, got {d}");
}

#[test]
fn distance_is_none_when_either_side_missing_coordinates() {
    assert_eq!(distance_miles(None, Some((37.7749, -122.4194))), None);
    assert_eq!(distance_miles(Some((37.7749, -122.4194)), None), None);
}

#[test]
fn emulator_default_coordinates_are_flagged() {
    assert!(is_emulator_default(37.4220, -122.0840));
    assert!(!is_emulator_default(40.7128, -74.0060));
}

#[test]
fn canonical_pair_is_stable_regardless_of_argument_order() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    assert_eq!(Match::canonical_pair(a, b), Match::canonical_pair(b, a));
}

#[test]
fn age_from_dob_handles_leap_day() {
    let dob = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
    let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    assert_eq!(age_from_dob(dob, now), 26);
}

#[test]
fn no_credit_error_reports_402_with_balance_details() {
    let err = CoreError::NoCredit {
        required: 10,
        available: 3,
    };
    let service_error: ServiceError = err.into();
    let response: error_types::http::HttpErrorResponse = service_error.into();

    assert_eq!(response.status, 402);
    assert_eq!(response.code, "NO_CREDIT");
}

#[test]
fn duplicate_like_reports_409_conflict() {
    let err = CoreError::DuplicateLike;
    let service_error: ServiceError = err.into();
    let response: error_types::http::HttpErrorResponse = service_error.into();

    assert_eq!(response.status, 409);
}

#[test]
fn self_target_reports_400_invalid_input() {
    let err = CoreError::SelfTarget;
    let service_error: ServiceError = err.into();
    let response: error_types::http::HttpErrorResponse = service_error.into();

    assert_eq!(response.status, 400);
}

#[test]
fn not_in_match_reports_403_forbidden() {
    let err = CoreError::NotInMatch;
    let service_error: ServiceError = err.into();
    let response: error_types::http::HttpErrorResponse = service_error.into();

    assert_eq!(response.status, 403);
}
