//! Distance and coordinate-sanitization helpers (§4.1, §9).

/// Mean earth radius in miles, matching the haversine constant the spec's
/// distance rule is built on.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance in miles, rounded to the nearest integer. `None` if
/// either side is missing coordinates (§4.1 distance fallback).
pub fn distance_miles(
    viewer: Option<(f64, f64)>,
    candidate: Option<(f64, f64)>,
) -> Option<i32> {
    let (lat1, lng1) = viewer?;
    let (lat2, lng2) = candidate?;

    let lat1r = lat1.to_radians();
    let lat2r = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1r.cos() * lat2r.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    Some((EARTH_RADIUS_MILES * c).round() as i32)
}

/// The simulator-default rectangle near Mountain View (§4.1, §9). Client
/// devices occasionally report these defaults instead of a real fix; a
/// location update landing inside it is silently dropped rather than
/// overwriting a user's real last-known position.
pub fn is_emulator_default(lat: f64, lng: f64) -> bool {
    (37.4..37.5).contains(&lat) && (-122.1..-122.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_none_without_both_coordinates() {
        assert_eq!(distance_miles(None, Some((1.0, 1.0))), None);
        assert_eq!(distance_miles(Some((1.0, 1.0)), None), None);
    }

    #[test]
    fn distance_zero_for_identical_points() {
        let p = Some((37.7749, -122.4194));
        assert_eq!(distance_miles(p, p), Some(0));
    }

    #[test]
    fn distance_sf_to_nyc_is_roughly_correct() {
        let sf = Some((37.7749, -122.4194));
        let nyc = Some((40.7128, -74.0060));
        let miles = distance_miles(sf, nyc).unwrap();
        assert!((2400..2600).contains(&miles), "got {miles}");
    }

    #[test]
    fn emulator_default_rectangle_matches_mountain_view() {
        assert!(is_emulator_default(37.45, -122.05));
        assert!(!is_emulator_default(37.7749, -122.4194));
    }
}
