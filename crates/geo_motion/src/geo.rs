//! Great-circle math on a spherical earth.
//!
//! Inputs are assumed finite; callers validate coordinates before calling.

use contracts::Coordinate;

/// Mean earth radius used by every formula in this module
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Initial compass bearing from `from` to `to`, in degrees within `[0, 360)`.
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine great-circle distance in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let half_dphi = (b.latitude - a.latitude).to_radians() / 2.0;
    let half_dlambda = (b.longitude - a.longitude).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Point reached by travelling `distance_km` from `origin` along `bearing_deg`.
///
/// Uses the spherical direct formula. A zero distance returns `origin` unchanged.
pub fn project(origin: Coordinate, distance_km: f64, bearing_deg: f64) -> Coordinate {
    if distance_km == 0.0 {
        return origin;
    }

    let delta = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();
    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();

    let sin_phi2 =
        (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    Coordinate::new(phi2.to_degrees(), normalize_longitude(lambda2.to_degrees()))
}

fn normalize_degrees(deg: f64) -> f64 {
    let normalized = deg.rem_euclid(360.0);
    // tiny negatives round up to exactly 360.0
    if normalized >= 360.0 { 0.0 } else { normalized }
}

fn normalize_longitude(deg: f64) -> f64 {
    if (-180.0..=180.0).contains(&deg) {
        deg
    } else {
        (deg + 540.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SEATTLE, UNIVERSITY_CAMPUS};

    fn samples() -> Vec<Coordinate> {
        vec![
            SEATTLE,
            UNIVERSITY_CAMPUS,
            Coordinate::new(0.0, 0.0),
            Coordinate::new(51.5074, -0.1278),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(35.6762, 139.6503),
            Coordinate::new(-54.8019, -68.3030),
            Coordinate::new(64.1466, -21.9426),
            Coordinate::new(1.3521, 103.8198),
        ]
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        for a in samples() {
            assert_eq!(distance_km(a, a), 0.0);
            for b in samples() {
                assert_eq!(distance_km(a, b), distance_km(b, a));
                assert!(distance_km(a, b) >= 0.0);
            }
        }
    }

    #[test]
    fn test_demo_route_distance() {
        let d = distance_km(SEATTLE, UNIVERSITY_CAMPUS);
        assert!((d - 403.3).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_bearing_range() {
        for a in samples() {
            for b in samples() {
                if a == b {
                    continue;
                }
                let brg = bearing(a, b);
                assert!((0.0..360.0).contains(&brg), "bearing {brg} out of range");
            }
        }
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((bearing(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_round_trip() {
        let points = samples();
        for a in &points {
            for b in &points {
                let d = distance_km(*a, *b);
                if d == 0.0 || d > 5000.0 {
                    continue;
                }
                let p = project(*a, d, bearing(*a, *b));
                assert!(
                    (p.latitude - b.latitude).abs() < 1e-3
                        && (p.longitude - b.longitude).abs() < 1e-3,
                    "{a:?} -> {b:?} projected to {p:?}"
                );
            }
        }
    }

    #[test]
    fn test_project_zero_is_identity() {
        assert_eq!(project(SEATTLE, 0.0, 123.0), SEATTLE);
    }

    #[test]
    fn test_project_wraps_antimeridian() {
        let p = project(Coordinate::new(0.0, 179.9), 50.0, 90.0);
        assert!(p.longitude < -179.0, "got {p:?}");
        assert!(p.is_valid());
    }

    #[test]
    fn test_project_near_pole_stays_valid() {
        let p = project(Coordinate::new(89.9, 10.0), 100.0, 0.0);
        assert!(p.is_valid(), "got {p:?}");
    }
}
