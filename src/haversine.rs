//! Great-circle geometry on a spherical earth.
//!
//! Straight-line distances only; roads are ignored. Every function here is
//! pure so the planner stages can share them without hidden state.

use crate::error::GeoError;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A (latitude, longitude) pair in degrees.
pub type Coord = (f64, f64);

/// Check that a coordinate is finite and inside the valid lat/lon ranges.
pub fn validate(coord: Coord) -> Result<(), GeoError> {
    let (lat, lon) = coord;
    let in_range = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);

    if in_range {
        Ok(())
    } else {
        Err(GeoError::InvalidCoordinate { lat, lon })
    }
}

/// Great-circle distance between two points in meters.
///
/// Symmetric, never negative, and exactly `0.0` for identical points.
pub fn distance_m(from: Coord, to: Coord) -> Result<f64, GeoError> {
    validate(from)?;
    validate(to)?;
    Ok(haversine_m(from, to))
}

/// Unchecked haversine; callers must have validated both points.
pub(crate) fn haversine_m(from: Coord, to: Coord) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Arithmetic mean of a set of points, or `None` when empty.
///
/// Good enough at city and region scale; not meant for sets spanning the
/// antimeridian.
pub fn centroid(points: &[Coord]) -> Option<Coord> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lon_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.0, lon + p.1));
    Some((lat_sum / n, lon_sum / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let dist = distance_m((5.4141, 100.3288), (5.4141, 100.3288)).unwrap();
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Penang (Komtar) to Kuala Lumpur (KLCC), roughly 290 km
        let dist = distance_m((5.4141, 100.3288), (3.1579, 101.7123)).unwrap();
        assert!(dist > 280_000.0 && dist < 300_000.0, "Penang to KL should be ~290km, got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = (36.17, -115.14);
        let b = (34.05, -118.24);
        assert_eq!(distance_m(a, b).unwrap(), distance_m(b, a).unwrap());
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let dist = distance_m((0.0, 0.0), (0.0, 180.0)).unwrap();
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let err = distance_m((90.5, 0.0), (0.0, 0.0)).unwrap_err();
        assert_eq!(err, GeoError::InvalidCoordinate { lat: 90.5, lon: 0.0 });
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(validate((f64::NAN, 0.0)).is_err());
        assert!(validate((0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(validate((90.0, 180.0)).is_ok());
        assert!(validate((-90.0, -180.0)).is_ok());
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[(1.0, 2.0), (3.0, 4.0)]).unwrap();
        assert_eq!(c, (2.0, 3.0));
    }
}
