//! Route geometry for a sequenced day.
//!
//! A day's stops in visit order, kept as decoded coordinates so the output
//! layer can draw the route or re-encode it for a map widget.

use serde::{Deserialize, Serialize};

use crate::haversine::{haversine_m, Coord};

/// A polyline representing a day route as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coord>,
}

impl Polyline {
    /// Creates a new Polyline from (latitude, longitude) points.
    pub fn new(points: Vec<Coord>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coord> {
        self.points
    }

    /// Lengths of each consecutive segment in meters.
    ///
    /// Points must already be valid coordinates.
    pub fn segment_lengths_m(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|pair| haversine_m(pair[0], pair[1]))
            .collect()
    }

    /// Total great-circle length in meters.
    pub fn length_m(&self) -> f64 {
        self.segment_lengths_m().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_points() {
        let points = vec![(5.4141, 100.3288), (5.4164, 100.3327), (5.4089, 100.3442)];
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
        assert_eq!(polyline.into_points(), points);
    }

    #[test]
    fn test_empty_and_single_point_have_zero_length() {
        assert_eq!(Polyline::new(vec![]).length_m(), 0.0);
        assert_eq!(Polyline::new(vec![(5.4, 100.3)]).length_m(), 0.0);
    }

    #[test]
    fn test_length_is_sum_of_segments() {
        let polyline = Polyline::new(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        let segments = polyline.segment_lengths_m();
        assert_eq!(segments.len(), 2);
        // One degree on the equator is ~111.2 km.
        assert!((segments[0] - 111_195.0).abs() < 10.0);
        assert_eq!(polyline.length_m(), segments[0] + segments[1]);
    }
}
