//! Within-day visit ordering.
//!
//! Greedy nearest-neighbor: O(n²) in the number of stops, which is fine for
//! the handful of POIs a day holds and not meant for large sets.

use serde::{Deserialize, Serialize};

use crate::haversine::{haversine_m, Coord};
use crate::model::{DayPlan, Diagnostic, OvernightTransition, PlannedStop, ScoredPoi};
use crate::polyline::Polyline;

/// Soft limits a day route is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteLimits {
    pub max_daily_distance_m: f64,
    pub long_segment_m: f64,
    pub min_pois_per_day: usize,
}

impl Default for RouteLimits {
    fn default() -> Self {
        Self {
            max_daily_distance_m: 50_000.0,
            long_segment_m: 20_000.0,
            min_pois_per_day: 3,
        }
    }
}

/// Order one day's POIs into a route.
///
/// Starts at the POI nearest `start_hint` when given, otherwise at the
/// highest-priority POI. Ties on distance go to the higher priority, then to
/// the earlier input position. The first stop always has a distance of 0.
pub fn sequence(day: usize, pois: &[ScoredPoi], start_hint: Option<&ScoredPoi>) -> DayPlan {
    let order = nearest_neighbor_order(pois, start_hint.map(ScoredPoi::coords));

    let mut stops = Vec::with_capacity(order.len());
    let mut previous: Option<Coord> = None;
    for (position, &i) in order.iter().enumerate() {
        let here = pois[i].coords();
        let distance_from_previous_m = previous.map_or(0.0, |prev| haversine_m(prev, here));
        stops.push(PlannedStop {
            poi: pois[i].clone(),
            sequence_no: position + 1,
            distance_from_previous_m,
        });
        previous = Some(here);
    }

    let route = Polyline::new(stops.iter().map(|s| s.poi.coords()).collect());
    DayPlan {
        day,
        total_distance_m: route.length_m(),
        stops,
        overnight_transition: None,
        route,
    }
}

fn nearest_neighbor_order(pois: &[ScoredPoi], start_hint: Option<Coord>) -> Vec<usize> {
    if pois.is_empty() {
        return Vec::new();
    }

    let mut visited = vec![false; pois.len()];
    let first = match start_hint {
        Some(hint) => nearest_unvisited(hint, pois, &visited),
        None => Some(highest_priority(pois)),
    };
    let Some(first) = first else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(pois.len());
    visited[first] = true;
    order.push(first);

    while order.len() < pois.len() {
        let current = pois[order[order.len() - 1]].coords();
        let Some(next) = nearest_unvisited(current, pois, &visited) else {
            break;
        };
        visited[next] = true;
        order.push(next);
    }
    order
}

fn nearest_unvisited(from: Coord, pois: &[ScoredPoi], visited: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, poi) in pois.iter().enumerate() {
        if visited[i] {
            continue;
        }
        let d = haversine_m(from, poi.coords());
        let better = match best {
            None => true,
            Some((b, best_d)) => d < best_d || (d == best_d && poi.priority_score > pois[b].priority_score),
        };
        if better {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

fn highest_priority(pois: &[ScoredPoi]) -> usize {
    let mut best = 0;
    for (i, poi) in pois.iter().enumerate().skip(1) {
        if poi.priority_score > pois[best].priority_score {
            best = i;
        }
    }
    best
}

/// Fill in the overnight transition of every day after the first.
///
/// Informational only; it does not change any day's order. Empty days break
/// the chain and get no transition.
pub fn link_days(days: &mut [DayPlan]) {
    for k in 1..days.len() {
        let (before, after) = days.split_at_mut(k);
        let today = &mut after[0];
        today.overnight_transition = match (before[k - 1].last(), today.first()) {
            (Some(from), Some(to)) => Some(OvernightTransition {
                from: from.poi.id().clone(),
                from_name: from.poi.name().to_string(),
                to: to.poi.id().clone(),
                to_name: to.poi.name().to_string(),
                distance_m: haversine_m(from.poi.coords(), to.poi.coords()),
            }),
            _ => None,
        };
    }
}

/// Check a sequenced day against soft route limits.
pub fn validate_day(plan: &DayPlan, limits: &RouteLimits) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();

    if plan.total_distance_m > limits.max_daily_distance_m {
        warnings.push(Diagnostic::DailyDistanceExceeded {
            day: plan.day,
            total_m: plan.total_distance_m,
            limit_m: limits.max_daily_distance_m,
        });
    }

    for pair in plan.stops.windows(2) {
        let hop = pair[1].distance_from_previous_m;
        if hop > limits.long_segment_m {
            warnings.push(Diagnostic::LongSegment {
                day: plan.day,
                from: pair[0].poi.id().clone(),
                to: pair[1].poi.id().clone(),
                distance_m: hop,
            });
        }
    }

    if plan.len() < limits.min_pois_per_day {
        warnings.push(Diagnostic::SparseDay {
            day: plan.day,
            pois: plan.len(),
            minimum: limits.min_pois_per_day,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CandidatePoi;

    fn scored(id: &str, lat: f64, lon: f64, priority: f64) -> ScoredPoi {
        ScoredPoi {
            poi: CandidatePoi::new(id, id, lat, lon),
            priority_score: priority,
            additive_boost: 0.0,
            multiplier: 1.0,
            breakdown: Vec::new(),
        }
    }

    fn ids(plan: &DayPlan) -> Vec<&str> {
        plan.place_ids().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_starts_at_highest_priority() {
        let pois = vec![
            scored("a", 0.0, 0.0, 10.0),
            scored("b", 0.0, 0.2, 50.0),
            scored("c", 0.0, 0.1, 20.0),
        ];
        let plan = sequence(1, &pois, None);
        assert_eq!(ids(&plan), vec!["b", "c", "a"]);
        assert_eq!(plan.stops[0].distance_from_previous_m, 0.0);
        assert_eq!(plan.stops[0].sequence_no, 1);
        assert_eq!(plan.stops[2].sequence_no, 3);
    }

    #[test]
    fn test_start_hint_picks_nearest_first() {
        let pois = vec![scored("far", 0.0, 1.0, 99.0), scored("near", 0.0, 0.1, 1.0)];
        let hint = scored("hotel", 0.0, 0.0, 0.0);
        let plan = sequence(2, &pois, Some(&hint));
        assert_eq!(ids(&plan), vec!["near", "far"]);
        assert_eq!(plan.stops[0].distance_from_previous_m, 0.0);
    }

    #[test]
    fn test_distance_ties_go_to_higher_priority() {
        let pois = vec![
            scored("start", 0.0, 0.0, 100.0),
            scored("east", 0.0, 0.1, 10.0),
            scored("west", 0.0, -0.1, 20.0),
        ];
        let plan = sequence(1, &pois, None);
        assert_eq!(ids(&plan), vec!["start", "west", "east"]);
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let pois = vec![scored("x", 0.0, 0.0, 5.0), scored("y", 0.0, 0.0, 5.0), scored("z", 0.0, 0.0, 5.0)];
        let plan = sequence(1, &pois, None);
        assert_eq!(ids(&plan), vec!["x", "y", "z"]);
        assert_eq!(plan.total_distance_m, 0.0);
    }

    #[test]
    fn test_total_distance_matches_stops_and_route() {
        let pois = vec![
            scored("a", 5.4141, 100.3288, 30.0),
            scored("b", 5.4164, 100.3327, 20.0),
            scored("c", 5.4089, 100.3442, 10.0),
        ];
        let plan = sequence(1, &pois, None);
        let sum: f64 = plan.stops.iter().map(|s| s.distance_from_previous_m).sum();
        assert!((plan.total_distance_m - sum).abs() < 1e-6);
        assert_eq!(plan.route.points().len(), 3);
        assert_eq!(plan.route.points()[0], (5.4141, 100.3288));
    }

    #[test]
    fn test_empty_day() {
        let plan = sequence(1, &[], None);
        assert!(plan.is_empty());
        assert_eq!(plan.total_distance_m, 0.0);
    }

    #[test]
    fn test_link_days() {
        let mut days = vec![
            sequence(1, &[scored("a", 0.0, 0.0, 1.0)], None),
            sequence(2, &[scored("b", 0.0, 0.1, 1.0)], None),
        ];
        link_days(&mut days);
        assert!(days[0].overnight_transition.is_none());
        let transition = days[1].overnight_transition.as_ref().unwrap();
        assert_eq!(transition.from.as_str(), "a");
        assert_eq!(transition.to.as_str(), "b");
        assert!((transition.distance_m - 11_119.5).abs() < 1.0);
    }

    #[test]
    fn test_validate_day_flags_long_routes() {
        let pois = vec![
            scored("a", 0.0, 0.0, 3.0),
            scored("b", 0.0, 0.5, 2.0),
        ];
        let plan = sequence(4, &pois, None);
        let warnings = validate_day(&plan, &RouteLimits::default());
        assert!(warnings.iter().any(|w| matches!(w, Diagnostic::DailyDistanceExceeded { day: 4, .. })));
        assert!(warnings.iter().any(|w| matches!(w, Diagnostic::LongSegment { day: 4, .. })));
        assert!(warnings.iter().any(|w| matches!(w, Diagnostic::SparseDay { pois: 2, minimum: 3, .. })));
    }

    #[test]
    fn test_validate_day_quiet_for_compact_route() {
        let pois = vec![
            scored("a", 5.4141, 100.3288, 3.0),
            scored("b", 5.4164, 100.3327, 2.0),
            scored("c", 5.4185, 100.3324, 1.0),
        ];
        let plan = sequence(1, &pois, None);
        assert!(validate_day(&plan, &RouteLimits::default()).is_empty());
    }
}
