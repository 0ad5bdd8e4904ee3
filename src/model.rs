//! Planner data model.
//!
//! Everything here is built fresh for one planning request and thrown away
//! once the [`TripPlan`] is returned.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::haversine::Coord;
use crate::polyline::Polyline;

/// Opaque catalog identifier of a place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A point of interest as loaded from the catalog.
///
/// `id`, `name`, `lat` and `lon` are required when deserializing; every
/// quality and behavioral signal is optional and counts as zero when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoi {
    pub id: PlaceId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Externally sourced popularity; the base of the priority score.
    #[serde(default)]
    pub popularity: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    /// Number of external knowledge-base cross references (e.g. wiki sitelinks).
    #[serde(default)]
    pub cross_reference_count: Option<u32>,
    #[serde(default)]
    pub curated: bool,
    #[serde(default)]
    pub viewed: bool,
    #[serde(default)]
    pub collected: bool,
    #[serde(default)]
    pub used_in_trip: bool,
    /// State or province the POI belongs to.
    #[serde(default)]
    pub region: Option<String>,
}

impl CandidatePoi {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: PlaceId::new(id),
            name: name.into(),
            lat,
            lon,
            categories: Vec::new(),
            popularity: 0,
            rating: None,
            review_count: None,
            cross_reference_count: None,
            curated: false,
            viewed: false,
            collected: false,
            used_in_trip: false,
            region: None,
        }
    }

    pub fn coords(&self) -> Coord {
        (self.lat, self.lon)
    }
}

/// Place ids the user has interacted with before.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSignals {
    pub viewed: BTreeSet<PlaceId>,
    pub collected: BTreeSet<PlaceId>,
    /// Places that appear in one of the user's previously saved trips.
    pub saved_trip: BTreeSet<PlaceId>,
}

/// Structured trip request, already validated by the request parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub destination_region: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub travelers: u32,
    pub trip_duration_days: u32,
    #[serde(default)]
    pub preferred_names: Vec<String>,
    #[serde(default)]
    pub behavior: BehaviorSignals,
}

impl UserContext {
    pub fn new(trip_duration_days: u32) -> Self {
        Self {
            destination_region: None,
            interests: Vec::new(),
            travelers: 1,
            trip_duration_days,
            preferred_names: Vec::new(),
            behavior: BehaviorSignals::default(),
        }
    }
}

/// One scoring layer that changed a POI's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum ScoreAdjustment {
    PreferredName { matched: String, factor: f64 },
    InterestMatch { factor: f64 },
    GroupSize { travelers: u32, factor: f64 },
    Landmark { cross_references: u32, factor: f64 },
    Behavior { additive: f64, multiplier: f64 },
}

/// A candidate annotated with its priority for one user's trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoi {
    #[serde(flatten)]
    pub poi: CandidatePoi,
    pub priority_score: f64,
    pub additive_boost: f64,
    pub multiplier: f64,
    #[serde(default)]
    pub breakdown: Vec<ScoreAdjustment>,
}

impl ScoredPoi {
    pub fn id(&self) -> &PlaceId {
        &self.poi.id
    }

    pub fn name(&self) -> &str {
        &self.poi.name
    }

    pub fn coords(&self) -> Coord {
        self.poi.coords()
    }
}

/// A POI placed in a day's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStop {
    #[serde(flatten)]
    pub poi: ScoredPoi,
    /// 1-based position within the day.
    pub sequence_no: usize,
    pub distance_from_previous_m: f64,
}

/// Travel from one day's last stop to the next day's first stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvernightTransition {
    pub from: PlaceId,
    pub from_name: String,
    pub to: PlaceId,
    pub to_name: String,
    pub distance_m: f64,
}

/// The ordered visits for one trip day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based day number.
    pub day: usize,
    pub stops: Vec<PlannedStop>,
    pub total_distance_m: f64,
    pub overnight_transition: Option<OvernightTransition>,
    pub route: Polyline,
}

impl DayPlan {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn first(&self) -> Option<&PlannedStop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&PlannedStop> {
        self.stops.last()
    }

    pub fn place_ids(&self) -> impl Iterator<Item = &PlaceId> {
        self.stops.iter().map(|stop| stop.poi.id())
    }
}

/// Which day-allocation strategy produced the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringStrategy {
    AnchorBased,
    Simple,
}

/// Why the anchor-based strategy was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    SingleDay,
    NoAnchors,
    InvalidAnchorCoordinates,
}

/// A recoverable condition encountered while planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    EmptyCandidatePool,
    InvalidCoordinate {
        place_id: PlaceId,
        name: String,
        lat: f64,
        lon: f64,
    },
    OutOfRegion {
        place_id: PlaceId,
        name: String,
        region: Option<String>,
    },
    /// Not a preferred place and has no positive popularity to rank on.
    ZeroPopularity {
        place_id: PlaceId,
        name: String,
        popularity: i64,
    },
    UnresolvedAnchor {
        preferred_name: String,
    },
    /// More anchors landed on one day than it has room for.
    /// `relocated_to` is `None` when no day had room and the anchor stayed.
    AnchorCapacityOverflow {
        place_id: PlaceId,
        name: String,
        day: usize,
        capacity: usize,
        relocated_to: Option<usize>,
    },
    InsufficientCandidates {
        day: usize,
        capacity: usize,
        placed: usize,
    },
    ClusteringFallback {
        reason: FallbackReason,
    },
    CatalogUnavailable {
        day: usize,
        message: String,
    },
    DailyDistanceExceeded {
        day: usize,
        total_m: f64,
        limit_m: f64,
    },
    LongSegment {
        day: usize,
        from: PlaceId,
        to: PlaceId,
        distance_m: f64,
    },
    SparseDay {
        day: usize,
        pois: usize,
        minimum: usize,
    },
}

/// Aggregate figures over the whole trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub days_requested: usize,
    pub days_planned: usize,
    pub total_pois: usize,
    pub total_distance_m: f64,
    pub avg_distance_per_day_m: f64,
    pub avg_pois_per_day: f64,
    /// Days that ended up with fewer POIs than `max_pois_per_day`.
    pub underfilled_days: usize,
    /// Regular POIs that were eligible but did not fit anywhere.
    pub held_back: usize,
    /// Share of placed POIs per interest category, zero shares omitted.
    #[serde(default)]
    pub activity_mix: BTreeMap<String, f64>,
}

/// The full multi-day itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub days: Vec<DayPlan>,
    pub trip_summary: TripSummary,
    pub clustering_strategy_used: Option<ClusteringStrategy>,
    pub preferred_names_requested: usize,
    pub anchors_resolved: usize,
    pub anchors_placed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl TripPlan {
    /// A plan with no days, carrying the reason in `diagnostics`.
    pub fn empty(days_requested: usize, preferred_names_requested: usize, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            days: Vec::new(),
            trip_summary: TripSummary {
                days_requested,
                ..TripSummary::default()
            },
            clustering_strategy_used: None,
            preferred_names_requested,
            anchors_resolved: 0,
            anchors_placed: 0,
            diagnostics,
        }
    }

    pub fn total_pois(&self) -> usize {
        self.days.iter().map(DayPlan::len).sum()
    }

    /// Day number holding `id`, if placed.
    pub fn day_of(&self, id: &PlaceId) -> Option<usize> {
        self.days
            .iter()
            .find(|day| day.place_ids().any(|placed| placed == id))
            .map(|day| day.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_requires_id_and_coordinates() {
        let missing_lat = r#"{"id": "p1", "name": "Komtar", "lon": 100.3}"#;
        assert!(serde_json::from_str::<CandidatePoi>(missing_lat).is_err());

        let minimal = r#"{"id": "p1", "name": "Komtar", "lat": 5.41, "lon": 100.33}"#;
        let poi: CandidatePoi = serde_json::from_str(minimal).unwrap();
        assert_eq!(poi.id, PlaceId::new("p1"));
        assert_eq!(poi.popularity, 0);
        assert!(poi.review_count.is_none());
        assert!(!poi.collected);
    }

    #[test]
    fn test_diagnostic_is_tagged() {
        let diag = Diagnostic::UnresolvedAnchor {
            preferred_name: "Lavender Garden".to_string(),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "unresolved_anchor");
        assert_eq!(json["preferred_name"], "Lavender Garden");
    }

    #[test]
    fn test_empty_plan() {
        let plan = TripPlan::empty(3, 1, vec![Diagnostic::EmptyCandidatePool]);
        assert!(plan.days.is_empty());
        assert_eq!(plan.total_pois(), 0);
        assert_eq!(plan.trip_summary.days_requested, 3);
        assert_eq!(plan.clustering_strategy_used, None);
    }
}
