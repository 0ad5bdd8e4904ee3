//! Itinerary orchestration.
//!
//! Runs screening, scoring, anchor resolution, day allocation, optional
//! catalog top-up and sequencing for one request, and assembles the
//! [`TripPlan`]. Only malformed options fail; everything else comes back as a
//! best-effort plan with diagnostics.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::anchors::{self, AnchorResolution};
use crate::clustering::{self, Allocation, AllocationParams};
use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::haversine::validate;
use crate::matching::NameMatchRule;
use crate::model::{CandidatePoi, DayPlan, Diagnostic, PlaceId, TripPlan, TripSummary, UserContext};
use crate::scorer::{PriorityScorer, ScoringWeights};
use crate::sequencer::{self, RouteLimits};
use crate::traits::PoiCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    pub max_pois_per_day: usize,
    /// Anchors within this distance share a day.
    pub anchor_proximity_threshold_m: f64,
    /// Radius around a day's centroid searched for filler POIs.
    pub poi_search_radius_m: f64,
    /// Candidates compared when picking a single best seed for a day.
    pub top_n_considered: usize,
    pub name_match: NameMatchRule,
    /// Start each day at the stop nearest the previous day's last stop.
    pub overnight_continuity: bool,
    pub route_limits: RouteLimits,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_pois_per_day: 6,
            anchor_proximity_threshold_m: 30_000.0,
            poi_search_radius_m: 50_000.0,
            top_n_considered: 5,
            name_match: NameMatchRule::default(),
            overnight_continuity: false,
            route_limits: RouteLimits::default(),
        }
    }
}

impl PlanOptions {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_pois_per_day == 0 {
            return Err(PlanError::InvalidOptions("max_pois_per_day must be at least 1".into()));
        }
        if self.top_n_considered == 0 {
            return Err(PlanError::InvalidOptions("top_n_considered must be at least 1".into()));
        }
        for (name, value) in [
            ("anchor_proximity_threshold_m", self.anchor_proximity_threshold_m),
            ("poi_search_radius_m", self.poi_search_radius_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlanError::InvalidOptions(format!("{} must be a positive distance, got {}", name, value)));
            }
        }
        if let NameMatchRule::Fuzzy { min_similarity } = self.name_match {
            if !(min_similarity > 0.0 && min_similarity <= 1.0) {
                return Err(PlanError::InvalidOptions(format!(
                    "name_match min_similarity must be in (0, 1], got {}",
                    min_similarity
                )));
            }
        }
        Ok(())
    }
}

/// One planning request: the loaded candidate pool and the user's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub candidates: Vec<CandidatePoi>,
    pub context: UserContext,
}

/// Plans trips with a fixed set of weights and options.
#[derive(Debug, Clone, Default)]
pub struct ItineraryPlanner {
    scorer: PriorityScorer,
    options: PlanOptions,
}

impl ItineraryPlanner {
    pub fn new(weights: ScoringWeights, options: PlanOptions) -> Self {
        Self {
            scorer: PriorityScorer::new(weights, options.name_match),
            options,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.scoring.clone(), config.planning.clone())
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn plan(&self, candidates: &[CandidatePoi], context: &UserContext) -> Result<TripPlan, PlanError> {
        self.run(candidates, context, None)
    }

    /// Like [`plan`](Self::plan), but tops up under-filled days from `catalog`.
    pub fn plan_with_catalog<C: PoiCatalog>(
        &self,
        candidates: &[CandidatePoi],
        context: &UserContext,
        catalog: &C,
    ) -> Result<TripPlan, PlanError> {
        self.run(candidates, context, Some(catalog as &dyn PoiCatalog))
    }

    /// Plan independent requests in parallel; results keep request order.
    pub fn plan_batch(&self, requests: &[PlanRequest]) -> Vec<Result<TripPlan, PlanError>> {
        requests
            .par_iter()
            .map(|request| self.plan(&request.candidates, &request.context))
            .collect()
    }

    /// [`plan_batch`](Self::plan_batch) with catalog top-up for every request.
    pub fn plan_batch_with_catalog<C: PoiCatalog + Sync>(
        &self,
        requests: &[PlanRequest],
        catalog: &C,
    ) -> Vec<Result<TripPlan, PlanError>> {
        requests
            .par_iter()
            .map(|request| self.plan_with_catalog(&request.candidates, &request.context, catalog))
            .collect()
    }

    fn run(
        &self,
        candidates: &[CandidatePoi],
        context: &UserContext,
        catalog: Option<&dyn PoiCatalog>,
    ) -> Result<TripPlan, PlanError> {
        self.options.validate()?;
        if context.trip_duration_days == 0 {
            return Err(PlanError::InvalidOptions("trip_duration_days must be at least 1".into()));
        }

        let days_requested = context.trip_duration_days as usize;
        let capacity = self.options.max_pois_per_day;
        let names_requested = context.preferred_names.len();

        let (screened, mut diagnostics) = self.screen(candidates, context);
        if screened.is_empty() {
            tracing::info!(candidates = candidates.len(), "no usable candidates, returning empty plan");
            diagnostics.push(Diagnostic::EmptyCandidatePool);
            diagnostics.extend(context.preferred_names.iter().map(|name| Diagnostic::UnresolvedAnchor {
                preferred_name: name.clone(),
            }));
            return Ok(TripPlan::empty(days_requested, names_requested, diagnostics));
        }

        let scored = self.scorer.score(&screened, context);
        let AnchorResolution {
            anchors,
            regulars,
            unresolved,
        } = anchors::resolve(scored, &context.preferred_names, self.options.name_match);
        diagnostics.extend(unresolved.into_iter().map(|preferred_name| Diagnostic::UnresolvedAnchor { preferred_name }));

        let params = AllocationParams {
            trip_duration_days: days_requested,
            max_pois_per_day: capacity,
            anchor_proximity_threshold_m: self.options.anchor_proximity_threshold_m,
            poi_search_radius_m: self.options.poi_search_radius_m,
            top_n_considered: self.options.top_n_considered,
        };
        let mut allocation = clustering::allocate(&anchors, &regulars, &params);
        tracing::debug!(
            strategy = ?allocation.strategy,
            anchors = anchors.len(),
            regulars = regulars.len(),
            "allocated POIs to days"
        );
        diagnostics.append(&mut allocation.diagnostics);

        if let Some(catalog) = catalog {
            let mut known = clustering::placed_ids(&allocation);
            known.extend(candidates.iter().map(|c| c.id.clone()));
            self.top_up(&mut allocation, catalog, context, known, &mut diagnostics);
        }

        let mut underfilled_days = 0;
        for day in &allocation.days {
            if day.pois.len() < capacity {
                tracing::debug!(day = day.day, placed = day.pois.len(), capacity, "day under-filled");
                underfilled_days += 1;
                diagnostics.push(Diagnostic::InsufficientCandidates {
                    day: day.day,
                    capacity,
                    placed: day.pois.len(),
                });
            }
        }

        let mut days: Vec<DayPlan> = Vec::with_capacity(allocation.days.len());
        for set in allocation.days.iter().filter(|set| !set.pois.is_empty()) {
            let hint = if self.options.overnight_continuity {
                days.last().and_then(DayPlan::last).map(|stop| &stop.poi)
            } else {
                None
            };
            let plan = sequencer::sequence(days.len() + 1, &set.pois, hint);
            days.push(plan);
        }
        sequencer::link_days(&mut days);
        for day in &days {
            diagnostics.extend(sequencer::validate_day(day, &self.options.route_limits));
        }

        let anchors_placed = anchors
            .iter()
            .filter(|anchor| days.iter().any(|day| day.place_ids().any(|id| id == anchor.id())))
            .count();

        let mut trip_summary = summarize(&days, days_requested, underfilled_days, allocation.held_back.len());
        trip_summary.activity_mix = self
            .scorer
            .activity_mix(days.iter().flat_map(|day| day.stops.iter().map(|stop| &stop.poi.poi)));
        tracing::info!(
            strategy = ?allocation.strategy,
            days = trip_summary.days_planned,
            pois = trip_summary.total_pois,
            total_distance_m = trip_summary.total_distance_m,
            anchors_placed,
            anchors = anchors.len(),
            diagnostics = diagnostics.len(),
            "trip planned"
        );

        Ok(TripPlan {
            days,
            trip_summary,
            clustering_strategy_used: Some(allocation.strategy),
            preferred_names_requested: names_requested,
            anchors_resolved: anchors.len(),
            anchors_placed,
            diagnostics,
        })
    }

    /// Drop POIs that cannot or should not be planned, with one diagnostic each.
    fn screen(&self, candidates: &[CandidatePoi], context: &UserContext) -> (Vec<CandidatePoi>, Vec<Diagnostic>) {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut diagnostics = Vec::new();

        for poi in candidates {
            match self.rejection(poi, context) {
                Some(reason) => diagnostics.push(reason),
                None => kept.push(poi.clone()),
            }
        }

        (kept, diagnostics)
    }

    /// Why `poi` must be left out, if it must.
    ///
    /// Bad coordinates always disqualify. A POI matching a preferred name is
    /// exempt from the region and popularity checks.
    fn rejection(&self, poi: &CandidatePoi, context: &UserContext) -> Option<Diagnostic> {
        if validate(poi.coords()).is_err() {
            tracing::warn!(place_id = %poi.id, lat = poi.lat, lon = poi.lon, "excluding POI with invalid coordinates");
            return Some(Diagnostic::InvalidCoordinate {
                place_id: poi.id.clone(),
                name: poi.name.clone(),
                lat: poi.lat,
                lon: poi.lon,
            });
        }

        let preferred = self
            .options
            .name_match
            .first_match(&poi.name, &context.preferred_names)
            .is_some();
        if preferred {
            return None;
        }

        let outside = match (&context.destination_region, &poi.region) {
            (Some(wanted), Some(actual)) => !wanted.trim().eq_ignore_ascii_case(actual.trim()),
            _ => false,
        };
        if outside {
            return Some(Diagnostic::OutOfRegion {
                place_id: poi.id.clone(),
                name: poi.name.clone(),
                region: poi.region.clone(),
            });
        }

        if poi.popularity <= 0 {
            return Some(Diagnostic::ZeroPopularity {
                place_id: poi.id.clone(),
                name: poi.name.clone(),
                popularity: poi.popularity,
            });
        }

        None
    }

    /// Fill remaining day capacity from the catalog. No retries.
    fn top_up(
        &self,
        allocation: &mut Allocation,
        catalog: &dyn PoiCatalog,
        context: &UserContext,
        mut known: HashSet<PlaceId>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let capacity = self.options.max_pois_per_day;
        for day in allocation.days.iter_mut() {
            let room = capacity.saturating_sub(day.pois.len());
            let Some(center) = day.centroid else {
                continue;
            };
            if room == 0 {
                continue;
            }

            let found = match catalog.find_near(center, self.options.poi_search_radius_m) {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(day = day.day, error = %err, "catalog top-up failed");
                    diagnostics.push(Diagnostic::CatalogUnavailable {
                        day: day.day,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let mut fresh = Vec::with_capacity(found.len());
            for poi in found {
                if known.contains(&poi.id) {
                    continue;
                }
                match self.rejection(&poi, context) {
                    Some(reason) => {
                        known.insert(poi.id.clone());
                        diagnostics.push(reason);
                    }
                    None => fresh.push(poi),
                }
            }
            let added: Vec<_> = self.scorer.score(&fresh, context).into_iter().take(room).collect();
            tracing::debug!(day = day.day, added = added.len(), room, "topped up day from catalog");
            for poi in added {
                known.insert(poi.id().clone());
                day.pois.push(poi);
            }
        }
    }
}

/// Plan one request with default scoring weights.
pub fn plan(candidates: &[CandidatePoi], context: &UserContext, options: PlanOptions) -> Result<TripPlan, PlanError> {
    ItineraryPlanner::new(ScoringWeights::default(), options).plan(candidates, context)
}

fn summarize(days: &[DayPlan], days_requested: usize, underfilled_days: usize, held_back: usize) -> TripSummary {
    let total_pois: usize = days.iter().map(DayPlan::len).sum();
    let total_distance_m: f64 = days.iter().map(|d| d.total_distance_m).sum();
    let days_planned = days.len();
    let (avg_distance_per_day_m, avg_pois_per_day) = if days_planned == 0 {
        (0.0, 0.0)
    } else {
        (
            total_distance_m / days_planned as f64,
            total_pois as f64 / days_planned as f64,
        )
    };

    TripSummary {
        days_requested,
        days_planned,
        total_pois,
        total_distance_m,
        avg_distance_per_day_m,
        avg_pois_per_day,
        underfilled_days,
        held_back,
        activity_mix: BTreeMap::new(),
    }
}
