//! Contextual priority scoring.
//!
//! Turns a POI's static popularity into a priority for one user's trip by
//! running it through a fixed stack of layers:
//!
//! 1. preferred-name boost
//! 2. interest-category boost
//! 3. group-size adjustment
//! 4. short-trip landmark boost
//! 5. behavioral signals, `(score + additive) * multiplier`
//!
//! All factors come from [`ScoringWeights`] so they can be tuned from config.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::matching::NameMatchRule;
use crate::model::{CandidatePoi, ScoreAdjustment, ScoredPoi, UserContext};

/// Review and cross-reference counts that mark a POI as proven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenThresholds {
    pub min_reviews: u32,
    pub min_cross_references: u32,
}

impl Default for ProvenThresholds {
    fn default() -> Self {
        Self {
            min_reviews: 50,
            min_cross_references: 5,
        }
    }
}

/// Tunable factors for every scoring layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub preferred_multiplier: f64,
    pub interest_multiplier: f64,
    /// Groups strictly larger than this get `group_penalty`.
    pub group_size_threshold: u32,
    pub group_penalty: f64,
    /// When set, proven POIs are exempt from the group penalty.
    pub group_exemption: Option<ProvenThresholds>,
    /// Trips strictly shorter than this get the landmark boost.
    pub short_trip_days: u32,
    pub landmark_cross_references: u32,
    pub landmark_multiplier: f64,
    pub viewed_boost: f64,
    pub collected_boost: f64,
    pub saved_trip_multiplier: f64,
    /// Interest name to the place-type tags it covers.
    pub interest_categories: BTreeMap<String, Vec<String>>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            preferred_multiplier: 2.0,
            interest_multiplier: 1.5,
            group_size_threshold: 2,
            group_penalty: 0.8,
            group_exemption: None,
            short_trip_days: 3,
            landmark_cross_references: 20,
            landmark_multiplier: 1.2,
            viewed_boost: 3.0,
            collected_boost: 20.0,
            saved_trip_multiplier: 1.4,
            interest_categories: default_interest_categories(),
        }
    }
}

fn default_interest_categories() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("Art", &["art_gallery", "museum", "painter", "art_studio", "craft"]),
        (
            "Culture",
            &["museum", "art_gallery", "cultural_center", "library", "historical_landmark", "landmark", "place_of_worship"],
        ),
        (
            "Adventure",
            &["amusement_park", "theme_park", "water_park", "zoo", "aquarium", "park", "hiking_area", "campground"],
        ),
        (
            "Nature",
            &["park", "natural_feature", "hiking_area", "campground", "beach", "waterfall", "mountain", "forest", "lake", "river"],
        ),
        (
            "Food",
            &["restaurant", "cafe", "food", "bar", "bakery", "meal_takeaway", "meal_delivery", "food_court"],
        ),
        (
            "Shopping",
            &["shopping_mall", "department_store", "store", "market", "supermarket", "clothing_store", "jewelry_store", "book_store"],
        ),
        (
            "History",
            &["historical_landmark", "museum", "monument", "heritage", "archaeological_site", "castle", "fort", "memorial"],
        ),
        (
            "Religion",
            &["place_of_worship", "church", "mosque", "temple", "hindu_temple", "buddhist_temple", "synagogue"],
        ),
        (
            "Entertainment",
            &["night_club", "bar", "movie_theater", "casino", "bowling_alley", "amusement_park", "tourist_attraction"],
        ),
        (
            "Relaxation",
            &["spa", "beauty_salon", "park", "beach", "resort", "tourist_attraction", "scenic_overlook"],
        ),
    ];

    table
        .iter()
        .map(|(interest, types)| {
            (
                interest.to_string(),
                types.iter().map(|t| t.to_string()).collect(),
            )
        })
        .collect()
}

/// Scores candidates for a user context.
#[derive(Debug, Clone, Default)]
pub struct PriorityScorer {
    pub weights: ScoringWeights,
    pub name_rule: NameMatchRule,
}

impl PriorityScorer {
    pub fn new(weights: ScoringWeights, name_rule: NameMatchRule) -> Self {
        Self { weights, name_rule }
    }

    /// Score every candidate and sort by descending priority.
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn score(&self, candidates: &[CandidatePoi], context: &UserContext) -> Vec<ScoredPoi> {
        let mut scored: Vec<ScoredPoi> = candidates
            .par_iter()
            .map(|poi| self.score_one(poi, context))
            .collect();
        scored.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
        scored
    }

    pub fn score_one(&self, poi: &CandidatePoi, context: &UserContext) -> ScoredPoi {
        let w = &self.weights;
        let mut breakdown = Vec::new();
        let mut score = poi.popularity.max(0) as f64;

        if let Some(matched) = self.name_rule.first_match(&poi.name, &context.preferred_names) {
            score *= w.preferred_multiplier;
            breakdown.push(ScoreAdjustment::PreferredName {
                matched: matched.to_string(),
                factor: w.preferred_multiplier,
            });
        }

        if self.matches_interest(&poi.categories, &context.interests) {
            score *= w.interest_multiplier;
            breakdown.push(ScoreAdjustment::InterestMatch {
                factor: w.interest_multiplier,
            });
        }

        if context.travelers > w.group_size_threshold && !self.is_exempt_from_group_penalty(poi) {
            score *= w.group_penalty;
            breakdown.push(ScoreAdjustment::GroupSize {
                travelers: context.travelers,
                factor: w.group_penalty,
            });
        }

        let cross_references = poi.cross_reference_count.unwrap_or(0);
        if context.trip_duration_days < w.short_trip_days && cross_references >= w.landmark_cross_references {
            score *= w.landmark_multiplier;
            breakdown.push(ScoreAdjustment::Landmark {
                cross_references,
                factor: w.landmark_multiplier,
            });
        }

        let behavior = &context.behavior;
        let mut additive_boost = 0.0;
        if poi.viewed || behavior.viewed.contains(&poi.id) {
            additive_boost += w.viewed_boost;
        }
        if poi.collected || behavior.collected.contains(&poi.id) {
            additive_boost += w.collected_boost;
        }
        let multiplier = if poi.used_in_trip || behavior.saved_trip.contains(&poi.id) {
            w.saved_trip_multiplier
        } else {
            1.0
        };
        if additive_boost != 0.0 || multiplier != 1.0 {
            breakdown.push(ScoreAdjustment::Behavior {
                additive: additive_boost,
                multiplier,
            });
        }
        // Additive first so collection signals compound with earlier layers.
        score = (score + additive_boost) * multiplier;

        ScoredPoi {
            poi: poi.clone(),
            priority_score: round_2dp(score.max(0.0)),
            additive_boost,
            multiplier,
            breakdown,
        }
    }

    /// True when any POI tag equals an interest or one of its mapped place types.
    pub fn matches_interest(&self, categories: &[String], interests: &[String]) -> bool {
        if categories.is_empty() || interests.is_empty() {
            return false;
        }
        interests.iter().any(|interest| {
            let mapped = self
                .weights
                .interest_categories
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(interest))
                .map(|(_, types)| types.as_slice())
                .unwrap_or_default();

            categories.iter().any(|tag| {
                tag.eq_ignore_ascii_case(interest) || mapped.iter().any(|t| t.eq_ignore_ascii_case(tag))
            })
        })
    }

    /// Share of `pois` matching each interest category, keyed by the
    /// lowercased interest. A POI can count toward several categories.
    /// Categories with no match are omitted.
    pub fn activity_mix<'a, I>(&self, pois: I) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = &'a CandidatePoi>,
    {
        let pois: Vec<&CandidatePoi> = pois.into_iter().collect();
        if pois.is_empty() {
            return BTreeMap::new();
        }

        self.weights
            .interest_categories
            .keys()
            .filter_map(|interest| {
                let interest_only = std::slice::from_ref(interest);
                let count = pois
                    .iter()
                    .filter(|poi| self.matches_interest(&poi.categories, interest_only))
                    .count();
                (count > 0).then(|| (interest.to_lowercase(), round_2dp(count as f64 / pois.len() as f64)))
            })
            .collect()
    }

    fn is_exempt_from_group_penalty(&self, poi: &CandidatePoi) -> bool {
        match &self.weights.group_exemption {
            Some(proven) => {
                poi.review_count.unwrap_or(0) >= proven.min_reviews
                    && poi.cross_reference_count.unwrap_or(0) >= proven.min_cross_references
            }
            None => false,
        }
    }
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
