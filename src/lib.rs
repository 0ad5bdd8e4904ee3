//! trip-planner core
//!
//! Turns a pool of candidate POIs and a user's context into a multi-day
//! itinerary: priority scoring, preferred-place anchoring, day clustering and
//! within-day sequencing.

pub mod anchors;
pub mod catalog;
pub mod clustering;
pub mod config;
pub mod error;
pub mod haversine;
pub mod matching;
pub mod model;
pub mod planner;
pub mod polyline;
pub mod scorer;
pub mod sequencer;
pub mod traits;

pub use config::PlannerConfig;
pub use error::{CatalogError, ConfigError, GeoError, PlanError};
pub use model::{CandidatePoi, DayPlan, Diagnostic, PlaceId, TripPlan, UserContext};
pub use planner::{plan, ItineraryPlanner, PlanOptions, PlanRequest};
