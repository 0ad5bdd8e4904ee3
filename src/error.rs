//! Error types for the itinerary engine.
//!
//! Only invalid input shapes and infrastructure failures are errors. Conditions
//! the planner can recover from are reported as [`Diagnostic`](crate::model::Diagnostic)
//! values on the finished plan instead.

use std::path::PathBuf;

use thiserror::Error;

/// Failures from the geo-math helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid coordinate ({lat}, {lon}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Precondition violations that abort planning before any work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid planning options: {0}")]
    InvalidOptions(String),
}

/// Failures talking to an external POI catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog query rejected: {0}")]
    InvalidQuery(#[from] GeoError),
}

/// Failures loading planner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] PlanError),
}
