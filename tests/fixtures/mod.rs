//! Test fixtures for trip-planner.
//!
//! Provides realistic test data including:
//! - Real Penang locations (from OpenStreetMap)
//! - A builder for candidate POIs

#![allow(dead_code)]

pub mod penang_locations;

pub use penang_locations::*;

use trip_planner::CandidatePoi;

/// Builder for candidate POIs with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestPoi {
    poi: CandidatePoi,
}

impl TestPoi {
    pub fn new(id: &str) -> Self {
        Self {
            poi: CandidatePoi::new(id, id, 0.0, 0.0),
        }
    }

    pub fn at(location: &Location) -> Self {
        let id = location.name.to_lowercase().replace(' ', "-");
        Self::new(&id).named(location.name).location(location.lat, location.lng)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.poi.name = name.to_string();
        self
    }

    pub fn location(mut self, lat: f64, lng: f64) -> Self {
        self.poi.lat = lat;
        self.poi.lon = lng;
        self
    }

    pub fn popularity(mut self, popularity: i64) -> Self {
        self.poi.popularity = popularity;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.poi.categories.push(category.to_string());
        self
    }

    pub fn cross_references(mut self, count: u32) -> Self {
        self.poi.cross_reference_count = Some(count);
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.poi.region = Some(region.to_string());
        self
    }

    pub fn viewed(mut self) -> Self {
        self.poi.viewed = true;
        self
    }

    pub fn collected(mut self) -> Self {
        self.poi.collected = true;
        self
    }

    pub fn used_in_trip(mut self) -> Self {
        self.poi.used_in_trip = true;
        self
    }

    pub fn build(self) -> CandidatePoi {
        self.poi
    }
}
