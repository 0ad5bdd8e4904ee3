//! Collaborator interfaces for the planner.
//!
//! The engine itself never does I/O. Anything that lives outside the
//! request, such as the POI catalog, is reached through these traits.

use crate::error::CatalogError;
use crate::haversine::Coord;
use crate::model::CandidatePoi;

/// A geospatial POI catalog that can answer radius queries.
///
/// Calls are synchronous and made at most once per under-filled day; retries,
/// if any, belong to the implementation.
pub trait PoiCatalog {
    /// POIs within `radius_m` meters of `center`, nearest first.
    fn find_near(&self, center: Coord, radius_m: f64) -> Result<Vec<CandidatePoi>, CatalogError>;
}
