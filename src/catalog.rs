//! POI catalog adapters: an in-memory pool and a blocking HTTP client.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::haversine::{haversine_m, validate, Coord};
use crate::model::CandidatePoi;
use crate::traits::PoiCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_results: usize,
    /// Only return curated POIs.
    pub curated_only: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
            max_results: 50,
            curated_only: false,
        }
    }
}

/// Catalog backed by the service's HTTP API.
///
/// Issues `GET {base_url}/pois/near?lat=..&lon=..&radius_m=..&limit=..` and
/// expects a JSON array of candidates.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    config: CatalogConfig,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

impl PoiCatalog for HttpCatalog {
    fn find_near(&self, center: Coord, radius_m: f64) -> Result<Vec<CandidatePoi>, CatalogError> {
        validate(center)?;

        let url = format!("{}/pois/near", self.config.base_url.trim_end_matches('/'));
        let params = [
            ("lat", format!("{:.6}", center.0)),
            ("lon", format!("{:.6}", center.1)),
            ("radius_m", format!("{:.0}", radius_m)),
            ("limit", self.config.max_results.to_string()),
            ("curated_only", self.config.curated_only.to_string()),
        ];

        let mut pois = self
            .client
            .get(url)
            .query(&params)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<CandidatePoi>>())?;

        if self.config.curated_only {
            pois.retain(|poi| poi.curated);
        }
        pois.truncate(self.config.max_results);
        tracing::debug!(count = pois.len(), radius_m, "catalog radius query");
        Ok(pois)
    }
}

/// Catalog over a pool that is already loaded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    pois: Vec<CandidatePoi>,
}

impl InMemoryCatalog {
    pub fn new(pois: Vec<CandidatePoi>) -> Self {
        Self { pois }
    }
}

impl PoiCatalog for InMemoryCatalog {
    fn find_near(&self, center: Coord, radius_m: f64) -> Result<Vec<CandidatePoi>, CatalogError> {
        validate(center)?;

        let mut hits: Vec<(f64, &CandidatePoi)> = self
            .pois
            .iter()
            .filter(|poi| validate(poi.coords()).is_ok())
            .map(|poi| (haversine_m(center, poi.coords()), poi))
            .filter(|(distance, _)| *distance <= radius_m)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(hits.into_iter().map(|(_, poi)| poi.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_radius_query_nearest_first() {
        let catalog = InMemoryCatalog::new(vec![
            CandidatePoi::new("far", "Far", 0.0, 0.3),
            CandidatePoi::new("near", "Near", 0.0, 0.1),
            CandidatePoi::new("broken", "Broken", 120.0, 0.0),
            CandidatePoi::new("nearer", "Nearer", 0.0, 0.05),
        ]);
        let hits = catalog.find_near((0.0, 0.0), 20_000.0).unwrap();
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["nearer", "near"]);
    }

    #[test]
    fn test_in_memory_rejects_invalid_center() {
        let catalog = InMemoryCatalog::default();
        assert!(matches!(
            catalog.find_near((0.0, 200.0), 1_000.0),
            Err(CatalogError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_http_catalog_unreachable_is_an_error() {
        let catalog = HttpCatalog::new(CatalogConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..CatalogConfig::default()
        })
        .unwrap();
        assert!(matches!(
            catalog.find_near((5.41, 100.33), 1_000.0),
            Err(CatalogError::Http(_))
        ));
    }
}
