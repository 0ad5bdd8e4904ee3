//! Planner configuration loaded from TOML.
//!
//! Every section is optional; missing keys fall back to the built-in
//! defaults.
//!
//! ```toml
//! [planning]
//! max_pois_per_day = 5
//! overnight_continuity = true
//!
//! [scoring]
//! collected_boost = 25.0
//!
//! [catalog]
//! base_url = "http://catalog.internal:8080"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogConfig;
use crate::error::ConfigError;
use crate::planner::PlanOptions;
use crate::scorer::ScoringWeights;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub scoring: ScoringWeights,
    pub planning: PlanOptions,
    /// Catalog used to top up under-filled days; none means in-memory only.
    pub catalog: Option<CatalogConfig>,
}

impl PlannerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = toml::from_str(contents)?;
        config.planning.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::matching::NameMatchRule;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.planning.max_pois_per_day, 6);
        assert_eq!(config.scoring.saved_trip_multiplier, 1.4);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = PlannerConfig::from_toml_str(
            r#"
            [planning]
            max_pois_per_day = 4
            name_match = "exact"

            [planning.route_limits]
            min_pois_per_day = 2

            [scoring]
            collected_boost = 25.0

            [catalog]
            base_url = "http://catalog:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.planning.max_pois_per_day, 4);
        assert_eq!(config.planning.name_match, NameMatchRule::Exact);
        assert_eq!(config.planning.route_limits.min_pois_per_day, 2);
        assert_eq!(config.planning.route_limits.long_segment_m, 20_000.0);
        assert_eq!(config.scoring.collected_boost, 25.0);
        assert_eq!(config.scoring.viewed_boost, 3.0);
        let catalog = config.catalog.unwrap();
        assert_eq!(catalog.base_url, "http://catalog:8080");
        assert_eq!(catalog.timeout_secs, 10);
    }

    #[test]
    fn test_fuzzy_name_match() {
        let config = PlannerConfig::from_toml_str(
            "[planning]\nname_match = { fuzzy = { min_similarity = 0.75 } }\n",
        )
        .unwrap();
        assert_eq!(config.planning.name_match, NameMatchRule::Fuzzy { min_similarity: 0.75 });
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = PlannerConfig::from_toml_str("[planning]\nmax_pois_per_day = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = PlannerConfig::from_toml_str("[planning\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[planning]\ntop_n_considered = 3").unwrap();
        let config = PlannerConfig::load(file.path()).unwrap();
        assert_eq!(config.planning.top_n_considered, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = PlannerConfig::load(Path::new("/nonexistent/trip-planner.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
