//! Preferred-name matching.
//!
//! The scorer's preferred-name boost and the anchor resolver must agree on
//! which POIs the user asked for, so both go through [`NameMatchRule`].

use serde::{Deserialize, Serialize};

/// How a POI name is compared against a user's preferred name.
///
/// Both sides are lowercased and whitespace-collapsed first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatchRule {
    /// Normalized names are equal.
    Exact,
    /// Normalized POI name contains the normalized preferred name.
    #[default]
    Contains,
    /// Normalized Levenshtein similarity of at least `min_similarity`, or
    /// either name containing the other. Tolerates transliteration drift
    /// such as "Kek Lok See" for "Kek Lok Si".
    Fuzzy { min_similarity: f64 },
}

/// Similarity threshold used by [`NameMatchRule::fuzzy`].
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.8;

impl NameMatchRule {
    pub fn fuzzy() -> Self {
        NameMatchRule::Fuzzy {
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    pub fn matches(self, poi_name: &str, preferred: &str) -> bool {
        let preferred = normalize(preferred);
        if preferred.is_empty() {
            return false;
        }
        let poi_name = normalize(poi_name);
        match self {
            NameMatchRule::Exact => poi_name == preferred,
            NameMatchRule::Contains => poi_name.contains(&preferred),
            NameMatchRule::Fuzzy { min_similarity } => {
                if poi_name.is_empty() {
                    return false;
                }
                poi_name.contains(&preferred)
                    || preferred.contains(&poi_name)
                    || strsim::normalized_levenshtein(&poi_name, &preferred) >= min_similarity
            }
        }
    }

    /// First preferred name that `poi_name` matches.
    pub fn first_match<'a>(self, poi_name: &str, preferred: &'a [String]) -> Option<&'a str> {
        preferred
            .iter()
            .map(String::as_str)
            .find(|candidate| self.matches(poi_name, candidate))
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert!(NameMatchRule::Exact.matches("George  Town", "george town"));
        assert!(NameMatchRule::Contains.matches(" KEK LOK SI Temple", "kek lok si"));
    }

    #[test]
    fn test_exact_rejects_partial() {
        assert!(!NameMatchRule::Exact.matches("Penang Hill", "Penang"));
        assert!(NameMatchRule::Contains.matches("Penang Hill", "Penang"));
    }

    #[test]
    fn test_contains_is_one_directional() {
        // A longer preferred name never matches a shorter POI name.
        assert!(!NameMatchRule::Contains.matches("Penang", "Penang Hill"));
    }

    #[test]
    fn test_blank_preferred_never_matches() {
        assert!(!NameMatchRule::Contains.matches("Komtar", "   "));
        assert!(!NameMatchRule::Exact.matches("", ""));
    }

    #[test]
    fn test_first_match() {
        let preferred = vec!["Botanical".to_string(), "Komtar".to_string()];
        assert_eq!(NameMatchRule::Contains.first_match("Komtar Tower", &preferred), Some("Komtar"));
        assert_eq!(NameMatchRule::Contains.first_match("Clan Jetties", &preferred), None);
    }

    #[test]
    fn test_fuzzy_tolerates_spelling_drift() {
        let rule = NameMatchRule::fuzzy();
        assert!(rule.matches("Kek Lok Si", "kek lok see"));
        assert!(!NameMatchRule::Contains.matches("Kek Lok Si", "kek lok see"));
        assert!(!rule.matches("Komtar Tower", "Clan Jetties"));
    }

    #[test]
    fn test_fuzzy_containment_runs_both_ways() {
        let rule = NameMatchRule::fuzzy();
        assert!(rule.matches("Penang Hill Funicular", "penang hill"));
        assert!(rule.matches("Penang", "Penang Hill"));
        assert!(!rule.matches("", "Penang"));
        assert!(!rule.matches("Penang", " "));
    }

    #[test]
    fn test_fuzzy_threshold_is_respected() {
        let strict = NameMatchRule::Fuzzy { min_similarity: 0.95 };
        assert!(!strict.matches("Kek Lok Si", "Kek Lok See"));
        assert!(strict.matches("Kek Lok Si", "kek  lok  si"));
    }
}
