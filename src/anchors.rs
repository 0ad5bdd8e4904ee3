//! Split scored POIs into user-mandated anchors and discretionary regulars.

use crate::matching::NameMatchRule;
use crate::model::ScoredPoi;

/// Result of matching preferred names against the scored pool.
#[derive(Debug, Clone, Default)]
pub struct AnchorResolution {
    /// Matched POIs, in the scored (priority) order.
    pub anchors: Vec<ScoredPoi>,
    /// Everything else, in the scored order.
    pub regulars: Vec<ScoredPoi>,
    /// Preferred names that matched no POI.
    pub unresolved: Vec<String>,
}

/// Partition `scored` with the same rule the scorer used for its name boost.
///
/// Every POI lands in exactly one of `anchors` or `regulars`. A preferred
/// name may match several POIs; all of them become anchors.
pub fn resolve(scored: Vec<ScoredPoi>, preferred_names: &[String], rule: NameMatchRule) -> AnchorResolution {
    if preferred_names.is_empty() {
        return AnchorResolution {
            regulars: scored,
            ..AnchorResolution::default()
        };
    }

    let mut matched = vec![false; preferred_names.len()];
    let (anchors, regulars): (Vec<_>, Vec<_>) = scored.into_iter().partition(|poi| {
        let mut is_anchor = false;
        for (i, preferred) in preferred_names.iter().enumerate() {
            if rule.matches(poi.name(), preferred) {
                matched[i] = true;
                is_anchor = true;
            }
        }
        is_anchor
    });

    let unresolved = preferred_names
        .iter()
        .zip(&matched)
        .filter(|(_, hit)| !**hit)
        .map(|(name, _)| name.clone())
        .collect::<Vec<_>>();

    if !unresolved.is_empty() {
        tracing::debug!(unresolved = ?unresolved, "preferred names without a matching POI");
    }

    AnchorResolution {
        anchors,
        regulars,
        unresolved,
    }
}
