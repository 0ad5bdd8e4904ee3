//! Day allocation: which POIs go on which trip day.
//!
//! Two strategies sit behind [`DayAllocator`]. The anchor-based strategy groups
//! user-mandated POIs geographically and builds each day around one group; the
//! simple strategy deals POIs out in priority order. [`select_strategy`] is the
//! single place that decides between them.
//!
//! Anchors are never dropped. When a day holds more anchors than
//! `max_pois_per_day`, the lowest-priority extras move to the day nearest in
//! trip order that still has room; only if no day has room do they stay and
//! overflow their day. Both cases are reported as `AnchorCapacityOverflow`.

use std::collections::HashSet;

use crate::haversine::{centroid, haversine_m, validate, Coord};
use crate::model::{ClusteringStrategy, Diagnostic, FallbackReason, PlaceId, ScoredPoi};

/// Knobs for one allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationParams {
    pub trip_duration_days: usize,
    pub max_pois_per_day: usize,
    /// Anchors closer than this end up on the same day.
    pub anchor_proximity_threshold_m: f64,
    /// Regulars farther than this from a day's centroid are not used to fill it.
    pub poi_search_radius_m: f64,
    /// How many top regulars compete when seeding a day without anchors.
    pub top_n_considered: usize,
}

/// The unordered POI set for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySet {
    /// 1-based day number.
    pub day: usize,
    pub pois: Vec<ScoredPoi>,
    /// Geographic center the day was built around.
    pub centroid: Option<Coord>,
}

impl DaySet {
    /// Highest-priority POI with usable coordinates; ties keep the earlier one.
    pub fn anchor_point(&self) -> Option<&ScoredPoi> {
        self.pois
            .iter()
            .filter(|poi| validate(poi.coords()).is_ok())
            .reduce(|best, poi| if poi.priority_score > best.priority_score { poi } else { best })
    }
}

#[derive(Debug, Clone)]
pub struct Allocation {
    pub strategy: ClusteringStrategy,
    /// Exactly `trip_duration_days` entries; some may be empty.
    pub days: Vec<DaySet>,
    pub diagnostics: Vec<Diagnostic>,
    /// Regulars that were not placed on any day.
    pub held_back: Vec<ScoredPoi>,
}

/// A day-allocation strategy.
pub trait DayAllocator {
    fn strategy(&self) -> ClusteringStrategy;

    /// Distribute `anchors` and `regulars` over the trip days.
    ///
    /// Both slices are expected in descending priority order.
    fn allocate(&self, anchors: &[ScoredPoi], regulars: &[ScoredPoi], params: &AllocationParams) -> Allocation;
}

/// Groups anchors by proximity and builds each day around one group.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorClusterAllocator;

/// Deals POIs out in priority order with no geographic grouping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAllocator;

/// Decide which strategy applies; `Err` carries why the fallback is used.
pub fn select_strategy(anchors: &[ScoredPoi], params: &AllocationParams) -> Result<ClusteringStrategy, FallbackReason> {
    if params.trip_duration_days < 2 {
        return Err(FallbackReason::SingleDay);
    }
    if anchors.is_empty() {
        return Err(FallbackReason::NoAnchors);
    }
    if anchors.iter().any(|a| validate(a.coords()).is_err()) {
        return Err(FallbackReason::InvalidAnchorCoordinates);
    }
    Ok(ClusteringStrategy::AnchorBased)
}

pub fn allocator_for(strategy: ClusteringStrategy) -> &'static dyn DayAllocator {
    static ANCHOR_BASED: AnchorClusterAllocator = AnchorClusterAllocator;
    static SIMPLE: SimpleAllocator = SimpleAllocator;
    match strategy {
        ClusteringStrategy::AnchorBased => &ANCHOR_BASED,
        ClusteringStrategy::Simple => &SIMPLE,
    }
}

/// Select a strategy and run it.
pub fn allocate(anchors: &[ScoredPoi], regulars: &[ScoredPoi], params: &AllocationParams) -> Allocation {
    match select_strategy(anchors, params) {
        Ok(strategy) => allocator_for(strategy).allocate(anchors, regulars, params),
        Err(reason) => {
            tracing::debug!(?reason, "falling back to simple day allocation");
            let mut allocation = SimpleAllocator.allocate(anchors, regulars, params);
            allocation
                .diagnostics
                .insert(0, Diagnostic::ClusteringFallback { reason });
            allocation
        }
    }
}

// ============================================================================
// Anchor-based strategy
// ============================================================================

#[derive(Debug, Clone)]
struct Cluster {
    /// Indices into the anchor slice, ascending.
    members: Vec<usize>,
    centroid: Coord,
}

#[derive(Debug, Clone, Default)]
struct DayBuild {
    anchors: Vec<usize>,
    centroid: Option<Coord>,
    regulars: Vec<usize>,
}

impl DayAllocator for AnchorClusterAllocator {
    fn strategy(&self) -> ClusteringStrategy {
        ClusteringStrategy::AnchorBased
    }

    fn allocate(&self, anchors: &[ScoredPoi], regulars: &[ScoredPoi], params: &AllocationParams) -> Allocation {
        let days = params.trip_duration_days;
        let capacity = params.max_pois_per_day;
        let mut diagnostics = Vec::new();

        let mut clusters = group_by_proximity(anchors, params.anchor_proximity_threshold_m);
        let initial_clusters = clusters.len();
        while clusters.len() > days {
            merge_nearest(&mut clusters, anchors);
        }
        let clusters = order_clusters(clusters, anchors);
        tracing::debug!(
            initial_clusters,
            clusters = clusters.len(),
            days,
            "grouped anchors into day clusters"
        );

        let mut builds = vec![DayBuild::default(); days];
        for (build, cluster) in builds.iter_mut().zip(clusters) {
            build.anchors = by_priority(cluster.members, anchors);
            build.centroid = Some(cluster.centroid);
        }

        relocate_overflow(&mut builds, anchors, capacity, &mut diagnostics);

        let eligible: Vec<bool> = regulars.iter().map(|r| validate(r.coords()).is_ok()).collect();
        let mut used = vec![false; regulars.len()];

        for build in builds.iter_mut().filter(|b| !b.anchors.is_empty()) {
            if let Some(center) = build.centroid {
                let room = capacity.saturating_sub(build.anchors.len());
                build.regulars = fill_near(center, room, regulars, &eligible, &mut used, params.poi_search_radius_m);
            }
        }

        for build in builds.iter_mut().filter(|b| b.anchors.is_empty()) {
            let Some(seed) = pick_seed(regulars, &eligible, &used, params) else {
                continue;
            };
            used[seed] = true;
            let center = regulars[seed].coords();
            build.centroid = Some(center);
            build.regulars = vec![seed];
            build.regulars.extend(fill_near(
                center,
                capacity.saturating_sub(1),
                regulars,
                &eligible,
                &mut used,
                params.poi_search_radius_m,
            ));
        }

        let days = builds
            .into_iter()
            .enumerate()
            .map(|(i, build)| DaySet {
                day: i + 1,
                pois: build
                    .anchors
                    .iter()
                    .map(|&a| anchors[a].clone())
                    .chain(build.regulars.iter().map(|&r| regulars[r].clone()))
                    .collect(),
                centroid: build.centroid,
            })
            .collect();

        let held_back = regulars
            .iter()
            .zip(&used)
            .filter(|(_, placed)| !**placed)
            .map(|(poi, _)| poi.clone())
            .collect();

        Allocation {
            strategy: self.strategy(),
            days,
            diagnostics,
            held_back,
        }
    }
}

/// Connected components over the "within threshold" relation.
///
/// Clusters come out ordered by their lowest anchor index.
fn group_by_proximity(anchors: &[ScoredPoi], threshold_m: f64) -> Vec<Cluster> {
    let n = anchors.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in i + 1..n {
            if haversine_m(anchors[i].coords(), anchors[j].coords()) <= threshold_m {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let root = find(&mut parent, i);
        match slot_of_root[root] {
            Some(slot) => clusters[slot].members.push(i),
            None => {
                slot_of_root[root] = Some(clusters.len());
                clusters.push(Cluster {
                    members: vec![i],
                    centroid: anchors[i].coords(),
                });
            }
        }
    }
    for cluster in &mut clusters {
        cluster.centroid = member_centroid(&cluster.members, anchors);
    }
    clusters
}

fn member_centroid(members: &[usize], anchors: &[ScoredPoi]) -> Coord {
    let points: Vec<Coord> = members.iter().map(|&i| anchors[i].coords()).collect();
    centroid(&points).unwrap_or((0.0, 0.0))
}

/// Merge the two clusters whose centroids are closest.
fn merge_nearest(clusters: &mut Vec<Cluster>, anchors: &[ScoredPoi]) {
    if clusters.len() < 2 {
        return;
    }
    let mut best = (0, 1);
    let mut best_distance = f64::INFINITY;
    for i in 0..clusters.len() {
        for j in i + 1..clusters.len() {
            let d = haversine_m(clusters[i].centroid, clusters[j].centroid);
            if d < best_distance {
                best_distance = d;
                best = (i, j);
            }
        }
    }

    let (keep, absorb) = best;
    let absorbed = clusters.remove(absorb);
    let target = &mut clusters[keep];
    target.members.extend(absorbed.members);
    target.members.sort_unstable();
    target.centroid = member_centroid(&target.members, anchors);
    tracing::debug!(distance_m = best_distance, "merged nearest anchor clusters");
}

/// Nearest-neighbor chain over centroids, starting at the cluster that holds
/// the highest-priority anchor.
fn order_clusters(mut clusters: Vec<Cluster>, anchors: &[ScoredPoi]) -> Vec<Cluster> {
    if clusters.is_empty() {
        return clusters;
    }
    let top = highest_priority(anchors);
    let start = clusters
        .iter()
        .position(|c| c.members.contains(&top))
        .unwrap_or(0);

    let mut ordered = vec![clusters.remove(start)];
    while !clusters.is_empty() {
        let current = ordered[ordered.len() - 1].centroid;
        let mut next = 0;
        let mut next_distance = f64::INFINITY;
        for (i, cluster) in clusters.iter().enumerate() {
            let d = haversine_m(current, cluster.centroid);
            if d < next_distance {
                next_distance = d;
                next = i;
            }
        }
        ordered.push(clusters.remove(next));
    }
    ordered
}

fn highest_priority(pois: &[ScoredPoi]) -> usize {
    let mut best = 0;
    for (i, poi) in pois.iter().enumerate() {
        if poi.priority_score > pois[best].priority_score {
            best = i;
        }
    }
    best
}

/// Sort indices by descending priority, index breaking ties.
fn by_priority(mut indices: Vec<usize>, pois: &[ScoredPoi]) -> Vec<usize> {
    indices.sort_by(|&a, &b| {
        pois[b]
            .priority_score
            .total_cmp(&pois[a].priority_score)
            .then(a.cmp(&b))
    });
    indices
}

fn relocate_overflow(builds: &mut [DayBuild], anchors: &[ScoredPoi], capacity: usize, diagnostics: &mut Vec<Diagnostic>) {
    for source in 0..builds.len() {
        if builds[source].anchors.len() <= capacity {
            continue;
        }
        let excess = builds[source].anchors.split_off(capacity);
        for anchor in excess {
            let coords = anchors[anchor].coords();
            let target = (0..builds.len())
                .filter(|&d| d != source && builds[d].anchors.len() < capacity)
                .min_by(|&a, &b| {
                    let gap_a = a.abs_diff(source);
                    let gap_b = b.abs_diff(source);
                    let dist_a = builds[a].centroid.map_or(f64::INFINITY, |c| haversine_m(coords, c));
                    let dist_b = builds[b].centroid.map_or(f64::INFINITY, |c| haversine_m(coords, c));
                    gap_a.cmp(&gap_b).then(dist_a.total_cmp(&dist_b)).then(a.cmp(&b))
                });

            let relocated_to = match target {
                Some(day) => {
                    builds[day].anchors.push(anchor);
                    builds[day].centroid = Some(member_centroid(&builds[day].anchors, anchors));
                    Some(day + 1)
                }
                None => {
                    builds[source].anchors.push(anchor);
                    None
                }
            };

            tracing::warn!(
                anchor = %anchors[anchor].name(),
                day = source + 1,
                capacity,
                relocated_to = ?relocated_to,
                "anchor exceeds day capacity"
            );
            diagnostics.push(Diagnostic::AnchorCapacityOverflow {
                place_id: anchors[anchor].id().clone(),
                name: anchors[anchor].name().to_string(),
                day: source + 1,
                capacity,
                relocated_to,
            });
        }
        builds[source].centroid = Some(member_centroid(&builds[source].anchors, anchors));
    }
}

/// Take up to `room` unused regulars within `radius_m` of `center`, best first.
fn fill_near(
    center: Coord,
    room: usize,
    regulars: &[ScoredPoi],
    eligible: &[bool],
    used: &mut [bool],
    radius_m: f64,
) -> Vec<usize> {
    let mut picked = Vec::new();
    for i in by_priority((0..regulars.len()).collect(), regulars) {
        if picked.len() >= room {
            break;
        }
        if used[i] || !eligible[i] {
            continue;
        }
        if haversine_m(center, regulars[i].coords()) <= radius_m {
            used[i] = true;
            picked.push(i);
        }
    }
    picked
}

/// Among the top unused regulars, the one with the most unused neighbors
/// inside the search radius.
fn pick_seed(regulars: &[ScoredPoi], eligible: &[bool], used: &[bool], params: &AllocationParams) -> Option<usize> {
    let available: Vec<usize> = by_priority((0..regulars.len()).collect(), regulars)
        .into_iter()
        .filter(|&i| !used[i] && eligible[i])
        .collect();

    let mut best: Option<(usize, usize)> = None;
    for &candidate in available.iter().take(params.top_n_considered.max(1)) {
        let center = regulars[candidate].coords();
        let density = available
            .iter()
            .filter(|&&other| haversine_m(center, regulars[other].coords()) <= params.poi_search_radius_m)
            .count();
        if best.is_none_or(|(_, best_density)| density > best_density) {
            best = Some((candidate, density));
        }
    }
    best.map(|(seed, _)| seed)
}

// ============================================================================
// Simple strategy
// ============================================================================

impl DayAllocator for SimpleAllocator {
    fn strategy(&self) -> ClusteringStrategy {
        ClusteringStrategy::Simple
    }

    fn allocate(&self, anchors: &[ScoredPoi], regulars: &[ScoredPoi], params: &AllocationParams) -> Allocation {
        let days = params.trip_duration_days.max(1);
        let capacity = params.max_pois_per_day;
        let total_capacity = days * capacity;
        let mut diagnostics = Vec::new();

        let placed_anchors = anchors.len().min(total_capacity);
        let regular_slots = total_capacity - placed_anchors;
        let take_regulars = regulars.len().min(regular_slots);

        let mut pool: Vec<ScoredPoi> = anchors[..placed_anchors].to_vec();
        pool.extend_from_slice(&regulars[..take_regulars]);
        let held_back = regulars[take_regulars..].to_vec();

        let mut sets: Vec<Vec<ScoredPoi>> = Vec::with_capacity(days);
        let mut remaining = pool.into_iter();
        let mut left = placed_anchors + take_regulars;
        for day in 0..days {
            let share = left.div_ceil(days - day).min(capacity);
            sets.push(remaining.by_ref().take(share).collect());
            left -= share;
        }

        for overflow in &anchors[placed_anchors..] {
            tracing::warn!(anchor = %overflow.name(), days, capacity, "no day has room left for anchor");
            diagnostics.push(Diagnostic::AnchorCapacityOverflow {
                place_id: overflow.id().clone(),
                name: overflow.name().to_string(),
                day: days,
                capacity,
                relocated_to: None,
            });
            if let Some(last) = sets.last_mut() {
                last.push(overflow.clone());
            }
        }

        // Days here are not grouped geographically, so the best POI is the
        // day's reference point rather than the mean position.
        let days = sets
            .into_iter()
            .enumerate()
            .map(|(i, pois)| {
                let mut day = DaySet {
                    day: i + 1,
                    pois,
                    centroid: None,
                };
                day.centroid = day.anchor_point().map(ScoredPoi::coords);
                day
            })
            .collect();

        Allocation {
            strategy: self.strategy(),
            days,
            diagnostics,
            held_back,
        }
    }
}

/// Ids of every POI placed by an allocation.
pub fn placed_ids(allocation: &Allocation) -> HashSet<PlaceId> {
    allocation
        .days
        .iter()
        .flat_map(|day| day.pois.iter().map(|p| p.id().clone()))
        .collect()
}
