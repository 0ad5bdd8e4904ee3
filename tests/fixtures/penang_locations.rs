//! Real Penang locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. George Town sights sit within a
//! couple of kilometers of each other; the hills, the north coast and the
//! south-west of the island are 5 to 15 km out.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// George Town heritage core
// ============================================================================

pub const GEORGE_TOWN: &[Location] = &[
    Location::new("Komtar Tower", 5.4141, 100.3288),
    Location::new("Penang Street Art", 5.4164, 100.3327),
    Location::new("Clan Jetties", 5.4089, 100.3442),
    Location::new("Little India", 5.4185, 100.3324),
    Location::new("Khoo Kongsi", 5.4153, 100.3385),
];

// ============================================================================
// Hills and inland
// ============================================================================

pub const HILLS: &[Location] = &[
    Location::new("Penang Hill", 5.4231, 100.2699),
    Location::new("Kek Lok Si Temple", 5.3980, 100.2733),
    Location::new("Penang Botanic Gardens", 5.4319, 100.2862),
    Location::new("Wat Chaiyamangkalaram", 5.4174, 100.2991),
];

// ============================================================================
// North coast
// ============================================================================

pub const NORTH_COAST: &[Location] = &[
    Location::new("Batu Ferringhi Beach", 5.4723, 100.2467),
    Location::new("Tropical Spice Garden", 5.4589, 100.2234),
    Location::new("Entopia Butterfly Farm", 5.4656, 100.2389),
    Location::new("Penang National Park", 5.4423, 100.1989),
    Location::new("Gurney Drive", 5.4378, 100.3101),
    Location::new("Gurney Plaza", 5.4381, 100.3097),
];

// ============================================================================
// South and south-west
// ============================================================================

pub const SOUTH: &[Location] = &[
    Location::new("Balik Pulau", 5.3465, 100.2341),
    Location::new("Snake Temple", 5.3320, 100.2865),
    Location::new("Penang Bridge View", 5.3589, 100.3267),
];

pub fn all_locations() -> Vec<Location> {
    GEORGE_TOWN
        .iter()
        .chain(HILLS)
        .chain(NORTH_COAST)
        .chain(SOUTH)
        .cloned()
        .collect()
}

pub fn find(name: &str) -> Location {
    all_locations()
        .into_iter()
        .find(|loc| loc.name == name)
        .unwrap_or_else(|| panic!("unknown fixture location {name}"))
}
