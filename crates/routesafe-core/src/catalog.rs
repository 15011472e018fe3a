//! In-memory obstacle catalog with proximity queries.

use crate::models::{Coordinate, Obstacle};
use crate::spatial::haversine_distance;

/// Read-only set of height-restricted obstacles, loaded once and shared.
///
/// Queries are brute-force linear scans, which holds up fine for the low
/// thousands of entries in the bridge dataset. A grid or k-d index could
/// replace the scan without changing the query contract.
#[derive(Debug, Default)]
pub struct ObstacleCatalog {
    obstacles: Vec<Obstacle>,
    skipped: usize,
}

impl ObstacleCatalog {
    /// Build a catalog from parsed entries, dropping invalid ones.
    ///
    /// Entries with non-finite or out-of-range coordinates, or a
    /// non-positive height, are skipped and counted. Construction never
    /// fails; an empty catalog is a valid steady state.
    pub fn new(entries: impl IntoIterator<Item = Obstacle>) -> Self {
        let mut obstacles = Vec::new();
        let mut skipped = 0usize;
        for entry in entries {
            if entry.is_valid() {
                obstacles.push(entry);
            } else {
                skipped += 1;
            }
        }
        Self { obstacles, skipped }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Number of entries dropped during construction.
    pub fn skipped_entries(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// All obstacles within `radius_m` of `point`, with their distances.
    pub fn find_within_radius(&self, point: Coordinate, radius_m: f64) -> Vec<(Obstacle, f64)> {
        self.obstacles
            .iter()
            .filter_map(|obstacle| {
                let distance_m = haversine_distance(point, obstacle.coordinate);
                (distance_m <= radius_m).then_some((*obstacle, distance_m))
            })
            .collect()
    }

    /// The closest obstacle to `point`, or `None` for an empty catalog.
    pub fn find_nearest(&self, point: Coordinate) -> Option<(Obstacle, f64)> {
        self.obstacles
            .iter()
            .map(|obstacle| (*obstacle, haversine_distance(point, obstacle.coordinate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
