//! Shared application state.

use crate::config::Config;
use dashmap::DashMap;
use routesafe_core::{ClearanceEngine, Coordinate};
use routesafe_ors::OrsClient;
use std::time::{Duration, Instant};

struct CachedGeocode {
    coordinate: Coordinate,
    fetched_at: Instant,
}

/// Postcode queries differing only in case or padding share a cache slot.
fn cache_key(query: &str) -> String {
    query.trim().to_uppercase()
}

/// Application state shared by all request handlers.
pub struct AppState {
    pub engine: ClearanceEngine,
    pub ors: OrsClient,
    pub config: Config,
    geocode_cache: DashMap<String, CachedGeocode>,
}

impl AppState {
    pub fn new(engine: ClearanceEngine, ors: OrsClient, config: Config) -> Self {
        Self {
            engine,
            ors,
            config,
            geocode_cache: DashMap::new(),
        }
    }

    /// Look up a previously geocoded query that is still fresh.
    pub fn cached_geocode(&self, query: &str) -> Option<Coordinate> {
        let ttl = Duration::from_secs(self.config.geocode_cache_ttl_s);
        let entry = self.geocode_cache.get(&cache_key(query))?;
        (entry.fetched_at.elapsed() <= ttl).then_some(entry.coordinate)
    }

    /// Remember a geocode result, evicting stale and surplus entries.
    pub fn remember_geocode(&self, query: &str, coordinate: Coordinate) {
        self.geocode_cache.insert(
            cache_key(query),
            CachedGeocode {
                coordinate,
                fetched_at: Instant::now(),
            },
        );
        self.prune_geocode_cache();
    }

    fn prune_geocode_cache(&self) {
        let ttl = Duration::from_secs(self.config.geocode_cache_ttl_s);
        self.geocode_cache
            .retain(|_, entry| entry.fetched_at.elapsed() <= ttl);

        let max_entries = self.config.geocode_cache_max_entries;
        if self.geocode_cache.len() <= max_entries {
            return;
        }

        let mut entries: Vec<(String, Instant)> = self
            .geocode_cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fetched_at))
            .collect();
        entries.sort_by_key(|(_, fetched_at)| *fetched_at);
        for (key, _) in entries {
            if self.geocode_cache.len() <= max_entries {
                break;
            }
            self.geocode_cache.remove(&key);
        }
    }
}
