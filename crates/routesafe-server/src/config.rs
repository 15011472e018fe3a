//! Server configuration from environment.

use routesafe_core::ClearanceRules;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub ors_base_url: String,
    pub ors_api_key: String,
    pub bridge_csv_path: String,
    pub router_timeout_s: u64,
    pub search_radius_m: Option<f64>,
    pub avoidance_radius_m: Option<f64>,
    pub geocode_cache_ttl_s: u64,
    pub geocode_cache_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("ROUTESAFE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            ors_base_url: env::var("ORS_BASE_URL")
                .unwrap_or_else(|_| "https://api.openrouteservice.org".to_string()),
            ors_api_key: env::var("ORS_API_KEY").unwrap_or_default(),
            bridge_csv_path: env::var("BRIDGE_CSV_PATH")
                .unwrap_or_else(|_| "bridge_heights_clean.csv".to_string()),
            router_timeout_s: env::var("ROUTESAFE_ROUTER_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            search_radius_m: env::var("ROUTESAFE_SEARCH_RADIUS_M")
                .ok()
                .and_then(|s| s.parse().ok()),
            avoidance_radius_m: env::var("ROUTESAFE_AVOIDANCE_RADIUS_M")
                .ok()
                .and_then(|s| s.parse().ok()),
            geocode_cache_ttl_s: env::var("ROUTESAFE_GEOCODE_TTL_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
            geocode_cache_max_entries: env::var("ROUTESAFE_GEOCODE_CACHE_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(512),
        }
    }

    /// Clearance rules with any environment overrides applied.
    pub fn clearance_rules(&self) -> ClearanceRules {
        let mut rules = ClearanceRules::default();
        if let Some(radius) = self.search_radius_m {
            rules.search_radius_m = radius;
        }
        if let Some(radius) = self.avoidance_radius_m {
            rules.avoidance_radius_m = radius;
        }
        rules
    }
}
