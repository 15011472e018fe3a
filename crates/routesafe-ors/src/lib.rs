//! RouteSafe ORS - OpenRouteService API client
//!
//! Handles all communication with the OpenRouteService geocoding and
//! HGV directions endpoints.

pub mod client;

pub use client::{avoid_polygons_geojson, HgvRoute, OrsClient, OrsError};
