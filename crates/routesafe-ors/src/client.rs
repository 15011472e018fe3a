//! OpenRouteService API HTTP client.

use reqwest::Client;
use routesafe_core::{AvoidanceZone, Coordinate};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the routing provider.
#[derive(Debug, Error)]
pub enum OrsError {
    /// Geocoding found no feature for the query text.
    #[error("no geocoding result for '{0}'")]
    NoMatch(String),
    /// Provider answered with a non-success status.
    #[error("provider returned {code}: {detail}")]
    Status { code: u16, detail: String },
    /// Request never completed (connection failure, timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// Response body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl OrsError {
    /// True when the request died on a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, OrsError::Transport(err) if err.is_timeout())
    }

    /// True when the provider could not produce any route at all.
    pub fn is_no_route(&self) -> bool {
        matches!(self, OrsError::Status { code: 404, .. })
    }
}

/// A routed leg returned by the directions API.
#[derive(Debug, Clone)]
pub struct HgvRoute {
    pub polyline: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_min: f64,
}

/// HTTP client for the OpenRouteService geocoding and directions APIs.
pub struct OrsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OrsClient {
    /// Create a new client against a provider base URL.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve free text (typically a postcode) to a coordinate.
    pub async fn geocode(&self, text: &str) -> Result<Coordinate, OrsError> {
        let url = format!("{}/geocode/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("text", text),
                ("size", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OrsError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        let payload: Value = response.json().await?;
        parse_geocode(&payload, text)
    }

    /// Request a driving-hgv route, excluding the given avoidance zones.
    pub async fn directions_hgv(
        &self,
        start: Coordinate,
        end: Coordinate,
        avoid: &[AvoidanceZone],
    ) -> Result<HgvRoute, OrsError> {
        let url = format!("{}/v2/directions/driving-hgv/geojson", self.base_url);

        let mut body = serde_json::json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
        });
        if let Some(geometry) = avoid_polygons_geojson(avoid) {
            body["options"] = serde_json::json!({ "avoid_polygons": geometry });
        }

        debug!(zones = avoid.len(), "requesting driving-hgv directions");

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OrsError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        let payload: Value = response.json().await?;
        parse_directions(&payload)
    }
}

/// Merge avoidance zones into the `avoid_polygons` geometry ORS expects.
/// A single zone stays a Polygon; several become a MultiPolygon.
pub fn avoid_polygons_geojson(zones: &[AvoidanceZone]) -> Option<Value> {
    match zones {
        [] => None,
        [zone] => Some(zone.to_geojson()),
        zones => {
            let polygons: Vec<Value> = zones
                .iter()
                .map(|zone| zone.to_geojson()["coordinates"].clone())
                .collect();
            Some(serde_json::json!({
                "type": "MultiPolygon",
                "coordinates": polygons,
            }))
        }
    }
}

fn parse_geocode(payload: &Value, query: &str) -> Result<Coordinate, OrsError> {
    // Pelias returns matches as GeoJSON features, best match first.
    let feature = match payload["features"].get(0) {
        Some(feature) => feature,
        None => return Err(OrsError::NoMatch(query.to_string())),
    };

    let coords = &feature["geometry"]["coordinates"];
    let lon = coords.get(0).and_then(Value::as_f64);
    let lat = coords.get(1).and_then(Value::as_f64);

    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
        _ => Err(OrsError::Decode(
            "geocode feature missing coordinates".to_string(),
        )),
    }
}

fn parse_directions(payload: &Value) -> Result<HgvRoute, OrsError> {
    let feature = payload["features"]
        .get(0)
        .ok_or_else(|| OrsError::Decode("directions response has no features".to_string()))?;

    let pairs = feature["geometry"]["coordinates"]
        .as_array()
        .ok_or_else(|| OrsError::Decode("route geometry has no coordinates".to_string()))?;

    let mut polyline = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let lon = pair.get(0).and_then(Value::as_f64);
        let lat = pair.get(1).and_then(Value::as_f64);
        match (lat, lon) {
            (Some(lat), Some(lon)) => polyline.push(Coordinate::new(lat, lon)),
            _ => {
                return Err(OrsError::Decode(
                    "route geometry has a non-numeric pair".to_string(),
                ))
            }
        }
    }

    let segment = &feature["properties"]["segments"][0];
    let distance_m = segment["distance"]
        .as_f64()
        .ok_or_else(|| OrsError::Decode("route segment missing distance".to_string()))?;
    let duration_s = segment["duration"]
        .as_f64()
        .ok_or_else(|| OrsError::Decode("route segment missing duration".to_string()))?;

    Ok(HgvRoute {
        polyline,
        distance_km: distance_m / 1000.0,
        duration_min: duration_s / 60.0,
    })
}
