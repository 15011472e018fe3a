//! REST API routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;
use routesafe_core::{
    sample_route, AlternateStatus, AvoidancePlanner, AvoidanceZone, ClearanceOutcome, Coordinate,
    ObstacleProximity, PlanProgress, RiskLevel, RouteDecision, RouterError,
};
use routesafe_ors::{HgvRoute, OrsError};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/route", post(plan_route))
        .route("/api/route/check", post(check_route))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub start_postcode: String,
    pub dest_postcode: String,
    pub vehicle_height_m: f64,
    #[serde(default = "default_avoid_low_bridges")]
    pub avoid_low_bridges: bool,
    /// Reserved for DVLA height lookups by registration
    #[allow(dead_code)]
    pub vehicle_reg: Option<String>,
}

fn default_avoid_low_bridges() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Route vertices as [lon, lat] pairs
    pub route: Vec<[f64; 2]>,
    pub vehicle_height_m: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_min: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteGeometry {
    /// Route vertices as [lon, lat] pairs
    pub coords: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct BridgeReport {
    pub lat: f64,
    pub lon: f64,
    pub height_m: f64,
    pub distance_m: f64,
}

#[derive(Debug, Serialize)]
pub struct BridgeResult {
    pub risk_level: RiskLevel,
    pub severity: String,
    pub nearest_bridge: Option<BridgeReport>,
    pub conflicts: Vec<BridgeReport>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub metrics: RouteMetrics,
    pub main_route: RouteGeometry,
    pub alt_route: Option<RouteGeometry>,
    pub bridge_result: BridgeResult,
    pub recommended_route: String,
    pub alternate_status: AlternateStatus,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub bridge_result: BridgeResult,
    /// Sampled vertices the verdict was computed over
    pub checked_points: usize,
    pub generated_at: DateTime<Utc>,
}

type Rejection = (StatusCode, Json<serde_json::Value>);

// === Handlers ===

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "RouteSafe Navigator API" }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "bridges": state.engine.catalog().len(),
    }))
}

async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, Rejection> {
    validate_height(req.vehicle_height_m)?;

    let start = resolve_postcode(&state, &req.start_postcode).await?;
    let dest = resolve_postcode(&state, &req.dest_postcode).await?;

    let HgvRoute {
        polyline,
        distance_km,
        duration_min,
    } = state
        .ors
        .directions_hgv(start, dest, &[])
        .await
        .map_err(|err| {
            tracing::error!("Main route request failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Routing provider error: {}", err) })),
            )
        })?;

    let planner = AvoidancePlanner::new(&state.engine);
    let decision = match planner.plan(polyline, req.vehicle_height_m) {
        PlanProgress::Decided(decision) => decision,
        PlanProgress::AwaitingAlternate(pending) => {
            if req.avoid_low_bridges {
                let attempt = fetch_alternate(&state, start, dest, pending.zones()).await;
                pending.resolve(attempt)
            } else {
                pending.abandon()
            }
        }
    };

    tracing::info!(
        "Planned {} -> {}: {:?} risk, alternate {:?}",
        req.start_postcode,
        req.dest_postcode,
        decision.outcome.risk,
        decision.alternate
    );

    Ok(Json(build_route_response(
        &decision,
        distance_km,
        duration_min,
    )))
}

async fn check_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, Rejection> {
    validate_height(req.vehicle_height_m)?;
    if req.route.len() < 2 {
        return Err(bad_request(
            "Route needs at least 2 coordinates",
            Some("route"),
        ));
    }

    let route: Vec<Coordinate> = req
        .route
        .iter()
        .map(|[lon, lat]| Coordinate::new(*lat, *lon))
        .collect();
    if route.iter().any(|c| !c.is_valid()) {
        return Err(bad_request(
            "Route contains an out-of-range coordinate",
            Some("route"),
        ));
    }

    let outcome = state.engine.evaluate(&route, req.vehicle_height_m);
    let checked_points = sample_route(&route, state.engine.rules().max_sample_points).len();

    Ok(Json(CheckResponse {
        bridge_result: bridge_result(&outcome),
        checked_points,
        generated_at: Utc::now(),
    }))
}

// === Helpers ===

fn bad_request(message: &str, field: Option<&str>) -> Rejection {
    let mut payload = json!({ "error": message });
    if let Some(field) = field {
        payload["field"] = serde_json::Value::String(field.to_string());
    }
    (StatusCode::BAD_REQUEST, Json(payload))
}

fn validate_height(height_m: f64) -> Result<(), Rejection> {
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(bad_request(
            "Vehicle height must be a positive number",
            Some("vehicle_height_m"),
        ));
    }
    Ok(())
}

async fn resolve_postcode(state: &AppState, query: &str) -> Result<Coordinate, Rejection> {
    if let Some(coordinate) = state.cached_geocode(query) {
        return Ok(coordinate);
    }

    match state.ors.geocode(query).await {
        Ok(coordinate) => {
            state.remember_geocode(query, coordinate);
            Ok(coordinate)
        }
        Err(OrsError::NoMatch(_)) => Err(bad_request(
            &format!("No location found for '{}'", query),
            None,
        )),
        Err(err) => {
            tracing::error!("Geocoding '{}' failed: {}", query, err);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Geocoding service error: {}", err) })),
            ))
        }
    }
}

/// Ask the provider for a route around the zones, bounded by the configured
/// deadline. Failures come back as router errors, never HTTP rejections;
/// the caller still has a usable main route.
async fn fetch_alternate(
    state: &AppState,
    start: Coordinate,
    dest: Coordinate,
    zones: &[AvoidanceZone],
) -> Result<Vec<Coordinate>, RouterError> {
    let deadline = Duration::from_secs(state.config.router_timeout_s);
    match tokio::time::timeout(deadline, state.ors.directions_hgv(start, dest, zones)).await {
        Ok(Ok(route)) => Ok(route.polyline),
        Ok(Err(err)) if err.is_timeout() => Err(RouterError::Timeout),
        Ok(Err(err)) if err.is_no_route() => Err(RouterError::NoRoute),
        Ok(Err(err)) => Err(RouterError::Transport(err.to_string())),
        Err(_) => Err(RouterError::Timeout),
    }
}

fn build_route_response(
    decision: &RouteDecision,
    distance_km: f64,
    duration_min: f64,
) -> RouteResponse {
    // The metrics always describe the originally requested main route;
    // `recommended_route` says which geometry to actually drive.
    let (main_route, alt_route, recommended) = match (&decision.alternate, &decision.secondary) {
        (AlternateStatus::Promoted, Some(original)) => (
            geometry(&original.route),
            Some(geometry(&decision.primary)),
            "alt",
        ),
        (_, Some(secondary)) => (
            geometry(&decision.primary),
            Some(geometry(&secondary.route)),
            "main",
        ),
        (_, None) => (geometry(&decision.primary), None, "main"),
    };

    RouteResponse {
        metrics: RouteMetrics {
            distance_km,
            duration_min,
        },
        main_route,
        alt_route,
        bridge_result: bridge_result(&decision.outcome),
        recommended_route: recommended.to_string(),
        alternate_status: decision.alternate.clone(),
        generated_at: Utc::now(),
    }
}

fn geometry(route: &[Coordinate]) -> RouteGeometry {
    RouteGeometry {
        coords: route.iter().map(|c| [c.lon, c.lat]).collect(),
    }
}

fn bridge_report(proximity: &ObstacleProximity) -> BridgeReport {
    BridgeReport {
        lat: proximity.obstacle.coordinate.lat,
        lon: proximity.obstacle.coordinate.lon,
        height_m: proximity.obstacle.clearance_height_m,
        distance_m: proximity.distance_m,
    }
}

fn bridge_result(outcome: &ClearanceOutcome) -> BridgeResult {
    BridgeResult {
        risk_level: outcome.risk,
        severity: outcome.risk.severity().to_string(),
        nearest_bridge: outcome.nearest.as_ref().map(bridge_report),
        conflicts: outcome.conflicts.iter().map(bridge_report).collect(),
    }
}
