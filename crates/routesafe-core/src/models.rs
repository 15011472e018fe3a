//! Core data models for RouteSafe clearance checking.

use serde::{Deserialize, Serialize};

/// A latitude/longitude position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A height-restricted structure (low bridge) the vehicle must pass under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub coordinate: Coordinate,
    /// Clearance height of the structure in meters
    pub clearance_height_m: f64,
}

impl Obstacle {
    pub fn new(lat: f64, lon: f64, clearance_height_m: f64) -> Self {
        Self {
            coordinate: Coordinate::new(lat, lon),
            clearance_height_m,
        }
    }

    /// True when the position is valid and the height is finite and positive.
    pub fn is_valid(&self) -> bool {
        self.coordinate.is_valid()
            && self.clearance_height_m.is_finite()
            && self.clearance_height_m > 0.0
    }
}

/// Aggregate height risk for a route, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No obstacle within the search radius of any sampled point
    None,
    /// Obstacles near the route, all clearing the comfort margin
    Low,
    /// At least one obstacle inside the comfort margin
    Near,
    /// At least one obstacle the vehicle will not fit under
    Conflict,
}

impl RiskLevel {
    /// Operator-facing severity label.
    pub fn severity(&self) -> &'static str {
        match self {
            RiskLevel::Conflict => "high",
            RiskLevel::Near => "medium",
            RiskLevel::None | RiskLevel::Low => "low",
        }
    }
}

/// An obstacle observed near the route, with its closest approach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleProximity {
    pub obstacle: Obstacle,
    /// Minimum distance from any sampled route point to the obstacle
    pub distance_m: f64,
}

/// Result of scanning one route against the obstacle catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearanceOutcome {
    pub risk: RiskLevel,
    /// Globally nearest obstacle over all samples, unfiltered by clearance
    pub nearest: Option<ObstacleProximity>,
    /// Obstacles the vehicle cannot pass under, nearest first
    pub conflicts: Vec<ObstacleProximity>,
}

impl ClearanceOutcome {
    /// The deterministic outcome for an empty route or empty catalog.
    pub fn clear() -> Self {
        Self {
            risk: RiskLevel::None,
            nearest: None,
            conflicts: Vec::new(),
        }
    }

    pub fn has_conflict(&self) -> bool {
        self.risk == RiskLevel::Conflict
    }
}

/// An exclusion polygon handed to the router to force a path around an
/// obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvoidanceZone {
    pub center: Coordinate,
    pub radius_m: f64,
    /// Square ring of vertices, closed (first == last)
    pub polygon: Vec<Coordinate>,
}

impl AvoidanceZone {
    /// Build a square zone of half-width `radius_m` centered on `center`.
    pub fn around(center: Coordinate, radius_m: f64) -> Self {
        let dlat = crate::spatial::meters_to_lat(radius_m, center.lat);
        let dlon = crate::spatial::meters_to_lon(radius_m, center.lat);
        let polygon = vec![
            Coordinate::new(center.lat - dlat, center.lon - dlon),
            Coordinate::new(center.lat - dlat, center.lon + dlon),
            Coordinate::new(center.lat + dlat, center.lon + dlon),
            Coordinate::new(center.lat + dlat, center.lon - dlon),
            Coordinate::new(center.lat - dlat, center.lon - dlon),
        ];
        Self {
            center,
            radius_m,
            polygon,
        }
    }

    /// GeoJSON `Polygon` geometry with `[lon, lat]` vertex order.
    pub fn to_geojson(&self) -> serde_json::Value {
        let ring: Vec<[f64; 2]> = self.polygon.iter().map(|c| [c.lon, c.lat]).collect();
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [ring],
        })
    }
}

/// Why the decision's alternate slot looks the way it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlternateStatus {
    /// Primary route had no conflict; avoidance never ran
    NotNeeded,
    /// Caller declined the avoidance attempt
    Declined,
    /// Router produced no alternate (timeout, no path, transport failure)
    Unavailable { reason: String },
    /// Alternate came back clear and is now the primary route
    Promoted,
    /// Alternate still conflicts; kept only as an informational overlay
    StillConflicted,
}

/// A non-primary route kept alongside the decision for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryRoute {
    pub route: Vec<Coordinate>,
    pub outcome: ClearanceOutcome,
}

/// Final route selection for one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    /// The route the caller should drive
    pub primary: Vec<Coordinate>,
    /// Outcome justifying the selection (the alternate's when promoted)
    pub outcome: ClearanceOutcome,
    /// Demoted original after promotion, or a conflicted alternate
    pub secondary: Option<SecondaryRoute>,
    pub alternate: AlternateStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_range_validation() {
        assert!(Coordinate::new(53.74, -1.5).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.1).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn obstacle_requires_positive_finite_height() {
        assert!(Obstacle::new(53.74, -1.5, 4.6).is_valid());
        assert!(!Obstacle::new(53.74, -1.5, 0.0).is_valid());
        assert!(!Obstacle::new(53.74, -1.5, -2.0).is_valid());
        assert!(!Obstacle::new(53.74, -1.5, f64::INFINITY).is_valid());
        assert!(!Obstacle::new(91.0, -1.5, 4.6).is_valid());
    }

    #[test]
    fn risk_levels_order_by_severity() {
        assert!(RiskLevel::None < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Near);
        assert!(RiskLevel::Near < RiskLevel::Conflict);
        assert_eq!(
            RiskLevel::Near.max(RiskLevel::Conflict),
            RiskLevel::Conflict
        );
    }

    #[test]
    fn severity_labels() {
        assert_eq!(RiskLevel::Conflict.severity(), "high");
        assert_eq!(RiskLevel::Near.severity(), "medium");
        assert_eq!(RiskLevel::Low.severity(), "low");
        assert_eq!(RiskLevel::None.severity(), "low");
    }

    #[test]
    fn avoidance_zone_ring_is_closed_and_centered() {
        let center = Coordinate::new(53.74, -1.5);
        let zone = AvoidanceZone::around(center, 250.0);

        assert_eq!(zone.polygon.len(), 5);
        assert_eq!(zone.polygon.first(), zone.polygon.last());

        let mid_lat: f64 = zone.polygon[..4].iter().map(|c| c.lat).sum::<f64>() / 4.0;
        let mid_lon: f64 = zone.polygon[..4].iter().map(|c| c.lon).sum::<f64>() / 4.0;
        assert!((mid_lat - center.lat).abs() < 1e-9);
        assert!((mid_lon - center.lon).abs() < 1e-9);
    }

    #[test]
    fn avoidance_zone_geojson_uses_lon_lat_order() {
        let zone = AvoidanceZone::around(Coordinate::new(53.74, -1.5), 250.0);
        let geojson = zone.to_geojson();

        assert_eq!(geojson["type"], "Polygon");
        let ring = geojson["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        // First vertex is [lon, lat] of the ring's south-west corner.
        let first = ring[0].as_array().unwrap();
        assert!((first[0].as_f64().unwrap() - zone.polygon[0].lon).abs() < 1e-12);
        assert!((first[1].as_f64().unwrap() - zone.polygon[0].lat).abs() < 1e-12);
    }

    #[test]
    fn alternate_status_serializes_with_status_tag() {
        let promoted = serde_json::to_value(AlternateStatus::Promoted).unwrap();
        assert_eq!(promoted["status"], "promoted");

        let unavailable = serde_json::to_value(AlternateStatus::Unavailable {
            reason: "routing provider timed out".to_string(),
        })
        .unwrap();
        assert_eq!(unavailable["status"], "unavailable");
        assert_eq!(unavailable["reason"], "routing provider timed out");
    }
}
