pub mod avoidance;
pub mod catalog;
pub mod clearance;
pub mod models;
pub mod sample;
pub mod spatial;

pub use avoidance::{AvoidancePlanner, PendingAvoidance, PlanProgress, RouterError};
pub use catalog::ObstacleCatalog;
pub use clearance::{ClearanceEngine, ClearanceRules};
pub use models::{
    AlternateStatus, AvoidanceZone, ClearanceOutcome, Coordinate, Obstacle, ObstacleProximity,
    RiskLevel, RouteDecision, SecondaryRoute,
};
pub use sample::sample_route;
pub use spatial::haversine_distance;
