//! Route clearance evaluation against the obstacle catalog.

use crate::catalog::ObstacleCatalog;
use crate::models::{ClearanceOutcome, Coordinate, Obstacle, ObstacleProximity, RiskLevel};
use crate::sample::sample_route;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Thresholds and budgets for clearance checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceRules {
    /// How far from the sampled path an obstacle still counts as "on route"
    pub search_radius_m: f64,
    /// Minimum acceptable clearance margin; below this the vehicle does not fit
    pub conflict_clearance_m: f64,
    /// Comfort margin; clearance below this raises a near-limit warning
    pub near_clearance_m: f64,
    /// Sample budget for route scanning
    pub max_sample_points: usize,
    /// Half-width of the exclusion zones built around conflicting obstacles
    pub avoidance_radius_m: f64,
}

impl Default for ClearanceRules {
    fn default() -> Self {
        Self {
            search_radius_m: 300.0,
            conflict_clearance_m: 0.0,
            near_clearance_m: 0.25,
            max_sample_points: 120,
            avoidance_radius_m: 250.0,
        }
    }
}

/// Clearance evaluation engine bound to one obstacle catalog.
///
/// Holds no mutable state; one engine may serve any number of concurrent
/// evaluations over the shared catalog.
#[derive(Debug)]
pub struct ClearanceEngine {
    catalog: Arc<ObstacleCatalog>,
    rules: ClearanceRules,
}

impl ClearanceEngine {
    /// Create an engine over a shared catalog.
    ///
    /// `near_clearance_m` is clamped up to `conflict_clearance_m` so the
    /// near-limit band can never sit below the conflict band.
    pub fn new(catalog: Arc<ObstacleCatalog>, mut rules: ClearanceRules) -> Self {
        rules.near_clearance_m = rules.near_clearance_m.max(rules.conflict_clearance_m);
        Self { catalog, rules }
    }

    pub fn rules(&self) -> &ClearanceRules {
        &self.rules
    }

    pub fn catalog(&self) -> &ObstacleCatalog {
        &self.catalog
    }

    /// Scan a route and classify its height risk.
    ///
    /// Per sampled point, every obstacle within `search_radius_m` is
    /// classified by its clearance against the vehicle height; the route
    /// aggregate is the worst per-obstacle level. The nearest obstacle is
    /// tracked across all samples regardless of radius or clearance.
    ///
    /// Pure and deterministic for a fixed catalog: the same route and
    /// height always produce a bit-identical outcome, and the reduction is
    /// commutative, so sample and obstacle order are unobservable.
    pub fn evaluate(&self, route: &[Coordinate], vehicle_height_m: f64) -> ClearanceOutcome {
        let samples = sample_route(route, self.rules.max_sample_points);
        if samples.is_empty() || self.catalog.is_empty() {
            return ClearanceOutcome::clear();
        }

        let mut risk = RiskLevel::None;
        let mut nearest: Option<ObstacleProximity> = None;
        let mut conflicts: Vec<ObstacleProximity> = Vec::new();

        for sample in &samples {
            if let Some((obstacle, distance_m)) = self.catalog.find_nearest(*sample) {
                let closer = nearest.map(|n| distance_m < n.distance_m).unwrap_or(true);
                if closer {
                    nearest = Some(ObstacleProximity {
                        obstacle,
                        distance_m,
                    });
                }
            }

            for (obstacle, distance_m) in self
                .catalog
                .find_within_radius(*sample, self.rules.search_radius_m)
            {
                let clearance_m = obstacle.clearance_height_m - vehicle_height_m;
                let level = self.classify(clearance_m);
                risk = risk.max(level);
                if level == RiskLevel::Conflict {
                    merge_conflict(&mut conflicts, obstacle, distance_m);
                }
            }
        }

        // Nearest-first keeps the list independent of scan order.
        conflicts.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        ClearanceOutcome {
            risk,
            nearest,
            conflicts,
        }
    }

    /// Band classification: strict upper bounds, non-strict lower.
    fn classify(&self, clearance_m: f64) -> RiskLevel {
        if clearance_m < self.rules.conflict_clearance_m {
            RiskLevel::Conflict
        } else if clearance_m < self.rules.near_clearance_m {
            RiskLevel::Near
        } else {
            RiskLevel::Low
        }
    }
}

/// Keep one entry per obstacle, holding its minimum observed distance.
fn merge_conflict(conflicts: &mut Vec<ObstacleProximity>, obstacle: Obstacle, distance_m: f64) {
    match conflicts.iter_mut().find(|c| c.obstacle == obstacle) {
        Some(existing) => {
            if distance_m < existing.distance_m {
                existing.distance_m = distance_m;
            }
        }
        None => conflicts.push(ObstacleProximity {
            obstacle,
            distance_m,
        }),
    }
}
