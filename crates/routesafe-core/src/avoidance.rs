//! Bounded avoidance retry around conflicting obstacles.
//!
//! On a conflicting route the planner builds one exclusion zone per
//! conflicting obstacle and asks the external router for an alternate
//! once. The router's answer (or failure) settles the decision; there is
//! no second round.

use crate::clearance::ClearanceEngine;
use crate::models::{
    AlternateStatus, AvoidanceZone, ClearanceOutcome, Coordinate, RouteDecision, SecondaryRoute,
};
use thiserror::Error;

/// Failure surfaced by the external router during an avoidance attempt.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("routing provider timed out")]
    Timeout,
    #[error("no feasible route around the exclusion zones")]
    NoRoute,
    #[error("routing provider failure: {0}")]
    Transport(String),
}

/// One planning pass, either settled immediately or suspended on the router.
#[derive(Debug)]
pub enum PlanProgress<'a> {
    /// No conflict on the evaluated route; nothing to avoid
    Decided(RouteDecision),
    /// Conflict found; an alternate route is needed
    AwaitingAlternate(PendingAvoidance<'a>),
}

/// A planning pass waiting on the external router.
///
/// Exactly one of [`resolve`](Self::resolve) or [`abandon`](Self::abandon)
/// finishes the pass.
#[derive(Debug)]
pub struct PendingAvoidance<'a> {
    engine: &'a ClearanceEngine,
    route: Vec<Coordinate>,
    outcome: ClearanceOutcome,
    vehicle_height_m: f64,
    zones: Vec<AvoidanceZone>,
}

impl PendingAvoidance<'_> {
    /// Exclusion zones for the router, one per conflicting obstacle.
    pub fn zones(&self) -> &[AvoidanceZone] {
        &self.zones
    }

    /// Outcome of the original route that triggered the attempt.
    pub fn outcome(&self) -> &ClearanceOutcome {
        &self.outcome
    }

    /// Feed the router's answer back and settle the decision.
    ///
    /// A clear alternate is promoted to primary and the original demoted to
    /// the risky secondary. A conflicted alternate stays secondary so the
    /// caller can see that no safe alternative exists. A router failure
    /// keeps the original route and its conflict; degraded, not fatal.
    pub fn resolve(self, alternate: Result<Vec<Coordinate>, RouterError>) -> RouteDecision {
        let alt_route = match alternate {
            Ok(alt_route) => alt_route,
            Err(err) => {
                return RouteDecision {
                    primary: self.route,
                    outcome: self.outcome,
                    secondary: None,
                    alternate: AlternateStatus::Unavailable {
                        reason: err.to_string(),
                    },
                }
            }
        };

        let alt_outcome = self.engine.evaluate(&alt_route, self.vehicle_height_m);
        if alt_outcome.has_conflict() {
            RouteDecision {
                primary: self.route,
                outcome: self.outcome,
                secondary: Some(SecondaryRoute {
                    route: alt_route,
                    outcome: alt_outcome,
                }),
                alternate: AlternateStatus::StillConflicted,
            }
        } else {
            RouteDecision {
                primary: alt_route,
                outcome: alt_outcome,
                secondary: Some(SecondaryRoute {
                    route: self.route,
                    outcome: self.outcome,
                }),
                alternate: AlternateStatus::Promoted,
            }
        }
    }

    /// Settle without consulting the router (caller declined avoidance).
    pub fn abandon(self) -> RouteDecision {
        RouteDecision {
            primary: self.route,
            outcome: self.outcome,
            secondary: None,
            alternate: AlternateStatus::Declined,
        }
    }
}

/// Drives evaluation and the single avoidance retry for one engine.
#[derive(Debug, Clone, Copy)]
pub struct AvoidancePlanner<'a> {
    engine: &'a ClearanceEngine,
}

impl<'a> AvoidancePlanner<'a> {
    pub fn new(engine: &'a ClearanceEngine) -> Self {
        Self { engine }
    }

    /// Evaluate a route; on conflict, return the pending avoidance attempt.
    pub fn plan(&self, route: Vec<Coordinate>, vehicle_height_m: f64) -> PlanProgress<'a> {
        let outcome = self.engine.evaluate(&route, vehicle_height_m);
        if !outcome.has_conflict() {
            return PlanProgress::Decided(RouteDecision {
                primary: route,
                outcome,
                secondary: None,
                alternate: AlternateStatus::NotNeeded,
            });
        }

        let radius_m = self.engine.rules().avoidance_radius_m;
        let zones = outcome
            .conflicts
            .iter()
            .map(|conflict| AvoidanceZone::around(conflict.obstacle.coordinate, radius_m))
            .collect();

        PlanProgress::AwaitingAlternate(PendingAvoidance {
            engine: self.engine,
            route,
            outcome,
            vehicle_height_m,
            zones,
        })
    }

    /// Full planning pass with a synchronous router callback.
    ///
    /// The callback is the only boundary to the outside world; it is
    /// responsible for honoring the caller's timeout and mapping failures
    /// into [`RouterError`].
    pub fn plan_with_avoidance<F>(
        &self,
        route: Vec<Coordinate>,
        vehicle_height_m: f64,
        alternate_router: F,
    ) -> RouteDecision
    where
        F: FnOnce(&[AvoidanceZone]) -> Result<Vec<Coordinate>, RouterError>,
    {
        match self.plan(route, vehicle_height_m) {
            PlanProgress::Decided(decision) => decision,
            PlanProgress::AwaitingAlternate(pending) => {
                let alternate = alternate_router(pending.zones());
                pending.resolve(alternate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObstacleCatalog;
    use crate::clearance::ClearanceRules;
    use crate::models::{Obstacle, RiskLevel};
    use std::sync::Arc;

    // One 4.6m bridge sitting on the direct route.
    fn test_engine() -> ClearanceEngine {
        ClearanceEngine::new(
            Arc::new(ObstacleCatalog::new(vec![Obstacle::new(
                53.7400, -1.5000, 4.6,
            )])),
            ClearanceRules::default(),
        )
    }

    fn conflicting_route() -> Vec<Coordinate> {
        vec![
            Coordinate::new(53.7390, -1.5000),
            Coordinate::new(53.7410, -1.5000),
        ]
    }

    // Parallel route ~7km west, well clear of the bridge.
    fn clear_route() -> Vec<Coordinate> {
        vec![
            Coordinate::new(53.7390, -1.6000),
            Coordinate::new(53.7410, -1.6000),
        ]
    }

    #[test]
    fn clear_route_decides_without_calling_router() {
        let engine = test_engine();
        let planner = AvoidancePlanner::new(&engine);

        let decision = planner.plan_with_avoidance(clear_route(), 4.8, |_| {
            panic!("router must not be consulted for a clear route")
        });

        assert_eq!(decision.alternate, AlternateStatus::NotNeeded);
        assert_eq!(decision.primary, clear_route());
        assert!(decision.secondary.is_none());
        assert_ne!(decision.outcome.risk, RiskLevel::Conflict);
    }

    #[test]
    fn clear_alternate_is_promoted_to_primary() {
        let engine = test_engine();
        let planner = AvoidancePlanner::new(&engine);

        let decision =
            planner.plan_with_avoidance(conflicting_route(), 4.8, |_| Ok(clear_route()));

        assert_eq!(decision.alternate, AlternateStatus::Promoted);
        assert_eq!(decision.primary, clear_route());
        assert_ne!(decision.outcome.risk, RiskLevel::Conflict);

        let secondary = decision.secondary.expect("original kept as secondary");
        assert_eq!(secondary.route, conflicting_route());
        assert_eq!(secondary.outcome.risk, RiskLevel::Conflict);
    }

    #[test]
    fn router_failure_keeps_original_and_its_conflict() {
        let engine = test_engine();
        let planner = AvoidancePlanner::new(&engine);

        let decision =
            planner.plan_with_avoidance(conflicting_route(), 4.8, |_| Err(RouterError::Timeout));

        assert_eq!(decision.primary, conflicting_route());
        assert_eq!(decision.outcome.risk, RiskLevel::Conflict);
        assert!(decision.secondary.is_none());
        match decision.alternate {
            AlternateStatus::Unavailable { reason } => {
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn conflicted_alternate_stays_secondary() {
        let engine = test_engine();
        let planner = AvoidancePlanner::new(&engine);

        // The "alternate" passes the same bridge.
        let decision =
            planner.plan_with_avoidance(conflicting_route(), 4.8, |_| Ok(conflicting_route()));

        assert_eq!(decision.alternate, AlternateStatus::StillConflicted);
        assert_eq!(decision.primary, conflicting_route());
        assert_eq!(decision.outcome.risk, RiskLevel::Conflict);

        let secondary = decision.secondary.expect("alternate kept for display");
        assert_eq!(secondary.outcome.risk, RiskLevel::Conflict);
    }

    #[test]
    fn one_zone_per_conflicting_obstacle() {
        let engine = ClearanceEngine::new(
            Arc::new(ObstacleCatalog::new(vec![
                Obstacle::new(53.7395, -1.5000, 4.6),
                Obstacle::new(53.7405, -1.5000, 4.2),
            ])),
            ClearanceRules::default(),
        );
        let planner = AvoidancePlanner::new(&engine);

        match planner.plan(conflicting_route(), 4.8) {
            PlanProgress::AwaitingAlternate(pending) => {
                assert_eq!(pending.zones().len(), 2);
                for zone in pending.zones() {
                    assert_eq!(zone.polygon.len(), 5);
                    assert!((zone.radius_m - 250.0).abs() < 1e-12);
                }
                assert_eq!(pending.outcome().conflicts.len(), 2);
            }
            PlanProgress::Decided(decision) => {
                panic!("expected pending avoidance, got {:?}", decision.alternate)
            }
        }
    }

    #[test]
    fn abandon_keeps_original_with_declined_status() {
        let engine = test_engine();
        let planner = AvoidancePlanner::new(&engine);

        match planner.plan(conflicting_route(), 4.8) {
            PlanProgress::AwaitingAlternate(pending) => {
                let decision = pending.abandon();
                assert_eq!(decision.alternate, AlternateStatus::Declined);
                assert_eq!(decision.primary, conflicting_route());
                assert_eq!(decision.outcome.risk, RiskLevel::Conflict);
                assert!(decision.secondary.is_none());
            }
            PlanProgress::Decided(_) => panic!("route should conflict"),
        }
    }
}
