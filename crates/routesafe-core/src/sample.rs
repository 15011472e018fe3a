//! Route downsampling for bounded-cost proximity scanning.

use crate::models::Coordinate;

/// Reduce a polyline to at most `max_points` stride-sampled points.
///
/// Deterministic selection of every `ceil(len / max_points)`-th point,
/// in the original order, introducing no new points. The first and last
/// point of the input are always part of the output, so route endpoints
/// are always scanned no matter how aggressive the stride is.
pub fn sample_route(route: &[Coordinate], max_points: usize) -> Vec<Coordinate> {
    // A budget below 2 could not keep both endpoints.
    let budget = max_points.max(2);
    if route.len() <= budget {
        return route.to_vec();
    }

    let stride = route.len().div_ceil(budget);
    let mut sampled: Vec<Coordinate> = route.iter().step_by(stride).copied().collect();

    let last_index = route.len() - 1;
    if last_index % stride != 0 {
        if sampled.len() < budget {
            sampled.push(route[last_index]);
        } else {
            // Swap the final selected point for the true endpoint.
            let tail = sampled.len() - 1;
            sampled[tail] = route[last_index];
        }
    }

    sampled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_route(len: usize) -> Vec<Coordinate> {
        (0..len)
            .map(|i| Coordinate::new(53.0 + i as f64 * 1e-4, -1.5))
            .collect()
    }

    #[test]
    fn short_routes_pass_through_unchanged() {
        let route = straight_route(7);
        assert_eq!(sample_route(&route, 120), route);

        let pair = straight_route(2);
        assert_eq!(sample_route(&pair, 120), pair);
    }

    #[test]
    fn endpoints_always_survive_sampling() {
        for len in [2usize, 3, 119, 120, 121, 240, 241, 997, 5_000] {
            let route = straight_route(len);
            let sampled = sample_route(&route, 120);
            assert_eq!(sampled.first(), route.first(), "len {len}");
            assert_eq!(sampled.last(), route.last(), "len {len}");
        }
    }

    #[test]
    fn output_never_exceeds_budget() {
        for len in [121usize, 240, 360, 997, 10_000] {
            let sampled = sample_route(&straight_route(len), 120);
            assert!(sampled.len() <= 120, "len {len} gave {}", sampled.len());
        }
    }

    #[test]
    fn sampling_preserves_order_and_invents_nothing() {
        let route = straight_route(1_000);
        let sampled = sample_route(&route, 120);

        let mut cursor = 0usize;
        for point in &sampled {
            let found = route[cursor..].iter().position(|p| p == point);
            let offset = found.expect("sampled point missing from input");
            cursor += offset + 1;
        }
    }

    #[test]
    fn tiny_budget_still_keeps_both_endpoints() {
        let route = straight_route(50);
        let sampled = sample_route(&route, 2);
        assert_eq!(sampled.len(), 2);
        assert_eq!(sampled.first(), route.first());
        assert_eq!(sampled.last(), route.last());
    }
}
