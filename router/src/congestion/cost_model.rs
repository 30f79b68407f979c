use super::CongestionEdge2D;

/// The cost an edge contributes to a path search. Swapping strategies here
/// replaces the original's compile-time `HISTORY_COST`/`FASTROUTE_COST` flag
/// (spec.md Design Notes) with a capability object, so stage 1 and stage 2
/// can each hand the maze router the strategy they need.
pub trait CostModel: Sync {
    fn edge_cost(&self, edge: &CongestionEdge2D) -> f64;
}

/// Stage 1's pattern-routing cost (spec.md §4.1, `FASTROUTE_COST`):
/// `cost = max(0, cur_cap - max_cap + 1)`, a convex penalty that turns
/// positive only once an edge is at or past capacity.
pub struct FastRouteCost {
    pub congestion_penalty: f64,
}

impl CostModel for FastRouteCost {
    fn edge_cost(&self, edge: &CongestionEdge2D) -> f64 {
        let raw = edge.cur_cap as f64 - edge.max_cap as f64 + 1.0;
        raw.max(0.0) * self.congestion_penalty
    }
}

/// Stage 2's rip-up/reroute cost (spec.md §4.1, `HISTORY_COST`):
/// `cost = (cur_cap/max_cap + 1)^k * history`. `k` rises across iterations
/// (spec.md §4.7's `adjust` factor), making the history term bite harder
/// the longer an edge keeps overflowing.
pub struct HistoryCost {
    pub congestion_penalty: f64,
    pub history_weight: f64,
    pub k: f64,
}

impl CostModel for HistoryCost {
    fn edge_cost(&self, edge: &CongestionEdge2D) -> f64 {
        let ratio = if edge.max_cap > 0 {
            edge.cur_cap as f64 / edge.max_cap as f64
        } else {
            edge.cur_cap as f64
        };
        let base = (ratio + 1.0).powf(self.k);
        base * edge.history as f64 * self.history_weight * self.congestion_penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(cur_cap: u32, max_cap: u32, history: u32) -> CongestionEdge2D {
        CongestionEdge2D {
            cur_cap,
            max_cap,
            history,
            ..Default::default()
        }
    }

    #[test]
    fn fast_route_cost_is_zero_well_under_capacity() {
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };
        assert_eq!(model.edge_cost(&edge(0, 4, 0)), 0.0);
    }

    #[test]
    fn fast_route_cost_is_one_at_capacity() {
        let model = FastRouteCost {
            congestion_penalty: 1.0,
        };
        assert_eq!(model.edge_cost(&edge(4, 4, 0)), 1.0);
    }

    #[test]
    fn fast_route_cost_penalizes_overflow() {
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };
        assert_eq!(model.edge_cost(&edge(6, 4, 0)), 30.0);
    }

    #[test]
    fn history_cost_is_zero_with_no_history() {
        let model = HistoryCost {
            congestion_penalty: 1.0,
            history_weight: 1.0,
            k: 1.0,
        };
        assert_eq!(model.edge_cost(&edge(1, 4, 0)), 0.0);
    }

    #[test]
    fn history_cost_grows_with_k() {
        let low_k = HistoryCost {
            congestion_penalty: 1.0,
            history_weight: 1.0,
            k: 1.0,
        };
        let high_k = HistoryCost {
            congestion_penalty: 1.0,
            history_weight: 1.0,
            k: 2.0,
        };
        let e = edge(4, 4, 3);
        assert!(high_k.edge_cost(&e) > low_k.edge_cost(&e));
    }
}
