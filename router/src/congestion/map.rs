use crate::geometry::EdgePlane2D;
use groute_common::db::NetId;
use groute_common::geom::Direction;
use groute_common::model::RoutingRegion;
use std::collections::HashMap;

use super::CostModel;

/// Per-edge congestion bookkeeping (spec.md §3 `CongestionEdge2D`):
/// capacity, current demand, the history cost accumulated across
/// rip-up/reroute iterations, and which nets currently cross this edge.
/// Mirrors the teacher's `GridNode` (occupancy/history/cost_cache), with
/// capacity fixed at construction instead of recomputed per query, and an
/// explicit `used_net` table so a net never pays to reuse its own edge.
#[derive(Clone, Debug, Default)]
pub struct CongestionEdge2D {
    pub cur_cap: u32,
    pub max_cap: u32,
    pub history: u32,
    pub used_net: HashMap<NetId, u32>,
    cached_cost: f64,
}

impl CongestionEdge2D {
    pub fn overflow(&self) -> u32 {
        self.cur_cap.saturating_sub(self.max_cap)
    }

    pub fn is_congested(&self) -> bool {
        self.cur_cap > self.max_cap
    }
}

/// The flattened 2-D congestion map stage 1/stage 2 route against: one
/// `CongestionEdge2D` per grid edge, built from a `RoutingRegion`'s capacity
/// oracle.
pub struct CongestionMap2D {
    edges: EdgePlane2D<CongestionEdge2D>,
    width: u32,
    height: u32,
}

impl CongestionMap2D {
    pub fn from_region(region: &RoutingRegion, ibm_case: bool) -> Self {
        let mut edges: EdgePlane2D<CongestionEdge2D> =
            EdgePlane2D::new(region.width, region.height);
        for y in 0..region.height as i32 {
            for x in 0..region.width as i32 {
                if x + 1 < region.width as i32 {
                    let cap = region.max_cap_2d(x, y, x + 1, y, ibm_case);
                    edges.get_mut(x, y, x + 1, y).unwrap().max_cap = cap;
                }
                if y + 1 < region.height as i32 {
                    let cap = region.max_cap_2d(x, y, x, y + 1, ibm_case);
                    edges.get_mut(x, y, x, y + 1).unwrap().max_cap = cap;
                }
            }
        }
        Self {
            edges,
            width: region.width,
            height: region.height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn edge(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> &CongestionEdge2D {
        self.edges
            .get(x1, y1, x2, y2)
            .expect("congestion query on non-adjacent tiles")
    }

    pub fn edge_dir(&self, x: i32, y: i32, dir: Direction) -> Option<&CongestionEdge2D> {
        self.edges.get_dir(x, y, dir)
    }

    /// Insert one net's use of the edge `(x1,y1)-(x2,y2)`. Only increments
    /// `cur_cap` the first time this net crosses the edge; repeated inserts
    /// by the same net (e.g. overlapping two-pin sub-paths) just bump the
    /// per-net count.
    pub fn insert_net(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, net: NetId) {
        let edge = self
            .edges
            .get_mut(x1, y1, x2, y2)
            .expect("insert_net on non-adjacent tiles");
        let count = edge.used_net.entry(net).or_insert(0);
        if *count == 0 {
            edge.cur_cap += 1;
        }
        *count += 1;
    }

    /// Exact inverse of `insert_net`. Erases the net's entry once its count
    /// reaches zero (spec.md §3 invariant).
    pub fn remove_net(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, net: NetId) {
        let edge = self
            .edges
            .get_mut(x1, y1, x2, y2)
            .expect("remove_net on non-adjacent tiles");
        if let Some(count) = edge.used_net.get_mut(&net) {
            *count -= 1;
            if *count == 0 {
                edge.used_net.remove(&net);
                edge.cur_cap = edge.cur_cap.saturating_sub(1);
            }
        }
    }

    pub fn insert_path(&mut self, path: &[(i32, i32)], net: NetId) {
        for w in path.windows(2) {
            self.insert_net(w[0].0, w[0].1, w[1].0, w[1].1, net);
        }
    }

    pub fn remove_path(&mut self, path: &[(i32, i32)], net: NetId) {
        for w in path.windows(2) {
            self.remove_net(w[0].0, w[0].1, w[1].0, w[1].1, net);
        }
    }

    /// `(cost, unit_distance)` for traversing this edge while routing `net`.
    /// A net never pays to reuse an edge it already occupies (spec.md §4.1).
    pub fn cost2d(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        net: NetId,
        model: &dyn CostModel,
    ) -> (f64, f64) {
        let edge = self.edge(x1, y1, x2, y2);
        if edge.used_net.contains_key(&net) {
            return (0.0, 1.0);
        }
        (model.edge_cost(edge), 1.0)
    }

    /// Recompute and cache `cost2D`'s model-independent value for every
    /// edge, for cost models that want to avoid recomputing per query.
    pub fn pre_evaluate_all(&mut self, model: &dyn CostModel) {
        self.for_each_edge_mut(|e| e.cached_cost = model.edge_cost(e));
    }

    pub fn cached_cost(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
        self.edge(x1, y1, x2, y2).cached_cost
    }

    /// Grow `history` on every overflowing edge, then return the sum of
    /// every edge's overflow (`maxOverflow()` — despite the name, spec.md
    /// §4.1 defines it as the sum, not the max, over edges).
    pub fn max_overflow(&mut self, increment: u32) -> u32 {
        let mut total = 0u64;
        self.for_each_edge_mut(|e| {
            let overflow = e.overflow();
            total += overflow as u64;
            if overflow > 0 {
                e.history = e.history.saturating_add(increment);
            }
        });
        total.min(u32::MAX as u64) as u32
    }

    pub fn total_overflow(&self) -> u64 {
        self.edges
            .iter_edges()
            .map(|(_, _, e)| e.overflow() as u64)
            .sum()
    }

    pub fn for_each_edge_mut(&mut self, mut f: impl FnMut(&mut CongestionEdge2D)) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if x + 1 < self.width as i32 {
                    f(self.edges.get_mut(x, y, x + 1, y).unwrap());
                }
                if y + 1 < self.height as i32 {
                    f(self.edges.get_mut(x, y, x, y + 1).unwrap());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::FastRouteCost;
    use groute_common::model::UniformCapacity;

    fn region() -> RoutingRegion {
        RoutingRegion::new(4, 4, 2, Box::new(UniformCapacity::new(vec![2, 2])))
    }

    #[test]
    fn insert_then_remove_is_identity() {
        let mut map = CongestionMap2D::from_region(&region(), false);
        let net = NetId::new(0);
        map.insert_net(0, 0, 1, 0, net);
        assert_eq!(map.edge(0, 0, 1, 0).cur_cap, 1);
        map.remove_net(0, 0, 1, 0, net);
        assert_eq!(map.edge(0, 0, 1, 0).cur_cap, 0);
        assert!(map.edge(0, 0, 1, 0).used_net.is_empty());
    }

    #[test]
    fn repeated_insert_by_same_net_does_not_double_count() {
        let mut map = CongestionMap2D::from_region(&region(), false);
        let net = NetId::new(0);
        map.insert_net(0, 0, 1, 0, net);
        map.insert_net(0, 0, 1, 0, net);
        assert_eq!(map.edge(0, 0, 1, 0).cur_cap, 1);
    }

    #[test]
    fn cost2d_is_free_for_the_occupying_net() {
        let mut map = CongestionMap2D::from_region(&region(), false);
        let net = NetId::new(0);
        let other = NetId::new(1);
        // Fill the edge to capacity so a non-occupying net would pay.
        map.insert_net(0, 0, 1, 0, net);
        map.insert_net(0, 0, 1, 0, NetId::new(2));
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };
        let (cost, _) = map.cost2d(0, 0, 1, 0, net, &model);
        assert_eq!(cost, 0.0);
        let (cost_other, _) = map.cost2d(0, 0, 1, 0, other, &model);
        assert!(cost_other > 0.0);
    }

    #[test]
    fn history_grows_only_on_overflow() {
        let mut map = CongestionMap2D::from_region(&region(), false);
        for i in 0..3 {
            map.insert_net(0, 0, 1, 0, NetId::new(i));
        }
        let overflow = map.max_overflow(5);
        assert_eq!(overflow, map.edge(0, 0, 1, 0).overflow());
        assert!(map.edge(0, 0, 1, 0).history > 0);
        assert_eq!(map.edge(1, 0, 2, 0).history, 0);
    }
}
