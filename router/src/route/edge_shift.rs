use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;

use crate::congestion::{CongestionMap2D, CostModel};
use crate::error::InternalInvariant;
use crate::route::lshape::evaluate_path;
use crate::steiner::{SteinerBranch, SteinerTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexKind {
    Pin,
    Steiner,
    Deleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexHandle(usize);

#[derive(Clone, Debug)]
struct Vertex {
    coord: Coordinate2D,
    kind: VertexKind,
    neighbors: Vec<VertexHandle>,
}

/// The edge shifter's working graph (spec.md §9 Design Notes): a dense arena
/// of vertices indexed by integer handles, neighbors stored as handle
/// vectors, deletion represented by a tombstone (`VertexKind::Deleted`) plus
/// a compaction pass at the end. Created and destroyed once per net.
pub struct VertexFlute {
    vertices: Vec<Vertex>,
}

impl VertexFlute {
    pub fn from_tree(tree: &SteinerTree) -> Self {
        let mut vertices: Vec<Vertex> = tree
            .branch
            .iter()
            .enumerate()
            .map(|(i, b)| Vertex {
                coord: b.coord,
                kind: if tree.is_pin(i) {
                    VertexKind::Pin
                } else {
                    VertexKind::Steiner
                },
                neighbors: Vec::new(),
            })
            .collect();

        for (i, parent) in tree.edges() {
            if i == parent {
                continue;
            }
            vertices[i].neighbors.push(VertexHandle(parent));
            vertices[parent].neighbors.push(VertexHandle(i));
        }

        let mut flute = Self { vertices };
        flute.merge_coincident_vertices();
        flute
    }

    fn handles(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        (0..self.vertices.len())
            .filter(move |&i| self.vertices[i].kind != VertexKind::Deleted)
            .map(VertexHandle)
    }

    fn degree(&self, h: VertexHandle) -> usize {
        self.vertices[h.0].neighbors.len()
    }

    fn kind(&self, h: VertexHandle) -> VertexKind {
        self.vertices[h.0].kind
    }

    fn coord(&self, h: VertexHandle) -> Coordinate2D {
        self.vertices[h.0].coord
    }

    /// Merge vertices that landed on the same tile (e.g. after a prior
    /// shift), preserving the union of neighbors on the surviving handle and
    /// rewiring every reference to the merged-away handle.
    fn merge_coincident_vertices(&mut self) {
        let mut by_coord: std::collections::HashMap<(i32, i32), VertexHandle> =
            std::collections::HashMap::new();
        let mut redirect: Vec<VertexHandle> = (0..self.vertices.len()).map(VertexHandle).collect();

        for i in 0..self.vertices.len() {
            if self.vertices[i].kind == VertexKind::Deleted {
                continue;
            }
            let key = (self.vertices[i].coord.x, self.vertices[i].coord.y);
            match by_coord.get(&key) {
                Some(&survivor) if survivor.0 != i => {
                    self.merge_vertex(VertexHandle(i), survivor, &mut redirect);
                }
                Some(_) => {}
                None => {
                    by_coord.insert(key, VertexHandle(i));
                }
            }
        }
    }

    /// Merge `dead` into `survivor`: rewire every neighbor of `dead` to point
    /// at `survivor` instead, append them to `survivor`'s neighbor list, and
    /// tombstone `dead`.
    fn merge_vertex(
        &mut self,
        dead: VertexHandle,
        survivor: VertexHandle,
        redirect: &mut [VertexHandle],
    ) {
        let dead_neighbors = self.vertices[dead.0].neighbors.clone();
        for n in dead_neighbors {
            let n = redirect[n.0];
            if n == dead || n == survivor {
                continue;
            }
            if let Some(slot) = self.vertices[n.0].neighbors.iter_mut().find(|h| **h == dead) {
                *slot = survivor;
            }
            if !self.vertices[survivor.0].neighbors.contains(&n) {
                self.vertices[survivor.0].neighbors.push(n);
            }
        }
        self.vertices[dead.0].kind = VertexKind::Deleted;
        self.vertices[dead.0].neighbors.clear();
        redirect[dead.0] = survivor;
    }

    /// One-hop bound on how far a Steiner-Steiner edge can shift
    /// perpendicular to itself before an adjacent pin or branching Steiner
    /// point would be jumped past. A scoped-down version of spec.md §4.4's
    /// multi-hop walk: it looks one neighbor out from each endpoint rather
    /// than following the steepest-up chain to its end, which is a
    /// conservative (never unsafe, occasionally over-cautious) bound.
    fn safe_shift_range(&self, a: VertexHandle, b: VertexHandle, horizontal: bool) -> (i32, i32) {
        let coord_perp = |c: Coordinate2D| if horizontal { c.y } else { c.x };
        let mut low = i32::MIN;
        let mut high = i32::MAX;
        for endpoint in [a, b] {
            for &n in &self.vertices[endpoint.0].neighbors {
                if n == a || n == b {
                    continue;
                }
                let p = coord_perp(self.coord(n));
                let self_p = coord_perp(self.coord(endpoint));
                if p > self_p {
                    high = high.min(p - 1);
                } else if p < self_p {
                    low = low.max(p + 1);
                }
            }
        }
        if low == i32::MIN {
            low = coord_perp(self.coord(a)).min(coord_perp(self.coord(b)));
        }
        if high == i32::MAX {
            high = coord_perp(self.coord(a)).max(coord_perp(self.coord(b)));
        }
        (low.min(high), high.max(low))
    }

    /// Run one edge-shifting pass: for every edge between two Steiner points
    /// of degree <= 3, try every candidate position in its safe range and
    /// commit the one with the most negative delta (spec.md §4.4).
    pub fn shift_edges(
        &mut self,
        net: NetId,
        map: &CongestionMap2D,
        model: &dyn CostModel,
    ) {
        let edges: Vec<(VertexHandle, VertexHandle)> = self
            .handles()
            .flat_map(|a| {
                self.vertices[a.0]
                    .neighbors
                    .iter()
                    .copied()
                    .filter(move |&b| b.0 > a.0)
                    .map(move |b| (a, b))
            })
            .filter(|&(a, b)| {
                self.kind(a) == VertexKind::Steiner
                    && self.kind(b) == VertexKind::Steiner
                    && self.degree(a) <= 3
                    && self.degree(b) <= 3
            })
            .collect();

        for (a, b) in edges {
            self.try_shift_edge(a, b, net, map, model);
        }
    }

    fn try_shift_edge(
        &mut self,
        a: VertexHandle,
        b: VertexHandle,
        net: NetId,
        map: &CongestionMap2D,
        model: &dyn CostModel,
    ) {
        let ca = self.coord(a);
        let cb = self.coord(b);
        let horizontal = ca.y == cb.y;
        if !horizontal && ca.x != cb.x {
            return; // not an axis-aligned edge; nothing to shift
        }

        let (low, high) = self.safe_shift_range(a, b, horizontal);
        let base_cost = edge_l_cost(ca, cb, net, map, model);

        let mut best_p = None;
        let mut best_delta = 0.0f64;

        for p in low..=high {
            let (na, nb) = if horizontal {
                (Coordinate2D::new(ca.x, p), Coordinate2D::new(cb.x, p))
            } else {
                (Coordinate2D::new(p, ca.y), Coordinate2D::new(p, cb.y))
            };
            if na == ca && nb == cb {
                continue;
            }
            let shifted_cost = edge_l_cost(na, nb, net, map, model);
            let delta = shifted_cost - base_cost;
            if delta < best_delta {
                best_delta = delta;
                best_p = Some(p);
            }
        }

        if let Some(p) = best_p {
            let (na, nb) = if horizontal {
                (Coordinate2D::new(ca.x, p), Coordinate2D::new(cb.x, p))
            } else {
                (Coordinate2D::new(p, ca.y), Coordinate2D::new(p, cb.y))
            };
            self.vertices[a.0].coord = na;
            self.vertices[b.0].coord = nb;
            self.merge_coincident_vertices();
        }
    }

    /// Re-emit as a `SteinerTree` in DFS order from the original root,
    /// renumbering branches (spec.md §4.4 step 4).
    pub fn to_tree(&self, net: NetId, deg: usize) -> Result<SteinerTree, InternalInvariant> {
        let live: Vec<VertexHandle> = self.handles().collect();
        if live.is_empty() {
            return Err(InternalInvariant::DisconnectedTree(net));
        }

        let mut pins: Vec<VertexHandle> = live
            .iter()
            .copied()
            .filter(|&h| self.kind(h) == VertexKind::Pin)
            .collect();
        pins.sort_by_key(|h| h.0);
        let mut steiners: Vec<VertexHandle> = live
            .iter()
            .copied()
            .filter(|&h| self.kind(h) == VertexKind::Steiner)
            .collect();
        steiners.sort_by_key(|h| h.0);

        let ordered: Vec<VertexHandle> = pins.into_iter().chain(steiners).collect();
        let mut index_of: std::collections::HashMap<VertexHandle, usize> =
            std::collections::HashMap::new();
        for (i, &h) in ordered.iter().enumerate() {
            index_of.insert(h, i);
        }

        let root_handle = ordered[0];
        let mut parent = vec![usize::MAX; ordered.len()];
        let mut visited = vec![false; ordered.len()];
        visited[0] = true;
        parent[0] = 0;
        let mut stack = vec![root_handle];
        while let Some(u) = stack.pop() {
            let ui = index_of[&u];
            for &v in &self.vertices[u.0].neighbors {
                if let Some(&vi) = index_of.get(&v) {
                    if !visited[vi] {
                        visited[vi] = true;
                        parent[vi] = ui;
                        stack.push(v);
                    }
                }
            }
        }

        if visited.iter().any(|&v| !v) {
            return Err(InternalInvariant::DisconnectedTree(net));
        }

        let branch = ordered
            .iter()
            .enumerate()
            .map(|(i, &h)| SteinerBranch {
                coord: self.coord(h),
                parent: parent[i],
            })
            .collect();

        Ok(SteinerTree {
            deg,
            branch,
            root: 0,
        })
    }
}

fn edge_l_cost(
    a: Coordinate2D,
    b: Coordinate2D,
    net: NetId,
    map: &CongestionMap2D,
    model: &dyn CostModel,
) -> f64 {
    if a.x == b.x || a.y == b.y {
        let path = straight_for_cost(a, b);
        evaluate_path(&path, net, map, model).1
    } else {
        // Shifted endpoints of a formerly axis-aligned edge should stay
        // axis-aligned; this branch only guards against a degenerate
        // diagonal produced by a bug upstream.
        0.0
    }
}

fn straight_for_cost(a: Coordinate2D, b: Coordinate2D) -> Vec<Coordinate2D> {
    let mut path = Vec::new();
    if a.x == b.x {
        let (lo, hi) = (a.y.min(b.y), a.y.max(b.y));
        for y in lo..=hi {
            path.push(Coordinate2D::new(a.x, y));
        }
    } else {
        let (lo, hi) = (a.x.min(b.x), a.x.max(b.x));
        for x in lo..=hi {
            path.push(Coordinate2D::new(x, a.y));
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::FastRouteCost;
    use crate::steiner::{HananMstOracle, RsmtOracle};
    use groute_common::model::{RoutingRegion, UniformCapacity};

    #[test]
    fn from_tree_preserves_symmetric_neighbors() {
        let oracle = HananMstOracle;
        let tree = oracle
            .solve(&[
                Coordinate2D::new(0, 0),
                Coordinate2D::new(4, 4),
                Coordinate2D::new(0, 4),
            ])
            .unwrap();
        let flute = VertexFlute::from_tree(&tree);
        for h in flute.handles() {
            for &n in &flute.vertices[h.0].neighbors {
                assert!(flute.vertices[n.0].neighbors.contains(&h));
            }
        }
    }

    #[test]
    fn shifting_never_increases_total_l_cost() {
        let region = RoutingRegion::new(8, 8, 1, Box::new(UniformCapacity::new(vec![4])));
        let mut map = CongestionMap2D::from_region(&region, false);
        let net = NetId::new(0);
        // Crowd one edge to create an incentive to shift away from it.
        for other in 1..6 {
            map.insert_net(2, 0, 2, 1, NetId::new(other));
        }
        let oracle = HananMstOracle;
        let tree = oracle
            .solve(&[
                Coordinate2D::new(0, 0),
                Coordinate2D::new(4, 0),
                Coordinate2D::new(2, 4),
            ])
            .unwrap();
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };

        let before: f64 = tree
            .edges()
            .map(|(i, p)| edge_l_cost(tree.branch[i].coord, tree.branch[p].coord, net, &map, &model))
            .sum();

        let mut flute = VertexFlute::from_tree(&tree);
        flute.shift_edges(net, &map, &model);
        let shifted = flute.to_tree(net, tree.deg).unwrap();

        let after: f64 = shifted
            .edges()
            .map(|(i, p)| {
                edge_l_cost(
                    shifted.branch[i].coord,
                    shifted.branch[p].coord,
                    net,
                    &map,
                    &model,
                )
            })
            .sum();

        assert!(after <= before + 1e-9);
    }

    #[test]
    fn congested_steiner_steiner_edge_shifts_by_one_unit_and_strictly_decreases_cost() {
        // Four-pin net whose two Steiner points sit on a congested row;
        // shifting the shared edge one unit off that row should strictly
        // lower total L-cost.
        let region = RoutingRegion::new(8, 8, 1, Box::new(UniformCapacity::new(vec![4])));
        let mut map = CongestionMap2D::from_region(&region, false);
        let net = NetId::new(0);
        for other in 1..=5 {
            map.insert_net(2, 2, 3, 2, NetId::new(other));
            map.insert_net(3, 2, 4, 2, NetId::new(other));
        }

        let tree = SteinerTree {
            deg: 4,
            root: 0,
            branch: vec![
                SteinerBranch { coord: Coordinate2D::new(0, 0), parent: 0 },
                SteinerBranch { coord: Coordinate2D::new(0, 4), parent: 4 },
                SteinerBranch { coord: Coordinate2D::new(6, 0), parent: 5 },
                SteinerBranch { coord: Coordinate2D::new(6, 4), parent: 5 },
                SteinerBranch { coord: Coordinate2D::new(2, 2), parent: 0 },
                SteinerBranch { coord: Coordinate2D::new(4, 2), parent: 4 },
            ],
        };

        let model = FastRouteCost { congestion_penalty: 10.0 };
        let before = edge_l_cost(
            tree.branch[5].coord,
            tree.branch[4].coord,
            net,
            &map,
            &model,
        );

        let mut flute = VertexFlute::from_tree(&tree);
        flute.shift_edges(net, &map, &model);
        let shifted = flute.to_tree(net, tree.deg).unwrap();

        let steiner_coords: Vec<Coordinate2D> = shifted
            .branch
            .iter()
            .enumerate()
            .filter(|&(i, _)| !shifted.is_pin(i))
            .map(|(_, b)| b.coord)
            .collect();
        assert_eq!(steiner_coords.len(), 2);
        for c in &steiner_coords {
            assert_eq!(c.y, 1, "shared edge should move exactly one unit off the congested row");
        }

        let after = edge_l_cost(steiner_coords[0], steiner_coords[1], net, &map, &model);
        assert!(after < before, "shift should strictly lower cost: before={before} after={after}");
    }
}
