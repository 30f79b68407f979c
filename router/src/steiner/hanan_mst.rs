use super::{RsmtOracle, SteinerBranch, SteinerTree};
use crate::error::OracleError;
use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;
use std::collections::HashMap;

/// Reference `RsmtOracle`: builds a minimum rectilinear spanning tree over
/// the pins (Prim's algorithm, Manhattan distance), then replaces every
/// non-degenerate edge with a two-segment L through a Hanan-grid corner
/// point. Not flute-quality, but deterministic and a real Steiner tree — a
/// stand-in for the FLUTE primitive spec.md treats as an external
/// collaborator (§6).
pub struct HananMstOracle;

impl RsmtOracle for HananMstOracle {
    fn solve(&self, pins: &[Coordinate2D]) -> Result<SteinerTree, OracleError> {
        let deg = pins.len();
        if deg == 0 {
            return Err(OracleError::EmptyNet(NetId::new(0)));
        }
        if deg == 1 {
            return Ok(SteinerTree {
                deg: 1,
                branch: vec![SteinerBranch {
                    coord: pins[0],
                    parent: 0,
                }],
                root: 0,
            });
        }

        let mst_edges = prim_mst(pins);

        let mut coords: Vec<Coordinate2D> = pins.to_vec();
        let mut coord_index: HashMap<(i32, i32), usize> = coords
            .iter()
            .enumerate()
            .map(|(i, c)| ((c.x, c.y), i))
            .collect();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); deg];

        for &(u, v) in &mst_edges {
            let pu = pins[u];
            let pv = pins[v];
            if pu.x == pv.x || pu.y == pv.y {
                adjacency[u].push(v);
                adjacency[v].push(u);
                continue;
            }
            let corner = Coordinate2D::new(pu.x, pv.y);
            let corner_idx = *coord_index.entry((corner.x, corner.y)).or_insert_with(|| {
                coords.push(corner);
                adjacency.push(Vec::new());
                coords.len() - 1
            });
            if corner_idx != u {
                adjacency[u].push(corner_idx);
                adjacency[corner_idx].push(u);
            }
            if corner_idx != v {
                adjacency[v].push(corner_idx);
                adjacency[corner_idx].push(v);
            }
        }

        // BFS from pin 0 to assign parent links deterministically.
        let n = coords.len();
        let mut parent = vec![usize::MAX; n];
        let mut visited = vec![false; n];
        let root = 0usize;
        visited[root] = true;
        parent[root] = root;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            let mut neighbors = adjacency[u].clone();
            neighbors.sort_unstable();
            for v in neighbors {
                if !visited[v] {
                    visited[v] = true;
                    parent[v] = u;
                    queue.push_back(v);
                }
            }
        }

        let branch = coords
            .into_iter()
            .enumerate()
            .map(|(i, coord)| SteinerBranch {
                coord,
                parent: if parent[i] == usize::MAX { i } else { parent[i] },
            })
            .collect();

        Ok(SteinerTree { deg, branch, root })
    }
}

/// Prim's algorithm over Manhattan distance, returning MST edges as pin
/// index pairs. O(deg^2); pin counts in practice are small.
fn prim_mst(pins: &[Coordinate2D]) -> Vec<(usize, usize)> {
    let n = pins.len();
    let mut in_tree = vec![false; n];
    let mut best_dist = vec![i64::MAX; n];
    let mut best_from = vec![0usize; n];
    in_tree[0] = true;
    best_dist[0] = 0;
    for v in 1..n {
        best_dist[v] = pins[0].manhattan(pins[v]);
        best_from[v] = 0;
    }
    let mut edges = Vec::with_capacity(n - 1);

    for _ in 1..n {
        let mut next = usize::MAX;
        let mut next_dist = i64::MAX;
        for v in 0..n {
            if !in_tree[v] && best_dist[v] < next_dist {
                next_dist = best_dist[v];
                next = v;
            }
        }
        in_tree[next] = true;
        edges.push((best_from[next], next));
        for v in 0..n {
            if !in_tree[v] {
                let d = pins[next].manhattan(pins[v]);
                if d < best_dist[v] {
                    best_dist[v] = d;
                    best_from[v] = next;
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_pin_net_has_no_steiner_point() {
        let oracle = HananMstOracle;
        let tree = oracle.solve(&[Coordinate2D::new(0, 0), Coordinate2D::new(3, 4)]).unwrap();
        assert_eq!(tree.deg, 2);
        assert_eq!(tree.branch.len(), 3);
    }

    #[test]
    fn collinear_pins_need_no_corner() {
        let oracle = HananMstOracle;
        let pins = vec![
            Coordinate2D::new(0, 0),
            Coordinate2D::new(2, 0),
            Coordinate2D::new(4, 0),
        ];
        let tree = oracle.solve(&pins).unwrap();
        assert_eq!(tree.branch.len(), 3);
    }

    #[test]
    fn tree_is_connected() {
        let oracle = HananMstOracle;
        let pins = vec![
            Coordinate2D::new(0, 0),
            Coordinate2D::new(5, 5),
            Coordinate2D::new(0, 5),
            Coordinate2D::new(5, 0),
        ];
        let tree = oracle.solve(&pins).unwrap();
        let mut reachable = vec![false; tree.branch.len()];
        let mut stack = vec![tree.root];
        reachable[tree.root] = true;
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); tree.branch.len()];
        for (i, b) in tree.branch.iter().enumerate() {
            if i != tree.root {
                children[b.parent].push(i);
            }
        }
        while let Some(u) = stack.pop() {
            for &c in &children[u] {
                if !reachable[c] {
                    reachable[c] = true;
                    stack.push(c);
                }
            }
        }
        assert!(reachable.iter().all(|&r| r));
    }
}
