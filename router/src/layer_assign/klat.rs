use groute_common::db::NetId;

use crate::error::InternalInvariant;
use crate::layer_assign::map3d::CongestionMap3D;
use crate::steiner::SteinerTree;

/// One candidate-layer row of the KLAT tree DP (spec.md §4.8 `KLAT_NODE`):
/// `val` is the best subtree cost (via cost plus via overflow) assuming
/// this node's own edge to its parent lands on this row's layer; `pi_z`
/// is, per child, the layer that child's edge into this node should use
/// to realize `val`. The original's single scalar `pi_z` matches its
/// overwhelmingly chain-shaped trees; branch points here just get a
/// short vector instead of one field.
#[derive(Clone, Debug)]
pub struct KlatNode {
    pub val: i64,
    pub via_cost: i64,
    pub via_overflow: u32,
    pub pi_z: Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NodeState {
    Unvisited,
    CollectingChildren,
    Ready,
}

/// Root a `SteinerTree` (already the net's final 2-D tree) and assign
/// every node a metal layer minimizing total via cost plus via overflow
/// (spec.md §4.8). Returns one chosen layer per tree node, indexed the
/// same as `tree.branch`, and commits the resulting vias to `map3d`.
///
/// Node visitation is driven by an explicit `UNVISITED -> COLLECTING_CHILDREN
/// -> READY` state machine over an iterative stack, matching spec.md's
/// description exactly rather than hiding it behind plain recursion.
pub fn assign_layers(
    tree: &SteinerTree,
    net: NetId,
    num_layers: u8,
    map3d: &mut CongestionMap3D,
    via_cost_weight: u32,
) -> Result<Vec<u8>, InternalInvariant> {
    let n = tree.branch.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        if i != tree.root {
            children[tree.branch[i].parent].push(i);
        }
    }
    for c in &mut children {
        c.sort_unstable();
    }

    let mut state = vec![NodeState::Unvisited; n];
    let mut rows: Vec<Vec<KlatNode>> = vec![Vec::new(); n];
    let mut stack = vec![tree.root];

    while let Some(&u) = stack.last() {
        match state[u] {
            NodeState::Unvisited => {
                state[u] = NodeState::CollectingChildren;
                for &c in &children[u] {
                    stack.push(c);
                }
            }
            NodeState::CollectingChildren => {
                if !children[u].iter().all(|&c| state[c] == NodeState::Ready) {
                    return Err(InternalInvariant::DisconnectedTree(net));
                }
                rows[u] = compute_row(u, tree, &children, &rows, num_layers, map3d, via_cost_weight);
                state[u] = NodeState::Ready;
                stack.pop();
            }
            NodeState::Ready => {
                stack.pop();
            }
        }
    }

    let root_row = &rows[tree.root];
    let (best_z, _) = root_row
        .iter()
        .enumerate()
        .min_by_key(|(_, row)| (row.val, row.via_cost))
        .ok_or(InternalInvariant::DisconnectedTree(net))?;

    let mut chosen = vec![0u8; n];
    chosen[tree.root] = best_z as u8;
    let mut queue = std::collections::VecDeque::new();
    queue.push_back((tree.root, best_z));
    while let Some((u, z_u)) = queue.pop_front() {
        let row = &rows[u][z_u];
        for (slot, &c) in children[u].iter().enumerate() {
            let z_c = row.pi_z[slot] as usize;
            chosen[c] = z_c as u8;
            queue.push_back((c, z_c));
        }
    }

    for u in 0..n {
        let z_u = chosen[u];
        for &c in &children[u] {
            let z_c = chosen[c];
            if z_u != z_c {
                let coord = tree.branch[u].coord;
                map3d.commit_via(coord, z_u.min(z_c), z_u.max(z_c), net);
            }
        }
    }

    Ok(chosen)
}

fn compute_row(
    u: usize,
    tree: &SteinerTree,
    children: &[Vec<usize>],
    rows: &[Vec<KlatNode>],
    num_layers: u8,
    map3d: &CongestionMap3D,
    via_cost_weight: u32,
) -> Vec<KlatNode> {
    let coord = tree.branch[u].coord;
    let kids = &children[u];

    (0..num_layers)
        .map(|z_p| {
            if kids.is_empty() {
                return KlatNode {
                    val: 0,
                    via_cost: 0,
                    via_overflow: 0,
                    pi_z: Vec::new(),
                };
            }

            let mut val = 0i64;
            let mut via_cost = 0i64;
            let mut via_overflow = 0u32;
            let mut pi_z = Vec::with_capacity(kids.len());

            for &c in kids {
                let mut best: Option<(u8, i64, i64, u32)> = None;
                for z_c in 0..num_layers {
                    let d = (z_p as i64 - z_c as i64).unsigned_abs() as i64;
                    // No via is created when the parent and child already
                    // agree on a layer, so an empty z_p..z_c span overflows
                    // nothing, regardless of how contended this tile is.
                    let overflow = if z_p == z_c {
                        0
                    } else {
                        map3d.via_overflow(coord, z_p.min(z_c), z_p.max(z_c))
                    };
                    let child_row = &rows[c][z_c as usize];
                    let total = child_row.val + d * via_cost_weight as i64 + overflow as i64;
                    let vc = d * via_cost_weight as i64 + child_row.via_cost;
                    let ov = overflow + child_row.via_overflow;

                    let better = match &best {
                        None => true,
                        Some(&(_, bt, bvc, _)) => (total, vc) < (bt, bvc),
                    };
                    if better {
                        best = Some((z_c, total, vc, ov));
                    }
                }
                let (bz, bt, bvc, bov) = best.expect("num_layers > 0");
                val += bt;
                via_cost += bvc;
                via_overflow += bov;
                pi_z.push(bz);
            }

            KlatNode {
                val,
                via_cost,
                via_overflow,
                pi_z,
            }
        })
        .collect()
}
