use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use groute_common::db::NetId;
use groute_common::geom::{Coordinate2D, Direction};

use crate::congestion::{CongestionMap2D, CostModel};

/// An axis-aligned window the range router hands the maze router
/// (spec.md §4.5/§4.6): searches never expand outside `[min,max]`.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Window {
    pub fn contains(&self, c: Coordinate2D) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }
}

/// Fixed-point priority ordering: lower `f_score` pops first. `PriorityQueue`
/// is a max-heap, so scores are negated going in.
type Score = Reverse<i64>;

/// Bounded multi-source/multi-sink best-first search inside a window
/// (spec.md §4.6). `sources` is every tile already in the net's connected
/// component; the search terminates at the first tile in `sinks`.
pub fn search(
    window: Window,
    sources: &[Coordinate2D],
    sinks: &HashSet<Coordinate2D>,
    net: NetId,
    map: &CongestionMap2D,
    model: &dyn CostModel,
    heuristic_weight: f64,
    max_expansions: u32,
) -> Option<Vec<Coordinate2D>> {
    if sources.is_empty() || sinks.is_empty() {
        return None;
    }

    let nearest_sink_dist = |c: Coordinate2D| -> i64 {
        sinks.iter().map(|&s| c.manhattan(s)).min().unwrap_or(0)
    };

    let scale = 100i64;
    let mut g_score: HashMap<Coordinate2D, i64> = HashMap::new();
    let mut parent: HashMap<Coordinate2D, Coordinate2D> = HashMap::new();
    let mut heap: PriorityQueue<Coordinate2D, Score> = PriorityQueue::new();

    for &s in sources {
        if !window.contains(s) {
            continue;
        }
        g_score.insert(s, 0);
        let h = (nearest_sink_dist(s) as f64 * heuristic_weight * scale as f64) as i64;
        heap.push(s, Reverse(h));
    }

    let mut expansions = 0u32;

    while let Some((current, _)) = heap.pop() {
        if sinks.contains(&current) {
            return Some(reconstruct(current, &parent, sources));
        }

        let current_g = *g_score.get(&current).unwrap_or(&0);

        expansions += 1;
        if expansions > max_expansions {
            return None;
        }

        for dir in Direction::ALL {
            let Some(neighbor) = current.step(dir) else {
                continue;
            };
            if !window.contains(neighbor) {
                continue;
            }
            let (cost, _) = map.cost2d(current.x, current.y, neighbor.x, neighbor.y, net, model);
            let tentative_g = current_g + (cost * scale as f64) as i64;

            if tentative_g < *g_score.get(&neighbor).unwrap_or(&i64::MAX) {
                g_score.insert(neighbor, tentative_g);
                parent.insert(neighbor, current);
                let h = (nearest_sink_dist(neighbor) as f64 * heuristic_weight * scale as f64) as i64;
                heap.push(neighbor, Reverse(tentative_g + h));
            }
        }
    }

    None
}

fn reconstruct(
    end: Coordinate2D,
    parent: &HashMap<Coordinate2D, Coordinate2D>,
    sources: &[Coordinate2D],
) -> Vec<Coordinate2D> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&p) = parent.get(&current) {
        path.push(p);
        current = p;
        if sources.contains(&current) {
            break;
        }
    }
    path.reverse();
    path
}

/// Rip-up/reroute a single two-pin element: remove its old path from the
/// map, search, and either commit the new path or roll back the old one
/// atomically (spec.md §4.6 "rip-up discipline"). `extra_sources` is every
/// other tile already belonging to the net's connected component (spec.md
/// §4.6's multi-source rule) — typically tiles from the net's other
/// committed two-pin elements that fall inside `window` — so the search
/// can terminate early instead of redundantly routing all the way back to
/// `pin1` when the net already reaches the target region. Returns whether
/// a new (different) path was committed.
pub fn reroute_element(
    window: Window,
    pin1: Coordinate2D,
    pin2: Coordinate2D,
    old_path: &[Coordinate2D],
    extra_sources: &[Coordinate2D],
    net: NetId,
    map: &mut CongestionMap2D,
    model: &dyn CostModel,
    heuristic_weight: f64,
    max_expansions: u32,
) -> Option<Vec<Coordinate2D>> {
    let old_edges: Vec<(i32, i32, i32, i32)> = old_path
        .windows(2)
        .map(|w| (w[0].x, w[0].y, w[1].x, w[1].y))
        .collect();
    for &(x1, y1, x2, y2) in &old_edges {
        map.remove_net(x1, y1, x2, y2, net);
    }

    let mut sources: Vec<Coordinate2D> = Vec::with_capacity(1 + extra_sources.len());
    sources.push(pin1);
    for &s in extra_sources {
        if !sources.contains(&s) {
            sources.push(s);
        }
    }

    let sinks: HashSet<Coordinate2D> = [pin2].into_iter().collect();
    let result = search(
        window,
        &sources,
        &sinks,
        net,
        map,
        model,
        heuristic_weight,
        max_expansions,
    );

    match result {
        Some(path) => {
            for w in path.windows(2) {
                map.insert_net(w[0].x, w[0].y, w[1].x, w[1].y, net);
            }
            Some(path)
        }
        None => {
            for &(x1, y1, x2, y2) in &old_edges {
                map.insert_net(x1, y1, x2, y2, net);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::FastRouteCost;
    use groute_common::model::{RoutingRegion, UniformCapacity};

    fn full_window() -> Window {
        Window {
            min_x: 0,
            min_y: 0,
            max_x: 9,
            max_y: 9,
        }
    }

    #[test]
    fn finds_straight_path_when_uncongested() {
        let region = RoutingRegion::new(10, 10, 1, Box::new(UniformCapacity::new(vec![4])));
        let map = CongestionMap2D::from_region(&region, false);
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };
        let sinks: HashSet<Coordinate2D> = [Coordinate2D::new(3, 0)].into_iter().collect();
        let path = search(
            full_window(),
            &[Coordinate2D::new(0, 0)],
            &sinks,
            NetId::new(0),
            &map,
            &model,
            1.0,
            10_000,
        )
        .unwrap();
        assert_eq!(path.first(), Some(&Coordinate2D::new(0, 0)));
        assert_eq!(path.last(), Some(&Coordinate2D::new(3, 0)));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn failed_search_rolls_back_old_path_unchanged() {
        let region = RoutingRegion::new(2, 1, 1, Box::new(UniformCapacity::new(vec![2])));
        let mut map = CongestionMap2D::from_region(&region, false);
        let net = NetId::new(0);
        let old_path = vec![Coordinate2D::new(0, 0), Coordinate2D::new(1, 0)];
        map.insert_path(
            &old_path.iter().map(|c| (c.x, c.y)).collect::<Vec<_>>(),
            net,
        );
        let before = map.edge(0, 0, 1, 0).cur_cap;

        // An unreachable sink (outside the 1-wide window) forces failure.
        let tiny_window = Window {
            min_x: 0,
            min_y: 0,
            max_x: 0,
            max_y: 0,
        };
        let model = FastRouteCost {
            congestion_penalty: 10.0,
        };
        let result = reroute_element(
            tiny_window,
            Coordinate2D::new(0, 0),
            Coordinate2D::new(1, 0),
            &old_path,
            &[],
            net,
            &mut map,
            &model,
            1.0,
            10_000,
        );
        assert!(result.is_none());
        assert_eq!(map.edge(0, 0, 1, 0).cur_cap, before);
    }
}
