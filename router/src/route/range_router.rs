use std::collections::HashSet;

use groute_common::geom::Coordinate2D;

use crate::congestion::{CongestionMap2D, CostModel};
use crate::route::maze::{self, Window};
use crate::twopin::TwoPinElement2D;

/// One rectangular window of overflowed tiles, with its total overflow
/// (used to order windows by severity, spec.md §4.5).
struct ScoredWindow {
    window: Window,
    overflow: u64,
}

/// Partition the map's overflowed edges into `box_size`-tiles-per-side
/// windows, aligned to a grid so results are deterministic regardless of
/// scan order.
fn build_windows(map: &CongestionMap2D, box_size: u32) -> Vec<ScoredWindow> {
    let box_size = box_size.max(1) as i32;
    let mut totals: std::collections::HashMap<(i32, i32), u64> = std::collections::HashMap::new();

    for y in 0..map.height() as i32 {
        for x in 0..map.width() as i32 {
            let cell = (x / box_size, y / box_size);
            if x + 1 < map.width() as i32 {
                let overflow = map.edge(x, y, x + 1, y).overflow() as u64;
                if overflow > 0 {
                    *totals.entry(cell).or_insert(0) += overflow;
                }
            }
            if y + 1 < map.height() as i32 {
                let overflow = map.edge(x, y, x, y + 1).overflow() as u64;
                if overflow > 0 {
                    *totals.entry(cell).or_insert(0) += overflow;
                }
            }
        }
    }

    let mut windows: Vec<ScoredWindow> = totals
        .into_iter()
        .map(|((cx, cy), overflow)| {
            let min_x = cx * box_size;
            let min_y = cy * box_size;
            ScoredWindow {
                window: Window {
                    min_x,
                    min_y,
                    max_x: (min_x + box_size - 1).min(map.width() as i32 - 1),
                    max_y: (min_y + box_size - 1).min(map.height() as i32 - 1),
                },
                overflow,
            }
        })
        .collect();

    // Descending overflow; tie-break by position for determinism.
    windows.sort_by(|a, b| {
        b.overflow
            .cmp(&a.overflow)
            .then_with(|| a.window.min_x.cmp(&b.window.min_x))
            .then_with(|| a.window.min_y.cmp(&b.window.min_y))
    });
    windows
}

fn element_intersects(element: &TwoPinElement2D, window: &Window) -> bool {
    let (min_x, max_x) = (element.pin1.x.min(element.pin2.x), element.pin1.x.max(element.pin2.x));
    let (min_y, max_y) = (element.pin1.y.min(element.pin2.y), element.pin1.y.max(element.pin2.y));
    min_x <= window.max_x && max_x >= window.min_x && min_y <= window.max_y && max_y >= window.min_y
}

/// Run one stage-2 iteration: build windows over the current overflow,
/// visit them in descending severity, and reroute every intersecting
/// two-pin element (smallest bounding box first, spec.md §5 ordering
/// guarantee) whose net is enabled for this pass.
pub fn run_one_iteration(
    elements: &mut [TwoPinElement2D],
    map: &mut CongestionMap2D,
    model: &dyn CostModel,
    box_size: u32,
    heuristic_weight: f64,
    max_expansions: u32,
) -> usize {
    let windows = build_windows(map, box_size);
    let mut rerouted = 0usize;
    let mut already_done: HashSet<usize> = HashSet::new();

    for scored in &windows {
        let mut candidates: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(idx, e)| !already_done.contains(idx) && element_intersects(e, &scored.window))
            .map(|(idx, _)| idx)
            .collect();
        candidates.sort_by_key(|&idx| elements[idx].bbox_size());

        for idx in candidates {
            let element = &elements[idx];
            let old_path = element.path.clone();
            if old_path.len() < 2 {
                continue;
            }
            let net = element.net;
            let pin1 = element.pin1;
            let pin2 = element.pin2;

            // Every tile of the net's other two-pin elements that falls
            // inside this window is already part of the net's connected
            // component, so it's a valid extra source for the search
            // (spec.md §4.6): this lets the maze router latch onto the
            // rest of the net instead of redundantly routing all the way
            // back to `pin1`.
            let extra_sources: Vec<Coordinate2D> = elements
                .iter()
                .enumerate()
                .filter(|&(other_idx, e)| other_idx != idx && e.net == net)
                .flat_map(|(_, e)| e.path.iter().copied())
                .filter(|c| scored.window.contains(*c))
                .collect();

            let result = maze::reroute_element(
                scored.window,
                pin1,
                pin2,
                &old_path,
                &extra_sources,
                net,
                map,
                model,
                heuristic_weight,
                max_expansions,
            );
            if let Some(new_path) = result {
                if new_path != old_path {
                    rerouted += 1;
                }
                elements[idx].path = new_path;
            }
            already_done.insert(idx);
        }
    }

    rerouted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion::HistoryCost;
    use groute_common::db::NetId;
    use groute_common::model::{RoutingRegion, UniformCapacity};

    #[test]
    fn windows_are_ordered_by_descending_overflow() {
        let region = RoutingRegion::new(8, 1, 1, Box::new(UniformCapacity::new(vec![2])));
        let mut map = CongestionMap2D::from_region(&region, false);
        for i in 0..5 {
            map.insert_net(0, 0, 1, 0, NetId::new(i));
        }
        map.insert_net(6, 0, 7, 0, NetId::new(100));
        let windows = build_windows(&map, 4);
        assert!(windows[0].overflow >= windows.last().unwrap().overflow);
    }

    #[test]
    fn reroute_converges_a_two_net_conflict() {
        // S3-like scenario: two straight nets sharing an over-capacity row.
        let region = RoutingRegion::new(5, 5, 1, Box::new(UniformCapacity::new(vec![2])));
        let mut map = CongestionMap2D::from_region(&region, false);
        let mut elements = vec![
            TwoPinElement2D {
                net: NetId::new(0),
                pin1: Coordinate2D::new(0, 2),
                pin2: Coordinate2D::new(4, 2),
                path: (0..=4).map(|x| Coordinate2D::new(x, 2)).collect(),
            },
            TwoPinElement2D {
                net: NetId::new(1),
                pin1: Coordinate2D::new(0, 2),
                pin2: Coordinate2D::new(4, 2),
                path: (0..=4).map(|x| Coordinate2D::new(x, 2)).collect(),
            },
        ];
        for e in &elements {
            map.insert_path(
                &e.path.iter().map(|c| (c.x, c.y)).collect::<Vec<_>>(),
                e.net,
            );
        }
        let model = HistoryCost {
            congestion_penalty: 5.0,
            history_weight: 1.0,
            k: 1.0,
        };
        for _ in 0..5 {
            map.max_overflow(1);
            run_one_iteration(&mut elements, &mut map, &model, 5, 1.0, 50_000);
            if map.total_overflow() == 0 {
                break;
            }
        }
        assert_eq!(map.total_overflow(), 0);
    }
}
