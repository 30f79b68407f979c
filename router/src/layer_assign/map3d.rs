use std::collections::{HashMap, HashSet};

use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;
use groute_common::model::RoutingRegion;

use crate::geometry::EdgePlane3D;

/// Per-layer wire occupancy (spec.md §4.8 `Edge_3d`): capacity is the raw
/// per-layer value, not halved like `CongestionEdge2D`'s 2-D max_cap.
#[derive(Clone, Debug, Default)]
pub struct WireEdge3D {
    pub cur_cap: u32,
    pub max_cap: u32,
    pub used_net: HashMap<NetId, u32>,
}

impl WireEdge3D {
    pub fn overflow(&self) -> u32 {
        self.cur_cap.saturating_sub(self.max_cap)
    }
}

/// Per-layer wire usage plus via-stack bookkeeping at every tile
/// (spec.md §4.8 `cur_map_3d`), committed to as KLAT assigns each net a
/// layer. Via capacity at a tile is a single shared count across every
/// layer pair that crosses it there — spec.md's visible sources don't
/// pin down the exact via-capacity model, so this resolves it as "at most
/// `via_capacity` distinct nets may stack a via at one (x,y)", independent
/// of which two layers they bridge (see DESIGN.md).
pub struct CongestionMap3D {
    wires: EdgePlane3D<WireEdge3D>,
    vias: HashMap<(i32, i32), HashSet<NetId>>,
    via_capacity: u32,
    width: u32,
    height: u32,
    layers: u8,
}

impl CongestionMap3D {
    pub fn from_region(region: &RoutingRegion, via_capacity: u32) -> Self {
        let mut wires: EdgePlane3D<WireEdge3D> =
            EdgePlane3D::new(region.width, region.height, region.layers);
        for layer in 0..region.layers {
            for y in 0..region.height as i32 {
                for x in 0..region.width as i32 {
                    if x + 1 < region.width as i32 {
                        let cap = region.capacity.capacity(layer, x, y, x + 1, y);
                        wires.get_mut(layer, x, y, x + 1, y).unwrap().max_cap = cap;
                    }
                    if y + 1 < region.height as i32 {
                        let cap = region.capacity.capacity(layer, x, y, x, y + 1);
                        wires.get_mut(layer, x, y, x, y + 1).unwrap().max_cap = cap;
                    }
                }
            }
        }
        Self {
            wires,
            vias: HashMap::new(),
            via_capacity: via_capacity.max(1),
            width: region.width,
            height: region.height,
            layers: region.layers,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layers(&self) -> u8 {
        self.layers
    }

    pub fn wire(&self, layer: u8, x1: i32, y1: i32, x2: i32, y2: i32) -> &WireEdge3D {
        self.wires
            .get(layer, x1, y1, x2, y2)
            .expect("wire query on non-adjacent tiles")
    }

    pub fn commit_wire(&mut self, layer: u8, x1: i32, y1: i32, x2: i32, y2: i32, net: NetId) {
        let edge = self
            .wires
            .get_mut(layer, x1, y1, x2, y2)
            .expect("commit_wire on non-adjacent tiles");
        let count = edge.used_net.entry(net).or_insert(0);
        if *count == 0 {
            edge.cur_cap += 1;
        }
        *count += 1;
    }

    /// Commit every unit segment of `path` to `layer` for `net`
    /// (spec.md §4.8 `update_cur_map_for_klat_xy`).
    pub fn commit_path(&mut self, layer: u8, path: &[Coordinate2D], net: NetId) {
        for w in path.windows(2) {
            self.commit_wire(layer, w[0].x, w[0].y, w[1].x, w[1].y, net);
        }
    }

    /// Record a via stack at `coord` spanning `[z_lo, z_hi]` for `net`
    /// (spec.md §4.8 `update_cur_map_for_klat_z`). The z-range itself isn't
    /// tracked per-layer under the shared-capacity model above; only which
    /// nets occupy the tile matters for `via_overflow`.
    pub fn commit_via(&mut self, coord: Coordinate2D, z_lo: u8, z_hi: u8, net: NetId) {
        debug_assert!(z_lo <= z_hi);
        self.vias.entry((coord.x, coord.y)).or_default().insert(net);
    }

    /// How far a new via at `coord` would push the tile's via-stack count
    /// over `via_capacity`, ignoring which two layers it bridges.
    pub fn via_overflow(&self, coord: Coordinate2D, _z_lo: u8, _z_hi: u8) -> u32 {
        let used = self.vias.get(&(coord.x, coord.y)).map_or(0, |s| s.len() as u32);
        used.saturating_sub(self.via_capacity - 1)
    }

    pub fn wire_overflow_total(&self) -> u64 {
        let mut total = 0u64;
        for layer in 0..self.layers {
            total += self
                .wires
                .layer(layer)
                .iter_edges()
                .map(|(_, _, e)| e.overflow() as u64)
                .sum::<u64>();
        }
        total
    }
}
