use std::collections::HashMap;

/// Per-layer, per-edge capacity oracle. `capacity(layer, x1, y1, x2, y2)`
/// must be symmetric in its two endpoints (the edge between two tiles has
/// one capacity regardless of which endpoint is queried first) and is only
/// ever called for adjacent tiles.
pub trait EdgeCapacity: Sync + Send {
    fn capacity(&self, layer: u8, x1: i32, y1: i32, x2: i32, y2: i32) -> u32;
}

/// The common case: every edge on a layer has the same capacity.
pub struct UniformCapacity {
    pub per_layer: Vec<u32>,
}

impl UniformCapacity {
    pub fn new(per_layer: Vec<u32>) -> Self {
        Self { per_layer }
    }
}

impl EdgeCapacity for UniformCapacity {
    fn capacity(&self, layer: u8, _x1: i32, _y1: i32, _x2: i32, _y2: i32) -> u32 {
        self.per_layer.get(layer as usize).copied().unwrap_or(0)
    }
}

fn canonical_edge_key(layer: u8, x1: i32, y1: i32, x2: i32, y2: i32) -> (u8, i32, i32, i32, i32) {
    if (x1, y1) <= (x2, y2) {
        (layer, x1, y1, x2, y2)
    } else {
        (layer, x2, y2, x1, y1)
    }
}

/// A `UniformCapacity` with a sparse table of per-edge exceptions, used to
/// model obstacles and blockages (and the zero-capacity edges in test
/// scenarios like spec.md's S2).
pub struct CapacityWithOverrides {
    base: UniformCapacity,
    overrides: HashMap<(u8, i32, i32, i32, i32), u32>,
}

impl CapacityWithOverrides {
    pub fn new(per_layer: Vec<u32>) -> Self {
        Self {
            base: UniformCapacity::new(per_layer),
            overrides: HashMap::new(),
        }
    }

    pub fn set(&mut self, layer: u8, x1: i32, y1: i32, x2: i32, y2: i32, capacity: u32) {
        self.overrides
            .insert(canonical_edge_key(layer, x1, y1, x2, y2), capacity);
    }
}

impl EdgeCapacity for CapacityWithOverrides {
    fn capacity(&self, layer: u8, x1: i32, y1: i32, x2: i32, y2: i32) -> u32 {
        let key = canonical_edge_key(layer, x1, y1, x2, y2);
        self.overrides
            .get(&key)
            .copied()
            .unwrap_or_else(|| self.base.capacity(layer, x1, y1, x2, y2))
    }
}

/// The discretized chip floorplan the router operates over: `width` x
/// `height` tiles across `layers` metal layers, plus the capacity oracle
/// for every edge (spec.md §6 "Inputs").
pub struct RoutingRegion {
    pub width: u32,
    pub height: u32,
    pub layers: u8,
    pub capacity: Box<dyn EdgeCapacity>,
}

impl RoutingRegion {
    pub fn new(width: u32, height: u32, layers: u8, capacity: Box<dyn EdgeCapacity>) -> Self {
        Self {
            width,
            height,
            layers,
            capacity,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Sum of per-layer capacities for the 2-D edge `(x1,y1)-(x2,y2)`,
    /// halved unless `ibm_case` is set (spec.md §3, `CongestionEdge2D.max_cap`).
    pub fn max_cap_2d(&self, x1: i32, y1: i32, x2: i32, y2: i32, ibm_case: bool) -> u32 {
        let mut total: u64 = 0;
        for layer in 0..self.layers {
            total += self.capacity.capacity(layer, x1, y1, x2, y2) as u64;
        }
        if ibm_case {
            total as u32
        } else {
            (total / 2) as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_symmetric_in_endpoints() {
        let mut cap = CapacityWithOverrides::new(vec![4]);
        cap.set(0, 0, 0, 1, 0, 0);
        assert_eq!(cap.capacity(0, 0, 0, 1, 0), 0);
        assert_eq!(cap.capacity(0, 1, 0, 0, 0), 0);
        assert_eq!(cap.capacity(0, 1, 0, 2, 0), 4);
    }

    #[test]
    fn max_cap_2d_halves_unless_ibm_case() {
        let region = RoutingRegion::new(4, 4, 2, Box::new(UniformCapacity::new(vec![2, 2])));
        assert_eq!(region.max_cap_2d(0, 0, 1, 0, false), 2);
        assert_eq!(region.max_cap_2d(0, 0, 1, 0, true), 4);
    }
}
