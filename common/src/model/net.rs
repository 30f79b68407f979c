use crate::db::NetId;
use crate::geom::Coordinate2D;

/// A multi-pin net to be routed. Pins are grid tiles; the router treats
/// coincident pins (two pins on the same tile) as already connected.
#[derive(Clone, Debug)]
pub struct Net {
    pub id: NetId,
    pub pins: Vec<Coordinate2D>,
}

impl Net {
    pub fn new(id: NetId, pins: Vec<Coordinate2D>) -> Self {
        Self { id, pins }
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Manhattan size of the net's bounding box (half-perimeter wirelength
    /// lower bound), used to order nets by urgency in stage 1 and in
    /// `sort_net_order` for layer assignment.
    pub fn bbox_size(&self) -> i64 {
        if self.pins.is_empty() {
            return 0;
        }
        let (mut min_x, mut max_x) = (i32::MAX, i32::MIN);
        let (mut min_y, mut max_y) = (i32::MAX, i32::MIN);
        for p in &self.pins {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x) as i64 + (max_y - min_y) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_size_is_manhattan_half_perimeter() {
        let net = Net::new(
            NetId::new(0),
            vec![Coordinate2D::new(0, 0), Coordinate2D::new(3, 4)],
        );
        assert_eq!(net.bbox_size(), 7);
    }

    #[test]
    fn bbox_size_of_single_pin_is_zero() {
        let net = Net::new(NetId::new(0), vec![Coordinate2D::new(2, 2)]);
        assert_eq!(net.bbox_size(), 0);
    }
}
