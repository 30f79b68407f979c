use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;

use crate::steiner::SteinerTree;

/// A two-pin sub-net (spec.md §3 `TwoPinElement2D`): the ordered tile path
/// between `pin1` and `pin2`. Invariant: `path.first() == pin1`,
/// `path.last() == pin2`, consecutive tiles differ by exactly one unit on
/// exactly one axis.
#[derive(Clone, Debug)]
pub struct TwoPinElement2D {
    pub net: NetId,
    pub pin1: Coordinate2D,
    pub pin2: Coordinate2D,
    pub path: Vec<Coordinate2D>,
}

impl TwoPinElement2D {
    pub fn new(net: NetId, pin1: Coordinate2D, pin2: Coordinate2D) -> Self {
        Self {
            net,
            pin1,
            pin2,
            path: Vec::new(),
        }
    }

    pub fn bbox_size(&self) -> i64 {
        self.pin1.manhattan(self.pin2)
    }

    pub fn is_valid_unit_step_path(&self) -> bool {
        if self.path.is_empty() {
            return false;
        }
        if self.path.first() != Some(&self.pin1) || self.path.last() != Some(&self.pin2) {
            return false;
        }
        self.path.windows(2).all(|w| w[0].manhattan(w[1]) == 1)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Coordinate2D, Coordinate2D)> + '_ {
        self.path.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Walk every `(node, parent)` edge of a Steiner tree and emit one
/// `TwoPinElement2D` per distinct-endpoint edge, owned by `net`
/// (spec.md §4.2). Degenerate zero-length edges (coincident pins) are
/// dropped; `path` is left empty for the pattern router to fill in.
pub fn decompose(tree: &SteinerTree, net: NetId) -> Vec<TwoPinElement2D> {
    tree.edges()
        .filter_map(|(i, parent)| {
            let a = tree.branch[i].coord;
            let b = tree.branch[parent].coord;
            if a == b {
                None
            } else {
                Some(TwoPinElement2D::new(net, a, b))
            }
        })
        .collect()
}
