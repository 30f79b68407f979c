use crate::error::OracleError;
use groute_common::db::NetId;
use groute_common::geom::Coordinate2D;

/// One node of a `SteinerTree`: its coordinate, and the index of its parent
/// in the tree's `branch` array. The root is its own parent (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SteinerBranch {
    pub coord: Coordinate2D,
    pub parent: usize,
}

/// A rectilinear Steiner tree on `deg` pins: nodes `[0, deg)` are the pins in
/// the order they were supplied, nodes `[deg, branch.len())` are Steiner
/// points the oracle introduced.
#[derive(Clone, Debug)]
pub struct SteinerTree {
    pub deg: usize,
    pub branch: Vec<SteinerBranch>,
    pub root: usize,
}

impl SteinerTree {
    pub fn is_pin(&self, index: usize) -> bool {
        index < self.deg
    }

    /// `(i, branch[i].parent)` for every non-root node — the edges the
    /// two-pin decomposer walks (spec.md §4.2).
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.branch.len())
            .filter(move |&i| i != self.root)
            .map(|i| (i, self.branch[i].parent))
    }

    pub fn validate(&self, net: NetId) -> Result<(), OracleError> {
        if self.deg == 0 {
            return Err(OracleError::EmptyNet(net));
        }
        if self.branch.len() < self.deg {
            return Err(OracleError::MalformedTree {
                expected: self.deg,
                returned: self.branch.len(),
            });
        }
        for b in &self.branch {
            if b.parent >= self.branch.len() {
                return Err(OracleError::MalformedTree {
                    expected: self.branch.len(),
                    returned: b.parent,
                });
            }
        }
        Ok(())
    }
}

/// The Steiner-tree primitive this engine treats as an external, side-effect
/// free collaborator (spec.md §6).
pub trait RsmtOracle {
    fn solve(&self, pins: &[Coordinate2D]) -> Result<SteinerTree, OracleError>;
}
