pub mod hanan_mst;
pub mod tree;

pub use hanan_mst::HananMstOracle;
pub use tree::{RsmtOracle, SteinerBranch, SteinerTree};
