pub mod klat;
pub mod map3d;
pub mod order;

pub use klat::{assign_layers, KlatNode};
pub use map3d::CongestionMap3D;
pub use order::{sort_net_order, NetOrderingInput};
