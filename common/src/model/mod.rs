pub mod net;
pub mod region;

pub use net::Net;
pub use region::{CapacityWithOverrides, EdgeCapacity, RoutingRegion, UniformCapacity};
