pub mod edge_plane;

pub use edge_plane::{EdgePlane2D, EdgePlane3D};
